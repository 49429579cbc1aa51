//! Lexing and parsing of `.proto` source text.

pub mod ast;
pub mod grammar;
pub mod lexer;
pub mod token;
pub mod visit;

use crate::error::ParseError;

pub use ast::SourceFile;
pub use grammar::Parser;
pub use lexer::{ErrorSink, Lexer, TokenValue};
pub use token::SyntaxKind;
pub use visit::{walk, NodeRef};

/// Parse one file's text into a [`SourceFile`].
///
/// This is the main entry point for the parser module. The first syntax
/// error aborts the parse; soft lexical errors are kept on the result.
pub fn parse(file_name: &str, text: &str) -> Result<SourceFile, ParseError> {
    Parser::new(text).parse_source_file(file_name)
}
