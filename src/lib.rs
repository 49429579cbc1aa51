//! Protolint: the front end of a linter for `.proto` schema files.
//!
//! Source text goes through four stages, each feeding the next:
//!
//! - [`parser::lexer`] turns text into tokens, reporting soft errors to a sink.
//! - [`parser::grammar`] builds a [`SourceFile`] AST, failing fast on syntax errors.
//! - [`Binder`] declares packages, messages, enums and services in a shared
//!   [`SymbolTable`], merging packages across files.
//! - [`Resolver`] finds the symbol a qualified name refers to.
//!
//! # Quick Start
//!
//! ```rust
//! use protolint::{parser, Binder, Resolver};
//!
//! let mut file = parser::parse("foo.proto", r#"
//!     syntax = "proto3";
//!     package demo;
//!     message Person {
//!         string name = 1;
//!         Address home = 2;
//!         message Address {}
//!     }
//! "#).unwrap();
//!
//! let mut binder = Binder::new();
//! binder.bind(&mut file).unwrap();
//!
//! let resolver = Resolver::new(binder.symbols());
//! let refs = resolver.references(&file);
//! let target = refs[0].symbol.unwrap();
//! assert_eq!(resolver.fully_qualified_name(target), ".demo.Person.Address");
//! ```

pub mod binder;
pub mod error;
pub mod fix;
pub mod parser;
pub mod project;
pub mod resolver;
pub mod span;
pub mod symbols;

pub use binder::Binder;
pub use error::{BindError, FixError, LexError, ParseError, ProjectError, ProtolintError, Result};
pub use fix::{apply_replacements, Replacement};
pub use parser::SourceFile;
pub use project::{FileSystem, MemorySources, Project, SourceProvider};
pub use resolver::{Resolver, TypeReference};
pub use span::{LineCol, LineIndex, Span};
pub use symbols::{Symbol, SymbolId, SymbolKind, SymbolTable};
