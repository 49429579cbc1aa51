use crate::error::{LexError, ParseError};
use crate::span::{LineIndex, Span};

use super::ast::*;
use super::lexer::{Lexer, LexerSnapshot, TokenValue};
use super::token::SyntaxKind;

type PResult<T> = Result<T, ParseError>;

/// Deepest message nesting accepted before the parse is abandoned.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Recursive-descent parser over one file, one token of lookahead.
///
/// The current token is primed on construction. A syntax error aborts the
/// whole parse; there is no recovery.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    line_index: LineIndex,
    /// End of the last consumed token. Nodes end here, before any trivia.
    last_token_end: usize,
    next_id: u32,
    dependencies: Vec<String>,
    depth: usize,
}

struct ParserSnapshot {
    lexer: LexerSnapshot,
    last_token_end: usize,
    next_id: u32,
    dependencies: usize,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lexer = Lexer::new(text, true);
        lexer.scan();
        Parser {
            lexer,
            line_index: LineIndex::new(text),
            last_token_end: 0,
            next_id: 0,
            dependencies: Vec::new(),
            depth: 0,
        }
    }

    /// Soft lexical errors met so far.
    pub fn lex_errors(&self) -> &[LexError] {
        self.lexer.errors()
    }

    pub fn parse_source_file(mut self, file_name: &str) -> PResult<SourceFile> {
        let id = self.node_id();
        let syntax = self.parse_syntax_declaration()?;

        let mut statements = Vec::new();
        while self.token() != SyntaxKind::EndOfFile {
            statements.push(self.parse_statement()?);
        }

        let text = self.lexer.text();
        tracing::debug!(
            file = file_name,
            statements = statements.len(),
            nodes = self.next_id,
            lex_errors = self.lexer.errors().len(),
            "parsed source file"
        );

        Ok(SourceFile::new(
            id,
            file_name.to_string(),
            text.to_string(),
            self.line_index,
            syntax,
            statements,
            self.dependencies,
            self.lexer.into_sink(),
            self.next_id,
        ))
    }

    // ---- token plumbing ----

    fn token(&self) -> SyntaxKind {
        self.lexer.token()
    }

    fn start(&self) -> usize {
        self.lexer.token_start()
    }

    fn next_token(&mut self) -> SyntaxKind {
        self.last_token_end = self.lexer.token_end();
        self.lexer.scan()
    }

    fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn finish(&self, start: usize) -> Span {
        Span::new(start, self.last_token_end)
    }

    fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn parse_expected(&mut self, kind: SyntaxKind) -> PResult<Span> {
        if self.token() == kind {
            let span = self.lexer.token_span();
            self.next_token();
            Ok(span)
        } else {
            Err(self.expected(kind.to_string()))
        }
    }

    fn snapshot(&mut self) -> ParserSnapshot {
        ParserSnapshot {
            lexer: self.lexer.snapshot(),
            last_token_end: self.last_token_end,
            next_id: self.next_id,
            dependencies: self.dependencies.len(),
        }
    }

    fn restore(&mut self, saved: ParserSnapshot) {
        self.lexer.restore(saved.lexer);
        self.last_token_end = saved.last_token_end;
        self.next_id = saved.next_id;
        self.dependencies.truncate(saved.dependencies);
    }

    /// Run `f` and restore all parser state afterwards.
    fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.snapshot();
        let result = f(self);
        self.restore(saved);
        result
    }

    /// Run `f`, keeping its progress only when it returns `Some`.
    fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let saved = self.snapshot();
        let result = f(self);
        match result {
            Some(_) => self.lexer.commit(saved.lexer),
            None => self.restore(saved),
        }
        result
    }

    fn next_token_is(&mut self, predicate: impl FnOnce(SyntaxKind) -> bool) -> bool {
        self.look_ahead(|p| predicate(p.next_token()))
    }

    fn describe_token(&self) -> String {
        let kind = self.token();
        match kind {
            SyntaxKind::Identifier
            | SyntaxKind::Unknown
            | SyntaxKind::StringLiteral
            | SyntaxKind::DecimalLiteral
            | SyntaxKind::OctalLiteral
            | SyntaxKind::HexLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::BooleanLiteral => format!("{} '{}'", kind, self.lexer.token_text()),
            _ => kind.to_string(),
        }
    }

    fn expected(&self, expected: impl Into<String>) -> ParseError {
        let span = self.lexer.token_span();
        ParseError::Expected {
            span,
            location: self.line_index.line_col(span.start),
            expected: expected.into(),
            found: self.describe_token(),
        }
    }

    // ---- declarations ----

    fn parse_syntax_declaration(&mut self) -> PResult<SyntaxDeclaration> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::SyntaxKeyword)?;
        self.parse_expected(SyntaxKind::Equals)?;

        if self.token() != SyntaxKind::StringLiteral {
            return Err(self.expected("syntax version string"));
        }
        let span = self.lexer.token_span();
        let version = match self.lexer.token_value().as_str() {
            Some("proto2") => SyntaxVersion::Proto2,
            Some("proto3") => SyntaxVersion::Proto3,
            other => {
                return Err(ParseError::InvalidSyntaxVersion {
                    span,
                    location: self.line_index.line_col(span.start),
                    version: other.unwrap_or_default().to_string(),
                })
            }
        };
        self.next_token();
        self.parse_expected(SyntaxKind::Semicolon)?;

        Ok(SyntaxDeclaration {
            id,
            span: self.finish(start),
            version,
        })
    }

    fn parse_statement(&mut self) -> PResult<Statement> {
        Ok(match self.token() {
            SyntaxKind::OptionKeyword => Statement::Option(self.parse_option_statement()?),
            SyntaxKind::PackageKeyword => Statement::Package(self.parse_package_statement()?),
            SyntaxKind::ImportKeyword => Statement::Import(self.parse_import_statement()?),
            SyntaxKind::MessageKeyword => Statement::Message(self.parse_message_definition()?),
            SyntaxKind::EnumKeyword => Statement::Enum(self.parse_enum_definition()?),
            SyntaxKind::ServiceKeyword => Statement::Service(self.parse_service_definition()?),
            SyntaxKind::Semicolon => Statement::Empty(self.parse_empty_statement()?),
            _ => return Err(self.expected("top-level statement")),
        })
    }

    fn parse_empty_statement(&mut self) -> PResult<EmptyStatement> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::Semicolon)?;
        Ok(EmptyStatement {
            id,
            span: self.finish(start),
        })
    }

    fn parse_package_statement(&mut self) -> PResult<PackageStatement> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::PackageKeyword)?;
        let name = self.parse_full_identifier()?;
        self.parse_expected(SyntaxKind::Semicolon)?;
        Ok(PackageStatement {
            id,
            span: self.finish(start),
            name,
        })
    }

    fn parse_import_statement(&mut self) -> PResult<ImportStatement> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::ImportKeyword)?;
        let modifier = match self.token() {
            SyntaxKind::WeakKeyword => Some(ImportModifier::Weak),
            SyntaxKind::PublicKeyword => Some(ImportModifier::Public),
            _ => None,
        };
        if modifier.is_some() {
            self.next_token();
        }
        let path = self.parse_string_literal()?;
        self.parse_expected(SyntaxKind::Semicolon)?;

        self.dependencies.push(path.value.clone());
        Ok(ImportStatement {
            id,
            span: self.finish(start),
            modifier,
            path,
        })
    }

    fn parse_option_statement(&mut self) -> PResult<OptionStatement> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::OptionKeyword)?;
        let name = self.parse_option_name()?;
        self.parse_expected(SyntaxKind::Equals)?;
        let value = self.parse_constant()?;
        self.parse_expected(SyntaxKind::Semicolon)?;
        Ok(OptionStatement {
            id,
            span: self.finish(start),
            name,
            value,
        })
    }

    fn parse_option_name(&mut self) -> PResult<OptionName> {
        let id = self.node_id();
        let start = self.start();

        let (extension, name) = if self.parse_optional(SyntaxKind::OpenParen) {
            let extension = self.parse_full_identifier()?;
            self.parse_expected(SyntaxKind::CloseParen)?;
            let suffix = if self.parse_optional(SyntaxKind::Dot) {
                let suffix_start = self.start();
                Some(self.parse_name_chain(suffix_start, false)?)
            } else {
                None
            };
            (Some(extension), suffix)
        } else {
            (None, Some(self.parse_full_identifier()?))
        };

        Ok(OptionName {
            id,
            span: self.finish(start),
            extension,
            name,
        })
    }

    /// `[name = value, ...]` after a field; empty if there is no bracket.
    fn parse_field_options(&mut self) -> PResult<Vec<FieldOption>> {
        let mut options = Vec::new();
        if !self.parse_optional(SyntaxKind::OpenBracket) {
            return Ok(options);
        }
        loop {
            let id = self.node_id();
            let start = self.start();
            let name = self.parse_option_name()?;
            self.parse_expected(SyntaxKind::Equals)?;
            let value = self.parse_constant()?;
            options.push(FieldOption {
                id,
                span: self.finish(start),
                name,
                value,
            });
            if !self.parse_optional(SyntaxKind::Comma) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracket)?;
        Ok(options)
    }

    // ---- messages ----

    fn parse_message_definition(&mut self) -> PResult<MessageDefinition> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = self.lexer.token_span();
            return Err(ParseError::TooDeep {
                span,
                location: self.line_index.line_col(span.start),
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        let result = self.parse_message_body_block();
        self.depth -= 1;
        result
    }

    fn parse_message_body_block(&mut self) -> PResult<MessageDefinition> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::MessageKeyword)?;
        let name = self.parse_identifier()?;
        self.parse_expected(SyntaxKind::OpenBrace)?;

        let mut body = Vec::new();
        while self.token() != SyntaxKind::CloseBrace {
            body.push(self.parse_message_body_statement()?);
        }
        self.parse_expected(SyntaxKind::CloseBrace)?;

        Ok(MessageDefinition {
            id,
            span: self.finish(start),
            name,
            body,
            symbol: None,
        })
    }

    fn parse_message_body_statement(&mut self) -> PResult<MessageBodyStatement> {
        use MessageBodyStatement as S;
        Ok(match self.token() {
            SyntaxKind::OptionKeyword => S::Option(self.parse_option_statement()?),
            SyntaxKind::EnumKeyword => S::Enum(self.parse_enum_definition()?),
            SyntaxKind::MessageKeyword => S::Message(self.parse_message_definition()?),
            SyntaxKind::OneofKeyword => S::Oneof(self.parse_oneof_statement()?),
            SyntaxKind::ReservedKeyword => S::Reserved(self.parse_reserved_statement()?),
            SyntaxKind::Semicolon => S::Empty(self.parse_empty_statement()?),
            SyntaxKind::MapKeyword if self.next_token_is(|k| k == SyntaxKind::LessThan) => {
                S::MapField(self.parse_map_field_statement()?)
            }
            SyntaxKind::RepeatedKeyword
            | SyntaxKind::OptionalKeyword
            | SyntaxKind::RequiredKeyword
            | SyntaxKind::Dot => S::Field(self.parse_field_statement(true)?),
            kind if kind.is_identifier_or_keyword() => S::Field(self.parse_field_statement(true)?),
            _ => return Err(self.expected("message body statement")),
        })
    }

    fn parse_field_statement(&mut self, allow_label: bool) -> PResult<FieldStatement> {
        let id = self.node_id();
        let start = self.start();

        let label = if allow_label {
            let label = match self.token() {
                SyntaxKind::RepeatedKeyword => Some(FieldLabel::Repeated),
                SyntaxKind::OptionalKeyword => Some(FieldLabel::Optional),
                SyntaxKind::RequiredKeyword => Some(FieldLabel::Required),
                _ => None,
            };
            if label.is_some() {
                self.next_token();
            }
            label
        } else {
            None
        };

        let field_type = self.parse_field_type()?;
        let name = self.parse_identifier()?;
        self.parse_expected(SyntaxKind::Equals)?;
        let number = self.parse_field_number()?;
        let options = self.parse_field_options()?;
        self.parse_expected(SyntaxKind::Semicolon)?;

        Ok(FieldStatement {
            id,
            span: self.finish(start),
            label,
            field_type,
            name,
            number,
            options,
        })
    }

    fn parse_field_type(&mut self) -> PResult<FieldType> {
        if self.token().is_scalar_type() {
            Ok(FieldType::Scalar(self.parse_scalar_type()?))
        } else if self.token() == SyntaxKind::Dot || self.token().is_identifier_or_keyword() {
            Ok(FieldType::Reference(self.parse_full_identifier()?))
        } else {
            Err(self.expected("field type"))
        }
    }

    fn parse_scalar_type(&mut self) -> PResult<ScalarType> {
        let id = self.node_id();
        let start = self.start();
        let kind = self.token();
        if !kind.is_scalar_type() {
            return Err(self.expected("scalar type"));
        }
        self.next_token();
        Ok(ScalarType {
            id,
            span: self.finish(start),
            kind,
        })
    }

    fn parse_field_number(&mut self) -> PResult<IntegerLiteral> {
        if !self.token().is_integer_literal() {
            let span = self.lexer.token_span();
            return Err(ParseError::InvalidFieldNumber {
                span,
                location: self.line_index.line_col(span.start),
                found: self.describe_token(),
            });
        }
        self.parse_integer_literal()
    }

    fn parse_map_field_statement(&mut self) -> PResult<MapFieldStatement> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::MapKeyword)?;
        self.parse_expected(SyntaxKind::LessThan)?;

        if !self.token().is_key_type() {
            let span = self.lexer.token_span();
            return Err(ParseError::InvalidMapKey {
                span,
                location: self.line_index.line_col(span.start),
                found: self.describe_token(),
            });
        }
        let key_type = self.parse_scalar_type()?;
        self.parse_expected(SyntaxKind::Comma)?;
        let value_type = self.parse_field_type()?;
        self.parse_expected(SyntaxKind::GreaterThan)?;

        let name = self.parse_identifier()?;
        self.parse_expected(SyntaxKind::Equals)?;
        let number = self.parse_field_number()?;
        let options = self.parse_field_options()?;
        self.parse_expected(SyntaxKind::Semicolon)?;

        Ok(MapFieldStatement {
            id,
            span: self.finish(start),
            key_type,
            value_type,
            name,
            number,
            options,
        })
    }

    fn parse_oneof_statement(&mut self) -> PResult<OneofStatement> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::OneofKeyword)?;
        let name = self.parse_identifier()?;
        self.parse_expected(SyntaxKind::OpenBrace)?;

        let mut body = Vec::new();
        while self.token() != SyntaxKind::CloseBrace {
            let statement = match self.token() {
                SyntaxKind::Semicolon => OneofBodyStatement::Empty(self.parse_empty_statement()?),
                SyntaxKind::Dot => OneofBodyStatement::Field(self.parse_field_statement(false)?),
                kind if kind.is_identifier_or_keyword() => {
                    OneofBodyStatement::Field(self.parse_field_statement(false)?)
                }
                _ => return Err(self.expected("oneof field")),
            };
            body.push(statement);
        }
        self.parse_expected(SyntaxKind::CloseBrace)?;

        Ok(OneofStatement {
            id,
            span: self.finish(start),
            name,
            body,
        })
    }

    fn parse_reserved_statement(&mut self) -> PResult<ReservedStatement> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::ReservedKeyword)?;

        let mut ranges = Vec::new();
        let mut names = Vec::new();
        if self.token() == SyntaxKind::StringLiteral {
            loop {
                names.push(self.parse_string_literal()?);
                if !self.parse_optional(SyntaxKind::Comma) {
                    break;
                }
            }
        } else {
            loop {
                ranges.push(self.parse_reserved_range()?);
                if !self.parse_optional(SyntaxKind::Comma) {
                    break;
                }
            }
        }
        self.parse_expected(SyntaxKind::Semicolon)?;

        Ok(ReservedStatement {
            id,
            span: self.finish(start),
            ranges,
            names,
        })
    }

    fn parse_reserved_range(&mut self) -> PResult<ReservedRange> {
        let id = self.node_id();
        let start = self.start();
        let first = self.parse_field_number()?;
        let end = if self.parse_optional(SyntaxKind::ToKeyword) {
            if self.token() == SyntaxKind::MaxKeyword {
                let span = self.lexer.token_span();
                self.next_token();
                Some(RangeEnd::Max(span))
            } else {
                Some(RangeEnd::Number(self.parse_field_number()?))
            }
        } else {
            None
        };
        Ok(ReservedRange {
            id,
            span: self.finish(start),
            start: first,
            end,
        })
    }

    // ---- enums ----

    fn parse_enum_definition(&mut self) -> PResult<EnumDefinition> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::EnumKeyword)?;
        let name = self.parse_identifier()?;
        self.parse_expected(SyntaxKind::OpenBrace)?;

        let mut body = Vec::new();
        while self.token() != SyntaxKind::CloseBrace {
            let statement = match self.token() {
                SyntaxKind::OptionKeyword => EnumBodyStatement::Option(self.parse_option_statement()?),
                SyntaxKind::ReservedKeyword => {
                    EnumBodyStatement::Reserved(self.parse_reserved_statement()?)
                }
                SyntaxKind::Semicolon => EnumBodyStatement::Empty(self.parse_empty_statement()?),
                kind if kind.is_identifier_or_keyword() => {
                    EnumBodyStatement::Field(self.parse_enum_field_statement()?)
                }
                _ => return Err(self.expected("enum body statement")),
            };
            body.push(statement);
        }
        self.parse_expected(SyntaxKind::CloseBrace)?;

        Ok(EnumDefinition {
            id,
            span: self.finish(start),
            name,
            body,
            symbol: None,
        })
    }

    fn parse_enum_field_statement(&mut self) -> PResult<EnumFieldStatement> {
        let id = self.node_id();
        let start = self.start();
        let name = self.parse_identifier()?;
        self.parse_expected(SyntaxKind::Equals)?;

        let value_start = self.start();
        let value = self.parse_constant()?;
        if !matches!(value.value, ConstantValue::Integer(_)) {
            let span = value.span;
            return Err(ParseError::InvalidFieldNumber {
                span,
                location: self.line_index.line_col(value_start),
                found: format!("'{}'", span.slice(self.lexer.text())),
            });
        }

        let options = self.parse_field_options()?;
        self.parse_expected(SyntaxKind::Semicolon)?;

        Ok(EnumFieldStatement {
            id,
            span: self.finish(start),
            name,
            value,
            options,
            symbol: None,
        })
    }

    // ---- services ----

    fn parse_service_definition(&mut self) -> PResult<ServiceDefinition> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::ServiceKeyword)?;
        let name = self.parse_identifier()?;
        self.parse_expected(SyntaxKind::OpenBrace)?;

        let mut body = Vec::new();
        while self.token() != SyntaxKind::CloseBrace {
            let statement = match self.token() {
                SyntaxKind::OptionKeyword => {
                    ServiceBodyStatement::Option(self.parse_option_statement()?)
                }
                SyntaxKind::RpcKeyword => ServiceBodyStatement::Rpc(self.parse_rpc_statement()?),
                SyntaxKind::Semicolon => ServiceBodyStatement::Empty(self.parse_empty_statement()?),
                _ => return Err(self.expected("service body statement")),
            };
            body.push(statement);
        }
        self.parse_expected(SyntaxKind::CloseBrace)?;

        Ok(ServiceDefinition {
            id,
            span: self.finish(start),
            name,
            body,
            symbol: None,
        })
    }

    fn parse_rpc_statement(&mut self) -> PResult<RpcStatement> {
        let id = self.node_id();
        let start = self.start();
        self.parse_expected(SyntaxKind::RpcKeyword)?;
        let name = self.parse_identifier()?;

        self.parse_expected(SyntaxKind::OpenParen)?;
        let request = self.parse_rpc_type()?;
        self.parse_expected(SyntaxKind::CloseParen)?;
        self.parse_expected(SyntaxKind::ReturnsKeyword)?;
        self.parse_expected(SyntaxKind::OpenParen)?;
        let response = self.parse_rpc_type()?;
        self.parse_expected(SyntaxKind::CloseParen)?;

        let mut body = Vec::new();
        if self.parse_optional(SyntaxKind::OpenBrace) {
            while self.token() != SyntaxKind::CloseBrace {
                let statement = match self.token() {
                    SyntaxKind::OptionKeyword => {
                        RpcBodyStatement::Option(self.parse_option_statement()?)
                    }
                    SyntaxKind::Semicolon => RpcBodyStatement::Empty(self.parse_empty_statement()?),
                    _ => return Err(self.expected("rpc body statement")),
                };
                body.push(statement);
            }
            self.parse_expected(SyntaxKind::CloseBrace)?;
        } else if self.token() != SyntaxKind::Semicolon {
            return Err(self.expected("';' or '{'"));
        } else {
            self.next_token();
        }

        Ok(RpcStatement {
            id,
            span: self.finish(start),
            name,
            request,
            response,
            body,
        })
    }

    fn parse_rpc_type(&mut self) -> PResult<RpcType> {
        let id = self.node_id();
        let start = self.start();
        // `stream` is a modifier only when a type name follows it.
        let stream = self.token() == SyntaxKind::StreamKeyword
            && self.next_token_is(|k| k == SyntaxKind::Dot || k.is_identifier_or_keyword());
        if stream {
            self.next_token();
        }
        let type_name = self.parse_full_identifier()?;
        Ok(RpcType {
            id,
            span: self.finish(start),
            stream,
            type_name,
        })
    }

    // ---- names and constants ----

    fn parse_identifier(&mut self) -> PResult<Identifier> {
        if !self.token().is_identifier_or_keyword() {
            return Err(self.expected("identifier"));
        }
        let id = self.node_id();
        let span = self.lexer.token_span();
        let text = self.lexer.token_text().to_string();
        self.next_token();
        Ok(Identifier { id, span, text })
    }

    fn parse_full_identifier(&mut self) -> PResult<FullIdentifier> {
        let start = self.start();
        let root_relative = self.parse_optional(SyntaxKind::Dot);
        self.parse_name_chain(start, root_relative)
    }

    /// `a.b.c` starting at the current token.
    fn parse_name_chain(&mut self, start: usize, root_relative: bool) -> PResult<FullIdentifier> {
        let id = self.node_id();
        let mut terminal = self.parse_identifier()?;
        let mut qualifiers = Vec::new();
        while self.parse_optional(SyntaxKind::Dot) {
            let next = self.parse_identifier()?;
            qualifiers.push(std::mem::replace(&mut terminal, next));
        }
        Ok(FullIdentifier {
            id,
            span: self.finish(start),
            root_relative,
            qualifiers,
            terminal,
        })
    }

    fn parse_constant(&mut self) -> PResult<Constant> {
        let id = self.node_id();
        let start = self.start();

        let sign = match self.token() {
            SyntaxKind::Plus | SyntaxKind::Minus => {
                let sign = if self.token() == SyntaxKind::Plus {
                    Sign::Plus
                } else {
                    Sign::Minus
                };
                let committed = self.try_parse(|p| {
                    p.next_token();
                    p.token().is_numeric_literal().then_some(())
                });
                if committed.is_none() {
                    let span = self.lexer.token_span();
                    let found = self.look_ahead(|p| {
                        p.next_token();
                        p.describe_token()
                    });
                    return Err(ParseError::MisplacedSign {
                        span,
                        location: self.line_index.line_col(span.start),
                        found,
                    });
                }
                Some(sign)
            }
            _ => None,
        };

        let value = match self.token() {
            kind if kind.is_integer_literal() => ConstantValue::Integer(self.parse_integer_literal()?),
            SyntaxKind::FloatLiteral => {
                let id = self.node_id();
                let span = self.lexer.token_span();
                let value = self.lexer.token_value().as_f64().unwrap_or_default();
                self.next_token();
                ConstantValue::Float(FloatLiteral { id, span, value })
            }
            SyntaxKind::StringLiteral => ConstantValue::String(self.parse_string_literal()?),
            SyntaxKind::BooleanLiteral => {
                let id = self.node_id();
                let span = self.lexer.token_span();
                let value = matches!(self.lexer.token_value(), TokenValue::Boolean(true));
                self.next_token();
                ConstantValue::Boolean(BooleanLiteral { id, span, value })
            }
            kind if kind == SyntaxKind::Dot || kind.is_identifier_or_keyword() => {
                ConstantValue::Identifier(self.parse_full_identifier()?)
            }
            _ => return Err(self.expected("constant")),
        };

        Ok(Constant {
            id,
            span: self.finish(start),
            sign,
            value,
        })
    }

    fn parse_integer_literal(&mut self) -> PResult<IntegerLiteral> {
        let kind = self.token();
        if !kind.is_integer_literal() {
            return Err(self.expected("integer literal"));
        }
        let id = self.node_id();
        let span = self.lexer.token_span();
        let value = self.lexer.token_value().as_u64().unwrap_or_default();
        self.next_token();
        Ok(IntegerLiteral {
            id,
            span,
            kind,
            value,
        })
    }

    /// One or more adjacent string literals, joined.
    fn parse_string_literal(&mut self) -> PResult<StringLiteral> {
        if self.token() != SyntaxKind::StringLiteral {
            return Err(self.expected(SyntaxKind::StringLiteral.to_string()));
        }
        let id = self.node_id();
        let start = self.start();
        let mut value = String::new();
        while self.token() == SyntaxKind::StringLiteral {
            value.push_str(self.lexer.token_value().as_str().unwrap_or_default());
            self.next_token();
        }
        Ok(StringLiteral {
            id,
            span: self.finish(start),
            value,
        })
    }
}
