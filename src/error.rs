use std::path::PathBuf;

use crate::span::{LineCol, Span};

/// A soft lexical error. The lexer reports these and keeps scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("invalid character")]
    InvalidCharacter,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("hexadecimal digit expected")]
    HexDigitExpected,

    #[error("decimal digit expected")]
    DecimalDigitExpected,

    #[error("unicode escape value out of range")]
    EscapeOutOfRange,

    #[error("unterminated unicode escape sequence")]
    UnterminatedEscape,

    #[error("unpaired surrogate in unicode escape")]
    UnpairedSurrogate,

    #[error("unexpected end of text")]
    UnexpectedEndOfText,

    #[error("numeric literal too large")]
    NumericOverflow,
}

/// Errors from the parser. Any of these aborts the parse of the whole file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error at {location}: expected {expected}, found {found}")]
    Expected {
        span: Span,
        location: LineCol,
        expected: String,
        found: String,
    },

    #[error("syntax error at {location}: unrecognized syntax version '{version}'")]
    InvalidSyntaxVersion {
        span: Span,
        location: LineCol,
        version: String,
    },

    #[error("syntax error at {location}: invalid map key type {found}")]
    InvalidMapKey {
        span: Span,
        location: LineCol,
        found: String,
    },

    #[error("syntax error at {location}: sign is only allowed before a numeric literal, found {found}")]
    MisplacedSign {
        span: Span,
        location: LineCol,
        found: String,
    },

    #[error("syntax error at {location}: field number must be an integer literal, found {found}")]
    InvalidFieldNumber {
        span: Span,
        location: LineCol,
        found: String,
    },

    #[error("syntax error at {location}: messages nested deeper than {limit} levels")]
    TooDeep {
        span: Span,
        location: LineCol,
        limit: usize,
    },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. }
            | ParseError::InvalidSyntaxVersion { span, .. }
            | ParseError::InvalidMapKey { span, .. }
            | ParseError::MisplacedSign { span, .. }
            | ParseError::InvalidFieldNumber { span, .. }
            | ParseError::TooDeep { span, .. } => *span,
        }
    }

    pub fn location(&self) -> LineCol {
        match self {
            ParseError::Expected { location, .. }
            | ParseError::InvalidSyntaxVersion { location, .. }
            | ParseError::InvalidMapKey { location, .. }
            | ParseError::MisplacedSign { location, .. }
            | ParseError::InvalidFieldNumber { location, .. }
            | ParseError::TooDeep { location, .. } => *location,
        }
    }
}

/// Errors from the binder. Binding of the offending file is rolled back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("symbol '{name}' has already been defined in '{scope}'")]
    DuplicateSymbol { name: String, scope: String },
}

/// Errors from the project layer, tagged with the file they concern.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("failed to bind '{}': {source}", path.display())]
    Bind { path: PathBuf, source: BindError },
}

impl ProjectError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ProjectError::Io { path, .. }
            | ProjectError::Parse { path, .. }
            | ProjectError::Bind { path, .. } => path,
        }
    }
}

/// Errors applying text replacements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixError {
    #[error("replacement {start}..{end} is outside the text (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("replacement {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },

    #[error("replacement at {start} with length {length} runs past the end of addressable text")]
    Overflow { start: usize, length: usize },

    #[error("replacement {start}..{end} overlaps replacement {other_start}..{other_end}")]
    Overlap {
        start: usize,
        end: usize,
        other_start: usize,
        other_end: usize,
    },
}

/// Top-level error type that wraps all sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtolintError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Fix(#[from] FixError),
}

/// Result type alias for protolint operations.
pub type Result<T> = std::result::Result<T, ProtolintError>;
