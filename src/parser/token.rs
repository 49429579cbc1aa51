//! Token and node kinds, the keyword table, and kind predicates.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// Every token and grammar production the front end knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SyntaxKind {
    Unknown,
    EndOfFile,

    // Trivia
    NewLineTrivia,
    WhitespaceTrivia,
    SingleLineCommentTrivia,
    MultiLineCommentTrivia,

    // Punctuation
    Equals,
    Dot,
    Comma,
    Semicolon,
    Slash,
    Plus,
    Minus,
    LessThan,
    GreaterThan,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,

    // Literals
    DecimalLiteral,
    OctalLiteral,
    HexLiteral,
    FloatLiteral,
    StringLiteral,
    BooleanLiteral,

    Identifier,

    // Keywords
    SyntaxKeyword,
    ImportKeyword,
    WeakKeyword,
    PublicKeyword,
    PackageKeyword,
    OptionKeyword,
    MessageKeyword,
    EnumKeyword,
    ServiceKeyword,
    RpcKeyword,
    ReturnsKeyword,
    StreamKeyword,
    RepeatedKeyword,
    OptionalKeyword,
    RequiredKeyword,
    OneofKeyword,
    MapKeyword,
    ReservedKeyword,
    ToKeyword,
    MaxKeyword,

    // Scalar type keywords
    DoubleKeyword,
    FloatKeyword,
    Int32Keyword,
    Int64Keyword,
    Uint32Keyword,
    Uint64Keyword,
    Sint32Keyword,
    Sint64Keyword,
    Fixed32Keyword,
    Fixed64Keyword,
    Sfixed32Keyword,
    Sfixed64Keyword,
    BoolKeyword,
    StringKeyword,
    BytesKeyword,

    // Nodes
    SourceFile,
    SyntaxDeclaration,
    PackageStatement,
    ImportStatement,
    OptionStatement,
    OptionName,
    FieldOption,
    MessageDefinition,
    EnumDefinition,
    ServiceDefinition,
    FieldStatement,
    MapFieldStatement,
    OneofStatement,
    OneofFieldStatement,
    EnumFieldStatement,
    ReservedStatement,
    ReservedRange,
    RpcStatement,
    RpcType,
    EmptyStatement,
    FullIdentifier,
    ScalarType,
    Constant,
}

static KEYWORDS: Lazy<HashMap<&'static str, SyntaxKind>> = Lazy::new(|| {
    use SyntaxKind::*;
    HashMap::from([
        ("syntax", SyntaxKeyword),
        ("import", ImportKeyword),
        ("weak", WeakKeyword),
        ("public", PublicKeyword),
        ("package", PackageKeyword),
        ("option", OptionKeyword),
        ("message", MessageKeyword),
        ("enum", EnumKeyword),
        ("service", ServiceKeyword),
        ("rpc", RpcKeyword),
        ("returns", ReturnsKeyword),
        ("stream", StreamKeyword),
        ("repeated", RepeatedKeyword),
        ("optional", OptionalKeyword),
        ("required", RequiredKeyword),
        ("oneof", OneofKeyword),
        ("map", MapKeyword),
        ("reserved", ReservedKeyword),
        ("to", ToKeyword),
        ("max", MaxKeyword),
        ("double", DoubleKeyword),
        ("float", FloatKeyword),
        ("int32", Int32Keyword),
        ("int64", Int64Keyword),
        ("uint32", Uint32Keyword),
        ("uint64", Uint64Keyword),
        ("sint32", Sint32Keyword),
        ("sint64", Sint64Keyword),
        ("fixed32", Fixed32Keyword),
        ("fixed64", Fixed64Keyword),
        ("sfixed32", Sfixed32Keyword),
        ("sfixed64", Sfixed64Keyword),
        ("bool", BoolKeyword),
        ("string", StringKeyword),
        ("bytes", BytesKeyword),
        ("true", BooleanLiteral),
        ("false", BooleanLiteral),
    ])
});

/// Classify an identifier run: a keyword kind, `BooleanLiteral`, or `Identifier`.
pub fn identifier_kind(text: &str) -> SyntaxKind {
    KEYWORDS.get(text).copied().unwrap_or(SyntaxKind::Identifier)
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::NewLineTrivia
                | SyntaxKind::WhitespaceTrivia
                | SyntaxKind::SingleLineCommentTrivia
                | SyntaxKind::MultiLineCommentTrivia
        )
    }

    /// Keywords, including the scalar type names.
    pub fn is_reserved_word(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            SyntaxKeyword
                | ImportKeyword
                | WeakKeyword
                | PublicKeyword
                | PackageKeyword
                | OptionKeyword
                | MessageKeyword
                | EnumKeyword
                | ServiceKeyword
                | RpcKeyword
                | ReturnsKeyword
                | StreamKeyword
                | RepeatedKeyword
                | OptionalKeyword
                | RequiredKeyword
                | OneofKeyword
                | MapKeyword
                | ReservedKeyword
                | ToKeyword
                | MaxKeyword
        ) || self.is_scalar_type()
    }

    /// Tokens usable as a name segment.
    pub fn is_identifier_or_keyword(self) -> bool {
        self == SyntaxKind::Identifier || self.is_reserved_word()
    }

    pub fn is_scalar_type(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            DoubleKeyword
                | FloatKeyword
                | Int32Keyword
                | Int64Keyword
                | Uint32Keyword
                | Uint64Keyword
                | Sint32Keyword
                | Sint64Keyword
                | Fixed32Keyword
                | Fixed64Keyword
                | Sfixed32Keyword
                | Sfixed64Keyword
                | BoolKeyword
                | StringKeyword
                | BytesKeyword
        )
    }

    /// Scalar types allowed as map keys: no floating point, no bytes.
    pub fn is_key_type(self) -> bool {
        self.is_scalar_type()
            && !matches!(
                self,
                SyntaxKind::DoubleKeyword | SyntaxKind::FloatKeyword | SyntaxKind::BytesKeyword
            )
    }

    pub fn is_integer_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::DecimalLiteral | SyntaxKind::OctalLiteral | SyntaxKind::HexLiteral
        )
    }

    pub fn is_numeric_literal(self) -> bool {
        self.is_integer_literal() || self == SyntaxKind::FloatLiteral
    }

    /// Source text of punctuation and keyword tokens.
    pub fn text(self) -> Option<&'static str> {
        use SyntaxKind::*;
        let text = match self {
            Equals => "=",
            Dot => ".",
            Comma => ",",
            Semicolon => ";",
            Slash => "/",
            Plus => "+",
            Minus => "-",
            LessThan => "<",
            GreaterThan => ">",
            OpenBrace => "{",
            CloseBrace => "}",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            _ => {
                return KEYWORDS
                    .iter()
                    .find(|&(_, &kind)| kind == self && kind != BooleanLiteral)
                    .map(|(&text, _)| text)
            }
        };
        Some(text)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => write!(f, "'{}'", text),
            None => match self {
                SyntaxKind::EndOfFile => f.write_str("end of file"),
                SyntaxKind::Identifier => f.write_str("identifier"),
                SyntaxKind::StringLiteral => f.write_str("string literal"),
                SyntaxKind::DecimalLiteral => f.write_str("decimal literal"),
                SyntaxKind::OctalLiteral => f.write_str("octal literal"),
                SyntaxKind::HexLiteral => f.write_str("hex literal"),
                SyntaxKind::FloatLiteral => f.write_str("float literal"),
                SyntaxKind::BooleanLiteral => f.write_str("boolean literal"),
                SyntaxKind::Unknown => f.write_str("invalid character"),
                other => write!(f, "{:?}", other),
            },
        }
    }
}
