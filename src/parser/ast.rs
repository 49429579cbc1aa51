//! AST node types for a parsed `.proto` source file.
//!
//! A parent node owns its children. Each node carries a [`NodeId`] assigned in
//! creation order and a byte [`Span`] that covers exactly the source text of
//! the construct, with no trailing trivia. Parent links live in a side table
//! on [`SourceFile`] rather than in the nodes.

use crate::error::LexError;
use crate::span::{LineCol, LineIndex, Span};
use crate::symbols::SymbolId;

use super::token::SyntaxKind;
use super::visit::{self, NodeRef};

/// Identity of a node within its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Root of one parsed file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SourceFile {
    pub id: NodeId,
    pub span: Span,
    pub file_name: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub text: String,
    pub syntax: SyntaxDeclaration,
    pub statements: Vec<Statement>,
    /// Import paths, in source order.
    pub dependencies: Vec<String>,
    /// Soft lexical errors met while parsing.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub lex_errors: Vec<LexError>,
    /// Scope the file's definitions were bound into.
    pub scope: Option<SymbolId>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub line_index: LineIndex,
    node_count: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    parents: Vec<Option<NodeId>>,
}

impl SourceFile {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: NodeId,
        file_name: String,
        text: String,
        line_index: LineIndex,
        syntax: SyntaxDeclaration,
        statements: Vec<Statement>,
        dependencies: Vec<String>,
        lex_errors: Vec<LexError>,
        node_count: u32,
    ) -> Self {
        let mut file = SourceFile {
            id,
            span: Span::new(0, text.len()),
            file_name,
            text,
            syntax,
            statements,
            dependencies,
            lex_errors,
            scope: None,
            line_index,
            node_count,
            parents: Vec::new(),
        };
        file.link_parents();
        file
    }

    /// Fill the parent table by walking every node once.
    fn link_parents(&mut self) {
        let mut parents = vec![None; self.node_count()];
        fn link(node: NodeRef<'_>, parents: &mut [Option<NodeId>]) {
            let parent = node.id();
            node.for_each_child(&mut |child| {
                parents[child.id().index()] = Some(parent);
                link(child, parents);
            });
        }
        link(NodeRef::SourceFile(self), &mut parents);
        self.parents = parents;
    }

    /// Number of nodes in the tree, the file itself included.
    pub fn node_count(&self) -> usize {
        self.node_count as usize
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Find a node by id with a pre-order walk.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        let mut found = None;
        visit::walk(NodeRef::SourceFile(self), &mut |node| {
            if node.id() == id {
                found = Some(node);
            }
        });
        found
    }

    /// The first package declaration, if any.
    pub fn package(&self) -> Option<&PackageStatement> {
        self.statements.iter().find_map(|s| match s {
            Statement::Package(p) => Some(p),
            _ => None,
        })
    }

    pub fn location(&self, offset: usize) -> LineCol {
        self.line_index.line_col(offset)
    }

    /// Source text covered by `span`.
    pub fn slice(&self, span: Span) -> &str {
        span.slice(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SyntaxVersion {
    Proto2,
    Proto3,
}

/// `syntax = "proto3";`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SyntaxDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub version: SyntaxVersion,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Statement {
    Package(PackageStatement),
    Import(ImportStatement),
    Option(OptionStatement),
    Message(MessageDefinition),
    Enum(EnumDefinition),
    Service(ServiceDefinition),
    Empty(EmptyStatement),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PackageStatement {
    pub id: NodeId,
    pub span: Span,
    pub name: FullIdentifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ImportModifier {
    Weak,
    Public,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImportStatement {
    pub id: NodeId,
    pub span: Span,
    pub modifier: Option<ImportModifier>,
    pub path: StringLiteral,
}

/// `option name = value;`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptionStatement {
    pub id: NodeId,
    pub span: Span,
    pub name: OptionName,
    pub value: Constant,
}

/// `name`, `(extension)`, or `(extension).suffix`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptionName {
    pub id: NodeId,
    pub span: Span,
    pub extension: Option<FullIdentifier>,
    /// The plain name, or the dotted suffix after an extension.
    pub name: Option<FullIdentifier>,
}

/// One entry of a bracketed `[name = value, ...]` list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldOption {
    pub id: NodeId,
    pub span: Span,
    pub name: OptionName,
    pub value: Constant,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MessageDefinition {
    pub id: NodeId,
    pub span: Span,
    pub name: Identifier,
    pub body: Vec<MessageBodyStatement>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MessageBodyStatement {
    Option(OptionStatement),
    Message(MessageDefinition),
    Enum(EnumDefinition),
    Field(FieldStatement),
    MapField(MapFieldStatement),
    Oneof(OneofStatement),
    Reserved(ReservedStatement),
    Empty(EmptyStatement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldLabel {
    Repeated,
    Optional,
    Required,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldStatement {
    pub id: NodeId,
    pub span: Span,
    pub label: Option<FieldLabel>,
    pub field_type: FieldType,
    pub name: Identifier,
    pub number: IntegerLiteral,
    pub options: Vec<FieldOption>,
}

/// `map<KeyType, ValueType> name = number;`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MapFieldStatement {
    pub id: NodeId,
    pub span: Span,
    pub key_type: ScalarType,
    pub value_type: FieldType,
    pub name: Identifier,
    pub number: IntegerLiteral,
    pub options: Vec<FieldOption>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldType {
    Scalar(ScalarType),
    Reference(FullIdentifier),
}

impl FieldType {
    pub fn span(&self) -> Span {
        match self {
            FieldType::Scalar(s) => s.span,
            FieldType::Reference(r) => r.span,
        }
    }
}

/// A scalar type keyword such as `int32` or `string`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScalarType {
    pub id: NodeId,
    pub span: Span,
    pub kind: SyntaxKind,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OneofStatement {
    pub id: NodeId,
    pub span: Span,
    pub name: Identifier,
    pub body: Vec<OneofBodyStatement>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OneofBodyStatement {
    Field(FieldStatement),
    Empty(EmptyStatement),
}

/// `reserved 2, 9 to 11;` or `reserved "foo", "bar";`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReservedStatement {
    pub id: NodeId,
    pub span: Span,
    pub ranges: Vec<ReservedRange>,
    pub names: Vec<StringLiteral>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReservedRange {
    pub id: NodeId,
    pub span: Span,
    pub start: IntegerLiteral,
    pub end: Option<RangeEnd>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RangeEnd {
    Number(IntegerLiteral),
    Max(Span),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumDefinition {
    pub id: NodeId,
    pub span: Span,
    pub name: Identifier,
    pub body: Vec<EnumBodyStatement>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EnumBodyStatement {
    Option(OptionStatement),
    Field(EnumFieldStatement),
    Reserved(ReservedStatement),
    Empty(EmptyStatement),
}

/// `NAME = 1;`, the value possibly negative.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumFieldStatement {
    pub id: NodeId,
    pub span: Span,
    pub name: Identifier,
    pub value: Constant,
    pub options: Vec<FieldOption>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ServiceDefinition {
    pub id: NodeId,
    pub span: Span,
    pub name: Identifier,
    pub body: Vec<ServiceBodyStatement>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ServiceBodyStatement {
    Option(OptionStatement),
    Rpc(RpcStatement),
    Empty(EmptyStatement),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RpcStatement {
    pub id: NodeId,
    pub span: Span,
    pub name: Identifier,
    pub request: RpcType,
    pub response: RpcType,
    /// Statements of the `{ ... }` body; empty when the RPC ends with `;`.
    pub body: Vec<RpcBodyStatement>,
}

/// `(stream Foo)` in an RPC signature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RpcType {
    pub id: NodeId,
    pub span: Span,
    pub stream: bool,
    pub type_name: FullIdentifier,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RpcBodyStatement {
    Option(OptionStatement),
    Empty(EmptyStatement),
}

/// A lone `;`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EmptyStatement {
    pub id: NodeId,
    pub span: Span,
}

/// A single name segment. Keywords are valid names.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Identifier {
    pub id: NodeId,
    pub span: Span,
    pub text: String,
}

/// A dotted name like `.a.b.Foo`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FullIdentifier {
    pub id: NodeId,
    pub span: Span,
    /// Written with a leading `.`: resolved from the root scope.
    pub root_relative: bool,
    pub qualifiers: Vec<Identifier>,
    pub terminal: Identifier,
}

impl FullIdentifier {
    /// Segments from left to right, the terminal last.
    pub fn segments(&self) -> impl Iterator<Item = &Identifier> {
        self.qualifiers.iter().chain(std::iter::once(&self.terminal))
    }

    /// The dotted form as written, e.g. `.a.b.Foo`.
    pub fn dotted(&self) -> String {
        let joined = self.segments().map(|s| s.text.as_str()).collect::<Vec<_>>().join(".");
        if self.root_relative {
            format!(".{}", joined)
        } else {
            joined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Sign {
    Plus,
    Minus,
}

/// An option value or enum value, with its optional sign.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Constant {
    pub id: NodeId,
    pub span: Span,
    /// Only ever set when `value` is numeric.
    pub sign: Option<Sign>,
    pub value: ConstantValue,
}

impl Constant {
    /// The value as a signed integer, if it is one and fits.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.value {
            ConstantValue::Integer(lit) => {
                let magnitude = i64::try_from(lit.value).ok();
                match self.sign {
                    Some(Sign::Minus) => magnitude.map(|m| -m).or_else(|| {
                        (lit.value == i64::MIN.unsigned_abs()).then_some(i64::MIN)
                    }),
                    _ => magnitude,
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConstantValue {
    Identifier(FullIdentifier),
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    String(StringLiteral),
    Boolean(BooleanLiteral),
}

/// A decimal, octal or hex literal; `kind` records which.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IntegerLiteral {
    pub id: NodeId,
    pub span: Span,
    pub kind: SyntaxKind,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FloatLiteral {
    pub id: NodeId,
    pub span: Span,
    pub value: f64,
}

/// A string literal; adjacent literals are joined into one value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StringLiteral {
    pub id: NodeId,
    pub span: Span,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BooleanLiteral {
    pub id: NodeId,
    pub span: Span,
    pub value: bool,
}
