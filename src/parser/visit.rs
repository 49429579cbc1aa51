//! Structural child visitation over any AST node.

use crate::span::Span;

use super::ast::*;
use super::token::SyntaxKind;

/// A borrowed reference to any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    SourceFile(&'a SourceFile),
    SyntaxDeclaration(&'a SyntaxDeclaration),
    Package(&'a PackageStatement),
    Import(&'a ImportStatement),
    Option(&'a OptionStatement),
    OptionName(&'a OptionName),
    FieldOption(&'a FieldOption),
    Message(&'a MessageDefinition),
    Field(&'a FieldStatement),
    MapField(&'a MapFieldStatement),
    Oneof(&'a OneofStatement),
    /// A field declared inside a oneof body.
    OneofField(&'a FieldStatement),
    Reserved(&'a ReservedStatement),
    ReservedRange(&'a ReservedRange),
    Enum(&'a EnumDefinition),
    EnumField(&'a EnumFieldStatement),
    Service(&'a ServiceDefinition),
    Rpc(&'a RpcStatement),
    RpcType(&'a RpcType),
    Empty(&'a EmptyStatement),
    FullIdentifier(&'a FullIdentifier),
    Identifier(&'a Identifier),
    ScalarType(&'a ScalarType),
    Constant(&'a Constant),
    IntegerLiteral(&'a IntegerLiteral),
    FloatLiteral(&'a FloatLiteral),
    StringLiteral(&'a StringLiteral),
    BooleanLiteral(&'a BooleanLiteral),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeRef::SourceFile(_) => SyntaxKind::SourceFile,
            NodeRef::SyntaxDeclaration(_) => SyntaxKind::SyntaxDeclaration,
            NodeRef::Package(_) => SyntaxKind::PackageStatement,
            NodeRef::Import(_) => SyntaxKind::ImportStatement,
            NodeRef::Option(_) => SyntaxKind::OptionStatement,
            NodeRef::OptionName(_) => SyntaxKind::OptionName,
            NodeRef::FieldOption(_) => SyntaxKind::FieldOption,
            NodeRef::Message(_) => SyntaxKind::MessageDefinition,
            NodeRef::Field(_) => SyntaxKind::FieldStatement,
            NodeRef::MapField(_) => SyntaxKind::MapFieldStatement,
            NodeRef::Oneof(_) => SyntaxKind::OneofStatement,
            NodeRef::OneofField(_) => SyntaxKind::OneofFieldStatement,
            NodeRef::Reserved(_) => SyntaxKind::ReservedStatement,
            NodeRef::ReservedRange(_) => SyntaxKind::ReservedRange,
            NodeRef::Enum(_) => SyntaxKind::EnumDefinition,
            NodeRef::EnumField(_) => SyntaxKind::EnumFieldStatement,
            NodeRef::Service(_) => SyntaxKind::ServiceDefinition,
            NodeRef::Rpc(_) => SyntaxKind::RpcStatement,
            NodeRef::RpcType(_) => SyntaxKind::RpcType,
            NodeRef::Empty(_) => SyntaxKind::EmptyStatement,
            NodeRef::FullIdentifier(_) => SyntaxKind::FullIdentifier,
            NodeRef::Identifier(_) => SyntaxKind::Identifier,
            NodeRef::ScalarType(_) => SyntaxKind::ScalarType,
            NodeRef::Constant(_) => SyntaxKind::Constant,
            NodeRef::IntegerLiteral(n) => n.kind,
            NodeRef::FloatLiteral(_) => SyntaxKind::FloatLiteral,
            NodeRef::StringLiteral(_) => SyntaxKind::StringLiteral,
            NodeRef::BooleanLiteral(_) => SyntaxKind::BooleanLiteral,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            NodeRef::SourceFile(n) => n.span,
            NodeRef::SyntaxDeclaration(n) => n.span,
            NodeRef::Package(n) => n.span,
            NodeRef::Import(n) => n.span,
            NodeRef::Option(n) => n.span,
            NodeRef::OptionName(n) => n.span,
            NodeRef::FieldOption(n) => n.span,
            NodeRef::Message(n) => n.span,
            NodeRef::Field(n) | NodeRef::OneofField(n) => n.span,
            NodeRef::MapField(n) => n.span,
            NodeRef::Oneof(n) => n.span,
            NodeRef::Reserved(n) => n.span,
            NodeRef::ReservedRange(n) => n.span,
            NodeRef::Enum(n) => n.span,
            NodeRef::EnumField(n) => n.span,
            NodeRef::Service(n) => n.span,
            NodeRef::Rpc(n) => n.span,
            NodeRef::RpcType(n) => n.span,
            NodeRef::Empty(n) => n.span,
            NodeRef::FullIdentifier(n) => n.span,
            NodeRef::Identifier(n) => n.span,
            NodeRef::ScalarType(n) => n.span,
            NodeRef::Constant(n) => n.span,
            NodeRef::IntegerLiteral(n) => n.span,
            NodeRef::FloatLiteral(n) => n.span,
            NodeRef::StringLiteral(n) => n.span,
            NodeRef::BooleanLiteral(n) => n.span,
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::SourceFile(n) => n.id,
            NodeRef::SyntaxDeclaration(n) => n.id,
            NodeRef::Package(n) => n.id,
            NodeRef::Import(n) => n.id,
            NodeRef::Option(n) => n.id,
            NodeRef::OptionName(n) => n.id,
            NodeRef::FieldOption(n) => n.id,
            NodeRef::Message(n) => n.id,
            NodeRef::Field(n) | NodeRef::OneofField(n) => n.id,
            NodeRef::MapField(n) => n.id,
            NodeRef::Oneof(n) => n.id,
            NodeRef::Reserved(n) => n.id,
            NodeRef::ReservedRange(n) => n.id,
            NodeRef::Enum(n) => n.id,
            NodeRef::EnumField(n) => n.id,
            NodeRef::Service(n) => n.id,
            NodeRef::Rpc(n) => n.id,
            NodeRef::RpcType(n) => n.id,
            NodeRef::Empty(n) => n.id,
            NodeRef::FullIdentifier(n) => n.id,
            NodeRef::Identifier(n) => n.id,
            NodeRef::ScalarType(n) => n.id,
            NodeRef::Constant(n) => n.id,
            NodeRef::IntegerLiteral(n) => n.id,
            NodeRef::FloatLiteral(n) => n.id,
            NodeRef::StringLiteral(n) => n.id,
            NodeRef::BooleanLiteral(n) => n.id,
        }
    }

    /// Call `f` on each direct child, in source order.
    pub fn for_each_child(&self, f: &mut dyn FnMut(NodeRef<'a>)) {
        match *self {
            NodeRef::SourceFile(n) => {
                f(NodeRef::SyntaxDeclaration(&n.syntax));
                for statement in &n.statements {
                    f(statement_ref(statement));
                }
            }
            NodeRef::SyntaxDeclaration(_) => {}
            NodeRef::Package(n) => f(NodeRef::FullIdentifier(&n.name)),
            NodeRef::Import(n) => f(NodeRef::StringLiteral(&n.path)),
            NodeRef::Option(n) => {
                f(NodeRef::OptionName(&n.name));
                f(NodeRef::Constant(&n.value));
            }
            NodeRef::OptionName(n) => {
                if let Some(extension) = &n.extension {
                    f(NodeRef::FullIdentifier(extension));
                }
                if let Some(name) = &n.name {
                    f(NodeRef::FullIdentifier(name));
                }
            }
            NodeRef::FieldOption(n) => {
                f(NodeRef::OptionName(&n.name));
                f(NodeRef::Constant(&n.value));
            }
            NodeRef::Message(n) => {
                f(NodeRef::Identifier(&n.name));
                for statement in &n.body {
                    f(message_body_ref(statement));
                }
            }
            NodeRef::Field(n) | NodeRef::OneofField(n) => {
                f(field_type_ref(&n.field_type));
                f(NodeRef::Identifier(&n.name));
                f(NodeRef::IntegerLiteral(&n.number));
                n.options.iter().for_each(|o| f(NodeRef::FieldOption(o)));
            }
            NodeRef::MapField(n) => {
                f(NodeRef::ScalarType(&n.key_type));
                f(field_type_ref(&n.value_type));
                f(NodeRef::Identifier(&n.name));
                f(NodeRef::IntegerLiteral(&n.number));
                n.options.iter().for_each(|o| f(NodeRef::FieldOption(o)));
            }
            NodeRef::Oneof(n) => {
                f(NodeRef::Identifier(&n.name));
                for statement in &n.body {
                    match statement {
                        OneofBodyStatement::Field(field) => f(NodeRef::OneofField(field)),
                        OneofBodyStatement::Empty(empty) => f(NodeRef::Empty(empty)),
                    }
                }
            }
            NodeRef::Reserved(n) => {
                n.ranges.iter().for_each(|r| f(NodeRef::ReservedRange(r)));
                n.names.iter().for_each(|s| f(NodeRef::StringLiteral(s)));
            }
            NodeRef::ReservedRange(n) => {
                f(NodeRef::IntegerLiteral(&n.start));
                if let Some(RangeEnd::Number(end)) = &n.end {
                    f(NodeRef::IntegerLiteral(end));
                }
            }
            NodeRef::Enum(n) => {
                f(NodeRef::Identifier(&n.name));
                for statement in &n.body {
                    f(match statement {
                        EnumBodyStatement::Option(o) => NodeRef::Option(o),
                        EnumBodyStatement::Field(e) => NodeRef::EnumField(e),
                        EnumBodyStatement::Reserved(r) => NodeRef::Reserved(r),
                        EnumBodyStatement::Empty(e) => NodeRef::Empty(e),
                    });
                }
            }
            NodeRef::EnumField(n) => {
                f(NodeRef::Identifier(&n.name));
                f(NodeRef::Constant(&n.value));
                n.options.iter().for_each(|o| f(NodeRef::FieldOption(o)));
            }
            NodeRef::Service(n) => {
                f(NodeRef::Identifier(&n.name));
                for statement in &n.body {
                    f(match statement {
                        ServiceBodyStatement::Option(o) => NodeRef::Option(o),
                        ServiceBodyStatement::Rpc(r) => NodeRef::Rpc(r),
                        ServiceBodyStatement::Empty(e) => NodeRef::Empty(e),
                    });
                }
            }
            NodeRef::Rpc(n) => {
                f(NodeRef::Identifier(&n.name));
                f(NodeRef::RpcType(&n.request));
                f(NodeRef::RpcType(&n.response));
                for statement in &n.body {
                    f(match statement {
                        RpcBodyStatement::Option(o) => NodeRef::Option(o),
                        RpcBodyStatement::Empty(e) => NodeRef::Empty(e),
                    });
                }
            }
            NodeRef::RpcType(n) => f(NodeRef::FullIdentifier(&n.type_name)),
            NodeRef::FullIdentifier(n) => {
                n.segments().for_each(|s| f(NodeRef::Identifier(s)));
            }
            NodeRef::Constant(n) => f(match &n.value {
                ConstantValue::Identifier(v) => NodeRef::FullIdentifier(v),
                ConstantValue::Integer(v) => NodeRef::IntegerLiteral(v),
                ConstantValue::Float(v) => NodeRef::FloatLiteral(v),
                ConstantValue::String(v) => NodeRef::StringLiteral(v),
                ConstantValue::Boolean(v) => NodeRef::BooleanLiteral(v),
            }),
            NodeRef::Empty(_)
            | NodeRef::Identifier(_)
            | NodeRef::ScalarType(_)
            | NodeRef::IntegerLiteral(_)
            | NodeRef::FloatLiteral(_)
            | NodeRef::StringLiteral(_)
            | NodeRef::BooleanLiteral(_) => {}
        }
    }

    /// Direct children collected into a vector.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut children = Vec::new();
        self.for_each_child(&mut |child| children.push(child));
        children
    }
}

fn statement_ref(statement: &Statement) -> NodeRef<'_> {
    match statement {
        Statement::Package(n) => NodeRef::Package(n),
        Statement::Import(n) => NodeRef::Import(n),
        Statement::Option(n) => NodeRef::Option(n),
        Statement::Message(n) => NodeRef::Message(n),
        Statement::Enum(n) => NodeRef::Enum(n),
        Statement::Service(n) => NodeRef::Service(n),
        Statement::Empty(n) => NodeRef::Empty(n),
    }
}

fn message_body_ref(statement: &MessageBodyStatement) -> NodeRef<'_> {
    match statement {
        MessageBodyStatement::Option(n) => NodeRef::Option(n),
        MessageBodyStatement::Message(n) => NodeRef::Message(n),
        MessageBodyStatement::Enum(n) => NodeRef::Enum(n),
        MessageBodyStatement::Field(n) => NodeRef::Field(n),
        MessageBodyStatement::MapField(n) => NodeRef::MapField(n),
        MessageBodyStatement::Oneof(n) => NodeRef::Oneof(n),
        MessageBodyStatement::Reserved(n) => NodeRef::Reserved(n),
        MessageBodyStatement::Empty(n) => NodeRef::Empty(n),
    }
}

fn field_type_ref(field_type: &FieldType) -> NodeRef<'_> {
    match field_type {
        FieldType::Scalar(s) => NodeRef::ScalarType(s),
        FieldType::Reference(r) => NodeRef::FullIdentifier(r),
    }
}

/// Pre-order walk: `f` sees a node before any of its descendants.
pub fn walk<'a>(node: NodeRef<'a>, f: &mut dyn FnMut(NodeRef<'a>)) {
    f(node);
    node.for_each_child(&mut |child| walk(child, f));
}
