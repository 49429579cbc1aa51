//! Qualified-name resolution over a finished symbol table.

use crate::parser::ast::*;
use crate::symbols::{SymbolId, SymbolTable};

/// A type reference found in a file, with where it was written and what
/// it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeReference<'f> {
    pub name: &'f FullIdentifier,
    /// Scope the reference occurs in.
    pub scope: SymbolId,
    /// `None` if nothing by that name is visible.
    pub symbol: Option<SymbolId>,
}

/// Read-only name lookup. Cheap to create; safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    table: &'a SymbolTable,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Resolver { table }
    }

    pub fn symbols(&self) -> &'a SymbolTable {
        self.table
    }

    /// Resolve `name` as written inside `scope`.
    ///
    /// A root-relative name is looked up from the root only. Otherwise the
    /// search starts at `scope` and moves outward one parent at a time; the
    /// first scope from which every segment can be followed wins.
    pub fn resolve(&self, scope: SymbolId, name: &FullIdentifier) -> Option<SymbolId> {
        let segments: Vec<&str> = name.segments().map(|s| s.text.as_str()).collect();
        let resolved = self.resolve_path(scope, &segments, name.root_relative);
        tracing::trace!(
            reference = %name.dotted(),
            scope = %self.table.fully_qualified_name(scope),
            resolved = ?resolved.map(|id| self.table.fully_qualified_name(id)),
            "resolved reference"
        );
        resolved
    }

    /// [`Resolver::resolve`] over plain name segments.
    pub fn resolve_path<S: AsRef<str>>(
        &self,
        scope: SymbolId,
        segments: &[S],
        root_relative: bool,
    ) -> Option<SymbolId> {
        if root_relative {
            return self.descend(self.table.root(), segments);
        }
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(found) = self.descend(id, segments) {
                return Some(found);
            }
            current = self.table.get(id)?.parent;
        }
        None
    }

    /// Follow `segments` down from `scope`. Every qualifier must be a
    /// scope-bearing member; the terminal may be any member.
    fn descend<S: AsRef<str>>(&self, scope: SymbolId, segments: &[S]) -> Option<SymbolId> {
        let (terminal, qualifiers) = segments.split_last()?;
        let mut current = scope;
        for segment in qualifiers {
            let next = self.table.lookup_member(current, segment.as_ref())?;
            if !self.table.get(next)?.kind.has_members() {
                return None;
            }
            current = next;
        }
        self.table.lookup_member(current, terminal.as_ref())
    }

    /// Absolute dotted path of `symbol`, e.g. `.a.b.Foo`.
    pub fn fully_qualified_name(&self, symbol: SymbolId) -> String {
        self.table.fully_qualified_name(symbol)
    }

    /// Look up an absolute dotted name such as `.a.b.Foo`. The leading dot
    /// is optional.
    pub fn lookup_qualified(&self, name: &str) -> Option<SymbolId> {
        let trimmed = name.strip_prefix('.').unwrap_or(name);
        if trimmed.is_empty() {
            return Some(self.table.root());
        }
        let segments: Vec<&str> = trimmed.split('.').collect();
        self.descend(self.table.root(), &segments)
    }

    /// Every type reference in `file`, in source order.
    ///
    /// Field and map value types resolve from their message's scope, RPC
    /// types from their service's scope. Unbound files resolve from the root.
    pub fn references<'f>(&self, file: &'f SourceFile) -> Vec<TypeReference<'f>> {
        let mut out = Vec::new();
        let scope = file.scope.unwrap_or(self.table.root());
        for statement in &file.statements {
            match statement {
                Statement::Message(message) => self.message_references(scope, message, &mut out),
                Statement::Service(service) => {
                    let scope = service.symbol.unwrap_or(scope);
                    for statement in &service.body {
                        if let ServiceBodyStatement::Rpc(rpc) = statement {
                            self.push(scope, &rpc.request.type_name, &mut out);
                            self.push(scope, &rpc.response.type_name, &mut out);
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn message_references<'f>(
        &self,
        scope: SymbolId,
        message: &'f MessageDefinition,
        out: &mut Vec<TypeReference<'f>>,
    ) {
        let scope = message.symbol.unwrap_or(scope);
        for statement in &message.body {
            match statement {
                MessageBodyStatement::Field(field) => self.push_field_type(scope, &field.field_type, out),
                MessageBodyStatement::MapField(map) => self.push_field_type(scope, &map.value_type, out),
                MessageBodyStatement::Oneof(oneof) => {
                    for statement in &oneof.body {
                        if let OneofBodyStatement::Field(field) = statement {
                            self.push_field_type(scope, &field.field_type, out);
                        }
                    }
                }
                MessageBodyStatement::Message(nested) => self.message_references(scope, nested, out),
                _ => {}
            }
        }
    }

    fn push_field_type<'f>(
        &self,
        scope: SymbolId,
        field_type: &'f FieldType,
        out: &mut Vec<TypeReference<'f>>,
    ) {
        if let FieldType::Reference(name) = field_type {
            self.push(scope, name, out);
        }
    }

    fn push<'f>(&self, scope: SymbolId, name: &'f FullIdentifier, out: &mut Vec<TypeReference<'f>>) {
        out.push(TypeReference {
            name,
            scope,
            symbol: self.resolve(scope, name),
        });
    }
}
