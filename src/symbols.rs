//! The symbol table: an arena of symbols addressed by [`SymbolId`].

use std::collections::HashMap;
use std::fmt;

/// Identity of a symbol. Ids are handed out in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// The synthetic root scope every table starts with.
    pub const ROOT: SymbolId = SymbolId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SymbolKind {
    Package,
    Message,
    Enum,
    EnumField,
    Service,
}

impl SymbolKind {
    /// Whether symbols of this kind own a member map.
    pub fn has_members(self) -> bool {
        !matches!(self, SymbolKind::EnumField)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Package => "package",
            SymbolKind::Message => "message",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumField => "enum value",
            SymbolKind::Service => "service",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Owning scope; `None` only for the root.
    pub parent: Option<SymbolId>,
    /// Member name to symbol, for scope-bearing kinds.
    pub members: Option<HashMap<String, SymbolId>>,
}

impl Symbol {
    pub fn member(&self, name: &str) -> Option<SymbolId> {
        self.members.as_ref()?.get(name).copied()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// All symbols of one binding session, rooted at [`SymbolId::ROOT`].
///
/// The root is a nameless package scope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: vec![Symbol {
                id: SymbolId::ROOT,
                name: String::new(),
                kind: SymbolKind::Package,
                parent: None,
                members: Some(HashMap::new()),
            }],
        }
    }

    pub fn root(&self) -> SymbolId {
        SymbolId::ROOT
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Number of symbols, the root included.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.len() <= 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Find `name` directly inside `scope`.
    pub fn lookup_member(&self, scope: SymbolId, name: &str) -> Option<SymbolId> {
        self.get(scope)?.member(name)
    }

    /// Members of `scope` sorted by name.
    pub fn members(&self, scope: SymbolId) -> Vec<(&str, SymbolId)> {
        let mut members: Vec<_> = self
            .get(scope)
            .and_then(|s| s.members.as_ref())
            .map(|m| m.iter().map(|(name, &id)| (name.as_str(), id)).collect())
            .unwrap_or_default();
        members.sort_unstable();
        members
    }

    /// Absolute dotted path of `id`, e.g. `.a.b.Foo`; the root is `.`.
    pub fn fully_qualified_name(&self, id: SymbolId) -> String {
        let mut names = Vec::new();
        let mut current = self.get(id);
        while let Some(symbol) = current {
            if symbol.is_root() {
                break;
            }
            names.push(symbol.name.as_str());
            current = symbol.parent.and_then(|p| self.get(p));
        }
        if names.is_empty() {
            return ".".to_string();
        }
        names.reverse();
        format!(".{}", names.join("."))
    }

    /// Add a symbol under `parent` and register it as a member.
    ///
    /// The caller checks for collisions first.
    pub(crate) fn declare(&mut self, parent: SymbolId, name: &str, kind: SymbolKind) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            kind,
            parent: Some(parent),
            members: kind.has_members().then(HashMap::new),
        });
        if let Some(members) = self.symbols[parent.index()].members.as_mut() {
            members.insert(name.to_string(), id);
        }
        id
    }

    /// Drop every symbol with an id at or past `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.symbols.len() {
            return;
        }
        self.symbols.truncate(len.max(1));
        let keep = self.symbols.len() as u32;
        for symbol in &mut self.symbols {
            if let Some(members) = symbol.members.as_mut() {
                members.retain(|_, id| id.0 < keep);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut table = SymbolTable::new();
        let a = table.declare(table.root(), "a", SymbolKind::Package);
        let foo = table.declare(a, "Foo", SymbolKind::Message);
        assert_eq!(table.lookup_member(table.root(), "a"), Some(a));
        assert_eq!(table.lookup_member(a, "Foo"), Some(foo));
        assert_eq!(table.lookup_member(foo, "Bar"), None);
        assert_eq!(table.fully_qualified_name(foo), ".a.Foo");
        assert_eq!(table.fully_qualified_name(table.root()), ".");
    }

    #[test]
    fn test_enum_field_has_no_members() {
        let mut table = SymbolTable::new();
        let e = table.declare(table.root(), "E", SymbolKind::Enum);
        let v = table.declare(e, "V", SymbolKind::EnumField);
        assert!(table.get(v).unwrap().members.is_none());
        assert_eq!(table.lookup_member(v, "anything"), None);
    }

    #[test]
    fn test_truncate_removes_members() {
        let mut table = SymbolTable::new();
        let a = table.declare(table.root(), "a", SymbolKind::Package);
        let checkpoint = table.len();
        table.declare(a, "Foo", SymbolKind::Message);
        table.declare(table.root(), "b", SymbolKind::Package);
        table.truncate(checkpoint);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup_member(a, "Foo"), None);
        assert_eq!(table.members(table.root()), vec![("a", a)]);
    }
}
