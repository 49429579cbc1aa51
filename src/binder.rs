//! Builds the symbol table from parsed files.
//!
//! One [`Binder`] is one binding session: every file bound through it shares
//! the same table, so equal package paths from different files merge into a
//! single scope. Messages, enums and services are never merged; a second
//! declaration of the same name in one scope is a [`BindError`].

use crate::error::BindError;
use crate::parser::ast::*;
use crate::symbols::{SymbolId, SymbolKind, SymbolTable};

#[derive(Debug, Default)]
pub struct Binder {
    table: SymbolTable,
}

impl Binder {
    pub fn new() -> Self {
        Binder {
            table: SymbolTable::new(),
        }
    }

    /// Continue a session over an existing table.
    pub fn with_table(table: SymbolTable) -> Self {
        Binder { table }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.table
    }

    /// Bind one file into the shared table and return its scope.
    ///
    /// On failure every symbol this file created is removed again and the
    /// file's symbol back-references are put back to what they were before
    /// the call. Files bound earlier in the session are untouched.
    pub fn bind(&mut self, file: &mut SourceFile) -> Result<SymbolId, BindError> {
        let checkpoint = self.table.len();
        let mut saved = Vec::new();
        for_each_symbol_slot(file, &mut |slot| saved.push(*slot));
        match self.bind_file(file) {
            Ok(scope) => {
                file.scope = Some(scope);
                tracing::debug!(
                    file = %file.file_name,
                    scope = %self.table.fully_qualified_name(scope),
                    symbols = self.table.len() - checkpoint,
                    "bound source file"
                );
                Ok(scope)
            }
            Err(error) => {
                self.table.truncate(checkpoint);
                let mut saved = saved.into_iter();
                for_each_symbol_slot(file, &mut |slot| *slot = saved.next().flatten());
                tracing::debug!(file = %file.file_name, %error, "binding rolled back");
                Err(error)
            }
        }
    }

    fn bind_file(&mut self, file: &mut SourceFile) -> Result<SymbolId, BindError> {
        let package: Vec<String> = file
            .package()
            .map(|p| p.name.segments().map(|s| s.text.clone()).collect())
            .unwrap_or_default();

        let mut scope = self.table.root();
        for segment in &package {
            scope = self.enter_package(scope, segment)?;
        }

        for statement in &mut file.statements {
            match statement {
                Statement::Message(message) => self.bind_message(scope, message)?,
                Statement::Enum(definition) => self.bind_enum(scope, definition)?,
                Statement::Service(service) => self.bind_service(scope, service)?,
                Statement::Package(_)
                | Statement::Import(_)
                | Statement::Option(_)
                | Statement::Empty(_) => {}
            }
        }
        Ok(scope)
    }

    /// Reuse the package `name` under `scope`, or create it.
    fn enter_package(&mut self, scope: SymbolId, name: &str) -> Result<SymbolId, BindError> {
        match self.table.lookup_member(scope, name) {
            Some(existing) => match self.table.get(existing) {
                Some(symbol) if symbol.kind == SymbolKind::Package => Ok(existing),
                _ => Err(self.duplicate(scope, name)),
            },
            None => Ok(self.declare(scope, name, SymbolKind::Package)),
        }
    }

    fn declare_unique(
        &mut self,
        scope: SymbolId,
        name: &str,
        kind: SymbolKind,
    ) -> Result<SymbolId, BindError> {
        if self.table.lookup_member(scope, name).is_some() {
            return Err(self.duplicate(scope, name));
        }
        Ok(self.declare(scope, name, kind))
    }

    fn declare(&mut self, scope: SymbolId, name: &str, kind: SymbolKind) -> SymbolId {
        let id = self.table.declare(scope, name, kind);
        tracing::trace!(
            symbol = %self.table.fully_qualified_name(id),
            %kind,
            id = id.0,
            "declared symbol"
        );
        id
    }

    fn duplicate(&self, scope: SymbolId, name: &str) -> BindError {
        BindError::DuplicateSymbol {
            name: name.to_string(),
            scope: self.table.fully_qualified_name(scope),
        }
    }

    fn bind_message(
        &mut self,
        scope: SymbolId,
        message: &mut MessageDefinition,
    ) -> Result<(), BindError> {
        let id = self.declare_unique(scope, &message.name.text, SymbolKind::Message)?;
        message.symbol = Some(id);

        for statement in &mut message.body {
            match statement {
                MessageBodyStatement::Message(nested) => self.bind_message(id, nested)?,
                MessageBodyStatement::Enum(nested) => self.bind_enum(id, nested)?,
                MessageBodyStatement::Option(_)
                | MessageBodyStatement::Field(_)
                | MessageBodyStatement::MapField(_)
                | MessageBodyStatement::Oneof(_)
                | MessageBodyStatement::Reserved(_)
                | MessageBodyStatement::Empty(_) => {}
            }
        }
        Ok(())
    }

    fn bind_enum(&mut self, scope: SymbolId, definition: &mut EnumDefinition) -> Result<(), BindError> {
        let id = self.declare_unique(scope, &definition.name.text, SymbolKind::Enum)?;
        definition.symbol = Some(id);

        for statement in &mut definition.body {
            if let EnumBodyStatement::Field(field) = statement {
                field.symbol = Some(self.declare_unique(id, &field.name.text, SymbolKind::EnumField)?);
            }
        }
        Ok(())
    }

    fn bind_service(
        &mut self,
        scope: SymbolId,
        service: &mut ServiceDefinition,
    ) -> Result<(), BindError> {
        let id = self.declare_unique(scope, &service.name.text, SymbolKind::Service)?;
        service.symbol = Some(id);
        Ok(())
    }
}

/// Forget every symbol back-reference in `file`, ready for a fresh table.
pub fn clear_symbols(file: &mut SourceFile) {
    for_each_symbol_slot(file, &mut |slot| *slot = None);
}

/// Visit the file scope and every declaration's symbol, in source order.
fn for_each_symbol_slot(file: &mut SourceFile, f: &mut dyn FnMut(&mut Option<SymbolId>)) {
    fn visit_message(message: &mut MessageDefinition, f: &mut dyn FnMut(&mut Option<SymbolId>)) {
        f(&mut message.symbol);
        for statement in &mut message.body {
            match statement {
                MessageBodyStatement::Message(nested) => visit_message(nested, f),
                MessageBodyStatement::Enum(nested) => visit_enum(nested, f),
                _ => {}
            }
        }
    }

    fn visit_enum(definition: &mut EnumDefinition, f: &mut dyn FnMut(&mut Option<SymbolId>)) {
        f(&mut definition.symbol);
        for statement in &mut definition.body {
            if let EnumBodyStatement::Field(field) = statement {
                f(&mut field.symbol);
            }
        }
    }

    f(&mut file.scope);
    for statement in &mut file.statements {
        match statement {
            Statement::Message(definition) => visit_message(definition, f),
            Statement::Enum(definition) => visit_enum(definition, f),
            Statement::Service(service) => f(&mut service.symbol),
            _ => {}
        }
    }
}
