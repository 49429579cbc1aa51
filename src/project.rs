//! The file set: reads sources, parses and caches them, binds them together.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::binder::{clear_symbols, Binder};
use crate::error::ProjectError;
use crate::parser::{self, SourceFile};
use crate::resolver::Resolver;
use crate::symbols::SymbolTable;

/// Where source text comes from.
pub trait SourceProvider: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystem;

impl SourceProvider for FileSystem {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Serves sources from memory; handy for tests and editors.
#[derive(Debug, Default, Clone)]
pub struct MemorySources {
    files: HashMap<PathBuf, String>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl SourceProvider for MemorySources {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no source for {}", path.display()))
        })
    }
}

/// A set of source files sharing one symbol table.
///
/// Each path is read and parsed at most once; later requests get the cached
/// tree.
pub struct Project<P: SourceProvider = FileSystem> {
    provider: P,
    files: BTreeMap<PathBuf, SourceFile>,
    symbols: SymbolTable,
}

impl Default for Project<FileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl Project<FileSystem> {
    pub fn new() -> Self {
        Project::with_provider(FileSystem)
    }
}

impl<P: SourceProvider> Project<P> {
    pub fn with_provider(provider: P) -> Self {
        Project {
            provider,
            files: BTreeMap::new(),
            symbols: SymbolTable::new(),
        }
    }

    /// Parse `path` on first access and return the cached tree afterwards.
    pub fn get_source_file(&mut self, path: impl AsRef<Path>) -> Result<&SourceFile, ProjectError> {
        let path = path.as_ref();
        match self.files.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                let file = parse_path(&self.provider, path)?;
                Ok(&*entry.insert(file))
            }
        }
    }

    /// Read and parse every path not cached yet, in parallel.
    ///
    /// Successes are cached; failures are returned in path order.
    pub fn load<I, T>(&mut self, paths: I) -> Vec<ProjectError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<Path>,
    {
        let pending: BTreeSet<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .filter(|p| !self.files.contains_key(p))
            .collect();

        let provider = &self.provider;
        let results: Vec<(PathBuf, Result<SourceFile, ProjectError>)> = pending
            .into_par_iter()
            .map(|path| {
                let result = parse_path(provider, &path);
                (path, result)
            })
            .collect();

        let mut errors = Vec::new();
        for (path, result) in results {
            match result {
                Ok(file) => {
                    self.files.insert(path, file);
                }
                Err(error) => errors.push(error),
            }
        }
        errors
    }

    /// Bind every cached file, in path order, into a fresh symbol table.
    ///
    /// A file that fails to bind is skipped; the rest still bind.
    pub fn bind(&mut self) -> Vec<ProjectError> {
        let mut binder = Binder::new();
        let mut errors = Vec::new();
        for (path, file) in &mut self.files {
            clear_symbols(file);
            if let Err(source) = binder.bind(file) {
                tracing::warn!(path = %path.display(), error = %source, "failed to bind");
                errors.push(ProjectError::Bind {
                    path: path.clone(),
                    source,
                });
            }
        }
        self.symbols = binder.into_symbols();
        errors
    }

    pub fn source_file(&self, path: impl AsRef<Path>) -> Option<&SourceFile> {
        self.files.get(path.as_ref())
    }

    /// Cached files in path order.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &SourceFile)> {
        self.files.iter().map(|(p, f)| (p.as_path(), f))
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.symbols)
    }
}

fn parse_path<P: SourceProvider + ?Sized>(provider: &P, path: &Path) -> Result<SourceFile, ProjectError> {
    let text = provider.read(path).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "failed to read");
        ProjectError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    parser::parse(&path.display().to_string(), &text).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "failed to parse");
        ProjectError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })
}
