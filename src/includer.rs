//! Logical shader-name resolution.
//!
//! The [`ShaderIncluder`] answers the compiler's "give me the source behind
//! this include name" callback. Resolution order:
//!
//! 1. in-memory header cache (exact name, used for the synthesized
//!    variables header)
//! 2. substitution table (exact name, first hit wins — redirects shared
//!    logical names like the scene include to a concrete file)
//! 3. file system, relative to the configured shader folder

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::errors::{Result, ShaderTuneError};

/// `(logical name, replacement name)` redirection pair.
pub type Substitution = (String, String);

/// Source text for a resolved logical name.
///
/// The origin matters to the caller: header-cache hits are returned as-is,
/// while file loads are passed through variable extraction when a manager is
/// attached to the compile session.
#[derive(Debug)]
pub enum ResolvedSource {
    /// Served from the in-memory header cache.
    Header(String),
    /// Read from disk (possibly through a substitution).
    File(String),
}

/// Resolves logical shader filenames to source text.
#[derive(Debug, Default)]
pub struct ShaderIncluder {
    folder: PathBuf,
    substitutions: Vec<Substitution>,
    headers: FxHashMap<String, String>,
}

impl ShaderIncluder {
    /// Create an includer reading from `folder`.
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            substitutions: Vec::new(),
            headers: FxHashMap::default(),
        }
    }

    /// Change the base folder file-system loads resolve against.
    pub fn set_folder(&mut self, folder: impl Into<PathBuf>) {
        self.folder = folder.into();
    }

    /// Replace the substitution table wholesale.
    pub fn set_substitutions(&mut self, substitutions: Vec<Substitution>) {
        self.substitutions = substitutions;
    }

    /// Register (or replace) an in-memory header under a logical name.
    pub fn register_header(&mut self, name: &str, content: String) {
        self.headers.insert(name.to_owned(), content);
    }

    /// Drop all in-memory headers. Called on compile-cycle reset; the
    /// generated header is ephemeral.
    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    /// Resolve a logical filename to source text.
    pub fn resolve(&self, filename: &str) -> Result<ResolvedSource> {
        if let Some(content) = self.headers.get(filename) {
            return Ok(ResolvedSource::Header(content.clone()));
        }

        let final_name = self
            .substitutions
            .iter()
            .find(|(from, _)| from == filename)
            .map_or(filename, |(_, to)| to.as_str());

        let path = self.folder.join(final_name);
        match std::fs::read_to_string(&path) {
            Ok(code) => Ok(ResolvedSource::File(code)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ShaderTuneError::FileNotFound(filename.to_owned()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
