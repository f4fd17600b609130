//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ShaderTuneError>`. Every failure in a compile
//! attempt aborts the whole attempt; the caller keeps whatever shader was
//! previously adopted.

use thiserror::Error;

/// The main error type for the shadertune pipeline.
#[derive(Error, Debug)]
pub enum ShaderTuneError {
    /// A logical filename matched no header-cache entry, no substitution
    /// and no file under the configured shader folder.
    #[error("could not load shader file \"{0}\"")]
    FileNotFound(String),

    /// File I/O error other than not-found.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A variable declaration whose parameter list is malformed.
    #[error("invalid shader variable declaration \"{declaration}\": {message}")]
    Parse {
        /// The declaration span as it appeared in source.
        declaration: String,
        /// What was wrong with it.
        message: String,
    },

    /// The external compiler produced no binary.
    #[error("shader compilation of \"{file}\" failed:\n{diagnostics}")]
    Compile {
        /// Logical name of the file handed to the compiler.
        file: String,
        /// Compiler diagnostic text, possibly empty.
        diagnostics: String,
    },
}

/// Convenience alias used by all fallible APIs in this crate.
pub type Result<T> = std::result::Result<T, ShaderTuneError>;
