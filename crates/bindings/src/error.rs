//! Error types for binding discovery

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for binding discovery
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while reading a binding directory or entry
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(
        code(bpdeps::bindings::io),
        help("Check that the binding root is readable")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "read", "list")
        operation: String,
    },

    /// A binding directory has no `type` entry
    #[error("failed to load binding at {}: missing 'type'", path.display())]
    #[diagnostic(
        code(bpdeps::bindings::missing_type),
        help("Every binding directory must contain a 'type' file")
    )]
    MissingType {
        /// Directory of the malformed binding
        path: Box<Path>,
    },

    /// An entry was expected to be text but is not valid UTF-8
    #[error("binding entry '{entry}' is not valid UTF-8")]
    #[diagnostic(code(bpdeps::bindings::invalid_entry))]
    InvalidEntry {
        /// Name of the entry
        entry: String,
    },
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Create a missing type error
    #[must_use]
    pub fn missing_type(path: impl AsRef<Path>) -> Self {
        Self::MissingType {
            path: path.as_ref().into(),
        }
    }
}

/// Result type for binding operations
pub type Result<T> = std::result::Result<T, Error>;
