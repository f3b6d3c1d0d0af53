//! Error types for checksum calculation

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for checksum calculation
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while walking or reading files
    #[error("failed to calculate checksum: I/O {operation} failed: {}", path.display())]
    #[diagnostic(code(bpdeps::checksum::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "walk", "read")
        operation: String,
    },

    /// A worker thread stopped before reporting its result
    #[error("failed to calculate checksum: {message}")]
    #[diagnostic(code(bpdeps::checksum::worker))]
    Worker {
        /// What went wrong
        message: String,
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

    /// Create a worker error
    #[must_use]
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}

/// Result type for checksum calculation
pub type Result<T> = std::result::Result<T, Error>;
