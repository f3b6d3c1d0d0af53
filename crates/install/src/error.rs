//! Error types for dependency installation

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for fetching and unpacking dependencies
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The transport could not produce a stream for the URI
    #[error("failed to fetch dependency: {uri}")]
    #[diagnostic(
        code(bpdeps::install::fetch),
        help("Check that the URI is reachable and that any mirror or mapping points at a valid location")
    )]
    Fetch {
        /// The URI that was requested
        uri: String,
        /// Transport failure
        #[source]
        source: Box<Error>,
    },

    /// The URI could not be parsed
    #[error("invalid dependency URI '{uri}': {message}")]
    #[diagnostic(code(bpdeps::install::invalid_uri))]
    InvalidUri {
        /// The offending URI
        uri: String,
        /// Parse failure
        message: String,
    },

    /// The URI scheme is not served by the transport
    #[error("unsupported URI scheme '{scheme}' in {uri}")]
    #[diagnostic(
        code(bpdeps::install::unsupported_scheme),
        help("Supported schemes are file, http and https")
    )]
    UnsupportedScheme {
        /// The offending URI
        uri: String,
        /// Its scheme
        scheme: String,
    },

    /// HTTP client failure
    #[error("HTTP request for {uri} failed")]
    #[diagnostic(code(bpdeps::install::http))]
    Http {
        /// The requested URI
        uri: String,
        /// Client error
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("HTTP request for {uri} returned status {status}")]
    #[diagnostic(code(bpdeps::install::http_status))]
    HttpStatus {
        /// The requested URI
        uri: String,
        /// Response status code
        status: u16,
    },

    /// I/O error outside of archive extraction
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(code(bpdeps::install::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path involved
        path: Box<Path>,
        /// Operation that failed (e.g., "open")
        operation: String,
    },

    /// The stream is not gzip compressed
    #[error("failed to create gzip reader")]
    #[diagnostic(code(bpdeps::install::gzip))]
    GzipReader {
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// The tar stream could not be read
    #[error("failed to read tar response")]
    #[diagnostic(code(bpdeps::install::tar))]
    TarRead {
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// A directory entry could not be created
    #[error("failed to create archived directory: {}", path.display())]
    #[diagnostic(code(bpdeps::install::directory))]
    CreateDirectory {
        /// Destination path
        path: Box<Path>,
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// A file entry could not be written
    #[error("failed to create archived file: {}", path.display())]
    #[diagnostic(code(bpdeps::install::file))]
    CreateFile {
        /// Destination path
        path: Box<Path>,
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// A symlink entry could not be recreated
    #[error("failed to extract symlink: {} -> {target}: {message}", path.display())]
    #[diagnostic(code(bpdeps::install::symlink))]
    Symlink {
        /// Destination path of the link
        path: Box<Path>,
        /// Link target as stored in the archive
        target: String,
        /// What went wrong
        message: String,
        /// Cause, when the filesystem refused the link
        #[source]
        source: Option<std::io::Error>,
    },

    /// The streamed content does not hash to the expected checksum
    #[error("checksum does not match: expected {expected}, got {actual}")]
    #[diagnostic(
        code(bpdeps::install::checksum_mismatch),
        help("The artifact is corrupt or the catalog checksum is wrong")
    )]
    ChecksumMismatch {
        /// Checksum from the catalog
        expected: String,
        /// Checksum of the received bytes
        actual: String,
    },

    /// Resolution error (checksum parsing, mirrors, mappings)
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolver(#[from] bpdeps_resolver::Error),
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

    /// Wrap a transport failure for `uri`
    #[must_use]
    pub fn fetch(uri: impl Into<String>, source: Self) -> Self {
        Self::Fetch {
            uri: uri.into(),
            source: Box::new(source),
        }
    }

    /// Create a symlink error
    #[must_use]
    pub fn symlink(
        path: impl AsRef<Path>,
        target: impl Into<String>,
        message: impl Into<String>,
        source: Option<std::io::Error>,
    ) -> Self {
        Self::Symlink {
            path: path.as_ref().into(),
            target: target.into(),
            message: message.into(),
            source,
        }
    }
}

/// Result type for dependency installation
pub type Result<T> = std::result::Result<T, Error>;
