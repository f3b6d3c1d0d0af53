//! Error types for dependency resolution

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for catalog parsing and dependency resolution
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while reading the catalog
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(code(bpdeps::resolver::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read")
        operation: String,
    },

    /// The catalog document is malformed
    #[error("failed to parse catalog{}: {message}", path.as_ref().map_or(String::new(), |p| format!(" {}", p.display())))]
    #[diagnostic(
        code(bpdeps::resolver::catalog),
        help("The catalog must contain a [[metadata.dependencies]] array")
    )]
    CatalogParse {
        /// Catalog file, if parsed from disk
        path: Option<Box<Path>>,
        /// Parser message
        message: String,
    },

    /// The requested version constraint cannot be parsed
    #[error("improper constraint: {constraint}")]
    #[diagnostic(
        code(bpdeps::resolver::constraint),
        help("Use an exact version, comparison operators, '~>', or '*'")
    )]
    ImproperConstraint {
        /// The constraint as given
        constraint: String,
        /// Why it was rejected
        message: String,
    },

    /// A matching catalog record carries an invalid version
    #[error("failed to parse version \"{version}\" of dependency \"{id}\": {message}")]
    #[diagnostic(code(bpdeps::resolver::version))]
    InvalidVersion {
        /// Dependency id
        id: String,
        /// The offending version string
        version: String,
        /// Parser message
        message: String,
    },

    /// No record satisfies the constraint on the requested stack
    #[error(
        "failed to satisfy \"{name}\" dependency version constraint \"{constraint}\": no compatible versions on \"{stack}\" stack. Supported versions are: [{}]",
        supported.join(", ")
    )]
    #[diagnostic(code(bpdeps::resolver::no_compatible_version))]
    NoCompatibleVersion {
        /// Dependency id
        name: String,
        /// The effective constraint
        constraint: String,
        /// The requested stack
        stack: String,
        /// Versions available for this dependency and stack, ascending
        supported: Vec<String>,
    },

    /// Several wildcard-stack records tie for the best version
    #[error("multiple dependencies support wildcard stack for version: \"{version}\"")]
    #[diagnostic(
        code(bpdeps::resolver::ambiguous_wildcard),
        help("Give one of the records a specific stack in the catalog")
    )]
    AmbiguousWildcard {
        /// The tied version
        version: String,
    },

    /// A checksum string is malformed or uses an unknown algorithm
    #[error("invalid checksum '{checksum}': {message}")]
    #[diagnostic(code(bpdeps::resolver::checksum))]
    InvalidChecksum {
        /// The checksum as given
        checksum: String,
        /// Why it was rejected
        message: String,
    },

    /// A URI cannot be parsed
    #[error("invalid uri '{uri}': {message}")]
    #[diagnostic(code(bpdeps::resolver::uri))]
    InvalidUri {
        /// The URI as given
        uri: String,
        /// Parser message
        message: String,
    },

    /// A mirror uses a scheme other than https or file
    #[error("invalid mirror scheme '{scheme}' in {mirror}")]
    #[diagnostic(
        code(bpdeps::resolver::mirror_scheme),
        help("Mirrors must use the https or file scheme")
    )]
    InvalidMirrorScheme {
        /// The mirror template
        mirror: String,
        /// The rejected scheme
        scheme: String,
    },

    /// More than one dependency-mirror binding is present
    #[error("cannot have multiple bindings of type 'dependency-mirror'")]
    #[diagnostic(
        code(bpdeps::resolver::multiple_mirror_bindings),
        help("Merge the mirror entries into a single binding")
    )]
    MultipleMirrorBindings,

    /// Binding discovery failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Binding(#[from] bpdeps_bindings::Error),
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
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a catalog parse error
    #[must_use]
    pub fn catalog(path: Option<&Path>, message: impl Into<String>) -> Self {
        Self::CatalogParse {
            path: path.map(Into::into),
            message: message.into(),
        }
    }

    /// Create an improper constraint error
    #[must_use]
    pub fn improper_constraint(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ImproperConstraint {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Create an invalid checksum error
    #[must_use]
    pub fn invalid_checksum(checksum: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidChecksum {
            checksum: checksum.into(),
            message: message.into(),
        }
    }

    /// Create an invalid URI error
    #[must_use]
    pub fn invalid_uri(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, Error>;
