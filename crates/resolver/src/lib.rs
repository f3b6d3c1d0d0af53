//! Dependency resolution for bpdeps.
//!
//! This crate answers three questions for a build-time component:
//! - which catalog record satisfies a name, version constraint and stack
//!   ([`resolve`], [`resolve_catalog`])
//! - whether an operator mirror replaces the record's host
//!   ([`MirrorResolver`])
//! - whether an operator binding overrides the record's URI outright
//!   ([`MappingResolver`])
//!
//! # Example
//!
//! ```ignore
//! use bpdeps_bindings::FsBindingResolver;
//! use bpdeps_resolver::{MirrorResolver, resolve};
//!
//! let record = resolve(Path::new("buildpack.toml"), "node", "18.*", "io.buildpacks.stacks.jammy")?;
//! let mirrors = MirrorResolver::new(FsBindingResolver::new());
//! let uri = mirrors
//!     .find_mirror(&record.uri, Path::new("/platform"))?
//!     .unwrap_or(record.uri.clone());
//! ```

#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

pub mod catalog;
pub mod checksum;
pub mod deprecation;
mod error;
pub mod mapping;
pub mod mirror;
pub mod resolve;
pub mod version;

pub use catalog::{Catalog, DependencyRecord, License, StackMatch, WILDCARD_STACK};
pub use checksum::{Algorithm, Checksum, Hasher};
pub use bpdeps_bindings::{ConfigSource, ProcessEnv, StaticEnv};
pub use deprecation::DeprecationStatus;
pub use error::{Error, Result};
pub use mapping::{DEPENDENCY_MAPPING_BINDING, MappingResolver};
pub use mirror::{DEPENDENCY_MIRROR_BINDING, DEPENDENCY_MIRROR_ENV, MirrorResolver};
pub use resolve::{DEFAULT_VERSION, resolve, resolve_catalog};
pub use version::{Version, VersionConstraint, parse_version};
