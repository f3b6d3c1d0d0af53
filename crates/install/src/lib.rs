//! Dependency installation for bpdeps.
//!
//! [`Installer`] streams an artifact through a [`Transport`], hashes it on
//! the fly and unpacks it as a gzip-compressed tarball. [`Deliverer`] adds
//! the mapping and mirror rewrites in front of it.
//!
//! A corrupt artifact always surfaces as [`Error::ChecksumMismatch`], even
//! when it also broke extraction.

#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

mod archive;
mod deliver;
mod error;
mod installer;
mod transport;
mod validated;

pub use deliver::Deliverer;
pub use error::{Error, Result};
pub use installer::Installer;
pub use transport::{DefaultTransport, Transport};
pub use validated::{ValidatedReader, Verification};
