//! Parallel content checksums for bpdeps.
//!
//! [`ChecksumCalculator`] hashes a file or a set of directory trees into one
//! hex SHA-256 that is independent of traversal and worker scheduling.

mod calculator;
mod error;

pub use calculator::ChecksumCalculator;
pub use error::{Error, Result};
