//! Checksum verification while streaming.

use bpdeps_resolver::{Checksum, Hasher};
use std::io::{self, Read};

/// Outcome of a fully consumed [`ValidatedReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Checksum the content was expected to have
    pub expected: Checksum,
    /// Checksum of the bytes actually read
    pub actual: Checksum,
}

impl Verification {
    /// Whether the content matched.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.expected == self.actual
    }
}

/// Hashes every byte read through it with the expected checksum's algorithm.
pub struct ValidatedReader<R> {
    inner: R,
    hasher: Hasher,
    expected: Checksum,
}

impl<R: Read> ValidatedReader<R> {
    /// Wrap `inner`, hashing with `expected`'s algorithm.
    pub fn new(inner: R, expected: Checksum) -> Self {
        Self {
            inner,
            hasher: expected.algorithm().hasher(),
            expected,
        }
    }

    /// Read whatever the consumer left unread and compare checksums.
    pub fn finish(mut self) -> io::Result<Verification> {
        io::copy(&mut self, &mut io::sink())?;
        Ok(Verification {
            actual: self.hasher.finalize(),
            expected: self.expected,
        })
    }
}

impl<R: Read> Read for ValidatedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
