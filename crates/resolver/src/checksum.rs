//! Algorithm-qualified content checksums.
//!
//! Checksums are written as `algorithm:hex`. A bare hex string is taken to
//! be SHA-256, which is what older catalogs carry in their `sha256` field.

use crate::{Error, Result};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
}

impl Algorithm {
    /// Parse an algorithm name, ignoring ASCII case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Length of a hex-encoded digest for this algorithm.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }

    /// Start a new incremental hash.
    #[must_use]
    pub fn hasher(self) -> Hasher {
        match self {
            Self::Sha256 => Hasher::Sha256(Sha256::new()),
            Self::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Sha512 => write!(f, "sha512"),
        }
    }
}

/// Incremental hash state for one [`Algorithm`].
#[derive(Debug, Clone)]
pub enum Hasher {
    /// SHA-256 state
    Sha256(Sha256),
    /// SHA-512 state
    Sha512(Sha512),
}

impl Hasher {
    /// Feed bytes into the hash.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    /// Finish hashing and return the checksum.
    #[must_use]
    pub fn finalize(self) -> Checksum {
        match self {
            Self::Sha256(h) => Checksum {
                algorithm: Algorithm::Sha256,
                hex: hex::encode(h.finalize()),
            },
            Self::Sha512(h) => Checksum {
                algorithm: Algorithm::Sha512,
                hex: hex::encode(h.finalize()),
            },
        }
    }
}

/// A parsed checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum {
    algorithm: Algorithm,
    hex: String,
}

impl Checksum {
    /// Compute the checksum of `data` with `algorithm`.
    #[must_use]
    pub fn compute(algorithm: Algorithm, data: &[u8]) -> Self {
        let mut hasher = algorithm.hasher();
        hasher.update(data);
        hasher.finalize()
    }

    /// The digest algorithm.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The lowercase hex digest.
    #[must_use]
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl FromStr for Checksum {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (algorithm, digest) = match trimmed.split_once(':') {
            Some((name, digest)) => {
                let algorithm = Algorithm::parse(name).ok_or_else(|| {
                    Error::invalid_checksum(s, format!("unsupported algorithm '{name}'"))
                })?;
                (algorithm, digest)
            }
            None => (Algorithm::Sha256, trimmed),
        };

        if digest.len() != algorithm.hex_len() {
            return Err(Error::invalid_checksum(
                s,
                format!(
                    "expected {} hex characters for {algorithm}, found {}",
                    algorithm.hex_len(),
                    digest.len()
                ),
            ));
        }
        if !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::invalid_checksum(s, "digest is not hexadecimal"));
        }

        Ok(Self {
            algorithm,
            hex: digest.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_bare_hex_is_sha256() {
        let checksum: Checksum = EMPTY_SHA256.parse().unwrap();
        assert_eq!(checksum.algorithm(), Algorithm::Sha256);
        assert_eq!(checksum.to_string(), format!("sha256:{EMPTY_SHA256}"));
    }

    #[test]
    fn test_qualified_and_uppercase() {
        let upper = format!("SHA256:{}", EMPTY_SHA256.to_uppercase());
        let checksum: Checksum = upper.parse().unwrap();
        assert_eq!(checksum, Checksum::compute(Algorithm::Sha256, b""));
    }

    #[test]
    fn test_sha512() {
        let computed = Checksum::compute(Algorithm::Sha512, b"abc");
        let parsed: Checksum = computed.to_string().parse().unwrap();
        assert_eq!(parsed, computed);
        assert_eq!(parsed.hex().len(), 128);
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        let err = "md5:d41d8cd98f00b204e9800998ecf8427e"
            .parse::<Checksum>()
            .unwrap_err();
        assert!(err.to_string().contains("unsupported algorithm 'md5'"));
    }

    #[test]
    fn test_rejects_bad_digest() {
        assert!("sha256:abc".parse::<Checksum>().is_err());
        let not_hex = "z".repeat(64);
        assert!(not_hex.parse::<Checksum>().is_err());
    }
}
