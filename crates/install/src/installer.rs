//! Fetch, verify and unpack a single dependency.

use crate::archive;
use crate::transport::{DefaultTransport, Transport};
use crate::validated::ValidatedReader;
use crate::{Error, Result};
use bpdeps_resolver::{Checksum, DependencyRecord};
use std::path::Path;
use tracing::{debug, info};

/// Installs dependency records into a destination directory.
#[derive(Debug, Clone, Default)]
pub struct Installer<T = DefaultTransport> {
    transport: T,
}

impl Installer<DefaultTransport> {
    /// Create an installer backed by [`DefaultTransport`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(DefaultTransport::new())
    }
}

impl<T: Transport> Installer<T> {
    /// Create an installer backed by `transport`.
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// The transport used to fetch artifacts.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Install `record` from its own URI.
    pub fn install(
        &self,
        record: &DependencyRecord,
        transport_root: &Path,
        destination: &Path,
    ) -> Result<()> {
        self.install_from(record, &record.uri, transport_root, destination)
    }

    /// Install `record` from `uri`, which replaces the record's own URI
    /// when a mirror or mapping applies. The content must still match the
    /// record's checksum.
    pub fn install_from(
        &self,
        record: &DependencyRecord,
        uri: &str,
        transport_root: &Path,
        destination: &Path,
    ) -> Result<()> {
        let expected: Checksum = record.checksum.parse()?;
        debug!(
            id = %record.id,
            version = %record.version,
            %uri,
            ?destination,
            "Installing dependency"
        );

        let stream = self
            .transport
            .drop(transport_root, uri)
            .map_err(|e| Error::fetch(uri, e))?;

        let mut validated = ValidatedReader::new(stream, expected);
        let extracted = archive::extract(&mut validated, destination, record.strip_components);
        let verification = validated.finish();

        match (extracted, verification) {
            (_, Ok(verification)) if !verification.is_valid() => Err(Error::ChecksumMismatch {
                expected: verification.expected.to_string(),
                actual: verification.actual.to_string(),
            }),
            (Err(e), _) => Err(e),
            (Ok(()), Err(source)) => Err(Error::TarRead { source }),
            (Ok(()), Ok(_)) => {
                info!(id = %record.id, version = %record.version, ?destination, "Installed dependency");
                Ok(())
            }
        }
    }
}
