//! Source selection followed by installation.
//!
//! A checksum mapping replaces the record's URI outright. Without one, an
//! operator mirror may rewrite the host. Otherwise the record's own URI is
//! used.

use crate::transport::{DefaultTransport, Transport};
use crate::{Installer, Result};
use bpdeps_bindings::BindingResolver;
use bpdeps_resolver::{
    Checksum, ConfigSource, DependencyRecord, MappingResolver, MirrorResolver, ProcessEnv,
};
use std::path::Path;
use tracing::info;

/// Picks the effective URI for a record and installs it.
#[derive(Debug, Clone)]
pub struct Deliverer<B, C = ProcessEnv, T = DefaultTransport> {
    mappings: MappingResolver<B>,
    mirrors: MirrorResolver<B, C>,
    installer: Installer<T>,
}

impl<B: BindingResolver + Clone> Deliverer<B> {
    /// Create a deliverer reading mirrors from the process environment and
    /// fetching with [`DefaultTransport`].
    #[must_use]
    pub fn new(bindings: B) -> Self {
        Self {
            mappings: MappingResolver::new(bindings.clone()),
            mirrors: MirrorResolver::new(bindings),
            installer: Installer::new(),
        }
    }
}

impl<B, C, T> Deliverer<B, C, T>
where
    B: BindingResolver + Clone,
    C: ConfigSource,
    T: Transport,
{
    /// Create a deliverer from explicit parts.
    #[must_use]
    pub fn with_parts(bindings: B, config: C, installer: Installer<T>) -> Self {
        Self {
            mappings: MappingResolver::new(bindings.clone()),
            mirrors: MirrorResolver::with_config(bindings, config),
            installer,
        }
    }

    /// The URI `record` would be fetched from.
    ///
    /// Mappings are looked up by the full `algorithm:hex` checksum first,
    /// then by the bare hex digest.
    pub fn effective_uri(&self, record: &DependencyRecord, platform_dir: &Path) -> Result<String> {
        let checksum: Checksum = record.checksum.parse()?;
        for key in [checksum.to_string(), checksum.hex().to_string()] {
            if let Some(uri) = self.mappings.find_mapping(&key, platform_dir)? {
                return Ok(uri);
            }
        }

        if let Some(uri) = self.mirrors.find_mirror(&record.uri, platform_dir)? {
            return Ok(uri);
        }
        Ok(record.uri.clone())
    }

    /// Resolve the effective URI for `record` and install it.
    pub fn deliver(
        &self,
        record: &DependencyRecord,
        transport_root: &Path,
        destination: &Path,
        platform_dir: &Path,
    ) -> Result<()> {
        let uri = self.effective_uri(record, platform_dir)?;
        info!(id = %record.id, version = %record.version, %uri, "Delivering dependency");
        self.installer
            .install_from(record, &uri, transport_root, destination)
    }
}
