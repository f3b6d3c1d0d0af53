//! Checksum-keyed source overrides.
//!
//! Bindings of type `dependency-mapping` contain one entry per overridden
//! artifact, named after the artifact's checksum, whose content is the URI
//! to fetch instead.

use crate::Result;
use bpdeps_bindings::BindingResolver;
use std::path::Path;
use tracing::info;

/// Binding type carrying checksum mappings.
pub const DEPENDENCY_MAPPING_BINDING: &str = "dependency-mapping";

/// Resolves checksum mappings from bindings.
#[derive(Debug, Clone)]
pub struct MappingResolver<B> {
    bindings: B,
}

impl<B: BindingResolver> MappingResolver<B> {
    /// Create a mapping resolver.
    #[must_use]
    pub fn new(bindings: B) -> Self {
        Self { bindings }
    }

    /// The override URI for `checksum`, or `None` when no binding maps it.
    ///
    /// Bindings are searched in resolver order and the first match wins.
    pub fn find_mapping(&self, checksum: &str, platform_dir: &Path) -> Result<Option<String>> {
        let bindings = self
            .bindings
            .resolve(DEPENDENCY_MAPPING_BINDING, "", platform_dir)?;

        for binding in &bindings {
            if let Some(entry) = binding.entries.get(checksum) {
                let uri = entry.read_string(checksum)?;
                info!(%checksum, binding = %binding.name, %uri, "Using dependency mapping");
                return Ok(Some(uri));
            }
        }
        Ok(None)
    }
}
