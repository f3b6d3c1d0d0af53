//! Dependency catalog parsing.
//!
//! A catalog is a TOML document listing every dependency record a
//! component knows about, plus optional default version pins:
//!
//! ```toml
//! [metadata.default-versions]
//! node = "18.*"
//!
//! [[metadata.dependencies]]
//! id = "node"
//! version = "18.2.0"
//! uri = "https://nodejs.org/dist/v18.2.0/node-v18.2.0-linux-x64.tar.gz"
//! checksum = "sha256:..."
//! stacks = ["io.buildpacks.stacks.bionic"]
//! strip-components = 1
//! ```

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Stack identifier matching every stack.
pub const WILDCARD_STACK: &str = "*";

/// How a record's stacks matched a requested stack.
///
/// Ordered by specificity: a literal match outranks a wildcard match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StackMatch {
    /// The record lists `*`.
    Wildcard,
    /// The record lists the stack itself.
    Literal,
}

/// A license attached to a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// SPDX identifier or free-form license type.
    #[serde(rename = "type", default)]
    pub license_type: String,
    /// Where the license text lives.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
}

/// One dependency entry from a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    /// Dependency id, e.g. `node`.
    pub id: String,
    /// Human-readable name.
    pub name: Option<String>,
    /// Semantic version string.
    pub version: String,
    /// Expected checksum of the artifact, `algorithm:hex` or bare hex.
    pub checksum: String,
    /// Where to fetch the artifact.
    pub uri: String,
    /// Stacks the artifact runs on; may contain `*`.
    pub stacks: Vec<String>,
    /// Leading path components removed on extraction.
    pub strip_components: usize,
    /// Licenses of the artifact.
    pub licenses: Vec<License>,
    /// CPE identifiers.
    pub cpes: Vec<String>,
    /// Package URL.
    pub purl: Option<String>,
    /// When the upstream stops supporting this version.
    pub deprecation_date: Option<DateTime<Utc>>,
    /// URI of the source the artifact was built from.
    pub source: Option<String>,
    /// Checksum of `source`.
    pub source_checksum: Option<String>,
}

impl DependencyRecord {
    /// How this record's stacks match `stack`, if at all.
    #[must_use]
    pub fn stack_match(&self, stack: &str) -> Option<StackMatch> {
        if self.stacks.iter().any(|s| s == stack) {
            Some(StackMatch::Literal)
        } else if self.stacks.iter().any(|s| s == WILDCARD_STACK) {
            Some(StackMatch::Wildcard)
        } else {
            None
        }
    }
}

/// A parsed catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Every record in document order.
    pub dependencies: Vec<DependencyRecord>,
    /// Default version constraint per dependency id.
    pub default_versions: BTreeMap<String, String>,
}

impl Catalog {
    /// Read and parse a catalog file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        Self::parse(&content, Some(path))
    }

    /// Parse catalog content. `path` is only used for error context.
    pub fn parse(content: &str, path: Option<&Path>) -> Result<Self> {
        let document: RawDocument =
            toml::from_str(content).map_err(|e| Error::catalog(path, e.to_string()))?;

        let dependencies = document
            .metadata
            .dependencies
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.into_record(index, path))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dependencies,
            default_versions: document.metadata.default_versions,
        })
    }

    /// The pinned default constraint for `id`, if any.
    #[must_use]
    pub fn default_version(&self, id: &str) -> Option<&str> {
        self.default_versions.get(id).map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawMetadata {
    #[serde(default)]
    dependencies: Vec<RawDependency>,
    #[serde(default)]
    default_versions: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawDependency {
    id: String,
    name: Option<String>,
    version: String,
    uri: String,
    checksum: Option<String>,
    sha256: Option<String>,
    #[serde(default)]
    stacks: Vec<String>,
    #[serde(default)]
    strip_components: usize,
    #[serde(default)]
    licenses: Vec<License>,
    #[serde(default)]
    cpes: Vec<String>,
    purl: Option<String>,
    #[serde(alias = "deprecation_date")]
    deprecation_date: Option<toml::Value>,
    source: Option<String>,
    #[serde(alias = "source_checksum")]
    source_checksum: Option<String>,
    #[serde(alias = "source_sha256")]
    source_sha256: Option<String>,
}

impl RawDependency {
    fn into_record(self, index: usize, path: Option<&Path>) -> Result<DependencyRecord> {
        let checksum = match (self.checksum, self.sha256) {
            (Some(checksum), _) => checksum,
            (None, Some(sha256)) => format!("sha256:{sha256}"),
            (None, None) => {
                return Err(Error::catalog(
                    path,
                    format!(
                        "dependency {index} ('{}' {}) has no checksum",
                        self.id, self.version
                    ),
                ));
            }
        };

        let deprecation_date = self
            .deprecation_date
            .map(|raw| parse_date(&raw))
            .transpose()
            .map_err(|message| {
                Error::catalog(
                    path,
                    format!(
                        "dependency {index} ('{}' {}) has an invalid deprecation_date: {message}",
                        self.id, self.version
                    ),
                )
            })?;

        let source_checksum = self
            .source_checksum
            .or_else(|| self.source_sha256.map(|sha| format!("sha256:{sha}")));

        Ok(DependencyRecord {
            id: self.id,
            name: self.name,
            version: self.version,
            checksum,
            uri: self.uri,
            stacks: self.stacks,
            strip_components: self.strip_components,
            licenses: self.licenses,
            cpes: self.cpes,
            purl: self.purl,
            deprecation_date,
            source: self.source,
            source_checksum,
        })
    }
}

/// Dates may be TOML datetimes or strings.
fn parse_date(raw: &toml::Value) -> std::result::Result<DateTime<Utc>, String> {
    let text = match raw {
        toml::Value::Datetime(datetime) => datetime.to_string(),
        toml::Value::String(text) => text.clone(),
        other => return Err(format!("expected a date, found {}", other.type_str())),
    };
    if let Ok(datetime) = DateTime::parse_from_rfc3339(&text) {
        return Ok(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{text}' is neither RFC 3339 nor YYYY-MM-DD"))
}
