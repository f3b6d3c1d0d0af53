//! Version resolution against a dependency catalog.
//!
//! Given a dependency id, a version constraint and a stack, picks exactly
//! one record:
//! 1. records for other ids or stacks are ignored
//! 2. every remaining record must carry a valid semantic version
//! 3. the highest version satisfying the constraint wins
//! 4. at equal versions a literal stack match beats a `*` match
//! 5. two `*` records tied at the top with no literal record is an error

use crate::deprecation::warn_if_deprecated;
use crate::version::{Version, VersionConstraint, parse_version};
use crate::{Catalog, DependencyRecord, Error, Result, StackMatch};
use chrono::Utc;
use std::cmp::Reverse;
use std::path::Path;
use tracing::debug;

/// Constraint value that selects the catalog's default pin.
pub const DEFAULT_VERSION: &str = "default";

/// Resolve a dependency from the catalog at `catalog_path`.
pub fn resolve(
    catalog_path: &Path,
    name: &str,
    constraint: &str,
    stack: &str,
) -> Result<DependencyRecord> {
    let catalog = Catalog::from_path(catalog_path)?;
    resolve_catalog(&catalog, name, constraint, stack)
}

/// Resolve a dependency from an already parsed catalog.
pub fn resolve_catalog(
    catalog: &Catalog,
    name: &str,
    constraint: &str,
    stack: &str,
) -> Result<DependencyRecord> {
    let effective = effective_constraint(catalog, name, constraint);
    let parsed = VersionConstraint::parse(effective)?;

    let mut supported: Vec<(Version, StackMatch, &DependencyRecord)> = Vec::new();
    for record in catalog.dependencies.iter().filter(|r| r.id == name) {
        let Some(stack_match) = record.stack_match(stack) else {
            continue;
        };
        let version = parse_version(&record.version).map_err(|e| Error::InvalidVersion {
            id: record.id.clone(),
            version: record.version.clone(),
            message: e.to_string(),
        })?;
        supported.push((version, stack_match, record));
    }

    let mut candidates: Vec<_> = supported
        .iter()
        .filter(|(version, _, _)| parsed.matches(version))
        .collect();

    if candidates.is_empty() {
        let mut versions: Vec<_> = supported.iter().map(|(v, _, r)| (v, &r.version)).collect();
        versions.sort();
        versions.dedup_by(|a, b| a.0 == b.0);
        return Err(Error::NoCompatibleVersion {
            name: name.to_string(),
            constraint: effective.to_string(),
            stack: stack.to_string(),
            supported: versions.into_iter().map(|(_, s)| s.clone()).collect(),
        });
    }

    // Stable sort keeps catalog order among equal literal matches.
    candidates.sort_by_key(|(version, stack_match, _)| Reverse((version.clone(), *stack_match)));

    let (top_version, top_match, top_record) =
        (&candidates[0].0, candidates[0].1, candidates[0].2);
    if top_match == StackMatch::Wildcard {
        let tied = candidates
            .iter()
            .filter(|(v, m, _)| v == top_version && *m == StackMatch::Wildcard)
            .count();
        if tied > 1 {
            return Err(Error::AmbiguousWildcard {
                version: top_record.version.clone(),
            });
        }
    }

    debug!(
        %name,
        constraint = %parsed,
        %stack,
        version = %top_record.version,
        uri = %top_record.uri,
        "Resolved dependency"
    );
    warn_if_deprecated(top_record, Utc::now());

    Ok(top_record.clone())
}

/// The constraint actually applied for `name`.
///
/// `""` and `"default"` fall back to the catalog pin, then to `*`.
#[must_use]
pub fn effective_constraint<'a>(catalog: &'a Catalog, name: &str, constraint: &'a str) -> &'a str {
    let trimmed = constraint.trim();
    if trimmed.is_empty() || trimmed == DEFAULT_VERSION {
        catalog.default_version(name).unwrap_or("*")
    } else {
        constraint
    }
}
