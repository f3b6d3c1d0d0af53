//! Semantic versions and version constraints.
//!
//! Wraps the `semver` crate with the constraint dialect catalogs are
//! written in:
//! - a bare version is exact (`1.2.3` means `=1.2.3`)
//! - partial and wildcard versions match a range (`18.2`, `18.2.*`, `18.x`)
//! - comparison operators, optionally space separated (`>= 1.0, < 2.0`)
//! - pessimistic `~>` behaves like `~`
//! - `!=` excludes a single version
//! - `||` separates alternatives
//! - `*` or an empty string is unconstrained

use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// A parsed semantic version.
pub type Version = semver::Version;

static COMPARATOR: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(>=|<=|!=|~>|=|>|<|~|\^)?\s*v?([0-9xX*][0-9A-Za-z.*+\-]*)")
});

/// Parse a version, accepting a leading `v` and missing minor/patch parts.
pub fn parse_version(s: &str) -> std::result::Result<Version, semver::Error> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    // Only the numeric core may be padded; pre-release and build metadata
    // stay as written.
    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(split);
    let padded = match core.split('.').count() {
        1 => format!("{core}.0.0{rest}"),
        2 => format!("{core}.0{rest}"),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded)
}

/// One `||` alternative: a range plus versions it explicitly excludes.
#[derive(Debug, Clone)]
struct Alternative {
    req: semver::VersionReq,
    excluded: Vec<Version>,
}

impl Alternative {
    fn matches(&self, version: &Version) -> bool {
        self.req.matches(version) && !self.excluded.contains(version)
    }
}

/// A parsed version constraint.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    source: String,
    alternatives: Vec<Alternative>,
}

impl VersionConstraint {
    /// Parse a constraint expression.
    pub fn parse(s: &str) -> Result<Self> {
        let source = s.trim().to_string();
        if source.is_empty() || source == "*" {
            return Ok(Self {
                source: "*".to_string(),
                alternatives: vec![Alternative {
                    req: semver::VersionReq::STAR,
                    excluded: Vec::new(),
                }],
            });
        }

        let alternatives = source
            .split("||")
            .map(|alt| parse_alternative(s, alt))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source,
            alternatives,
        })
    }

    /// Check if a version satisfies this constraint.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(version))
    }

    /// The constraint as written (trimmed; empty normalized to `*`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_alternative(original: &str, alt: &str) -> Result<Alternative> {
    let regex = match &*COMPARATOR {
        Ok(regex) => regex,
        Err(e) => return Err(Error::improper_constraint(original, e.to_string())),
    };

    let mut comparators = Vec::new();
    let mut excluded = Vec::new();
    let mut consumed = 0;

    for part in alt.split(',') {
        for caps in regex.captures_iter(part) {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            consumed += whole.len();
            let op = caps.get(1).map_or("", |m| m.as_str());
            let version = caps.get(2).map_or("", |m| m.as_str());
            let wildcard = version.contains(['x', 'X', '*']);

            match op {
                "" if wildcard => comparators.push(version.replace('X', "x")),
                "" => comparators.push(format!("={version}")),
                "~>" => comparators.push(format!("~{version}")),
                "!=" => excluded.push(
                    parse_version(version)
                        .map_err(|e| Error::improper_constraint(original, e.to_string()))?,
                ),
                _ => comparators.push(format!("{op}{version}")),
            }
        }
    }

    // Anything the comparator pattern did not consume is garbage.
    let meaningful = alt.chars().filter(|c| !c.is_whitespace() && *c != ',').count();
    let matched: usize = alt
        .split(',')
        .flat_map(|part| regex.find_iter(part))
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).count())
        .sum();
    if consumed == 0 || matched != meaningful {
        return Err(Error::improper_constraint(
            original,
            format!("unexpected input in '{}'", alt.trim()),
        ));
    }

    let req = if comparators.is_empty() {
        semver::VersionReq::STAR
    } else {
        semver::VersionReq::parse(&comparators.join(", "))
            .map_err(|e| Error::improper_constraint(original, e.to_string()))?
    };

    Ok(Alternative { req, excluded })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    fn c(s: &str) -> VersionConstraint {
        VersionConstraint::parse(s).unwrap()
    }

    #[test]
    fn test_lenient_versions() {
        assert_eq!(v("v1.2.3"), Version::new(1, 2, 3));
        assert_eq!(v("1.2"), Version::new(1, 2, 0));
        assert_eq!(v("7"), Version::new(7, 0, 0));
        assert_eq!(v("1.2-rc.1").pre.as_str(), "rc.1");
        assert!(parse_version("latest").is_err());
    }

    #[test]
    fn test_bare_version_is_exact() {
        let req = c("1.2.3");
        assert!(req.matches(&v("1.2.3")));
        assert!(!req.matches(&v("1.2.4")));
        assert!(!req.matches(&v("1.9.0")));
    }

    #[test]
    fn test_wildcards() {
        let req = c("18.2.*");
        assert!(req.matches(&v("18.2.0")));
        assert!(req.matches(&v("18.2.9")));
        assert!(!req.matches(&v("18.3.0")));

        let req = c("18.X");
        assert!(req.matches(&v("18.9.1")));
        assert!(!req.matches(&v("19.0.0")));

        assert!(c("*").matches(&v("0.0.1")));
        assert!(c("").matches(&v("100.0.0")));
    }

    #[test]
    fn test_partial_version_matches_range() {
        let req = c("1.2");
        assert!(req.matches(&v("1.2.0")));
        assert!(req.matches(&v("1.2.7")));
        assert!(!req.matches(&v("1.3.0")));
    }

    #[test]
    fn test_comparisons() {
        let req = c(">= 1.0, < 2.0");
        assert!(req.matches(&v("1.0.0")));
        assert!(req.matches(&v("1.9.9")));
        assert!(!req.matches(&v("2.0.0")));

        let req = c(">=1.0 <2.0");
        assert!(req.matches(&v("1.5.0")));
        assert!(!req.matches(&v("0.9.0")));
    }

    #[test]
    fn test_pessimistic() {
        let req = c("~> 1.2.3");
        assert!(req.matches(&v("1.2.9")));
        assert!(!req.matches(&v("1.3.0")));
    }

    #[test]
    fn test_not_equal_and_alternatives() {
        let req = c(">=1.0.0, !=1.5.0");
        assert!(req.matches(&v("1.4.0")));
        assert!(!req.matches(&v("1.5.0")));

        let req = c("1.x || 3.x");
        assert!(req.matches(&v("1.1.0")));
        assert!(!req.matches(&v("2.0.0")));
        assert!(req.matches(&v("3.4.0")));
    }

    #[test]
    fn test_improper_constraints() {
        for bad in ["latest", ">= banana", "1.2.3 ; rm", "||"] {
            let err = VersionConstraint::parse(bad).unwrap_err();
            assert!(
                err.to_string().starts_with("improper constraint"),
                "{bad}: {err}"
            );
        }
    }
}
