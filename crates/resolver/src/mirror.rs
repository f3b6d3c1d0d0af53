//! Dependency mirror resolution.
//!
//! A mirror is a URI template that replaces the host a dependency is
//! downloaded from. Rules come from two places, consulted in order:
//!
//! 1. Environment variables. `BP_DEPENDENCY_MIRROR` is the default rule;
//!    `BP_DEPENDENCY_MIRROR_<HOST>` is a rule for one host, where `__` in
//!    `<HOST>` stands for `-` and `_` for `.`
//!    (`BP_DEPENDENCY_MIRROR_GITHUB_COM` applies to `github.com`).
//! 2. A single binding of type `dependency-mirror`. Its `default` entry is
//!    the default rule; every other entry is named after the host it
//!    applies to.
//!
//! Within one source a matching host rule beats the default. When several
//! host rules match, the longest hostname wins and equal lengths fall back
//! to lexicographic order.
//!
//! The template's `{originalHost}` placeholder is replaced with the
//! original host and path, so `https://mirror.test/{originalHost}` turns
//! `https://example.org/x` into `https://mirror.test/example.org/x`.

use crate::{Error, Result};
use bpdeps_bindings::{BindingResolver, ConfigSource, ProcessEnv};
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Environment variable holding the default mirror.
pub const DEPENDENCY_MIRROR_ENV: &str = "BP_DEPENDENCY_MIRROR";

/// Binding type carrying mirror rules.
pub const DEPENDENCY_MIRROR_BINDING: &str = "dependency-mirror";

/// Placeholder replaced with the original host and path.
pub const ORIGINAL_HOST_PLACEHOLDER: &str = "{originalHost}";

/// Binding entry holding the default mirror.
const DEFAULT_ENTRY: &str = "default";

/// Schemes a mirror may use.
const ALLOWED_SCHEMES: [&str; 2] = ["https", "file"];

/// Mirror rules gathered from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MirrorRules {
    default: Option<String>,
    hosts: Vec<(String, String)>,
}

impl MirrorRules {
    /// The template applying to `uri`, if any.
    fn select(&self, uri: &str) -> Option<&str> {
        self.hosts
            .iter()
            .filter(|(host, _)| uri.contains(host.as_str()))
            .min_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
            .map(|(_, template)| template.as_str())
            .or(self.default.as_deref())
    }
}

/// Resolves mirrors from configuration and bindings.
#[derive(Debug, Clone)]
pub struct MirrorResolver<B, C = ProcessEnv> {
    bindings: B,
    config: C,
}

impl<B: BindingResolver> MirrorResolver<B, ProcessEnv> {
    /// Create a resolver that reads the process environment.
    #[must_use]
    pub fn new(bindings: B) -> Self {
        Self {
            bindings,
            config: ProcessEnv,
        }
    }
}

impl<B: BindingResolver, C: ConfigSource> MirrorResolver<B, C> {
    /// Create a resolver with an explicit configuration source.
    #[must_use]
    pub fn with_config(bindings: B, config: C) -> Self {
        Self { bindings, config }
    }

    /// The mirrored location of `source_uri`, or `None` when no rule
    /// applies.
    pub fn find_mirror(&self, source_uri: &str, platform_dir: &Path) -> Result<Option<String>> {
        let env_rules = env_rules(&self.config);
        let template = match env_rules.select(source_uri) {
            Some(template) => {
                debug!(%source_uri, %template, "Mirror rule from environment");
                template.to_string()
            }
            None => {
                let binding_rules = self.binding_rules(platform_dir)?;
                match binding_rules.select(source_uri) {
                    Some(template) => {
                        debug!(%source_uri, %template, "Mirror rule from binding");
                        template.to_string()
                    }
                    None => return Ok(None),
                }
            }
        };

        let mirrored = apply_template(&template, source_uri)?;
        info!(%source_uri, %mirrored, "Using dependency mirror");
        Ok(Some(mirrored))
    }

    fn binding_rules(&self, platform_dir: &Path) -> Result<MirrorRules> {
        let bindings = self
            .bindings
            .resolve(DEPENDENCY_MIRROR_BINDING, "", platform_dir)?;
        if bindings.len() > 1 {
            return Err(Error::MultipleMirrorBindings);
        }

        let mut rules = MirrorRules::default();
        let Some(binding) = bindings.first() else {
            return Ok(rules);
        };
        for (name, entry) in &binding.entries {
            let template = entry.read_string(name)?;
            if template.is_empty() {
                continue;
            }
            if name == DEFAULT_ENTRY {
                rules.default = Some(template);
            } else {
                rules.hosts.push((name.clone(), template));
            }
        }
        Ok(rules)
    }
}

fn env_rules(config: &impl ConfigSource) -> MirrorRules {
    let prefix = format!("{DEPENDENCY_MIRROR_ENV}_");
    let mut rules = MirrorRules::default();
    for (name, value) in config.vars() {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if name == DEPENDENCY_MIRROR_ENV {
            rules.default = Some(value.to_string());
        } else if let Some(encoded) = name.strip_prefix(&prefix)
            && !encoded.is_empty()
        {
            rules.hosts.push((decode_hostname(encoded), value.to_string()));
        }
    }
    rules
}

/// Decode the hostname part of a `BP_DEPENDENCY_MIRROR_<HOST>` variable.
#[must_use]
pub fn decode_hostname(encoded: &str) -> String {
    encoded
        .replace("__", "-")
        .replace('_', ".")
        .to_lowercase()
}

/// Substitute the host and path of `source_uri` into `template`.
pub fn apply_template(template: &str, source_uri: &str) -> Result<String> {
    let mirror = Url::parse(template).map_err(|e| Error::invalid_uri(template, e.to_string()))?;
    if !ALLOWED_SCHEMES.contains(&mirror.scheme()) {
        return Err(Error::InvalidMirrorScheme {
            mirror: template.to_string(),
            scheme: mirror.scheme().to_string(),
        });
    }

    let source = Url::parse(source_uri).map_err(|e| Error::invalid_uri(source_uri, e.to_string()))?;
    let original = format!("{}{}", source.host_str().unwrap_or_default(), source.path());
    Ok(template.replace(ORIGINAL_HOST_PLACEHOLDER, &original))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hostname() {
        assert_eq!(decode_hostname("EXAMPLE_ORG"), "example.org");
        assert_eq!(decode_hostname("MY__HOST_EXAMPLE_COM"), "my-host.example.com");
    }

    #[test]
    fn test_select_prefers_longest_host() {
        let rules = MirrorRules {
            default: Some("https://default".into()),
            hosts: vec![
                ("example.org".into(), "https://short".into()),
                ("cdn.example.org".into(), "https://long".into()),
            ],
        };
        assert_eq!(rules.select("https://cdn.example.org/a"), Some("https://long"));
        assert_eq!(rules.select("https://example.org/a"), Some("https://short"));
        assert_eq!(rules.select("https://other.net/a"), Some("https://default"));
    }

    #[test]
    fn test_select_equal_length_is_lexicographic() {
        let rules = MirrorRules {
            default: None,
            hosts: vec![("b.org".into(), "https://b".into()), ("a.org".into(), "https://a".into())],
        };
        assert_eq!(rules.select("https://a.org/b.org"), Some("https://a"));
    }

    #[test]
    fn test_apply_template() {
        assert_eq!(
            apply_template("https://mirror.test/{originalHost}", "https://example.org/x").unwrap(),
            "https://mirror.test/example.org/x"
        );
        assert_eq!(
            apply_template("file:///mirror/{originalHost}", "https://example.org/a/b.tgz").unwrap(),
            "file:///mirror/example.org/a/b.tgz"
        );
        assert_eq!(
            apply_template("https://fixed.test/dep.tgz", "https://example.org/x").unwrap(),
            "https://fixed.test/dep.tgz"
        );
    }

    #[test]
    fn test_apply_template_rejects_scheme() {
        let err = apply_template("http://mirror.test/{originalHost}", "https://example.org/x")
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid mirror scheme"));
    }
}
