//! Sources of environment-style configuration.
//!
//! The binding root (`SERVICE_BINDING_ROOT`, `CNB_BINDINGS`) and the
//! `BP_DEPENDENCY_MIRROR*` variables are read through a [`ConfigSource`]
//! rather than the process environment directly, so the same rules can be
//! evaluated against a synthetic environment.

use std::collections::BTreeMap;

/// A set of name/value configuration variables.
pub trait ConfigSource: Send + Sync {
    /// Every variable visible to this source.
    fn vars(&self) -> Vec<(String, String)>;

    /// The value of `name`, if set.
    fn var(&self, name: &str) -> Option<String> {
        self.vars()
            .into_iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn vars(&self) -> Vec<(String, String)> {
        (**self).vars()
    }

    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn vars(&self) -> Vec<(String, String)> {
        // Non-UTF-8 variables cannot name a mirror; skip them.
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEnv {
    vars: BTreeMap<String, String>,
}

impl StaticEnv {
    /// An empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, returning the environment.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for StaticEnv {
    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_env() {
        let env: StaticEnv = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(
            env.vars(),
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "2".to_string())
            ]
        );
        assert_eq!(env.var("B").as_deref(), Some("2"));
        assert_eq!(env.var("C"), None);
    }

    #[test]
    fn test_process_env() {
        temp_env::with_var("BPDEPS_CONFIG_SOURCE_TEST", Some("present"), || {
            let vars = ProcessEnv.vars();
            assert!(
                vars.iter()
                    .any(|(k, v)| k == "BPDEPS_CONFIG_SOURCE_TEST" && v == "present")
            );
            assert_eq!(
                ProcessEnv.var("BPDEPS_CONFIG_SOURCE_TEST").as_deref(),
                Some("present")
            );
        });
    }
}
