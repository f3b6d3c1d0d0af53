//! Binding resolution from the filesystem or from memory.
//!
//! The binding root is chosen in this order:
//! 1. `SERVICE_BINDING_ROOT`
//! 2. `CNB_BINDINGS` (legacy)
//! 3. `<platform_dir>/bindings`
//!
//! Two on-disk layouts are understood. The current layout keeps `type`,
//! `provider` and every entry as files directly inside the binding
//! directory. The legacy layout keeps `kind` and `provider` under
//! `metadata/` and the entries under `secret/`.

use crate::config::{ConfigSource, ProcessEnv};
use crate::{Binding, Entry, Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Environment variable naming the binding root.
pub const SERVICE_BINDING_ROOT: &str = "SERVICE_BINDING_ROOT";

/// Legacy environment variable naming the binding root.
pub const CNB_BINDINGS: &str = "CNB_BINDINGS";

/// Enumerates bindings of a given type.
///
/// Implementations must enumerate fresh on every call; callers rely on
/// picking up configuration changes between resolutions.
pub trait BindingResolver: Send + Sync {
    /// Return all bindings of `binding_type`, optionally narrowed to
    /// `provider` (an empty provider matches any).
    fn resolve(
        &self,
        binding_type: &str,
        provider: &str,
        platform_dir: &Path,
    ) -> Result<Vec<Binding>>;
}

impl<T: BindingResolver + ?Sized> BindingResolver for &T {
    fn resolve(
        &self,
        binding_type: &str,
        provider: &str,
        platform_dir: &Path,
    ) -> Result<Vec<Binding>> {
        (**self).resolve(binding_type, provider, platform_dir)
    }
}

/// Resolves bindings from a directory tree.
#[derive(Debug, Clone, Default)]
pub struct FsBindingResolver<C = ProcessEnv> {
    root: Option<PathBuf>,
    config: C,
}

impl FsBindingResolver<ProcessEnv> {
    /// Create a resolver that picks its root from the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ProcessEnv)
    }

    /// Create a resolver with a fixed root, ignoring the environment.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            config: ProcessEnv,
        }
    }
}

impl<C: ConfigSource> FsBindingResolver<C> {
    /// Create a resolver that picks its root from `config`.
    #[must_use]
    pub fn with_config(config: C) -> Self {
        Self { root: None, config }
    }

    /// The directory bindings are read from for `platform_dir`.
    #[must_use]
    pub fn binding_root(&self, platform_dir: &Path) -> PathBuf {
        if let Some(root) = &self.root {
            return root.clone();
        }
        for var in [SERVICE_BINDING_ROOT, CNB_BINDINGS] {
            if let Some(dir) = self.config.var(var)
                && !dir.is_empty()
            {
                return PathBuf::from(dir);
            }
        }
        platform_dir.join("bindings")
    }

    fn load(&self, root: &Path) -> Result<Vec<Binding>> {
        let listing = match std::fs::read_dir(root) {
            Ok(listing) => listing,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(?root, "Binding root does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::io(e, root, "list")),
        };

        let mut bindings = Vec::new();
        for dirent in listing {
            let dirent = dirent.map_err(|e| Error::io(e, root, "list"))?;
            let path = dirent.path();
            if !path.is_dir() {
                continue;
            }
            bindings.push(load_binding(&path)?);
        }
        bindings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(bindings)
    }
}

impl<C: ConfigSource> BindingResolver for FsBindingResolver<C> {
    fn resolve(
        &self,
        binding_type: &str,
        provider: &str,
        platform_dir: &Path,
    ) -> Result<Vec<Binding>> {
        let root = self.binding_root(platform_dir);
        let bindings: Vec<Binding> = self
            .load(&root)?
            .into_iter()
            .filter(|b| b.matches(binding_type, provider))
            .collect();

        debug!(
            ?root,
            %binding_type,
            %provider,
            count = bindings.len(),
            "Resolved bindings"
        );
        Ok(bindings)
    }
}

fn load_binding(path: &Path) -> Result<Binding> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let metadata_dir = path.join("metadata");
    if metadata_dir.is_dir() {
        return load_legacy_binding(name, path, &metadata_dir);
    }

    let mut entries = read_entries(path)?;
    let binding_type = match entries.remove("type") {
        Some(entry) => entry.read_string("type")?,
        None => return Err(Error::missing_type(path)),
    };
    let provider = match entries.remove("provider") {
        Some(entry) => entry.read_string("provider")?,
        None => String::new(),
    };

    Ok(Binding {
        name,
        path: path.to_path_buf(),
        binding_type,
        provider,
        entries,
    })
}

fn load_legacy_binding(name: String, path: &Path, metadata_dir: &Path) -> Result<Binding> {
    let metadata = read_entries(metadata_dir)?;
    let binding_type = match metadata.get("kind") {
        Some(entry) => entry.read_string("kind")?,
        None => return Err(Error::missing_type(path)),
    };
    let provider = match metadata.get("provider") {
        Some(entry) => entry.read_string("provider")?,
        None => String::new(),
    };

    let secret_dir = path.join("secret");
    let entries = if secret_dir.is_dir() {
        read_entries(&secret_dir)?
    } else {
        BTreeMap::new()
    };

    Ok(Binding {
        name,
        path: path.to_path_buf(),
        binding_type,
        provider,
        entries,
    })
}

fn read_entries(dir: &Path) -> Result<BTreeMap<String, Entry>> {
    let mut entries = BTreeMap::new();
    for dirent in std::fs::read_dir(dir).map_err(|e| Error::io(e, dir, "list"))? {
        let dirent = dirent.map_err(|e| Error::io(e, dir, "list"))?;
        let file_name = dirent.file_name().to_string_lossy().into_owned();
        // Kubernetes projects volumes through hidden `..data` directories.
        if file_name.starts_with('.') {
            continue;
        }
        let path = dirent.path();
        if path.is_file() {
            entries.insert(file_name, Entry::File(path));
        }
    }
    Ok(entries)
}

/// Resolves bindings from a fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticBindingResolver {
    bindings: Vec<Binding>,
}

impl StaticBindingResolver {
    /// Create a resolver over `bindings`, preserving their order.
    #[must_use]
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }
}

impl BindingResolver for StaticBindingResolver {
    fn resolve(
        &self,
        binding_type: &str,
        provider: &str,
        _platform_dir: &Path,
    ) -> Result<Vec<Binding>> {
        Ok(self
            .bindings
            .iter()
            .filter(|b| b.matches(binding_type, provider))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticEnv;

    #[test]
    fn test_static_resolver_filters_by_type() {
        let resolver = StaticBindingResolver::new(vec![
            Binding::new("a", "/a", "dependency-mirror", ""),
            Binding::new("b", "/b", "dependency-mapping", ""),
            Binding::new("c", "/c", "dependency-mapping", "acme"),
        ]);

        let found = resolver
            .resolve("dependency-mapping", "", Path::new("/platform"))
            .unwrap();
        let names: Vec<_> = found.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);

        let found = resolver
            .resolve("dependency-mapping", "acme", Path::new("/platform"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "c");
    }

    #[test]
    fn test_binding_root_precedence() {
        let platform = Path::new("/platform");

        let resolver = FsBindingResolver::with_config(StaticEnv::new());
        assert_eq!(
            resolver.binding_root(platform),
            PathBuf::from("/platform/bindings")
        );

        let resolver = FsBindingResolver::with_config(StaticEnv::new().with(CNB_BINDINGS, "/cnb"));
        assert_eq!(resolver.binding_root(platform), PathBuf::from("/cnb"));

        let resolver = FsBindingResolver::with_config(
            StaticEnv::new()
                .with(CNB_BINDINGS, "/cnb")
                .with(SERVICE_BINDING_ROOT, "/service"),
        );
        assert_eq!(resolver.binding_root(platform), PathBuf::from("/service"));
    }

    #[test]
    fn test_empty_root_variable_is_ignored() {
        let resolver = FsBindingResolver::with_config(
            StaticEnv::new()
                .with(SERVICE_BINDING_ROOT, "")
                .with(CNB_BINDINGS, "/cnb"),
        );
        assert_eq!(
            resolver.binding_root(Path::new("/platform")),
            PathBuf::from("/cnb")
        );
    }

    #[test]
    fn test_fixed_root_ignores_environment() {
        let resolver = FsBindingResolver::with_root("/fixed");
        temp_env::with_var(SERVICE_BINDING_ROOT, Some("/from-env"), || {
            assert_eq!(
                resolver.binding_root(Path::new("/platform")),
                PathBuf::from("/fixed")
            );
        });
    }
}
