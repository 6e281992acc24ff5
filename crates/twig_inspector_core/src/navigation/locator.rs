//! Template identifier to source file resolution.

use crate::config::NavigationConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Resolves template identifiers to source files.
pub trait TemplateLocator {
    /// Returns the source path for `template`, or `None` when unknown.
    fn locate(&self, template: &str) -> Option<PathBuf>;

    /// Directories resolved files must live in.
    ///
    /// `None` means the locator is not filesystem-backed and containment is
    /// not checked.
    fn allowed_roots(&self) -> Option<Vec<PathBuf>>;
}

/// Filesystem locator with main and `@Namespace` roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesystemLocator {
    roots: Vec<PathBuf>,
    namespaces: BTreeMap<String, Vec<PathBuf>>,
}

impl FilesystemLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            namespaces: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self {
            roots: config.template_roots.clone(),
            namespaces: config.namespaced_roots.clone(),
        }
    }

    /// Adds a root for `@namespace/...` identifiers.
    pub fn add_namespace(&mut self, namespace: impl Into<String>, root: impl Into<PathBuf>) {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .push(root.into());
    }

    fn search(roots: &[PathBuf], relative: &str) -> Option<PathBuf> {
        roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
    }
}

impl TemplateLocator for FilesystemLocator {
    fn locate(&self, template: &str) -> Option<PathBuf> {
        match template.strip_prefix('@') {
            Some(namespaced) => {
                let (namespace, relative) = namespaced.split_once('/')?;
                Self::search(self.namespaces.get(namespace)?, relative)
            }
            None => Self::search(&self.roots, template),
        }
    }

    fn allowed_roots(&self) -> Option<Vec<PathBuf>> {
        let mut roots = self.roots.clone();
        for paths in self.namespaces.values() {
            roots.extend(paths.iter().cloned());
        }
        Some(roots)
    }
}

/// In-memory locator for templates that are not stored under a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticLocator {
    templates: BTreeMap<String, PathBuf>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: impl Into<String>, path: impl AsRef<Path>) {
        self.templates
            .insert(template.into(), path.as_ref().to_path_buf());
    }
}

impl TemplateLocator for StaticLocator {
    fn locate(&self, template: &str) -> Option<PathBuf> {
        self.templates.get(template).cloned()
    }

    fn allowed_roots(&self) -> Option<Vec<PathBuf>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{FilesystemLocator, StaticLocator, TemplateLocator};
    use std::fs;

    #[test]
    fn searches_main_roots_in_order() {
        let first = tempfile::tempdir().expect("first root");
        let second = tempfile::tempdir().expect("second root");
        fs::write(second.path().join("a.twig"), "").expect("write a");
        fs::write(first.path().join("b.twig"), "").expect("write b");
        fs::write(second.path().join("b.twig"), "").expect("write shadowed b");

        let locator =
            FilesystemLocator::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        assert_eq!(locator.locate("a.twig"), Some(second.path().join("a.twig")));
        assert_eq!(locator.locate("b.twig"), Some(first.path().join("b.twig")));
        assert_eq!(locator.locate("c.twig"), None);
    }

    #[test]
    fn namespaced_identifiers_only_use_their_roots() {
        let main = tempfile::tempdir().expect("main root");
        let shop = tempfile::tempdir().expect("shop root");
        fs::write(main.path().join("cart.twig"), "").expect("write main cart");

        let mut locator = FilesystemLocator::new(vec![main.path().to_path_buf()]);
        locator.add_namespace("Shop", shop.path());
        assert_eq!(locator.locate("@Shop/cart.twig"), None);

        fs::write(shop.path().join("cart.twig"), "").expect("write shop cart");
        assert_eq!(locator.locate("@Shop/cart.twig"), Some(shop.path().join("cart.twig")));
        assert_eq!(locator.locate("@Shop"), None);
        assert_eq!(locator.allowed_roots().map(|roots| roots.len()), Some(2));
    }

    #[test]
    fn static_locator_has_no_roots() {
        let mut locator = StaticLocator::new();
        locator.insert("x.twig", "/anywhere/x.twig");
        assert!(locator.locate("x.twig").is_some());
        assert!(locator.allowed_roots().is_none());
    }
}
