use crate::config::GeneratorConfig;
use crate::package::default_package_name;
use crate::syntax::{PackageRef, TypeExpr};

use super::Artifact;

/// One import of the generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub path: String,
    /// Name the generated code uses for the package
    pub local_name: String,
    /// Set only when `local_name` differs from the path's default name
    pub alias: Option<String>,
}

impl ImportEntry {
    /// `alias "path"` or `"path"`.
    pub fn spec(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{alias} \"{}\"", self.path),
            None => format!("\"{}\"", self.path),
        }
    }

    /// Standard-library paths have no dot in their first element.
    pub fn is_std(&self) -> bool {
        !self.path.split('/').next().unwrap_or_default().contains('.')
    }
}

/// Import paths of one artifact in registration order, each path once, with
/// collision-free local names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    entries: Vec<ImportEntry>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path`, preferably under `preferred`, and return the local
    /// name it ended up with. A path registered earlier keeps its name; a
    /// name already taken by another path becomes `name2`, `name3`, ...
    pub fn add(&mut self, path: &str, preferred: &str) -> String {
        if let Some(existing) = self.local_name(path) {
            return existing.to_string();
        }
        let mut local = preferred.to_string();
        let mut suffix = 2;
        while self.entries.iter().any(|e| e.local_name == local) {
            local = format!("{preferred}{suffix}");
            suffix += 1;
        }
        let alias = (local != default_package_name(path)).then(|| local.clone());
        self.entries.push(ImportEntry {
            path: path.to_string(),
            local_name: local.clone(),
            alias,
        });
        local
    }

    pub fn local_name(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.local_name.as_str())
    }

    pub fn entries(&self) -> &[ImportEntry] {
        &self.entries
    }

    pub fn contains(&self, path: &str) -> bool {
        self.local_name(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Standard-library imports and the rest, each sorted by path.
    pub fn grouped(&self) -> (Vec<&ImportEntry>, Vec<&ImportEntry>) {
        let (mut std, mut other): (Vec<&ImportEntry>, Vec<&ImportEntry>) =
            self.entries.iter().partition(|e| e.is_std());
        std.sort_by(|a, b| a.path.cmp(&b.path));
        other.sort_by(|a, b| a.path.cmp(&b.path));
        (std, other)
    }

    /// Render `ty` with every bound qualifier spelled as its local name.
    pub fn render_type(&self, ty: &TypeExpr) -> String {
        ty.render_with(&|package: &PackageRef| {
            package
                .path
                .as_deref()
                .and_then(|path| self.local_name(path))
                .unwrap_or(&package.name)
                .to_string()
        })
    }
}

/// Baseline imports followed by every path bound in the artifact's types.
pub fn resolve_imports(artifact: &Artifact, config: &GeneratorConfig) -> ImportSet {
    let mut imports = ImportSet::new();
    imports.add("context", "context");
    imports.add("encoding/json", "json");
    imports.add("net/http", "http");
    imports.add(
        &config.endpoint_import,
        &default_package_name(&config.endpoint_import),
    );
    imports.add(&config.transport_import, &config.transport_alias);
    imports.add(&artifact.interface.import_path, &artifact.package_name);

    for method in &artifact.methods {
        method.for_each_type(&mut |ty: &TypeExpr| {
            ty.for_each_package(&mut |package: &PackageRef| {
                if let Some(path) = &package.path {
                    imports.add(path, &package.name);
                }
            });
        });
    }
    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deduplicates_by_path() {
        let mut set = ImportSet::new();
        assert_eq!(set.add("net/http", "http"), "http");
        assert_eq!(set.add("net/http", "nethttp"), "http");
        assert_eq!(set.len(), 1);
        assert_eq!(set.entries()[0].alias, None);
    }

    #[test]
    fn test_add_aliases_on_collision() {
        let mut set = ImportSet::new();
        set.add("net/http", "http");
        assert_eq!(set.add("example.com/svc/http", "http"), "http2");
        assert_eq!(set.add("example.com/other/http", "http"), "http3");
        assert_eq!(set.entries()[1].spec(), "http2 \"example.com/svc/http\"");
    }

    #[test]
    fn test_alias_only_when_name_differs_from_default() {
        let mut set = ImportSet::new();
        set.add("github.com/go-kit/kit/transport/http", "httptransport");
        set.add("gopkg.in/yaml.v3", "yaml");
        set.add("example.com/svc/stuffpkg", "stuff");
        let specs: Vec<String> = set.entries().iter().map(ImportEntry::spec).collect();
        assert_eq!(
            specs,
            vec![
                "httptransport \"github.com/go-kit/kit/transport/http\"",
                "\"gopkg.in/yaml.v3\"",
                "stuff \"example.com/svc/stuffpkg\"",
            ]
        );
    }

    #[test]
    fn test_grouped_sorts_std_first() {
        let mut set = ImportSet::new();
        set.add("net/http", "http");
        set.add("github.com/go-kit/kit/endpoint", "endpoint");
        set.add("context", "context");
        set.add("example.com/svc/api", "api");
        let (std, other) = set.grouped();
        let std: Vec<&str> = std.iter().map(|e| e.path.as_str()).collect();
        let other: Vec<&str> = other.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(std, vec!["context", "net/http"]);
        assert_eq!(other, vec!["example.com/svc/api", "github.com/go-kit/kit/endpoint"]);
    }

    #[test]
    fn test_render_type_uses_local_names() {
        let mut set = ImportSet::new();
        set.add("net/http", "http");
        set.add("example.com/svc/http", "http");
        let ty = TypeExpr::Map {
            key: Box::new(TypeExpr::named("string")),
            value: Box::new(TypeExpr::Pointer(Box::new(TypeExpr::qualified(
                PackageRef::bound("http", "example.com/svc/http"),
                "Route",
            )))),
        };
        assert_eq!(set.render_type(&ty), "map[string]*http2.Route");

        let unbound = TypeExpr::qualified(PackageRef::unbound("mystery"), "T");
        assert_eq!(set.render_type(&unbound), "mystery.T");
    }
}
