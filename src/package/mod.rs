//! # Package Module
//!
//! Finding and loading Go packages.
//!
//! - [`PackageLocator`] maps an import path to a directory and its buildable
//!   files; [`GoPathLocator`] is the default implementation
//! - [`PackageCache`] parses located packages once per generation run
//! - [`BuildContext`] applies file-name and `//go:build` constraints
//! - [`GoMod`] reads module, require and replace directives

mod cache;
mod constraint;
mod locator;
mod module;


pub use cache::{Package, PackageCache, SourceFile};
pub use constraint::BuildContext;
pub use locator::{GoPathLocator, PackageLocation, PackageLocator};
pub use module::{escape_module_path, find_go_mod, GoMod, Replace, Requirement};

use once_cell::sync::Lazy;
use regex::Regex;

static MAJOR_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v[0-9]+$").expect("valid regex"));

/// The package name an import path is assumed to declare when no alias is
/// given.
///
/// Takes the last path element, skipping a trailing major-version element
/// (`/v2`), dropping a `go-` prefix, and cutting at the first character that
/// cannot appear in an identifier (`yaml.v3` → `yaml`, `kit-go` → `kit`).
/// Callers that can read the package should prefer its declared name.
pub fn default_package_name(import_path: &str) -> String {
    let mut segments = import_path.trim_end_matches('/').rsplit('/');
    let mut base = segments.next().unwrap_or(import_path);
    if MAJOR_VERSION.is_match(base) {
        if let Some(parent) = segments.next() {
            base = parent;
        }
    }
    let base = base.strip_prefix("go-").unwrap_or(base);
    let end = base
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(base.len());
    if end == 0 {
        return base.replace(|c: char| !(c.is_alphanumeric() || c == '_'), "_");
    }
    base[..end].to_string()
}
