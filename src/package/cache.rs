use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use super::locator::PackageLocator;
use crate::error::GenerateError;
use crate::syntax::{parse_file, File, ImportSpec, TypeSpec};

/// One parsed source file of a package.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub ast: File,
}

/// A located and parsed Go package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Name declared by the package clause
    pub name: String,
    pub import_path: String,
    pub dir: PathBuf,
    pub files: Vec<SourceFile>,
}

impl Package {
    /// The top-level type declaration `name` and the file declaring it.
    pub fn find_type(&self, name: &str) -> Option<(&SourceFile, &TypeSpec)> {
        self.files
            .iter()
            .find_map(|file| file.ast.find_type(name).map(|spec| (file, spec)))
    }

    /// Imports declared across all files, each path once.
    pub fn imports(&self) -> Vec<&ImportSpec> {
        let mut seen: Vec<&ImportSpec> = Vec::new();
        for import in self.files.iter().flat_map(|file| file.ast.imports.iter()) {
            if !seen.iter().any(|s| s.path == import.path && s.name == import.name) {
                seen.push(import);
            }
        }
        seen
    }
}

/// Parsed packages of one generation run, shared by reference.
///
/// Packages are keyed both by the import path they were requested under and
/// by their directory, so `.` and the full module path of the same package
/// resolve to the same entry.
pub struct PackageCache<'a> {
    locator: &'a dyn PackageLocator,
    by_path: HashMap<String, Rc<Package>>,
    by_dir: HashMap<PathBuf, Rc<Package>>,
}

impl<'a> PackageCache<'a> {
    pub fn new(locator: &'a dyn PackageLocator) -> Self {
        Self {
            locator,
            by_path: HashMap::new(),
            by_dir: HashMap::new(),
        }
    }

    /// Locate and parse the package, or return the cached copy.
    pub fn load(&mut self, import_path: &str, search_dir: &Path) -> Result<Rc<Package>, GenerateError> {
        if let Some(package) = self.by_path.get(import_path) {
            return Ok(Rc::clone(package));
        }

        let location = self.locator.locate(import_path, search_dir)?;
        if let Some(package) = self.by_dir.get(&location.dir) {
            let package = Rc::clone(package);
            self.by_path.insert(import_path.to_string(), Rc::clone(&package));
            return Ok(package);
        }

        let mut name: Option<String> = None;
        let mut files = Vec::new();
        for path in location.files {
            let src = match fs::read_to_string(&path) {
                Ok(src) => src,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping unreadable file");
                    continue;
                }
            };
            let ast = match parse_file(&src) {
                Ok(ast) => ast,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping file that failed to parse");
                    continue;
                }
            };
            match &name {
                None => name = Some(ast.package.clone()),
                Some(existing) if *existing != ast.package => {
                    warn!(
                        file = %path.display(),
                        expected = %existing,
                        found = %ast.package,
                        "skipping file from a different package"
                    );
                    continue;
                }
                Some(_) => {}
            }
            files.push(SourceFile { path, ast });
        }

        let Some(name) = name else {
            return Err(GenerateError::PackageNotFound {
                import_path: import_path.to_string(),
                reason: format!("no parsable Go files in {}", location.dir.display()),
            });
        };

        debug!(
            import_path = %location.import_path,
            package = %name,
            files = files.len(),
            "loaded package"
        );
        let package = Rc::new(Package {
            name,
            import_path: location.import_path.clone(),
            dir: location.dir.clone(),
            files,
        });
        self.by_dir.insert(location.dir, Rc::clone(&package));
        self.by_path.insert(import_path.to_string(), Rc::clone(&package));
        self.by_path
            .entry(location.import_path)
            .or_insert_with(|| Rc::clone(&package));
        Ok(package)
    }

    /// Package clause name of `import_path`, or `None` when it cannot be
    /// loaded.
    pub fn declared_name(&mut self, import_path: &str, search_dir: &Path) -> Option<String> {
        match self.load(import_path, search_dir) {
            Ok(package) => Some(package.name.clone()),
            Err(err) => {
                debug!(import_path, error = %err, "cannot read declared package name");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_dir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dir.is_empty()
    }
}
