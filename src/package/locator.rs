use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use super::constraint::BuildContext;
use super::module::{escape_module_path, find_go_mod, GoMod};
use crate::config::GoEnv;
use crate::error::GenerateError;

/// Where a package's buildable source files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    pub import_path: String,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Maps an import path, as seen from a search directory, to source files.
pub trait PackageLocator {
    fn locate(&self, import_path: &str, search_dir: &Path)
        -> Result<PackageLocation, GenerateError>;
}

/// Resolves import paths the way the `go` command does in module mode, with a
/// GOPATH fallback.
///
/// Lookup order: `replace` directives, the main module, its `vendor/` tree,
/// `GOROOT/src`, each `GOPATH/src`, then the module cache for required
/// modules. Relative paths (`.`, `./x`, `../x`) are taken from `search_dir`.
#[derive(Debug, Clone)]
pub struct GoPathLocator {
    env: GoEnv,
    build: BuildContext,
}

impl GoPathLocator {
    pub fn new(env: GoEnv) -> Self {
        let build = BuildContext::from_env(&env);
        Self { env, build }
    }

    pub fn from_env() -> Self {
        Self::new(GoEnv::from_env())
    }

    /// Buildable `.go` files of `dir`, sorted by name.
    pub fn list_go_files(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !self.build.matches_file_name(name) {
                continue;
            }
            let path = entry.path();
            match fs::read_to_string(&path) {
                Ok(src) if self.build.matches_source(&src) => files.push(path),
                Ok(_) => debug!(file = %path.display(), "excluded by build constraints"),
                Err(err) => warn!(file = %path.display(), error = %err, "skipping unreadable file"),
            }
        }
        files.sort();
        Ok(files)
    }

    fn candidates(&self, import_path: &str, search_dir: &Path, go_mod: Option<&GoMod>) -> Vec<PathBuf> {
        let mut dirs = Vec::new();

        if let Some(go_mod) = go_mod {
            if let Some((replace, rest)) = go_mod.replacement_for(import_path) {
                if replace.is_local() {
                    dirs.push(normalize(&go_mod.dir.join(&replace.new_path).join(rest)));
                } else if let Some(version) = &replace.new_version {
                    if let Some(dir) = self.module_cache_dir(&replace.new_path, version, rest) {
                        dirs.push(dir);
                    }
                }
            }
            if let Some(dir) = go_mod.local_dir(import_path) {
                dirs.push(dir);
            }
            dirs.push(go_mod.dir.join("vendor").join(import_path));
        } else {
            dirs.extend(
                search_dir
                    .ancestors()
                    .map(|ancestor| ancestor.join("vendor").join(import_path)),
            );
        }

        if let Some(goroot) = &self.env.goroot {
            dirs.push(goroot.join("src").join(import_path));
        }
        for gopath in &self.env.gopath {
            dirs.push(gopath.join("src").join(import_path));
        }

        if let Some(go_mod) = go_mod {
            if let Some((requirement, rest)) = go_mod.requirement_for(import_path) {
                if let Some(dir) =
                    self.module_cache_dir(&requirement.path, &requirement.version, rest)
                {
                    dirs.push(dir);
                }
            }
        }
        dirs
    }

    fn module_cache_dir(&self, module: &str, version: &str, rest: &str) -> Option<PathBuf> {
        let cache = self.env.gomodcache.as_ref()?;
        let root = format!("{}@{}", escape_module_path(module), version);
        Some(cache.join(root).join(rest))
    }

    /// Import path of a directory given by file-system location.
    fn import_path_of_dir(&self, dir: &Path, go_mod: Option<&GoMod>) -> String {
        if let Some(go_mod) = go_mod {
            if let Ok(rel) = dir.strip_prefix(&go_mod.dir) {
                return join_import_path(&go_mod.module, rel);
            }
        }
        for gopath in &self.env.gopath {
            if let Ok(rel) = dir.strip_prefix(gopath.join("src")) {
                return join_import_path("", rel);
            }
        }
        dir.display().to_string()
    }
}

impl PackageLocator for GoPathLocator {
    fn locate(
        &self,
        import_path: &str,
        search_dir: &Path,
    ) -> Result<PackageLocation, GenerateError> {
        let not_found = |reason: String| GenerateError::PackageNotFound {
            import_path: import_path.to_string(),
            reason,
        };
        let search_dir = search_dir.canonicalize().map_err(|err| {
            not_found(format!("cannot read search directory {}: {err}", search_dir.display()))
        })?;
        let go_mod = find_go_mod(&search_dir).unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "ignoring unreadable go.mod");
            None
        });

        if is_relative_import(import_path) {
            let dir = normalize(&search_dir.join(import_path));
            let files = self
                .list_go_files(&dir)
                .map_err(|err| not_found(format!("{}: {err}", dir.display())))?;
            if files.is_empty() {
                return Err(not_found(format!("no buildable Go files in {}", dir.display())));
            }
            let resolved = self.import_path_of_dir(&dir, go_mod.as_ref());
            debug!(import_path, resolved = %resolved, dir = %dir.display(), "located relative package");
            return Ok(PackageLocation {
                import_path: resolved,
                dir,
                files,
            });
        }

        for dir in self.candidates(import_path, &search_dir, go_mod.as_ref()) {
            if !dir.is_dir() {
                continue;
            }
            match self.list_go_files(&dir) {
                Ok(files) if !files.is_empty() => {
                    debug!(import_path, dir = %dir.display(), files = files.len(), "located package");
                    return Ok(PackageLocation {
                        import_path: import_path.to_string(),
                        dir,
                        files,
                    });
                }
                Ok(_) => debug!(dir = %dir.display(), "no buildable Go files"),
                Err(err) => warn!(dir = %dir.display(), error = %err, "cannot list directory"),
            }
        }
        Err(not_found(
            "no directory with buildable Go files for this import path".to_string(),
        ))
    }
}

fn is_relative_import(import_path: &str) -> bool {
    import_path == "."
        || import_path == ".."
        || import_path.starts_with("./")
        || import_path.starts_with("../")
}

fn join_import_path(base: &str, rel: &Path) -> String {
    let mut path = base.to_string();
    for component in rel.components() {
        if let Component::Normal(segment) = component {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&segment.to_string_lossy());
        }
    }
    path
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
