//! # Configuration Module
//!
//! Two sources of configuration feed the generator:
//!
//! - [`GeneratorConfig`]: what to generate. Loaded from an optional
//!   `kitboiler.toml` next to the sources (or `--config <path>`), then
//!   overridden by command-line flags.
//! - [`GoEnv`]: where Go packages live and which files the current platform
//!   builds. Read from the usual Go environment variables.
//!
//! ## `kitboiler.toml`
//!
//! ```toml
//! package = "transport"
//! endpoint_import = "github.com/go-kit/kit/endpoint"
//! transport_import = "github.com/go-kit/kit/transport/http"
//! transport_alias = "httptransport"
//! options_suffix = "Setter"
//! export_fields = false
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `GOROOT` | `/usr/local/go` when present |
//! | `GOPATH` | `$HOME/go` |
//! | `GOMODCACHE` | `$GOPATH/pkg/mod` |
//! | `GOOS` / `GOARCH` | host platform |
//! | `CGO_ENABLED` | `1` |
//! | `GOFLAGS` | `-tags=a,b` adds build tags |

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// File looked up in the search directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "kitboiler.toml";

/// Settings controlling the generated artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Package clause of the generated file
    pub package: String,
    /// Import path of the framework endpoint package
    pub endpoint_import: String,
    /// Import path of the framework HTTP transport package
    pub transport_import: String,
    /// Alias the transport package is imported under
    pub transport_alias: String,
    /// Type-name suffix marking a variadic functional-options parameter
    pub options_suffix: String,
    /// Capitalize request/response field names so encoding/json can see them
    pub export_fields: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: "endpoints".to_string(),
            endpoint_import: "github.com/go-kit/kit/endpoint".to_string(),
            transport_import: "github.com/go-kit/kit/transport/http".to_string(),
            transport_alias: "httptransport".to_string(),
            options_suffix: "Setter".to_string(),
            export_fields: false,
        }
    }
}

/// Load a generator configuration from a TOML file
///
/// # Returns
///
/// Returns `Ok(Some(config))` if the file exists and parses successfully,
/// `Ok(None)` if it doesn't exist (not an error),
/// `Err` if it exists but fails to parse.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path).with_context(|| {
        format!(
            "Failed to read generator config: {}",
            config_path.display()
        )
    })?;
    let config: GeneratorConfig = toml::from_str(&contents).with_context(|| {
        format!(
            "Failed to parse generator config: {}",
            config_path.display()
        )
    })?;
    Ok(Some(config))
}

/// Go toolchain environment used to locate packages and filter files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoEnv {
    pub goroot: Option<PathBuf>,
    pub gopath: Vec<PathBuf>,
    pub gomodcache: Option<PathBuf>,
    pub goos: String,
    pub goarch: String,
    pub cgo_enabled: bool,
    pub build_tags: Vec<String>,
}

impl GoEnv {
    /// Load the environment the way the `go` command would see it.
    pub fn from_env() -> Self {
        let home = env::var_os("HOME").map(PathBuf::from);
        let gopath: Vec<PathBuf> = match env::var_os("GOPATH") {
            Some(value) if !value.is_empty() => env::split_paths(&value).collect(),
            _ => home.map(|h| vec![h.join("go")]).unwrap_or_default(),
        };
        let gomodcache = env::var_os("GOMODCACHE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| gopath.first().map(|p| p.join("pkg").join("mod")));
        let goroot = env::var_os("GOROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                let default = PathBuf::from("/usr/local/go");
                default.is_dir().then_some(default)
            });
        let build_tags = env::var("GOFLAGS")
            .map(|flags| parse_tags_flag(&flags))
            .unwrap_or_default();

        Self {
            goroot,
            gopath,
            gomodcache,
            goos: env::var("GOOS").unwrap_or_else(|_| host_goos().to_string()),
            goarch: env::var("GOARCH").unwrap_or_else(|_| host_goarch().to_string()),
            cgo_enabled: env::var("CGO_ENABLED").map(|v| v != "0").unwrap_or(true),
            build_tags,
        }
    }

    /// An environment with no GOROOT/GOPATH, resolving only module-local and
    /// vendored packages.
    pub fn isolated(goos: &str, goarch: &str) -> Self {
        Self {
            goroot: None,
            gopath: Vec::new(),
            gomodcache: None,
            goos: goos.to_string(),
            goarch: goarch.to_string(),
            cgo_enabled: false,
            build_tags: Vec::new(),
        }
    }
}

fn parse_tags_flag(goflags: &str) -> Vec<String> {
    goflags
        .split_whitespace()
        .filter_map(|flag| flag.strip_prefix("-tags="))
        .flat_map(|tags| tags.split(','))
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn host_goos() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_goarch() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}
