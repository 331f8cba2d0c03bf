use tracing::warn;

use crate::tool::{pipe_through, tool_binary};

/// Environment variable overriding the `gofmt` binary.
pub const GOFMT_BIN_ENV: &str = "KITBOILER_GOFMT_BIN";

/// Normalizes generated source text.
pub trait SourceFormatter {
    fn format(&self, source: &str) -> anyhow::Result<String>;
}

/// Pipes source through `gofmt`.
#[derive(Debug, Clone)]
pub struct GofmtFormatter {
    bin: String,
}

impl GofmtFormatter {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// `gofmt`, unless `KITBOILER_GOFMT_BIN` names another binary.
    pub fn from_env() -> Self {
        Self::new(tool_binary(GOFMT_BIN_ENV, "gofmt"))
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }
}

impl SourceFormatter for GofmtFormatter {
    fn format(&self, source: &str) -> anyhow::Result<String> {
        pipe_through(&self.bin, std::iter::empty::<&str>(), source, None)
    }
}

/// Returns the source unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl SourceFormatter for NoopFormatter {
    fn format(&self, source: &str) -> anyhow::Result<String> {
        Ok(source.to_string())
    }
}

/// Formatted `source`, or `source` itself when the formatter fails.
pub fn format_or_raw(formatter: &dyn SourceFormatter, source: String) -> String {
    match formatter.format(&source) {
        Ok(formatted) => formatted,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "formatting failed, emitting unformatted source");
            source
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, OnceLock};

    // Serialize environment mutations to avoid test races
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn stub(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("gofmt");
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn with_gofmt_bin<T>(bin: &Path, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let old_bin = env::var(GOFMT_BIN_ENV).ok();
        env::set_var(GOFMT_BIN_ENV, bin);
        let result = f();
        match old_bin {
            Some(v) => env::set_var(GOFMT_BIN_ENV, v),
            None => env::remove_var(GOFMT_BIN_ENV),
        }
        result
    }

    #[test]
    fn test_gofmt_formatter_pipes_through_binary() {
        let dir = tempfile::tempdir().unwrap();
        let bin = stub(dir.path(), "#!/bin/sh\ntr 'a-z' 'A-Z'\n");
        let formatter = with_gofmt_bin(&bin, GofmtFormatter::from_env);
        assert_eq!(formatter.bin(), bin.to_str().unwrap());
        assert_eq!(formatter.format("package api\n").unwrap(), "PACKAGE API\n");
    }

    #[test]
    fn test_format_or_raw_falls_back_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bin = stub(dir.path(), "#!/bin/sh\ncat >/dev/null\necho 'syntax error' >&2\nexit 2\n");
        let formatter = GofmtFormatter::new(bin.to_str().unwrap());
        let err = formatter.format("package api\n").unwrap_err();
        assert!(format!("{err:#}").contains("syntax error"));

        let raw = "package   api\n".to_string();
        assert_eq!(format_or_raw(&formatter, raw.clone()), raw);
    }

    #[test]
    fn test_missing_binary_is_soft_failure() {
        let formatter = GofmtFormatter::new("/nonexistent/kitboiler-gofmt");
        assert_eq!(format_or_raw(&formatter, "x".to_string()), "x");
    }

    #[test]
    fn test_noop_formatter() {
        assert_eq!(NoopFormatter.format("a  b").unwrap(), "a  b");
    }
}
