//! Interface references: `import/path.Identifier` or a bare `pkg.Identifier`
//! expression whose import path has to be inferred.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::GenerateError;
use crate::package::default_package_name;
use crate::syntax::{is_exported, parse_file, parse_type_expr, TypeExpr};
use crate::tool::{pipe_through, tool_binary};

/// Environment variable overriding the `goimports` binary.
pub const GOIMPORTS_BIN_ENV: &str = "KITBOILER_GOIMPORTS_BIN";

/// A type declared directly in the package at `import_path`.
///
/// `import_path` may be `.` for the package in the search directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceReference {
    pub import_path: String,
    pub name: String,
}

impl InterfaceReference {
    pub fn new(import_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for InterfaceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.import_path, self.name)
    }
}

/// Result of syntactic reference parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReference {
    /// `path/to/pkg.Identifier`
    Qualified(InterfaceReference),
    /// No slash: `http.Handler` or `MyService`
    Bare(String),
}

/// Split a user-supplied reference without touching the file system.
///
/// A reference containing `/` must end in `.Identifier` with exactly one dot
/// after the last slash. Anything else is kept as a bare expression.
pub fn parse_reference(reference: &str) -> Result<ParsedReference, GenerateError> {
    let bad = |reason: &str| GenerateError::BadReferenceSyntax {
        reference: reference.to_string(),
        reason: reason.to_string(),
    };

    let mut fields = reference.split_whitespace();
    let (Some(reference), None) = (fields.next(), fields.next()) else {
        return Err(bad("expected a single word"));
    };

    let Some(slash) = reference.rfind('/') else {
        return Ok(ParsedReference::Bare(reference.to_string()));
    };
    if slash + 1 == reference.len() {
        return Err(bad("cannot end with '/'"));
    }
    if reference.ends_with('.') {
        return Err(bad("cannot end with '.'"));
    }
    if reference[slash..].matches('.').count() != 1 {
        return Err(bad("expected exactly one '.' after the last '/'"));
    }
    let Some(dot) = reference.rfind('.') else {
        return Err(bad("missing type name"));
    };
    let (import_path, name) = (&reference[..dot], &reference[dot + 1..]);
    Ok(ParsedReference::Qualified(InterfaceReference::new(
        import_path,
        name,
    )))
}

/// Resolves the import path of a bare `pkg.Identifier` expression.
pub trait ImportInferrer {
    fn infer(&self, expression: &str, search_dir: &Path)
        -> Result<InterfaceReference, GenerateError>;
}

/// Turn any reference string into an [`InterfaceReference`].
///
/// A bare exported identifier names a type of the package in `search_dir`;
/// other bare expressions go through `inferrer`.
pub fn resolve_reference(
    reference: &str,
    search_dir: &Path,
    inferrer: &dyn ImportInferrer,
) -> Result<InterfaceReference, GenerateError> {
    match parse_reference(reference)? {
        ParsedReference::Qualified(resolved) => Ok(resolved),
        ParsedReference::Bare(expression) if !expression.contains('.') => {
            if !is_exported(&expression) || parse_type_expr(&expression).is_err() {
                return Err(GenerateError::BadReferenceSyntax {
                    reference: expression,
                    reason: "expected an exported type name".to_string(),
                });
            }
            Ok(InterfaceReference::new(".", expression))
        }
        ParsedReference::Bare(expression) => {
            let resolved = inferrer.infer(&expression, search_dir)?;
            debug!(expression = %expression, resolved = %resolved, "inferred import path");
            Ok(resolved)
        }
    }
}

/// Infers import paths by letting `goimports` fix up
/// `package hack; var i <expr>`.
#[derive(Debug, Clone)]
pub struct GoimportsInferrer {
    bin: String,
}

impl GoimportsInferrer {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Uses `KITBOILER_GOIMPORTS_BIN`, falling back to `goimports` on `PATH`.
    pub fn from_env() -> Self {
        Self::new(tool_binary(GOIMPORTS_BIN_ENV, "goimports"))
    }
}

impl ImportInferrer for GoimportsInferrer {
    fn infer(
        &self,
        expression: &str,
        search_dir: &Path,
    ) -> Result<InterfaceReference, GenerateError> {
        let failed = |reason: String| GenerateError::InferenceFailed {
            expression: expression.to_string(),
            reason,
        };

        let Ok(TypeExpr::Named {
            package: Some(qualifier),
            name,
            args,
        }) = parse_type_expr(expression)
        else {
            return Err(failed("expected pkg.Identifier".to_string()));
        };
        if !args.is_empty() {
            return Err(failed("type arguments are not supported".to_string()));
        }

        let src = format!("package hack\nvar i {expression}\n");
        let srcdir = search_dir.join("__kitboiler__.go");
        let fixed = pipe_through(
            &self.bin,
            [std::ffi::OsStr::new("-srcdir"), srcdir.as_os_str()],
            &src,
            Some(search_dir),
        )
        .map_err(|err| failed(format!("{err:#}")))?;

        let file = parse_file(&fixed).map_err(|err| failed(format!("unreadable output: {err}")))?;
        let import = file
            .imports
            .iter()
            .find(|import| match &import.name {
                Some(alias) => *alias == qualifier.name,
                None => default_package_name(&import.path) == qualifier.name,
            })
            .or_else(|| file.imports.first())
            .ok_or_else(|| failed(format!("no package found for {}", qualifier.name)))?;

        Ok(InterfaceReference::new(import.path.clone(), name))
    }
}
