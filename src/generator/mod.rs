//! # Generator Module
//!
//! Turns a Go interface into a Go kit endpoints file.
//!
//! ## Pipeline
//!
//! ```text
//! reference → InterfaceReference → Extractor → Artifact → ImportSet → template → formatter
//! ```
//!
//! 1. **Reference** - `pkg/path.Iface` is split; bare expressions go through
//!    the [`ImportInferrer`]
//! 2. **Extraction** - the interface is flattened into qualified
//!    [`MethodSignature`]s, options parameters expanded
//! 3. **Imports** - baseline framework imports plus every path bound in a
//!    parameter, result or setter type
//! 4. **Rendering** - `templates/endpoints.go.tmpl` through minijinja
//! 5. **Formatting** - `gofmt`; a formatter failure returns the raw text
//!
//! ## Generated Code
//!
//! For each method `M`: `MRequest` and `MResponse` structs, `MEndPoint`,
//! `MHTTPJSONHandler` and `DecodeMRequest`, followed by one shared
//! `EncodeResponse`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kitboiler::config::GeneratorConfig;
//! use kitboiler::generator::Generator;
//!
//! let artifact = Generator::new(GeneratorConfig::default())
//!     .generate("example.com/svc/api.MyService", Path::new("."))?;
//! print!("{}", artifact.source);
//! ```
//!
//! Collaborators default to the Go toolchain and can be swapped through
//! [`Generator::with_locator`], [`Generator::with_formatter`] and
//! [`Generator::with_inferrer`].

mod format;
mod imports;
mod templates;

#[cfg(test)]
mod tests;

pub use format::{format_or_raw, GofmtFormatter, NoopFormatter, SourceFormatter, GOFMT_BIN_ENV};
pub use imports::{resolve_imports, ImportEntry, ImportSet};
pub use templates::{
    render, struct_field_name, template_data, EndpointsTemplateData, FieldTemplateData,
    MethodTemplateData,
};

use std::path::Path;

use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::package::{GoPathLocator, PackageCache, PackageLocator};
use crate::reference::{resolve_reference, GoimportsInferrer, ImportInferrer, InterfaceReference};
use crate::signature::{Extractor, MethodSignature};

/// Everything the template needs about one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// The interface, with the import path of its declaring package
    pub interface: InterfaceReference,
    /// Declared name of the interface's package
    pub package_name: String,
    /// Package clause of the generated file
    pub destination: String,
    pub methods: Vec<MethodSignature>,
}

/// Rendered and formatted output for one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub interface: InterfaceReference,
    pub source: String,
}

/// Generation pipeline with its collaborators.
pub struct Generator {
    config: GeneratorConfig,
    locator: Box<dyn PackageLocator>,
    formatter: Box<dyn SourceFormatter>,
    inferrer: Box<dyn ImportInferrer>,
}

impl Generator {
    /// Generator backed by the Go toolchain found through the environment.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            locator: Box::new(GoPathLocator::from_env()),
            formatter: Box::new(GofmtFormatter::from_env()),
            inferrer: Box::new(GoimportsInferrer::from_env()),
        }
    }

    pub fn with_locator(mut self, locator: impl PackageLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    pub fn with_formatter(mut self, formatter: impl SourceFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_inferrer(mut self, inferrer: impl ImportInferrer + 'static) -> Self {
        self.inferrer = Box::new(inferrer);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Resolve, extract and validate the interface named by `reference`.
    pub fn build_artifact(&self, reference: &str, search_dir: &Path) -> Result<Artifact, GenerateError> {
        let requested = resolve_reference(reference, search_dir, self.inferrer.as_ref())?;
        let mut cache = PackageCache::new(self.locator.as_ref());
        let package = cache.load(&requested.import_path, search_dir)?;

        let methods = Extractor::new(&mut cache, search_dir, self.config.options_suffix.as_str())
            .extract(&requested)?;
        for method in &methods {
            method.validate_names()?;
        }
        debug!(
            interface = %requested,
            methods = methods.len(),
            packages = cache.len(),
            "extracted interface"
        );

        Ok(Artifact {
            interface: InterfaceReference::new(package.import_path.clone(), requested.name),
            package_name: package.name.clone(),
            destination: self.config.package.clone(),
            methods,
        })
    }

    /// Produce the endpoints file for `reference`.
    pub fn generate(&self, reference: &str, search_dir: &Path) -> Result<GeneratedArtifact, GenerateError> {
        let artifact = self.build_artifact(reference, search_dir)?;
        let imports = resolve_imports(&artifact, &self.config);
        let raw = render(&artifact, &imports, &self.config)?;
        let source = format_or_raw(self.formatter.as_ref(), raw);
        info!(
            interface = %artifact.interface,
            methods = artifact.methods.len(),
            imports = imports.len(),
            "generated endpoints"
        );
        Ok(GeneratedArtifact {
            interface: artifact.interface,
            source,
        })
    }
}
