//! Errors raised while resolving an interface and generating its artifact.

use std::fmt;

/// Every hard failure of the resolution-and-generation pipeline.
///
/// The binary prints the `Display` form on one line and exits with status 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The interface reference string is malformed
    BadReferenceSyntax { reference: String, reason: String },
    /// No source directory could be found for an import path
    PackageNotFound { import_path: String, reason: String },
    /// The package has no top-level type with that name
    TypeNotFound { import_path: String, name: String },
    /// The named type exists but is not an interface
    NotAnInterface { import_path: String, name: String },
    /// The interface declares no methods and embeds nothing
    EmptyInterface { import_path: String, name: String },
    /// The interface declares type parameters
    GenericInterface { import_path: String, name: String },
    /// An embedded element cannot be flattened into methods
    UnsupportedEmbed { interface: String, embed: String },
    /// An embedding chain revisits an interface already being extracted
    EmbedCycle { chain: Vec<String> },
    /// Two methods of the flattened set share a name but not a signature
    DuplicateMethod { interface: String, method: String },
    /// Two parameters or results of one method share a name
    DuplicateParameter { method: String, name: String },
    /// A parameter or result has no usable name
    UnnamedParameter {
        method: String,
        position: usize,
        result: bool,
    },
    /// The options type behind a `...XSetter` parameter is not a struct
    OptionsNotStruct { options_type: String },
    /// The options struct has a field that cannot get a setter
    UnsupportedOptionsField { options_type: String, field: String },
    /// The import path of a bare reference could not be inferred
    InferenceFailed { expression: String, reason: String },
    /// The template engine failed to produce the artifact
    GenerationFailure(String),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::BadReferenceSyntax { reference, reason } => {
                write!(f, "invalid interface reference {reference:?}: {reason}")
            }
            GenerateError::PackageNotFound {
                import_path,
                reason,
            } => write!(f, "cannot find package {import_path:?}: {reason}"),
            GenerateError::TypeNotFound { import_path, name } => {
                write!(f, "type {name} not found in package {import_path:?}")
            }
            GenerateError::NotAnInterface { import_path, name } => {
                write!(f, "{import_path}.{name} is not an interface type")
            }
            GenerateError::EmptyInterface { import_path, name } => {
                write!(f, "interface {import_path}.{name} has no methods")
            }
            GenerateError::GenericInterface { import_path, name } => write!(
                f,
                "interface {import_path}.{name} has type parameters, which are not supported"
            ),
            GenerateError::UnsupportedEmbed { interface, embed } => {
                write!(f, "interface {interface} embeds {embed}, which has no method set to flatten")
            }
            GenerateError::EmbedCycle { chain } => {
                write!(f, "embedded interface cycle: {}", chain.join(" -> "))
            }
            GenerateError::DuplicateMethod { interface, method } => write!(
                f,
                "interface {interface} has conflicting declarations of method {method}"
            ),
            GenerateError::DuplicateParameter { method, name } => {
                write!(f, "method {method}: name {name} is used more than once")
            }
            GenerateError::UnnamedParameter {
                method,
                position,
                result,
            } => {
                let kind = if *result { "result" } else { "parameter" };
                write!(
                    f,
                    "method {method}: {kind} {} must be named (unnamed and '_' names are not supported)",
                    position + 1
                )
            }
            GenerateError::OptionsNotStruct { options_type } => {
                write!(f, "options type {options_type} is not a struct")
            }
            GenerateError::UnsupportedOptionsField {
                options_type,
                field,
            } => write!(
                f,
                "options type {options_type} has unsupported field {field} (embedded fields cannot be set)"
            ),
            GenerateError::InferenceFailed { expression, reason } => {
                write!(f, "cannot infer import path of {expression:?}: {reason}")
            }
            GenerateError::GenerationFailure(msg) => write!(f, "template execution failed: {msg}"),
        }
    }
}

impl std::error::Error for GenerateError {}

pub type GenerateResult<T> = Result<T, GenerateError>;
