//! # Signature Module
//!
//! Turns an interface declaration into a flat list of [`MethodSignature`]s
//! whose types are fully package-qualified.
//!
//! - [`Extractor`] walks the interface, recursing into embedded interfaces
//! - [`Qualifier`] qualifies exported identifiers and binds every package
//!   qualifier to its import path
//! - `options` expands `...XSetter` parameters into one setter per field of
//!   the `X` options struct

mod extract;
mod options;
mod qualify;


pub use extract::Extractor;
pub use options::{options_struct_name, setter_expression};
pub use qualify::Qualifier;

use std::collections::HashSet;

use crate::error::GenerateError;
use crate::syntax::{PackageRef, TypeExpr};

/// What a parameter means to the generated endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Carried in the request struct and passed as `req.<name>`
    Ordinary,
    /// `context.Context`, passed through as `ctx`
    Context,
    /// `...XSetter`, carried as an `X` struct and expanded into setters
    Options,
    /// The predeclared `error` type
    ErrorChannel,
}

impl ParamKind {
    /// Classify an already qualified type.
    pub fn classify(ty: &TypeExpr, options_suffix: &str) -> Self {
        match ty {
            TypeExpr::Named { package: None, name, args } if name == "error" && args.is_empty() => {
                ParamKind::ErrorChannel
            }
            TypeExpr::Named {
                package: Some(package),
                name,
                args,
            } if name == "Context" && args.is_empty() && is_context_package(package) => {
                ParamKind::Context
            }
            TypeExpr::Variadic(inner) if options_struct_name(inner, options_suffix).is_some() => {
                ParamKind::Options
            }
            _ => ParamKind::Ordinary,
        }
    }
}

fn is_context_package(package: &PackageRef) -> bool {
    match &package.path {
        Some(path) => path == "context",
        None => package.name == "context",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Empty for an anonymous parameter or result
    pub name: String,
    pub ty: TypeExpr,
    pub kind: ParamKind,
}

/// One setter call derived from a field of an options struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSetter {
    pub field: String,
    pub ty: TypeExpr,
}

/// Setters for one `...XSetter` parameter, in field declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSetterExpansion {
    /// Name of the variadic parameter
    pub param: String,
    /// The `X` options struct, qualified
    pub options_type: TypeExpr,
    pub setters: Vec<OptionSetter>,
}

/// A method of the flattened interface method set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub results: Vec<Parameter>,
    pub options: Vec<OptionSetterExpansion>,
}

impl MethodSignature {
    /// Reject anonymous, `_` and repeated names.
    ///
    /// Context parameters are exempt since they are passed as `ctx`.
    pub fn validate_names(&self) -> Result<(), GenerateError> {
        let mut seen = HashSet::new();
        let groups = [(false, &self.params), (true, &self.results)];
        for (result, list) in groups {
            for (position, param) in list.iter().enumerate() {
                if !result && param.kind == ParamKind::Context {
                    continue;
                }
                if param.name.is_empty() || param.name == "_" {
                    return Err(GenerateError::UnnamedParameter {
                        method: self.name.clone(),
                        position,
                        result,
                    });
                }
                if !seen.insert(param.name.as_str()) {
                    return Err(GenerateError::DuplicateParameter {
                        method: self.name.clone(),
                        name: param.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parameters carried in the request struct.
    pub fn request_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.kind != ParamKind::Context)
    }

    pub fn takes_request(&self) -> bool {
        self.request_params().next().is_some()
    }

    /// Results carried in the response struct.
    pub fn response_results(&self) -> impl Iterator<Item = &Parameter> {
        filter_error(&self.results)
    }

    pub fn error_result(&self) -> Option<&Parameter> {
        self.results
            .iter()
            .find(|r| r.kind == ParamKind::ErrorChannel)
    }

    pub fn options_for(&self, param: &str) -> Option<&OptionSetterExpansion> {
        self.options.iter().find(|o| o.param == param)
    }

    /// Visit every type the generated code spells out for this method.
    pub fn for_each_type(&self, f: &mut dyn FnMut(&TypeExpr)) {
        for param in self.params.iter().chain(self.results.iter()) {
            f(&param.ty);
        }
        for expansion in &self.options {
            f(&expansion.options_type);
            for setter in &expansion.setters {
                f(&setter.ty);
            }
        }
    }
}

/// Everything but `error`-typed entries.
pub fn filter_error(params: &[Parameter]) -> impl Iterator<Item = &Parameter> {
    params.iter().filter(|p| p.kind != ParamKind::ErrorChannel)
}

/// Comma-separated names, as used on the left of `:=`.
pub fn join_params(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
