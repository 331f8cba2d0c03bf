use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

use super::imports::ImportSet;
use super::Artifact;
use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::signature::{join_params, setter_expression, MethodSignature, ParamKind, Parameter};
use crate::syntax::TypeExpr;

const ENDPOINTS_TEMPLATE_NAME: &str = "endpoints.go.tmpl";
const ENDPOINTS_TEMPLATE: &str = include_str!("../../templates/endpoints.go.tmpl");

/// Template data for generating the endpoints file of one interface
#[derive(Debug, Clone, Serialize)]
pub struct EndpointsTemplateData {
    /// `import/path.Interface`, for the header comment
    pub interface: String,
    /// Destination package name
    pub package: String,
    /// Import specs of the standard library group, sorted
    pub std_imports: Vec<String>,
    /// Remaining import specs, sorted
    pub other_imports: Vec<String>,
    /// Service interface type as spelled in the generated file
    pub service: String,
    pub context_pkg: String,
    pub json_pkg: String,
    pub http_pkg: String,
    pub endpoint_pkg: String,
    pub transport_pkg: String,
    /// One entry per method of the flattened method set
    pub methods: Vec<MethodTemplateData>,
}

/// Per-method template data
#[derive(Debug, Clone, Serialize)]
pub struct MethodTemplateData {
    /// Method name
    pub name: String,
    /// Request struct fields
    pub request_fields: Vec<FieldTemplateData>,
    /// Response struct fields
    pub response_fields: Vec<FieldTemplateData>,
    /// Whether the endpoint has to unpack `req`
    pub takes_request: bool,
    /// The service call statement, e.g. `results, err := svc.Query(ctx, req.limit)`
    pub call: String,
    /// `err`-typed result name, or `nil`
    pub error_return: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldTemplateData {
    /// Struct field name
    pub name: String,
    /// Field type with local import names
    pub ty: String,
    /// JSON key
    pub key: String,
    /// Local variable holding the value in the endpoint
    pub var: String,
}

/// Build the template data of `artifact`.
pub fn template_data(
    artifact: &Artifact,
    imports: &ImportSet,
    config: &GeneratorConfig,
) -> EndpointsTemplateData {
    let (std, other) = imports.grouped();
    let local = |path: &str, fallback: &str| {
        imports.local_name(path).unwrap_or(fallback).to_string()
    };
    let service_pkg = local(&artifact.interface.import_path, &artifact.package_name);

    EndpointsTemplateData {
        interface: artifact.interface.to_string(),
        package: artifact.destination.clone(),
        std_imports: std.iter().map(|e| e.spec()).collect(),
        other_imports: other.iter().map(|e| e.spec()).collect(),
        service: format!("{service_pkg}.{}", artifact.interface.name),
        context_pkg: local("context", "context"),
        json_pkg: local("encoding/json", "json"),
        http_pkg: local("net/http", "http"),
        endpoint_pkg: local(&config.endpoint_import, "endpoint"),
        transport_pkg: local(&config.transport_import, &config.transport_alias),
        methods: artifact
            .methods
            .iter()
            .map(|m| method_data(m, imports, config))
            .collect(),
    }
}

fn method_data(method: &MethodSignature, imports: &ImportSet, config: &GeneratorConfig) -> MethodTemplateData {
    let field_name = |param: &Parameter| struct_field_name(&param.name, config.export_fields);

    let request_fields = method
        .request_params()
        .map(|param| {
            let ty = match (param.kind, method.options_for(&param.name)) {
                (ParamKind::Options, Some(expansion)) => imports.render_type(&expansion.options_type),
                _ => imports.render_type(&field_type(&param.ty)),
            };
            FieldTemplateData {
                name: field_name(param),
                ty,
                key: param.name.clone(),
                var: param.name.clone(),
            }
        })
        .collect();

    let response_fields = method
        .response_results()
        .map(|result| FieldTemplateData {
            name: field_name(result),
            ty: imports.render_type(&result.ty),
            key: result.name.clone(),
            var: result.name.clone(),
        })
        .collect();

    let mut args = Vec::new();
    let mut setters = Vec::new();
    for param in &method.params {
        match param.kind {
            ParamKind::Context => args.push("ctx".to_string()),
            ParamKind::Options => {
                let Some(expansion) = method.options_for(&param.name) else {
                    continue;
                };
                let options_type = imports.render_type(&expansion.options_type);
                setters.extend(expansion.setters.iter().map(|setter| {
                    setter_expression(
                        &imports.render_type(&setter.ty),
                        &options_type,
                        &setter.field,
                        &field_name(param),
                    )
                }));
            }
            ParamKind::Ordinary | ParamKind::ErrorChannel => {
                let spread = if matches!(param.ty, TypeExpr::Variadic(_)) { "..." } else { "" };
                args.push(format!("req.{}{spread}", field_name(param)));
            }
        }
    }
    args.extend(setters);

    let invocation = format!("svc.{}({})", method.name, args.join(", "));
    let call = if method.results.is_empty() {
        invocation
    } else {
        format!("{} := {invocation}", join_params(&method.results))
    };

    MethodTemplateData {
        name: method.name.clone(),
        request_fields,
        response_fields,
        takes_request: method.takes_request(),
        call,
        error_return: method
            .error_result()
            .map_or_else(|| "nil".to_string(), |r| r.name.clone()),
    }
}

/// Struct field type of a parameter: `...T` is carried as `[]T`.
fn field_type(ty: &TypeExpr) -> TypeExpr {
    match ty {
        TypeExpr::Variadic(inner) => TypeExpr::Slice(inner.clone()),
        other => other.clone(),
    }
}

/// Field name for a parameter, capitalized when fields are exported.
pub fn struct_field_name(param: &str, export: bool) -> String {
    if !export {
        return param.to_string();
    }
    let mut chars = param.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render the endpoints file of `artifact` (unformatted).
pub fn render(
    artifact: &Artifact,
    imports: &ImportSet,
    config: &GeneratorConfig,
) -> Result<String, GenerateError> {
    let data = template_data(artifact, imports, config);

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_template(ENDPOINTS_TEMPLATE_NAME, ENDPOINTS_TEMPLATE)
        .map_err(template_error)?;
    let tmpl = env
        .get_template(ENDPOINTS_TEMPLATE_NAME)
        .map_err(template_error)?;
    tmpl.render(&data).map_err(template_error)
}

fn template_error(err: minijinja::Error) -> GenerateError {
    GenerateError::GenerationFailure(err.to_string())
}
