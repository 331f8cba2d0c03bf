#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::config::GoEnv;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const API_SRC: &str = r#"package api

import (
	"context"

	"example.com/svc/model"
	"example.com/svc/somepkg"
)

type MyService interface {
	MyFirstFunction(name string) (err error)
	MySecondQuery() (result *somepkg.FooBar, err error)
	MyThirdQuery(ctx context.Context, id string, opts ...SomeOptionsSetter) (rows []model.Row, err error)
	Count() (n int)
	Fire(ctx context.Context, event model.Event)
}

type SomeOptions struct {
	A int
	B string
}

type SomeOptionsSetter func(*SomeOptions)

type Clash interface {
	Serve(h *http.Route) (err error)
}

type Unnamed interface {
	Do(string) (err error)
}

type Calculator interface {
	Sum(label string, xs ...model.Row) (total int, err error)
}

type Plain struct{}

type Empty interface{}
"#;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn service_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "go.mod", "module example.com/svc\n");
    write(dir.path(), "api/api.go", API_SRC);
    write(
        dir.path(),
        "model/model.go",
        "package model\n\ntype Row struct{}\n\ntype Event struct{}\n",
    );
    write(dir.path(), "somepkg/foo.go", "package somepkg\n\ntype FooBar struct{}\n");
    write(dir.path(), "http/route.go", "package http\n\ntype Route struct{}\n");
    dir
}

struct FixedInferrer;

impl ImportInferrer for FixedInferrer {
    fn infer(&self, expression: &str, _search_dir: &Path) -> Result<InterfaceReference, GenerateError> {
        match expression.split_once('.') {
            Some(("api", name)) => Ok(InterfaceReference::new("example.com/svc/api", name)),
            _ => Err(GenerateError::InferenceFailed {
                expression: expression.to_string(),
                reason: "unknown package".to_string(),
            }),
        }
    }
}

struct FailingFormatter;

impl SourceFormatter for FailingFormatter {
    fn format(&self, _source: &str) -> anyhow::Result<String> {
        anyhow::bail!("gofmt: expected declaration")
    }
}

fn generator(config: GeneratorConfig) -> Generator {
    Generator::new(config)
        .with_locator(GoPathLocator::new(GoEnv::isolated("linux", "amd64")))
        .with_formatter(NoopFormatter)
        .with_inferrer(FixedInferrer)
}

fn generate(tree: &TempDir, reference: &str) -> String {
    generator(GeneratorConfig::default())
        .generate(reference, tree.path())
        .unwrap()
        .source
}

#[test]
fn test_header_and_imports() {
    let tree = service_tree();
    let source = generate(&tree, "example.com/svc/api.MyService");
    assert!(source.starts_with(
        "// Code generated by kitboiler from example.com/svc/api.MyService. DO NOT EDIT.\n"
    ));
    assert!(source.contains("\npackage endpoints\n"));
    assert!(source.contains(
        "import (\n\t\"context\"\n\t\"encoding/json\"\n\t\"net/http\"\n\n\t\"example.com/svc/api\"\n\t\"example.com/svc/model\"\n\t\"example.com/svc/somepkg\"\n\t\"github.com/go-kit/kit/endpoint\"\n\thttptransport \"github.com/go-kit/kit/transport/http\"\n)\n"
    ));
    assert!(source.ends_with(
        "func EncodeResponse(_ context.Context, w http.ResponseWriter, response interface{}) error {\n\treturn json.NewEncoder(w).Encode(response)\n}\n"
    ));
    assert_eq!(source.matches("func EncodeResponse").count(), 1);
}

#[test]
fn test_single_parameter_method() {
    let tree = service_tree();
    let source = generate(&tree, "example.com/svc/api.MyService");
    assert!(source.contains(
        "type MyFirstFunctionRequest struct {\n\tname string `json:\"name\"`\n}\n"
    ));
    assert!(source.contains("type MyFirstFunctionResponse struct {\n}\n"));
    assert!(source.contains(
        "func MyFirstFunctionEndPoint(svc api.MyService) endpoint.Endpoint {\n\treturn func(ctx context.Context, request interface{}) (interface{}, error) {\n\t\treq := request.(MyFirstFunctionRequest)\n\t\terr := svc.MyFirstFunction(req.name)\n\t\treturn MyFirstFunctionResponse{}, err\n\t}\n}\n"
    ));
    assert!(source.contains(
        "func MyFirstFunctionHTTPJSONHandler(e endpoint.Endpoint) http.Handler {\n\treturn httptransport.NewServer(\n\t\te,\n\t\tDecodeMyFirstFunctionRequest,\n\t\tEncodeResponse,\n\t)\n}\n"
    ));
    assert!(source.contains(
        "func DecodeMyFirstFunctionRequest(_ context.Context, r *http.Request) (interface{}, error) {\n\tvar request MyFirstFunctionRequest\n\tif err := json.NewDecoder(r.Body).Decode(&request); err != nil {\n"
    ));
}

#[test]
fn test_external_result_type() {
    let tree = service_tree();
    let source = generate(&tree, "example.com/svc/api.MyService");
    assert!(source.contains(
        "type MySecondQueryResponse struct {\n\tresult *somepkg.FooBar `json:\"result\"`\n}\n"
    ));
    assert!(source.contains("\t\tresult, err := svc.MySecondQuery()\n"));
    assert!(source.contains("\t\treturn MySecondQueryResponse{\n\t\t\tresult: result,\n\t\t}, err\n"));
    // No request fields: the endpoint never unpacks `req`.
    assert!(!source.contains("request.(MySecondQueryRequest)"));
}

#[test]
fn test_options_and_context_arguments() {
    let tree = service_tree();
    let source = generate(&tree, "example.com/svc/api.MyService");
    assert!(source.contains(
        "type MyThirdQueryRequest struct {\n\tid string `json:\"id\"`\n\topts api.SomeOptions `json:\"opts\"`\n}\n"
    ));
    assert!(source.contains(
        "\t\trows, err := svc.MyThirdQuery(ctx, req.id, \
func(v int) func(*api.SomeOptions) { return func(opts *api.SomeOptions) { opts.A = v } }(req.opts.A), \
func(v string) func(*api.SomeOptions) { return func(opts *api.SomeOptions) { opts.B = v } }(req.opts.B))\n"
    ));
}

#[test]
fn test_methods_without_error_or_results() {
    let tree = service_tree();
    let source = generate(&tree, "example.com/svc/api.MyService");
    assert!(source.contains("\t\tn := svc.Count()\n"));
    assert!(source.contains("\t\t\tn: n,\n\t\t}, nil\n"));
    assert!(source.contains("\t\tsvc.Fire(ctx, req.event)\n\t\treturn FireResponse{}, nil\n"));
    assert!(source.contains("\tevent model.Event `json:\"event\"`\n"));
}

#[test]
fn test_variadic_parameter_is_a_slice_field() {
    let tree = service_tree();
    let source = generate(&tree, "example.com/svc/api.Calculator");
    assert!(source.contains(
        "type SumRequest struct {\n\tlabel string `json:\"label\"`\n\txs []model.Row `json:\"xs\"`\n}\n"
    ));
    assert!(source.contains("\t\ttotal, err := svc.Sum(req.label, req.xs...)\n"));
    assert!(!source.contains("...model.Row"));
}

#[test]
fn test_method_order_is_declaration_order() {
    let tree = service_tree();
    let source = generate(&tree, "example.com/svc/api.MyService");
    let positions: Vec<usize> = ["MyFirstFunction", "MySecondQuery", "MyThirdQuery", "Count", "Fire"]
        .iter()
        .map(|name| source.find(&format!("type {name}Request struct")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
}

#[test]
fn test_colliding_import_is_aliased() {
    let tree = service_tree();
    let api = API_SRC.replace(
        "\t\"example.com/svc/somepkg\"\n",
        "\t\"example.com/svc/somepkg\"\n\t\"example.com/svc/http\"\n",
    );
    write(tree.path(), "api/api.go", &api);

    let source = generate(&tree, "example.com/svc/api.Clash");
    assert!(source.contains("\t\"net/http\"\n"));
    assert!(source.contains("\thttp2 \"example.com/svc/http\"\n"));
    assert!(source.contains("\th *http2.Route `json:\"h\"`\n"));
    assert!(source.contains("(e endpoint.Endpoint) http.Handler"));
}

#[test]
fn test_export_fields_and_custom_package() {
    let tree = service_tree();
    let config = GeneratorConfig {
        package: "transport".to_string(),
        transport_alias: "kithttp".to_string(),
        export_fields: true,
        ..GeneratorConfig::default()
    };
    let source = generator(config)
        .generate("example.com/svc/api.MyService", tree.path())
        .unwrap()
        .source;
    assert!(source.contains("\npackage transport\n"));
    assert!(source.contains("\tkithttp \"github.com/go-kit/kit/transport/http\"\n"));
    assert!(source.contains("return kithttp.NewServer("));
    assert!(source.contains("\tName string `json:\"name\"`\n"));
    assert!(source.contains("err := svc.MyFirstFunction(req.Name)"));
    assert!(source.contains("\t\t\tResult: result,\n"));
    assert!(source.contains("}(req.Opts.A)"));
}

#[test]
fn test_bare_references() {
    let tree = service_tree();
    let from_api = generator(GeneratorConfig::default())
        .generate("MyService", &tree.path().join("api"))
        .unwrap();
    assert_eq!(
        from_api.interface,
        InterfaceReference::new("example.com/svc/api", "MyService")
    );
    assert!(from_api.source.contains("\t\"example.com/svc/api\"\n"));

    let inferred = generator(GeneratorConfig::default())
        .generate("api.MyService", tree.path())
        .unwrap();
    assert_eq!(inferred.source, from_api.source);
}

#[test]
fn test_rejected_inputs() {
    let tree = service_tree();
    let gen = generator(GeneratorConfig::default());
    let err = |reference: &str| gen.generate(reference, tree.path()).unwrap_err();

    assert!(matches!(err("net/http/"), GenerateError::BadReferenceSyntax { .. }));
    assert!(matches!(err("example.com/svc/api.Plain"), GenerateError::NotAnInterface { .. }));
    assert!(matches!(err("example.com/svc/api.Empty"), GenerateError::EmptyInterface { .. }));
    assert!(matches!(err("example.com/svc/api.Nope"), GenerateError::TypeNotFound { .. }));
    assert!(matches!(err("example.com/svc/missing.Iface"), GenerateError::PackageNotFound { .. }));
    assert!(matches!(err("other.Iface"), GenerateError::InferenceFailed { .. }));
    assert_eq!(
        err("example.com/svc/api.Unnamed"),
        GenerateError::UnnamedParameter {
            method: "Do".to_string(),
            position: 0,
            result: false,
        }
    );
}

#[test]
fn test_formatter_failure_returns_raw_source() {
    let tree = service_tree();
    let raw = generate(&tree, "example.com/svc/api.MyService");
    let formatted = generator(GeneratorConfig::default())
        .with_formatter(FailingFormatter)
        .generate("example.com/svc/api.MyService", tree.path())
        .unwrap();
    assert_eq!(formatted.source, raw);
}

#[test]
fn test_resolve_imports_collects_bound_paths() {
    let tree = service_tree();
    let gen = generator(GeneratorConfig::default());
    let artifact = gen
        .build_artifact("example.com/svc/api.MyService", tree.path())
        .unwrap();
    assert_eq!(artifact.package_name, "api");
    assert_eq!(artifact.destination, "endpoints");

    let imports = resolve_imports(&artifact, gen.config());
    let paths: Vec<&str> = imports.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "context",
            "encoding/json",
            "net/http",
            "github.com/go-kit/kit/endpoint",
            "github.com/go-kit/kit/transport/http",
            "example.com/svc/api",
            "example.com/svc/somepkg",
            "example.com/svc/model",
        ]
    );
}

#[test]
fn test_template_data() {
    let tree = service_tree();
    let gen = generator(GeneratorConfig::default());
    let artifact = gen
        .build_artifact("example.com/svc/api.MyService", tree.path())
        .unwrap();
    let imports = resolve_imports(&artifact, gen.config());
    let data = template_data(&artifact, &imports, gen.config());

    assert_eq!(data.service, "api.MyService");
    assert_eq!(data.transport_pkg, "httptransport");
    let first = &data.methods[0];
    assert!(first.takes_request);
    assert_eq!(first.error_return, "err");
    assert!(first.response_fields.is_empty());

    let count = &data.methods[3];
    assert!(!count.takes_request);
    assert_eq!(count.call, "n := svc.Count()");
    assert_eq!(count.error_return, "nil");
}

#[test]
fn test_struct_field_name() {
    assert_eq!(struct_field_name("name", false), "name");
    assert_eq!(struct_field_name("name", true), "Name");
    assert_eq!(struct_field_name("ünit", true), "Ünit");
    assert_eq!(struct_field_name("", true), "");
}
