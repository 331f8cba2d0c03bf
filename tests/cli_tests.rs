#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::go_tree::GoTree;
use common::stub_tools::write_script;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Run the binary against `tree` with a stub gofmt and no ambient Go setup.
fn kitboiler(tree: &GoTree, gofmt: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_kitboiler");
    Command::new(exe)
        .current_dir(tree.module_dir())
        .env("KITBOILER_GOFMT_BIN", gofmt)
        .env("KITBOILER_GOIMPORTS_BIN", "/nonexistent/goimports")
        .env("GOMODCACHE", tree.mod_cache())
        .env("GOOS", "linux")
        .env("GOARCH", "amd64")
        .env_remove("GOFLAGS")
        .env_remove("KITBOILER_LOG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run kitboiler")
}

fn identity_gofmt(tree: &GoTree) -> std::path::PathBuf {
    write_script(tree.root(), "gofmt", "cat")
}

#[test]
fn test_cli_writes_artifact_to_stdout() {
    let tree = GoTree::service();
    let gofmt = identity_gofmt(&tree);
    let output = kitboiler(&tree, &gofmt, &["example.com/svc/api.MyService"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(
        "// Code generated by kitboiler from example.com/svc/api.MyService. DO NOT EDIT.\n"
    ));
    assert!(stdout.contains("\npackage endpoints\n"));
    assert!(stdout.contains("func MyFirstFunctionEndPoint(svc api.MyService) endpoint.Endpoint {"));
    assert!(stdout.contains("func DecodeAuditRequest("));
}

#[test]
fn test_cli_pkg_and_dir_options() {
    let tree = GoTree::service();
    let gofmt = identity_gofmt(&tree);
    let api_dir = tree.module_dir().join("api");
    let output = kitboiler(
        &tree,
        &gofmt,
        &["--pkg", "transport", "--dir", api_dir.to_str().unwrap(), "MyService"],
    );
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\npackage transport\n"));
    assert!(stdout.contains("\t\"example.com/svc/api\"\n"));
}

#[test]
fn test_cli_reads_config_file() {
    let tree = GoTree::service();
    let gofmt = identity_gofmt(&tree);
    tree.write(
        "svc/kitboiler.toml",
        "package = \"handlers\"\ntransport_alias = \"kithttp\"\nexport_fields = true\n",
    );
    let output = kitboiler(&tree, &gofmt, &["example.com/svc/api.MyService"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\npackage handlers\n"));
    assert!(stdout.contains("\tkithttp \"github.com/go-kit/kit/transport/http\"\n"));
    assert!(stdout.contains("\tName string `json:\"name\"`\n"));

    let other = tree.root().join("other.toml");
    fs::write(&other, "package = \"other\"\n").unwrap();
    let output = kitboiler(
        &tree,
        &gofmt,
        &["--config", other.to_str().unwrap(), "example.com/svc/api.MyService"],
    );
    assert!(String::from_utf8(output.stdout).unwrap().contains("\npackage other\n"));
}

#[test]
fn test_cli_formatter_failure_still_succeeds() {
    let tree = GoTree::service();
    let gofmt = write_script(tree.root(), "gofmt", "cat >/dev/null\necho 'expected declaration' >&2\nexit 2");
    let output = kitboiler(&tree, &gofmt, &["example.com/svc/api.MyService"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8(output.stdout)
        .unwrap()
        .starts_with("// Code generated by kitboiler"));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("formatting failed"), "{stderr}");
}

#[test]
fn test_cli_missing_interface_prints_usage() {
    let tree = GoTree::new();
    let gofmt = identity_gofmt(&tree);
    let output = kitboiler(&tree, &gofmt, &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Usage: kitboiler [OPTIONS] <INTERFACE>"));
    assert!(stderr.contains("must be named"));
}

#[test]
fn test_cli_generation_errors_exit_one() {
    let tree = GoTree::service();
    let gofmt = identity_gofmt(&tree);

    let cases = [
        ("net/http/", "cannot end with '/'"),
        ("example.com/svc/api.NotAService", "not an interface"),
        ("example.com/svc/nothere.Service", "cannot find package"),
        ("api.MyService", "goimports"),
    ];
    for (reference, expected) in cases {
        let output = kitboiler(&tree, &gofmt, &[reference]);
        assert_eq!(output.status.code(), Some(1), "{reference}");
        assert!(output.stdout.is_empty(), "{reference}");
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(
            stderr.starts_with(&format!("kitboiler: cannot generate endpoints for {reference}: ")),
            "{stderr}"
        );
        assert!(stderr.contains(expected), "{reference}: {stderr}");
        assert_eq!(stderr.trim_end().lines().count(), 1, "{stderr}");
    }
}
