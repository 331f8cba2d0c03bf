#![allow(dead_code)]

pub mod go_tree {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    pub const MODULE: &str = "example.com/svc";

    pub const API_SRC: &str = r#"package api

import (
	"context"

	"github.com/Acme/audit"

	"example.com/svc/options"
	"example.com/svc/somepkg"
)

// MyService is served over HTTP.
type MyService interface {
	MyFirstFunction(name string) (err error)
	MySecondQuery() (result *somepkg.FooBar, err error)
	List(ctx context.Context, prefix string, opts ...options.ListOptionsSetter) (names []string, total int, err error)
	audit.Auditor
}

type NotAService struct {
	Name string
}
"#;

    pub const OPTIONS_SRC: &str = r#"package options

import "time"

type ListOptions struct {
	Limit, Offset int
	Since         time.Time
}

type ListOptionsSetter func(*ListOptions)

func WithLimit(n int) ListOptionsSetter {
	return func(o *ListOptions) { o.Limit = n }
}
"#;

    pub const AUDIT_SRC: &str = r#"package audit

type Entry struct {
	Message string
}

type Auditor interface {
	Audit(entry Entry) (id string, err error)
}
"#;

    /// A throw-away Go module plus module cache.
    pub struct GoTree {
        dir: TempDir,
    }

    impl GoTree {
        pub fn new() -> Self {
            let tree = Self {
                dir: tempfile::tempdir().unwrap(),
            };
            tree.write(
                "svc/go.mod",
                &format!("module {MODULE}\n\ngo 1.21\n\nrequire github.com/Acme/audit v1.2.0\n"),
            );
            tree
        }

        /// The module layout most tests share.
        pub fn service() -> Self {
            let tree = Self::new();
            tree.write("svc/api/api.go", API_SRC);
            tree.write("svc/api/api_windows.go", "package api\n\ntype Windows interface{ W() (err error) }\n");
            tree.write("svc/api/api_test.go", "package api_test\n");
            tree.write("svc/options/options.go", OPTIONS_SRC);
            tree.write("svc/somepkg/foo.go", "package somepkg\n\ntype FooBar struct{}\n");
            tree.write("modcache/github.com/!acme/audit@v1.2.0/audit.go", AUDIT_SRC);
            tree
        }

        pub fn write(&self, rel: &str, contents: &str) {
            let path = self.dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        /// Root of the Go module.
        pub fn module_dir(&self) -> PathBuf {
            self.dir.path().join("svc")
        }

        pub fn mod_cache(&self) -> PathBuf {
            self.dir.path().join("modcache")
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }
    }
}

pub mod stub_tools {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Write an executable shell script.
    pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }
}
