//! # kitboiler
//!
//! **kitboiler** generates [Go kit](https://github.com/go-kit/kit) endpoint
//! boilerplate from a Go service interface.
//!
//! ## Overview
//!
//! Given `example.com/svc/api.MyService`, kitboiler finds the interface in
//! the Go source tree, flattens its method set (including embedded
//! interfaces from other packages), qualifies every type with its package,
//! and renders for each method:
//!
//! - `<M>Request` / `<M>Response` structs with JSON tags
//! - `<M>EndPoint(svc)` adapting the method to an `endpoint.Endpoint`
//! - `<M>HTTPJSONHandler(e)` built on `httptransport.NewServer`
//! - `Decode<M>Request` decoding the JSON request body
//!
//! plus one shared `EncodeResponse`.
//!
//! ## Architecture
//!
//! - **[`syntax`]** - Go lexer, parser and type printer for declarations
//! - **[`package`]** - package location (go.mod, vendor, GOPATH, module
//!   cache), build constraints and the parsed-package cache
//! - **[`reference`]** - `import/path.Iface` parsing and import inference
//! - **[`signature`]** - interface flattening, type qualification and
//!   functional-options expansion
//! - **[`generator`]** - import resolution, template rendering, formatting
//! - **[`config`]** - `kitboiler.toml` and the Go environment
//! - **[`logging`]** - tracing subscriber setup
//! - **[`cli`]** - the `kitboiler` command line
//!
//! ```text
//! CLI → reference → Extractor (Qualifier, options) → ImportSet → template → gofmt → stdout
//! ```
//!
//! ## Example
//!
//! ```go
//! package api
//!
//! type MyService interface {
//!     MyFirstFunction(name string) (err error)
//!     MySecondQuery() (result *somepkg.FooBar, err error)
//! }
//! ```
//!
//! ```bash
//! kitboiler example.com/svc/api.MyService > endpoints/endpoints.go
//! ```
//!
//! Every parameter and result must be named: the names become request and
//! response fields.

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod package;
pub mod reference;
pub mod signature;
pub mod syntax;
mod tool;

pub use config::GeneratorConfig;
pub use error::{GenerateError, GenerateResult};
pub use generator::{GeneratedArtifact, Generator};
pub use reference::InterfaceReference;
