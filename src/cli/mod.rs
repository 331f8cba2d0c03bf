//! # CLI Module
//!
//! Command-line surface of the `kitboiler` binary.
//!
//! ```bash
//! kitboiler example.com/svc/api.MyService --pkg endpoints > endpoints/endpoints.go
//! ```
//!
//! Options:
//! - `<INTERFACE>` - `import/path.Iface`, `pkg.Iface` (goimports) or `Iface` (package in `--dir`)
//! - `--pkg <NAME>` - package clause of the output (default: config, else `endpoints`)
//! - `--dir <PATH>` - directory references are resolved from (default: `.`)
//! - `--config <FILE>` - generator configuration (default: `kitboiler.toml` in `--dir`)
//!
//! The generated source goes to stdout, diagnostics to stderr. Exit status
//! is 0 on success, 2 when the interface is missing and 1 on any other
//! failure.

mod commands;


pub use commands::{effective_config, run, Cli, USAGE};
