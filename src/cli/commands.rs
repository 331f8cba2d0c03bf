use anyhow::{bail, Context};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::config::{load_config, GeneratorConfig, DEFAULT_CONFIG_FILE};
use crate::generator::Generator;

/// Printed when the interface reference is missing.
pub const USAGE: &str = "\
Usage: kitboiler [OPTIONS] <INTERFACE>

Generates Go kit endpoints, request/response types, request decoders and
HTTP handlers for every method of a Go interface.

Example:

  Given this interface in package example.com/svc/api:

    type MyService interface {
        MyFirstFunction(name string) (err error)
        MyFirstQuery(ctx context.Context, limit, offset int) (results []*QueryResult, err error)
    }

  run

    kitboiler example.com/svc/api.MyService > endpoints/endpoints.go

  A bare name such as MyService refers to the package in --dir, and
  api.MyService is resolved with goimports.

NOTE: every parameter and result of every method must be named, since the
names become request and response fields.

Run `kitboiler --help` for all options.";

/// Command-line interface for kitboiler
#[derive(Parser, Debug, Clone)]
#[command(name = "kitboiler", version)]
#[command(about = "Generate Go kit endpoints from a Go interface", long_about = None)]
pub struct Cli {
    /// Interface to generate endpoints for: `import/path.Iface`, `pkg.Iface` or `Iface`
    #[arg(value_name = "INTERFACE")]
    pub interface: String,

    /// Package clause of the generated file
    #[arg(long = "pkg", value_name = "NAME")]
    pub package: Option<String>,

    /// Directory the interface reference is resolved from
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub dir: PathBuf,

    /// Generator configuration file
    /// If not provided, kitboiler.toml in --dir is used when present
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Configuration file settings with command-line overrides applied.
pub fn effective_config(cli: &Cli) -> anyhow::Result<GeneratorConfig> {
    let path = match &cli.config {
        Some(path) if !path.exists() => bail!("config file not found: {}", path.display()),
        Some(path) => path.clone(),
        None => cli.dir.join(DEFAULT_CONFIG_FILE),
    };
    let mut config = load_config(&path)?.unwrap_or_default();
    if let Some(package) = &cli.package {
        config.package = package.clone();
    }
    if config.package.is_empty() {
        bail!("destination package name cannot be empty");
    }
    debug!(config = %path.display(), package = %config.package, "resolved generator config");
    Ok(config)
}

/// Generate the endpoints file for `cli.interface` into `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = effective_config(cli)?;
    let artifact = Generator::new(config)
        .generate(&cli.interface, &cli.dir)
        .with_context(|| format!("cannot generate endpoints for {}", cli.interface))?;
    out.write_all(artifact.source.as_bytes())
        .context("failed to write generated source")?;
    out.flush().context("failed to write generated source")
}
