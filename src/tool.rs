//! Running external Go tools as stdin → stdout filters.

use std::ffi::OsStr;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{bail, Context};

/// Binary named by `env_var`, or `default` when unset or empty.
pub fn tool_binary(env_var: &str, default: &str) -> String {
    std::env::var(env_var)
        .ok()
        .filter(|bin| !bin.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Feed `input` to `bin args...` and return its standard output.
///
/// A non-zero exit status is an error carrying the tool's stderr.
pub fn pipe_through<I, S>(bin: &str, args: I, input: &str, dir: Option<&Path>) -> anyhow::Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(bin);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    let mut child = cmd.spawn().with_context(|| format!("failed to run {bin}"))?;

    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_owned();
        thread::spawn(move || match stdin.write_all(input.as_bytes()) {
            Err(err) if err.kind() != ErrorKind::BrokenPipe => Err(err),
            _ => Ok(()),
        })
    });

    let output = child
        .wait_with_output()
        .with_context(|| format!("failed to wait for {bin}"))?;
    if let Some(writer) = writer {
        match writer.join() {
            Ok(result) => result.with_context(|| format!("failed to write to {bin}"))?,
            Err(_) => bail!("writer thread for {bin} panicked"),
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{bin} exited with {}: {}", output.status, stderr.trim());
    }
    String::from_utf8(output.stdout).with_context(|| format!("{bin} produced non-UTF-8 output"))
}
