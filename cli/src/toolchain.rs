//! Invokes the host Go toolchain over a staged tree. Plain
//! `std::process::Command` rather than the `subprocess` crate: a
//! toolchain invocation here is exactly fire-and-collect-the-exit-code,
//! nothing more.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

pub fn build(staging_dir: &Path, output: Option<&Path>) -> Result<i32> {
    let mut command = Command::new("go");
    command.current_dir(staging_dir).arg("build");
    if let Some(output) = output {
        command.arg("-o").arg(output);
    }
    run(command)
}

pub fn run_binary(staging_dir: &Path, file: &Path) -> Result<i32> {
    let mut command = Command::new("go");
    command.current_dir(staging_dir).arg("run").arg(file);
    run(command)
}

pub fn test(staging_dir: &Path) -> Result<i32> {
    let mut command = Command::new("go");
    command.current_dir(staging_dir).arg("test").arg("./...");
    run(command)
}

pub fn install(staging_dir: &Path) -> Result<i32> {
    let mut command = Command::new("go");
    command.current_dir(staging_dir).arg("install").arg("./...");
    run(command)
}

fn run(mut command: Command) -> Result<i32> {
    log::debug!("running {command:?}");
    let status = command
        .status()
        .with_context(|| format!("failed to spawn {command:?}"))?;
    Ok(status.code().unwrap_or(1))
}
