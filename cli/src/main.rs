#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moxie_core::config::Toml;
use std::path::{Path, PathBuf};

mod pipeline;
mod report;
mod toolchain;

use report::Format;

#[derive(Parser)]
#[command(name = "mx", about = "Translate and build Moxie-dialect Go")]
struct Opts {
    #[command(subcommand)]
    command: Command,

    /// Diagnostic output form.
    #[arg(long, value_enum, global = true, default_value = "human")]
    format: Format,
}

#[derive(Subcommand)]
enum Command {
    /// Translate the tree, invoke the host toolchain to produce a binary,
    /// and copy the binary back.
    Build {
        #[arg(short, long)]
        output: Option<PathBuf>,
        dir: Option<PathBuf>,
    },
    /// Translate a single file and invoke the host runner.
    Run { file: PathBuf },
    /// Translate the tree and invoke the host test runner.
    Test { dir: Option<PathBuf> },
    /// Translate the tree and invoke the host installer.
    Install { dir: Option<PathBuf> },
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    let code = match opts.command {
        Command::Build { output, dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            run_staged(&dir, opts.format, |staging_dir| {
                toolchain::build(staging_dir, output.as_deref())
            })?
        }
        Command::Run { file } => {
            let dir = file
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            run_staged(&dir, opts.format, |staging_dir| {
                let relative = file.strip_prefix(&dir).unwrap_or(&file);
                toolchain::run_binary(staging_dir, &relative.with_extension("go"))
            })?
        }
        Command::Test { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            run_staged(&dir, opts.format, |staging_dir| toolchain::test(staging_dir))?
        }
        Command::Install { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            run_staged(&dir, opts.format, |staging_dir| toolchain::install(staging_dir))?
        }
    };
    std::process::exit(code);
}

/// Translates `dir` into a scratch directory, prints diagnostics, and —
/// only if translation produced no errors (any error present aborts
/// emission and returns non-zero) — runs `invoke` against the staged tree
/// and returns its exit code.
fn run_staged(
    dir: &Path,
    format: Format,
    invoke: impl FnOnce(&Path) -> Result<i32>,
) -> Result<i32> {
    let compiled = Toml::read(dir)?.compile()?;
    let staging_dir = tempfile::Builder::new()
        .prefix("moxie-build-")
        .tempdir()
        .context("failed to create staging directory")?;
    let staged = pipeline::stage(dir, staging_dir.path(), &compiled)?;
    report::print(&staged.diagnostics, format);
    if staged.diagnostics.has_errors() {
        return Ok(1);
    }
    invoke(&staged.staging_dir)
}
