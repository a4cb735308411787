//! Walks a directory tree for `.mx`/`.x`/`.go` files, translates each
//! one, and stages the emitted `.go` tree (plus a `go.mod`) in a scratch
//! directory the host `go` toolchain can build directly. One `moxie.toml`
//! governs every file under `root`: a single config per project.

use anyhow::{Context, Result};
use moxie_core::config::Compiled;
use moxie_core::diagnostics::Diagnostics;
use moxie_core::source_file::SourceFile;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DIALECT_EXTENSIONS: &[&str] = &["mx", "x", "go"];

#[must_use]
pub fn discover_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(std::ffi::OsStr::to_str)
                .is_some_and(|ext| DIALECT_EXTENSIONS.contains(&ext))
        })
        .collect()
}

pub struct StagedBuild {
    pub staging_dir: PathBuf,
    pub diagnostics: Diagnostics,
}

/// Translates every dialect file under `root` into `staging_dir`, mirroring
/// relative paths and swapping `.mx`/`.x` for `.go` (`SourceFile::emitted_path`).
/// Diagnostics from every file are merged into one collector; the caller
/// decides whether `diagnostics.has_errors()` should abort emission, since
/// any error present aborts emission.
pub fn stage(root: &Path, staging_dir: &Path, compiled: &Compiled) -> Result<StagedBuild> {
    fs::create_dir_all(staging_dir)
        .with_context(|| format!("failed to create {}", staging_dir.display()))?;

    let mut diagnostics = Diagnostics::new();
    let files = discover_files(root);
    for path in files {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let source = SourceFile::new(path.clone(), contents);
        let translation = moxie_core::translate(source, compiled);

        let relative = path.strip_prefix(root).unwrap_or(&path);
        let dest = staging_dir.join(relative).with_extension("go");
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        if !translation.has_errors() {
            fs::write(&dest, &translation.source)
                .with_context(|| format!("failed to write {}", dest.display()))?;
        }
        diagnostics.extend(translation.diagnostics);
    }

    stage_module_manifest(root, staging_dir, compiled)?;

    Ok(StagedBuild {
        staging_dir: staging_dir.to_path_buf(),
        diagnostics,
    })
}

/// Copies `go.mod` verbatim if the input tree has one; otherwise generates
/// a minimal manifest naming the synthetic module the runtime import path
/// is rooted under.
fn stage_module_manifest(root: &Path, staging_dir: &Path, compiled: &Compiled) -> Result<()> {
    let existing = root.join("go.mod");
    let dest = staging_dir.join("go.mod");
    if existing.is_file() {
        fs::copy(&existing, &dest)
            .with_context(|| format!("failed to copy {}", existing.display()))?;
        return Ok(());
    }
    let module = synthetic_module_name(compiled.runtime_import_path());
    fs::write(&dest, format!("module {module}\n\ngo 1.21\n"))
        .with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}

fn synthetic_module_name(runtime_import_path: &str) -> &str {
    runtime_import_path
        .split('/')
        .next()
        .unwrap_or(runtime_import_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moxie_core::config::Toml;

    #[test]
    fn discovers_dialect_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mx"), "package p\n").unwrap();
        fs::write(dir.path().join("b.x"), "package p\n").unwrap();
        fs::write(dir.path().join("c.go"), "package p\n").unwrap();
        fs::write(dir.path().join("readme.md"), "ignored").unwrap();
        let mut files = discover_files(dir.path());
        files.sort();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn stage_writes_translated_go_and_generated_manifest() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("main.mx"), "package main\n\nfunc main() {\n}\n").unwrap();
        let out = tempfile::tempdir().unwrap();
        let compiled = Toml::default().compile().unwrap();
        let staged = stage(src.path(), out.path(), &compiled).unwrap();
        assert!(!staged.diagnostics.has_errors());
        assert!(out.path().join("main.go").is_file());
        let manifest = fs::read_to_string(out.path().join("go.mod")).unwrap();
        assert!(manifest.starts_with("module moxie-module\n"));
    }

    #[test]
    fn existing_go_mod_is_copied_verbatim() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("go.mod"), "module example.com/foo\n\ngo 1.20\n").unwrap();
        fs::write(src.path().join("main.mx"), "package main\n\nfunc main() {\n}\n").unwrap();
        let out = tempfile::tempdir().unwrap();
        let compiled = Toml::default().compile().unwrap();
        stage(src.path(), out.path(), &compiled).unwrap();
        let manifest = fs::read_to_string(out.path().join("go.mod")).unwrap();
        assert_eq!(manifest, "module example.com/foo\n\ngo 1.20\n");
    }
}
