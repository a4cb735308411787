//! On-disk configuration: a `Toml` struct deriving
//! `serde::{Deserialize, Serialize}` with a `#[serde(flatten)] other`
//! catch-all that is rejected with `bail!` if non-empty, so an unrecognized
//! key is a hard error rather than a silently-ignored typo. A `Compiled`
//! view is built from the `Toml` once, keeping the parsed-from-disk shape
//! separate from the validated, ready-to-consult one.

use crate::diagnostics::Category;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Default, serde::Deserialize, serde::Serialize)]
pub struct Toml {
    /// Identifier-case translation mode (snake_case <-> Pascal/camelCase).
    /// Disabled by default.
    #[serde(default)]
    pub translate_names: bool,
    /// Diagnostic categories to promote to hard errors.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Diagnostic categories to silence entirely.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Overrides the default of 10 rewrite passes.
    #[serde(default)]
    pub max_rewrite_passes: Option<usize>,
    /// The canonical runtime-library import path, aliased `moxie` in
    /// emitted files.
    #[serde(default)]
    pub runtime_import_path: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, toml::Value>,
}

impl Toml {
    /// Reads `moxie.toml` from `root`, or the defaults if absent.
    pub fn read(root: &Path) -> Result<Self> {
        let path = root.join("moxie.toml");
        if !path.try_exists()? {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let toml: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if !toml.other.is_empty() {
            bail!(
                "{} contains unknown keys: {:#?}",
                path.display(),
                toml.other.keys().collect::<Vec<_>>()
            );
        }
        Ok(toml)
    }

    pub fn compile(&self) -> Result<Compiled> {
        let deny = parse_categories(&self.deny)?;
        let allow = parse_categories(&self.allow)?;
        Ok(Compiled {
            translate_names: self.translate_names,
            deny,
            allow,
            max_rewrite_passes: self.max_rewrite_passes.unwrap_or(10).clamp(1, 64),
            runtime_import_path: self
                .runtime_import_path
                .clone()
                .unwrap_or_else(|| "moxie-module/internal/runtime".to_string()),
        })
    }
}

fn parse_categories(names: &[String]) -> Result<Vec<Category>> {
    names
        .iter()
        .map(|s| Category::from_str(s).map_err(anyhow::Error::msg))
        .collect()
}

/// The compiled view the pipeline actually consults; `Category::All` in
/// `deny`/`allow` matches every category.
pub struct Compiled {
    translate_names: bool,
    deny: Vec<Category>,
    allow: Vec<Category>,
    max_rewrite_passes: usize,
    runtime_import_path: String,
}

impl Compiled {
    #[must_use]
    pub fn translate_names(&self) -> bool {
        self.translate_names
    }

    #[must_use]
    pub fn max_rewrite_passes(&self) -> usize {
        self.max_rewrite_passes
    }

    #[must_use]
    pub fn runtime_import_path(&self) -> &str {
        &self.runtime_import_path
    }

    #[must_use]
    pub fn is_denied(&self, category: Category) -> bool {
        matches(&self.deny, category)
    }

    #[must_use]
    pub fn is_allowed_silent(&self, category: Category) -> bool {
        matches(&self.allow, category)
    }
}

fn matches(list: &[Category], category: Category) -> bool {
    list.iter().any(|c| *c == Category::All || *c == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = std::env::temp_dir().join("moxie-config-test-missing");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let toml = Toml::read(&dir).unwrap();
        assert!(!toml.translate_names);
        let compiled = toml.compile().unwrap();
        assert_eq!(compiled.max_rewrite_passes(), 10);
        assert_eq!(compiled.runtime_import_path(), "moxie-module/internal/runtime");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = std::env::temp_dir().join("moxie-config-test-unknown");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("moxie.toml"), "bogus_key = 1\n").unwrap();
        assert!(Toml::read(&dir).is_err());
    }

    #[test]
    fn max_rewrite_passes_is_clamped() {
        let mut toml = Toml::default();
        toml.max_rewrite_passes = Some(1000);
        let compiled = toml.compile().unwrap();
        assert_eq!(compiled.max_rewrite_passes(), 64);
    }

    #[test]
    fn deny_all_matches_every_category() {
        let mut toml = Toml::default();
        toml.deny = vec!["all".to_string()];
        let compiled = toml.compile().unwrap();
        assert!(compiled.is_denied(Category::BareMake));
        assert!(compiled.is_denied(Category::ConstMutation));
    }
}
