//! The diagnostic sink.
//!
//! A translation unit is a single, synchronous, non-interactive call, so
//! the sink is a plain accumulator rather than a rate-limited console
//! printer with per-warning "emitted once" state: `--allow`/`--deny`
//! enforcement lives in `Compiled` (`crate::config`) and runs before a
//! diagnostic is even pushed. The category enum keeps a `#[remain::sorted]`,
//! kebab-case `Display` convention.

use crate::position::Position;
use heck::ToKebabCase;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[non_exhaustive]
#[remain::sorted]
pub enum Category {
    All,
    BareChannelLiteral,
    BareMake,
    CoerceUnknownSourceType,
    ConcatUnknownElementType,
    ConstMutation,
    MissingCloneFreeArgument,
    StringDispatchHeuristic,
    SyntaxError,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{self:?}").to_kebab_case())
    }
}

/// Parses the kebab-case `Display` form back into a `Category`, so
/// `moxie.toml`'s `allow`/`deny` lists and the CLI's `--allow`/`--deny`
/// flags can name a category by the same string the diagnostic output
/// prints it as.
impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: &[Category] = &[
            Category::All,
            Category::BareChannelLiteral,
            Category::BareMake,
            Category::CoerceUnknownSourceType,
            Category::ConcatUnknownElementType,
            Category::ConstMutation,
            Category::MissingCloneFreeArgument,
            Category::StringDispatchHeuristic,
            Category::SyntaxError,
        ];
        ALL.iter()
            .find(|c| c.to_string() == s)
            .copied()
            .ok_or_else(|| format!("unknown diagnostic category: {s}"))
    }
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub position: Position,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        position: Position,
        severity: Severity,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self {
            position,
            severity,
            category,
            message: message.into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: [{}] {}",
            self.position, self.severity, self.category, self.message
        )?;
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

/// Collects every diagnostic a pass produces; the pipeline is fail-soft:
/// one subtree's error never aborts another's traversal.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("diagnostic: {diagnostic}");
        self.entries.push(diagnostic);
    }

    #[must_use]
    pub fn all(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// The first collected error: top-level entry points return the first
    /// error so callers can still choose to emit.
    #[must_use]
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.entries
            .iter()
            .find(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut errors = 0;
        let mut warnings = 0;
        let mut infos = 0;
        for d in &self.entries {
            match d.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                Severity::Info => infos += 1,
            }
        }
        (errors, warnings, infos)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Applies `moxie.toml`'s `allow`/`deny` lists (`crate::config::Compiled`)
    /// after a pass has run: an allowed category is dropped outright, a
    /// denied one is promoted to `Severity::Error` regardless of the
    /// severity the pass pushed it with.
    pub fn apply_config(&mut self, compiled: &crate::config::Compiled) {
        self.entries.retain(|d| !compiled.is_allowed_silent(d.category));
        for d in &mut self.entries {
            if compiled.is_denied(d.category) {
                d.severity = Severity::Error;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_kebab_case() {
        assert_eq!("bare-make", Category::BareMake.to_string());
        assert_eq!("const-mutation", Category::ConstMutation.to_string());
    }

    #[test]
    fn category_from_str_round_trips_display() {
        use std::str::FromStr;
        assert_eq!(Category::from_str("bare-make").unwrap(), Category::BareMake);
        assert_eq!(Category::from_str("all").unwrap(), Category::All);
        assert!(Category::from_str("not-a-category").is_err());
    }

    #[test]
    fn first_error_skips_warnings() {
        let file = crate::source_file::SourceFile::new(
            std::path::PathBuf::from("x.mx"),
            String::new(),
        );
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(
            Position::start_of(file.clone()),
            Severity::Warning,
            Category::StringDispatchHeuristic,
            "heuristic guess",
        ));
        assert!(diags.first_error().is_none());
        diags.push(Diagnostic::new(
            Position::start_of(file),
            Severity::Error,
            Category::BareMake,
            "make used for non-channel type",
        ));
        assert!(diags.first_error().is_some());
        assert_eq!((1, 1, 0), diags.counts());
    }

    #[test]
    fn allow_drops_and_deny_promotes() {
        let file = crate::source_file::SourceFile::new(
            std::path::PathBuf::from("x.mx"),
            String::new(),
        );
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(
            Position::start_of(file.clone()),
            Severity::Info,
            Category::CoerceUnknownSourceType,
            "silenced",
        ));
        diags.push(Diagnostic::new(
            Position::start_of(file),
            Severity::Warning,
            Category::StringDispatchHeuristic,
            "promoted",
        ));
        let mut toml = crate::config::Toml::default();
        toml.allow = vec!["coerce-unknown-source-type".to_string()];
        toml.deny = vec!["string-dispatch-heuristic".to_string()];
        let compiled = toml.compile().unwrap();
        diags.apply_config(&compiled);
        assert_eq!(diags.all().len(), 1);
        assert_eq!(diags.all()[0].severity, Severity::Error);
    }
}
