#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]

//! `moxie-core`: the AST translation pipeline — parse a Moxie (`.mx`)
//! source file, run it through the rewrite engine, and emit plain Go.
//! [`translate`] is the single public entry point the `moxie` CLI drives;
//! everything upstream of it is exposed as its own module so each stage
//! can also be exercised in isolation.

pub mod ast;
pub mod config;
pub mod const_check;
pub mod diagnostics;
pub mod emit;
pub mod import_rewrite;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod position;
pub mod registries;
mod rename;
pub mod rewrite;
pub mod source_file;
pub mod type_tracker;

use config::Compiled;
use diagnostics::Diagnostics;
use source_file::SourceFile;

/// The result of translating one file: the emitted Go source plus every
/// diagnostic collected along the way (the full list is always available
/// even when only the first error is surfaced).
#[derive(Debug)]
pub struct Translation {
    pub source: String,
    pub diagnostics: Diagnostics,
}

impl Translation {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Runs the full pipeline over one file:
///
/// 1. `parser::parse` builds the syntax tree and collects syntax
///    diagnostics.
/// 2. `const_check::check` flags mutated `const`s against the
///    *original* tree, before any rewrite has a chance to obscure them.
/// 3. `rename::apply` (the identifier-case translate-name mode), only when
///    `config.translate_names()` is set.
/// 4. `rewrite::rewrite` drives the name registries and the type tracker
///    through a fixed-point loop bounded by `config.max_rewrite_passes()`.
/// 5. `import_rewrite::rewrite` fixes up import paths and appends whatever
///    `bytes`/runtime imports the rewrite `Outcome` says got used.
/// 6. `emit::emit` prints the result.
///
/// `moxie.toml`'s `allow`/`deny` lists are applied once, after every pass
/// has had a chance to push its diagnostics, so a category denied in
/// config is promoted to an error no matter which pass raised it.
#[must_use]
pub fn translate(file: SourceFile, compiled: &Compiled) -> Translation {
    let (mut tree, mut diagnostics) = parser::parse(file);

    const_check::check(&tree, &mut diagnostics);

    if compiled.translate_names() {
        rename::apply(&mut tree);
    }

    let outcome = rewrite::rewrite(&mut tree, &mut diagnostics, compiled.max_rewrite_passes());
    import_rewrite::rewrite(&mut tree, outcome, compiled.runtime_import_path());

    diagnostics.apply_config(compiled);

    let source = emit::emit(&tree);
    Translation { source, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate_default(src: &str) -> Translation {
        let file = SourceFile::new(std::path::PathBuf::from("t.mx"), src.to_string());
        let compiled = config::Toml::default().compile().unwrap();
        translate(file, &compiled)
    }

    #[test]
    fn simple_file_translates_without_errors() {
        let t = translate_default("package main\n\nfunc main() {\n}\n");
        assert!(!t.has_errors());
        assert_eq!(t.source, "package main\n\nfunc main() {\n}\n");
    }

    #[test]
    fn const_mutation_is_reported_as_error() {
        let t = translate_default(
            "package p\nconst limit int = 10\nfunc f() {\n\tlimit = 20\n}\n",
        );
        assert!(t.has_errors());
        assert_eq!(
            t.diagnostics.first_error().unwrap().category,
            diagnostics::Category::ConstMutation
        );
    }

    #[test]
    fn denied_category_is_promoted_to_error() {
        let mut toml = config::Toml::default();
        toml.deny = vec!["concat-unknown-element-type".to_string()];
        let compiled = toml.compile().unwrap();
        let file = SourceFile::new(
            std::path::PathBuf::from("t.mx"),
            "package p\nfunc f(p *int, q *int) {\n\t_ = *p + *q\n}\n".to_string(),
        );
        let t = translate(file, &compiled);
        assert!(t.has_errors());
    }
}
