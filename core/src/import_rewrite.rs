//! The import rewriter.
//!
//! Two jobs, run after the rewrite engine has finished: (1) map dialect
//! import paths rooted under the module's own `internal/`/`src/` prefixes
//! back onto their standard-Go package path (e.g. `moxie-module/internal/fmt`
//! → `fmt`); (2) append the runtime-library and `bytes` imports the rewrite
//! [`Outcome`](crate::rewrite::Outcome) says the emitted file actually
//! references, without duplicating an import that's already present under
//! the same alias/path — the runtime import is present in the output iff
//! the file's emitted Go references at least one runtime symbol.

use crate::ast::{File, ImportSpec};
use crate::position::Position;
use crate::rewrite::Outcome;

/// `moxie-module/internal/<pkg>` and `moxie-module/src/<pkg>` both rewrite
/// to the bare standard-Go package path `<pkg>`. The module-name prefix
/// itself isn't fixed, so any single path segment followed by `internal`
/// or `src` is treated as this dialect-module convention.
fn rewritten_path(path: &str) -> Option<String> {
    let mut segments = path.split('/');
    let _module = segments.next()?;
    match segments.next()? {
        "internal" | "src" => {
            let rest: Vec<&str> = segments.collect();
            if rest.is_empty() {
                None
            } else {
                Some(rest.join("/"))
            }
        }
        _ => None,
    }
}

pub fn rewrite(file: &mut File, outcome: Outcome, runtime_import_path: &str) {
    for import in &mut file.imports {
        if let Some(rewritten) = rewritten_path(&import.path) {
            import.path = rewritten;
        }
    }

    if outcome.bytes_import {
        append_if_absent(file, None, "bytes");
    }
    if outcome.runtime_import {
        append_if_absent(file, Some("moxie"), runtime_import_path);
    }
}

fn append_if_absent(file: &mut File, alias: Option<&str>, path: &str) {
    let already_present = file.imports.iter().any(|i| {
        i.path == path || (alias.is_some() && i.alias.as_deref() == alias)
    });
    if already_present {
        return;
    }
    file.imports.push(ImportSpec {
        pos: Position::start_of(file.pos.file.clone()),
        alias: alias.map(str::to_string),
        path: path.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DeclKind;
    use crate::diagnostics::Diagnostics;
    use crate::source_file::SourceFile;

    fn parse(src: &str) -> File {
        let file = SourceFile::new(std::path::PathBuf::from("t.mx"), src.to_string());
        let (file, _) = crate::parser::parse(file);
        file
    }

    #[test]
    fn internal_prefix_is_stripped() {
        let mut file = parse("package p\nimport \"moxie-module/internal/fmt\"\n");
        rewrite(&mut file, Outcome::default(), "moxie-module/internal/runtime");
        assert_eq!(file.imports[0].path, "fmt");
    }

    #[test]
    fn src_prefix_is_stripped_for_nested_path() {
        let mut file = parse("package p\nimport \"moxie-module/src/net/http\"\n");
        rewrite(&mut file, Outcome::default(), "moxie-module/internal/runtime");
        assert_eq!(file.imports[0].path, "net/http");
    }

    #[test]
    fn unrelated_import_is_untouched() {
        let mut file = parse("package p\nimport \"github.com/foo/bar\"\n");
        rewrite(&mut file, Outcome::default(), "moxie-module/internal/runtime");
        assert_eq!(file.imports[0].path, "github.com/foo/bar");
    }

    #[test]
    fn runtime_import_is_appended_once() {
        let mut diags = Diagnostics::new();
        let mut file = parse("package p\nfunc f() { a := &[]byte{'a'}; b := &[]byte{'b'}; c := a + b; _ = c }\n");
        let outcome = crate::rewrite::rewrite(&mut file, &mut diags, 10);
        rewrite(&mut file, outcome, "moxie-module/internal/runtime");
        let moxie_imports = file.imports.iter().filter(|i| i.alias.as_deref() == Some("moxie")).count();
        assert_eq!(moxie_imports, 1);
        assert!(matches!(file.decls[0].kind, DeclKind::Func(_)));
    }

    #[test]
    fn bytes_import_appended_for_comparison_lowering() {
        let mut diags = Diagnostics::new();
        let mut file = parse(
            "package p\nvar a string\nvar b string\nfunc f() bool { return a == b }\n",
        );
        let outcome = crate::rewrite::rewrite(&mut file, &mut diags, 10);
        rewrite(&mut file, outcome, "moxie-module/internal/runtime");
        assert!(file.imports.iter().any(|i| i.path == "bytes"));
    }

    #[test]
    fn existing_runtime_alias_is_not_duplicated() {
        let mut file = parse("package p\nimport moxie \"moxie-module/internal/runtime\"\n");
        rewrite(&mut file, Outcome { runtime_import: true, bytes_import: false }, "moxie-module/internal/runtime");
        assert_eq!(file.imports.len(), 1);
    }
}
