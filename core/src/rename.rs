//! The identifier-case half of translate-name mode, off by default
//! (`crate::config::Compiled::translate_names`).
//!
//! Scope: top-level `const`/`var`/`type`/`func` declaration names, function
//! parameters/results, and the bare `Ident` expressions that reference them.
//! `Selector` targets (`pkg.Name`, `x.Field`) are left untouched — a
//! selector's right-hand name is either a package member this translation
//! unit doesn't own or a struct field, and renaming either without full
//! type information risks producing a name that doesn't resolve. Since
//! `registries::translate_name` is a pure function of the name text and its
//! exported-ness, applying it to every declaration site and every bare
//! reference is consistent without needing scope resolution: the same input
//! name always maps to the same output name.

use crate::ast::{Decl, DeclKind, Expr, ExprKind, Field, MutVisitor};
use crate::registries::translate_name;

pub fn apply(file: &mut crate::ast::File) {
    let mut renamer = Renamer;
    renamer.visit_file(file);
}

fn rename(name: &mut String) {
    if name == "_" {
        return;
    }
    let exported = name.chars().next().is_some_and(char::is_uppercase);
    *name = translate_name(name, exported);
}

fn rename_field(field: &mut Field) {
    for name in &mut field.names {
        rename(name);
    }
}

struct Renamer;

impl MutVisitor for Renamer {
    fn visit_decl(&mut self, decl: &mut Decl) {
        match &mut decl.kind {
            DeclKind::Const(specs) => {
                for spec in specs {
                    for name in &mut spec.names {
                        rename(name);
                    }
                }
            }
            DeclKind::Var(specs) => {
                for spec in specs {
                    for name in &mut spec.names {
                        rename(name);
                    }
                }
            }
            DeclKind::Type(specs) => {
                for spec in specs {
                    rename(&mut spec.name);
                }
            }
            DeclKind::Func(func) => {
                if func.receiver.is_none() {
                    rename(&mut func.name);
                }
                for param in &mut func.type_params {
                    rename_field(param);
                }
                for param in &mut func.signature.params {
                    rename_field(param);
                }
                for result in &mut func.signature.results {
                    rename_field(result);
                }
            }
        }
        crate::ast::cursor::walk_decl(self, decl);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        if let ExprKind::Ident(name) = &mut expr.kind {
            rename(name);
        }
        crate::ast::cursor::walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::SourceFile;

    fn parse(src: &str) -> crate::ast::File {
        let file = SourceFile::new(std::path::PathBuf::from("t.mx"), src.to_string());
        crate::parser::parse(file).0
    }

    #[test]
    fn snake_case_func_becomes_camel_case() {
        let mut file = parse("package p\nfunc do_thing() {\n\tdo_thing()\n}\n");
        apply(&mut file);
        let DeclKind::Func(func) = &file.decls[0].kind else {
            panic!("expected func");
        };
        assert_eq!(func.name, "doThing");
    }

    #[test]
    fn exported_snake_case_name_becomes_pascal_case() {
        let mut file = parse("package p\nfunc Do_Thing() {\n}\n");
        apply(&mut file);
        let DeclKind::Func(func) = &file.decls[0].kind else {
            panic!("expected func");
        };
        assert_eq!(func.name, "DoThing");
    }

    #[test]
    fn selector_member_is_left_untouched() {
        let mut file = parse("package p\nimport \"fmt\"\nfunc f() {\n\tfmt.Println(1)\n}\n");
        apply(&mut file);
        let DeclKind::Func(func) = &file.decls[0].kind else {
            panic!("expected func");
        };
        let body = func.body.as_ref().unwrap();
        let crate::ast::StmtKind::Expr(call) = &body.stmts[0].kind else {
            panic!("expected expr stmt");
        };
        let ExprKind::Call { func: callee, .. } = &call.kind else {
            panic!("expected call");
        };
        let ExprKind::Selector { name, .. } = &callee.kind else {
            panic!("expected selector");
        };
        assert_eq!(name, "Println");
    }

    #[test]
    fn blank_identifier_is_never_renamed() {
        let mut file = parse("package p\nfunc f() {\n\t_ = 1\n}\n");
        apply(&mut file);
        let DeclKind::Func(func) = &file.decls[0].kind else {
            panic!("expected func");
        };
        let body = func.body.as_ref().unwrap();
        let crate::ast::StmtKind::Assign { lhs, .. } = &body.stmts[0].kind else {
            panic!("expected assign");
        };
        assert!(matches!(&lhs[0].kind, ExprKind::Ident(name) if name == "_"));
    }
}
