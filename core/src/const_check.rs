//! The const-mutation checker. Runs as a read-only pass over the tree
//! *before* the rewrite engine touches it, using a two-phase idiom:
//! collect a set, then check against it while walking.

use crate::ast::{AssignOp, Block, Decl, DeclKind, Expr, ExprKind, File, Stmt, StmtKind};
use crate::diagnostics::{Category, Diagnostic, Diagnostics, Severity};
use crate::position::Position;
use std::collections::HashMap;

/// Collects every `const`-declared name (with its declaration position),
/// then flags any assignment or inc/dec targeting one. Name lookup
/// resolves through `*c`, `c.f`, `c[i]`, `(c)` back to the base identifier.
/// A frozen read-only pass over the original tree, so it walks by shared
/// reference rather than through the rewrite engine's mutable cursor
/// (`crate::ast::cursor`).
pub fn check(file: &File, diags: &mut Diagnostics) {
    let consts = collect_consts(file);
    if consts.is_empty() {
        return;
    }
    let mut checker = Checker { consts, diags };
    for decl in &file.decls {
        checker.check_decl(decl);
    }
}

fn collect_consts(file: &File) -> HashMap<String, Position> {
    let mut consts = HashMap::new();
    for decl in &file.decls {
        if let crate::ast::DeclKind::Const(specs) = &decl.kind {
            for spec in specs {
                for name in &spec.names {
                    if name != "_" {
                        consts.insert(name.clone(), spec.pos.clone());
                    }
                }
            }
        }
    }
    consts
}

/// Strips `*x`, `x.f`, `x[i]`, `(x)` wrappers to find the identifier an
/// assignment target ultimately names.
fn base_ident(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Ident(name) => Some(name),
        ExprKind::Unary {
            op: crate::ast::UnaryOp::Deref,
            operand,
        } => base_ident(operand),
        ExprKind::Selector { x, .. } => base_ident(x),
        ExprKind::Index { x, .. } => base_ident(x),
        ExprKind::Paren(x) => base_ident(x),
        _ => None,
    }
}

struct Checker<'a> {
    consts: HashMap<String, Position>,
    diags: &'a mut Diagnostics,
}

impl Checker<'_> {
    fn flag(&mut self, pos: &Position, name: &str) {
        if let Some(decl_pos) = self.consts.get(name) {
            self.diags.push(Diagnostic::new(
                pos.clone(),
                Severity::Error,
                Category::ConstMutation,
                format!("cannot assign to const {name}"),
            ).with_help(format!("{name} declared const at {decl_pos}")));
        }
    }
}

impl Checker<'_> {
    fn check_decl(&mut self, decl: &Decl) {
        if let DeclKind::Func(func) = &decl.kind {
            if let Some(body) = &func.body {
                self.check_block(body);
            }
        }
    }

    fn check_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { tok, lhs, .. } if *tok != AssignOp::Define => {
                for l in lhs {
                    if let Some(name) = base_ident(l) {
                        self.flag(&l.pos, name);
                    }
                }
            }
            StmtKind::IncDec { expr, .. } => {
                if let Some(name) = base_ident(expr) {
                    self.flag(&expr.pos, name);
                }
            }
            StmtKind::Block(b) => self.check_block(b),
            StmtKind::If { init, body, else_, .. } => {
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                self.check_block(body);
                if let Some(else_) = else_ {
                    self.check_stmt(else_);
                }
            }
            StmtKind::For { init, post, body, .. } => {
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                if let Some(post) = post {
                    self.check_stmt(post);
                }
                self.check_block(body);
            }
            StmtKind::Range { body, .. } => self.check_block(body),
            StmtKind::Switch { init, cases, .. } => {
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                for case in cases {
                    for s in &case.body {
                        self.check_stmt(s);
                    }
                }
            }
            StmtKind::TypeSwitch { init, cases, .. } => {
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                for (_, body, _) in cases {
                    for s in body {
                        self.check_stmt(s);
                    }
                }
            }
            StmtKind::Select { cases } => {
                for case in cases {
                    if let Some(comm) = &case.comm {
                        self.check_stmt(comm);
                    }
                    for s in &case.body {
                        self.check_stmt(s);
                    }
                }
            }
            StmtKind::Labeled { stmt, .. } => self.check_stmt(stmt),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::SourceFile;

    fn parse(src: &str) -> (File, Diagnostics) {
        let file = SourceFile::new(std::path::PathBuf::from("t.mx"), src.to_string());
        crate::parser::parse(file)
    }

    #[test]
    fn flags_simple_reassignment() {
        let (file, mut diags) = parse("package p\nconst K = 1\nfunc f() { K = 2 }\n");
        check(&file, &mut diags);
        assert!(diags
            .all()
            .iter()
            .any(|d| d.category == Category::ConstMutation && d.message.contains('K')));
    }

    #[test]
    fn flags_through_deref_and_index() {
        let (file, mut diags) = parse(
            "package p\nconst K = 1\nfunc f() { *K = 2; K[0] = 3; K++ }\n",
        );
        check(&file, &mut diags);
        let hits = diags
            .all()
            .iter()
            .filter(|d| d.category == Category::ConstMutation)
            .count();
        assert_eq!(hits, 3);
    }

    #[test]
    fn ignores_define_and_non_const() {
        let (file, mut diags) = parse("package p\nconst K = 1\nfunc f() { x := 2; x = 3 }\n");
        check(&file, &mut diags);
        assert!(!diags.all().iter().any(|d| d.category == Category::ConstMutation));
    }
}
