//! The fixed-point rewrite engine. Drives a bounded number of passes over
//! the tree with [`crate::ast::MutVisitor`];
//! each pass re-walks the whole file, so a rewrite produced late in one
//! pass (e.g. a string literal turned into an address-of composite) can
//! feed a rewrite earlier in tree order on the next pass (e.g. that same
//! composite now participating in a concat). The loop stops the moment a
//! pass makes no change, or after `max_passes`.

mod binary;
mod calls;
mod string_lit;
mod support;
mod unary;

use crate::ast::cursor::{self, MutVisitor};
use crate::ast::{AssignOp, Decl, DeclKind, Expr, ExprKind, File, Stmt, StmtKind, TypeExpr, TypeKind, UnaryOp};
use crate::diagnostics::Diagnostics;
use crate::position::Position;
use crate::type_tracker::TypeTracker;
use std::collections::HashSet;

/// What the rewrite pipeline discovered needs importing; consumed by
/// `crate::import_rewrite`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub runtime_import: bool,
    pub bytes_import: bool,
}

pub fn rewrite(file: &mut File, diags: &mut Diagnostics, max_passes: usize) -> Outcome {
    let mut outcome = Outcome::default();
    let mut flagged = HashSet::new();
    for _ in 0..max_passes.max(1) {
        let mut engine = Engine {
            tracker: TypeTracker::new(),
            diags: &mut *diags,
            flagged: &mut flagged,
            changed: false,
            runtime_import: false,
            bytes_import: false,
        };
        engine.visit_file(file);
        outcome.runtime_import |= engine.runtime_import;
        outcome.bytes_import |= engine.bytes_import;
        if !engine.changed {
            break;
        }
    }
    outcome
}

struct Engine<'a> {
    tracker: TypeTracker,
    diags: &'a mut Diagnostics,
    flagged: &'a mut HashSet<usize>,
    changed: bool,
    runtime_import: bool,
    bytes_import: bool,
}

impl MutVisitor for Engine<'_> {
    fn visit_type(&mut self, ty: &mut TypeExpr) {
        if matches!(&ty.kind, TypeKind::Named { pkg: None, name } if name == "string") {
            ty.kind = TypeKind::ByteString;
            self.changed = true;
            return;
        }
        cursor::walk_type(self, ty);
    }

    fn visit_decl(&mut self, decl: &mut Decl) {
        match &mut decl.kind {
            DeclKind::Const(specs) => {
                for spec in specs.iter_mut() {
                    if let Some(ty) = &mut spec.ty {
                        self.visit_type(ty);
                    }
                    for value in spec.values.iter_mut() {
                        string_lit::lower_in_context(value, self.diags);
                        self.visit_expr(value);
                    }
                    let category = spec
                        .ty
                        .as_ref()
                        .map(TypeTracker::category_of_type)
                        .or_else(|| spec.values.first().map(|v| self.tracker.category_of_expr(v)));
                    if let Some(category) = category {
                        for name in &spec.names {
                            if name != "_" {
                                self.tracker.record(name.clone(), category.clone());
                            }
                        }
                    }
                }
            }
            DeclKind::Var(specs) => {
                for spec in specs.iter_mut() {
                    if let Some(ty) = &mut spec.ty {
                        self.visit_type(ty);
                    }
                    for value in spec.values.iter_mut() {
                        string_lit::lower_in_context(value, self.diags);
                        self.visit_expr(value);
                    }
                    let category = spec
                        .ty
                        .as_ref()
                        .map(TypeTracker::category_of_type)
                        .or_else(|| spec.values.first().map(|v| self.tracker.category_of_expr(v)));
                    if let Some(category) = category {
                        for name in &spec.names {
                            if name != "_" {
                                self.tracker.record(name.clone(), category.clone());
                            }
                        }
                    }
                }
            }
            DeclKind::Type(specs) => {
                for spec in specs.iter_mut() {
                    self.visit_type(&mut spec.ty);
                }
            }
            DeclKind::Func(func) => {
                self.tracker.record_func(func.name.clone(), func.signature.clone());
                cursor::walk_func_decl(self, func);
            }
        }
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Assign { tok, lhs, rhs } => {
                let n = lhs.len().min(rhs.len());
                if *tok != AssignOp::Define {
                    for i in 0..n {
                        if is_append_call(&rhs[i]) {
                            dereference_append_arg(&mut rhs[i]);
                            dereference_once(&mut lhs[i]);
                            self.changed = true;
                        }
                    }
                }
                for e in rhs.iter_mut() {
                    string_lit::lower_in_context(e, self.diags);
                }
                for e in rhs.iter_mut().chain(lhs.iter_mut()) {
                    self.visit_expr(e);
                }
                if lhs.len() == rhs.len() {
                    for i in 0..n {
                        if let ExprKind::Ident(name) = &lhs[i].kind {
                            let category = self.tracker.category_of_expr(&rhs[i]);
                            self.tracker.record(name.clone(), category);
                        }
                    }
                }
            }
            StmtKind::Return(exprs) => {
                for e in exprs.iter_mut() {
                    string_lit::lower_in_context(e, self.diags);
                    self.visit_expr(e);
                }
            }
            StmtKind::Expr(e) => {
                string_lit::lower_call_args(e, self.diags);
                self.visit_expr(e);
            }
            StmtKind::Defer(call) | StmtKind::Go(call) => {
                string_lit::lower_call_args(call, self.diags);
                self.visit_expr(call);
            }
            StmtKind::Decl(decl) => self.visit_decl(decl),
            _ => cursor::walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        if let ExprKind::Ident(name) = &expr.kind {
            if let Some(kind) = lower_runtime_ident(&expr.pos, name) {
                expr.kind = kind;
                self.runtime_import = true;
                self.changed = true;
                return;
            }
        }
        if let ExprKind::Binary { op, left, right } = &expr.kind {
            if let Some(result) = binary::try_rewrite(&self.tracker, self.diags, *op, left, right) {
                expr.kind = result.kind;
                self.runtime_import |= result.runtime_import;
                self.bytes_import |= result.bytes_import;
                self.changed = true;
                cursor::walk_expr(self, expr);
                return;
            }
        }
        if let ExprKind::Call {
            func,
            args,
            ellipsis,
            type_args,
        } = &expr.kind
        {
            let pos = expr.pos.clone();
            if let Some(result) =
                calls::try_rewrite(&self.tracker, self.diags, self.flagged, &pos, func, args, *ellipsis, type_args)
            {
                expr.kind = result.kind;
                self.runtime_import |= result.runtime_import;
                self.changed = true;
                cursor::walk_expr(self, expr);
                return;
            }
        }
        if matches!(&expr.kind, ExprKind::Unary { op: UnaryOp::Addr, .. }) {
            if let Some(new_expr) = unary::try_rewrite(expr) {
                *expr = new_expr;
                self.changed = true;
                cursor::walk_expr(self, expr);
                return;
            }
        }
        // `*[]rune(s)` parses as `Unary{Deref, operand: Call{func: Type([]rune), args:[s]}}`
        // (the `*` is ordinary pointer-deref syntax here, not part of the cast). Strip the
        // `Deref` along with lowering the inner call, so both `[]rune(s)` and `*[]rune(s)`
        // collapse to the same `moxie.StringToRunes(s)`, per spec.
        if let ExprKind::Unary {
            op: UnaryOp::Deref,
            operand,
        } = &expr.kind
        {
            if let ExprKind::Call {
                func,
                args,
                ellipsis: false,
                type_args,
            } = &operand.kind
            {
                if args.len() == 1 && matches!(&func.kind, ExprKind::Type(ty) if calls::is_rune_slice(ty)) {
                    let pos = expr.pos.clone();
                    let src = args[0].clone();
                    let _ = type_args;
                    expr.kind = support::call_expr(support::moxie_selector(&pos, "StringToRunes"), vec![src], vec![]);
                    self.runtime_import = true;
                    self.changed = true;
                    cursor::walk_expr(self, expr);
                    return;
                }
            }
        }
        if let ExprKind::Binary { left, right, .. } = &mut expr.kind {
            string_lit::lower_in_context(left, self.diags);
            string_lit::lower_in_context(right, self.diags);
        }
        cursor::walk_expr(self, expr);
    }
}

fn lower_runtime_ident(pos: &Position, name: &str) -> Option<ExprKind> {
    const RTLD: [&str; 4] = ["RTLD_LAZY", "RTLD_NOW", "RTLD_GLOBAL", "RTLD_LOCAL"];
    const ENDIAN: [&str; 3] = ["NativeEndian", "LittleEndian", "BigEndian"];
    if RTLD.contains(&name) || ENDIAN.contains(&name) {
        return Some(support::moxie_selector(pos, name).kind);
    }
    None
}

fn is_append_call(e: &Expr) -> bool {
    matches!(&e.kind, ExprKind::Call { func, .. } if matches!(&func.kind, ExprKind::Ident(n) if n == "append"))
}

fn dereference_append_arg(e: &mut Expr) {
    if let ExprKind::Call { args, .. } = &mut e.kind {
        if let Some(first) = args.first_mut() {
            dereference_once(first);
        }
    }
}

fn dereference_once(e: &mut Expr) {
    if matches!(&e.kind, ExprKind::Unary { op: UnaryOp::Deref, .. }) {
        return;
    }
    let pos = e.pos.clone();
    let moved = std::mem::replace(e, Expr::new(pos.clone(), ExprKind::Ident(String::new())));
    *e = Expr::new(
        pos,
        ExprKind::Unary {
            op: UnaryOp::Deref,
            operand: Box::new(moved),
        },
    );
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
    fn append_assignment_dereferences_both_sides() {
        let (mut file, mut diags) = parse("package p\nfunc f() { s := &[]int{1}; s = append(s, 2) }\n");
        let outcome = rewrite(&mut file, &mut diags, 10);
        let _ = outcome;
        let DeclKind::Func(func) = &file.decls[0].kind else {
            panic!("expected func");
        };
        let body = func.body.as_ref().unwrap();
        let StmtKind::Assign { lhs, rhs, .. } = &body.stmts[1].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(lhs[0].kind, ExprKind::Unary { op: UnaryOp::Deref, .. }));
        let ExprKind::Call { args, .. } = &rhs[0].kind else {
            panic!("expected append call");
        };
        assert!(matches!(args[0].kind, ExprKind::Unary { op: UnaryOp::Deref, .. }));
    }

    #[test]
    fn string_var_decl_lowers_type_and_literal() {
        let (mut file, mut diags) = parse("package p\nvar x string = \"hi\"\n");
        rewrite(&mut file, &mut diags, 10);
        let DeclKind::Var(specs) = &file.decls[0].kind else {
            panic!("expected var decl");
        };
        assert!(matches!(specs[0].ty.as_ref().unwrap().kind, TypeKind::ByteString));
        assert!(matches!(specs[0].values[0].kind, ExprKind::Unary { op: UnaryOp::Addr, .. }));
    }

    #[test]
    fn channel_literal_becomes_make() {
        let (mut file, mut diags) = parse("package p\nfunc f() { ch := &chan int{10} }\n");
        let outcome = rewrite(&mut file, &mut diags, 10);
        assert!(!outcome.runtime_import);
        let DeclKind::Func(func) = &file.decls[0].kind else {
            panic!("expected func");
        };
        let body = func.body.as_ref().unwrap();
        let StmtKind::Assign { rhs, .. } = &body.stmts[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&rhs[0].kind, ExprKind::Call { func, .. } if matches!(&func.kind, ExprKind::Ident(n) if n == "make")));
    }

    #[test]
    fn byte_concat_sets_runtime_import() {
        let (mut file, mut diags) = parse(
            "package p\nfunc f() { a := &[]byte{'a'}; b := &[]byte{'b'}; c := a + b }\n",
        );
        let outcome = rewrite(&mut file, &mut diags, 10);
        assert!(outcome.runtime_import);
        let DeclKind::Func(func) = &file.decls[0].kind else {
            panic!("expected func");
        };
        let body = func.body.as_ref().unwrap();
        let StmtKind::Assign { rhs, .. } = &body.stmts[2].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&rhs[0].kind, ExprKind::Call { func, .. }
            if matches!(&func.kind, ExprKind::Selector { name, .. } if name == "Concat")));
    }
}
