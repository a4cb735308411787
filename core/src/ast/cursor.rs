//! The traversal the rewrite engine needs: something that visits every
//! node and can replace a child in its parent, because a rewrite (`+`
//! becoming a call, a string literal becoming a composite literal)
//! changes a node's *kind* outright rather than just one of its fields.
//!
//! A literal parent-pointer cursor exposing `parent`/`replace`/child
//! iteration over an owned, `Box`-based tree needs either unsafe aliasing
//! or a zipper that rebuilds ancestors on every step; neither fits a
//! boxed recursive enum cleanly in Rust. Instead this module gives the
//! rewrite engine the same power through an `&mut` visitor: each
//! `visit_*` hook receives `&mut Expr`/`&mut Stmt`/... directly, and
//! `*node = new_node` *is* the replace-in-parent operation, because the
//! `&mut` reference already aliases the exact slot inside the parent that
//! owns it. See `DESIGN.md` for why this trade was made.
//!
//! Default `walk_*` functions perform the structural recursion so a
//! `MutVisitor` impl only overrides the node kinds it cares about and calls
//! `walk_*` to keep recursing into children it doesn't rewrite itself.

use super::decl::{Decl, DeclKind, FuncDecl};
use super::expr::{Expr, ExprKind};
use super::file::File;
use super::stmt::{Block, Stmt, StmtKind};
use super::ty::TypeExpr;

/// Implemented by each rewrite pass. Every method defaults to recursing via
/// the matching `walk_*` function; override a method to inspect or replace
/// the node before/after recursing into its children.
pub trait MutVisitor {
    fn visit_file(&mut self, file: &mut File) {
        walk_file(self, file);
    }
    fn visit_decl(&mut self, decl: &mut Decl) {
        walk_decl(self, decl);
    }
    fn visit_func_decl(&mut self, func: &mut FuncDecl) {
        walk_func_decl(self, func);
    }
    fn visit_block(&mut self, block: &mut Block) {
        walk_block(self, block);
    }
    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        walk_stmt(self, stmt);
    }
    fn visit_expr(&mut self, expr: &mut Expr) {
        walk_expr(self, expr);
    }
    fn visit_type(&mut self, ty: &mut TypeExpr) {
        walk_type(self, ty);
    }
}

pub fn walk_file<V: MutVisitor + ?Sized>(v: &mut V, file: &mut File) {
    for decl in &mut file.decls {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<V: MutVisitor + ?Sized>(v: &mut V, decl: &mut Decl) {
    match &mut decl.kind {
        DeclKind::Const(specs) => {
            for spec in specs {
                if let Some(ty) = &mut spec.ty {
                    v.visit_type(ty);
                }
                for value in &mut spec.values {
                    v.visit_expr(value);
                }
            }
        }
        DeclKind::Var(specs) => {
            for spec in specs {
                if let Some(ty) = &mut spec.ty {
                    v.visit_type(ty);
                }
                for value in &mut spec.values {
                    v.visit_expr(value);
                }
            }
        }
        DeclKind::Type(specs) => {
            for spec in specs {
                v.visit_type(&mut spec.ty);
            }
        }
        DeclKind::Func(func) => v.visit_func_decl(func),
    }
}

pub fn walk_func_decl<V: MutVisitor + ?Sized>(v: &mut V, func: &mut FuncDecl) {
    if let Some(receiver) = &mut func.receiver {
        v.visit_type(&mut receiver.ty);
    }
    for field in func
        .signature
        .params
        .iter_mut()
        .chain(func.signature.results.iter_mut())
    {
        v.visit_type(&mut field.ty);
    }
    if let Some(body) = &mut func.body {
        v.visit_block(body);
    }
}

pub fn walk_block<V: MutVisitor + ?Sized>(v: &mut V, block: &mut Block) {
    for stmt in &mut block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: MutVisitor + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Block(block) => v.visit_block(block),
        StmtKind::Expr(expr) => v.visit_expr(expr),
        StmtKind::Assign { lhs, rhs, .. } => {
            for e in lhs.iter_mut().chain(rhs.iter_mut()) {
                v.visit_expr(e);
            }
        }
        StmtKind::IncDec { expr, .. } => v.visit_expr(expr),
        StmtKind::Return(exprs) => {
            for e in exprs {
                v.visit_expr(e);
            }
        }
        StmtKind::Branch { .. } | StmtKind::Empty => {}
        StmtKind::If {
            init,
            cond,
            body,
            else_,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(cond);
            v.visit_block(body);
            if let Some(else_) = else_ {
                v.visit_stmt(else_);
            }
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(cond) = cond {
                v.visit_expr(cond);
            }
            if let Some(post) = post {
                v.visit_stmt(post);
            }
            v.visit_block(body);
        }
        StmtKind::Range {
            key, value, expr, body, ..
        } => {
            if let Some(key) = key {
                v.visit_expr(key);
            }
            if let Some(value) = value {
                v.visit_expr(value);
            }
            v.visit_expr(expr);
            v.visit_block(body);
        }
        StmtKind::Switch { init, tag, cases } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(tag) = tag {
                v.visit_expr(tag);
            }
            for case in cases {
                for value in &mut case.values {
                    v.visit_expr(value);
                }
                for s in &mut case.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::TypeSwitch {
            init,
            assign,
            cases,
            ..
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(assign);
            for (types, body, _) in cases {
                for ty in types {
                    v.visit_type(ty);
                }
                for s in body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::Select { cases } => {
            for case in cases {
                if let Some(comm) = &mut case.comm {
                    v.visit_stmt(comm);
                }
                for s in &mut case.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::Defer(call) | StmtKind::Go(call) => v.visit_expr(call),
        StmtKind::Labeled { stmt, .. } => v.visit_stmt(stmt),
        StmtKind::Send { chan, value } => {
            v.visit_expr(chan);
            v.visit_expr(value);
        }
        StmtKind::Decl(decl) => v.visit_decl(decl),
    }
}

pub fn walk_expr<V: MutVisitor + ?Sized>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Ident(_) | ExprKind::BasicLit { .. } => {}
        ExprKind::CompositeLit { ty, elements } => {
            if let Some(ty) = ty {
                v.visit_type(ty);
            }
            for e in elements {
                v.visit_expr(e);
            }
        }
        ExprKind::FuncLit { signature, body } => {
            for field in signature.params.iter_mut().chain(signature.results.iter_mut()) {
                v.visit_type(&mut field.ty);
            }
            v.visit_block(body);
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::Selector { x, .. } => v.visit_expr(x),
        ExprKind::Index { x, index } => {
            v.visit_expr(x);
            v.visit_expr(index);
        }
        ExprKind::IndexList { x, indices } => {
            v.visit_expr(x);
            for i in indices {
                v.visit_expr(i);
            }
        }
        ExprKind::Slice3 { x, low, high, max } => {
            v.visit_expr(x);
            for e in [low, high, max].into_iter().flatten() {
                v.visit_expr(e);
            }
        }
        ExprKind::TypeAssert { x, ty } => {
            v.visit_expr(x);
            if let Some(ty) = ty {
                v.visit_type(ty);
            }
        }
        ExprKind::Call {
            func,
            args,
            type_args,
            ..
        } => {
            v.visit_expr(func);
            for a in args {
                v.visit_expr(a);
            }
            for t in type_args {
                v.visit_type(t);
            }
        }
        ExprKind::Paren(x) => v.visit_expr(x),
        ExprKind::KeyValue(kv) => {
            if let Some(key) = &mut kv.key {
                v.visit_expr(key);
            }
            v.visit_expr(&mut kv.value);
        }
        ExprKind::Type(ty) => v.visit_type(ty),
    }
}

pub fn walk_type<V: MutVisitor + ?Sized>(v: &mut V, ty: &mut TypeExpr) {
    use super::ty::TypeKind;
    match &mut ty.kind {
        TypeKind::Named { .. } | TypeKind::ByteString => {}
        TypeKind::Pointer(inner)
        | TypeKind::Paren(inner)
        | TypeKind::Const(inner)
        | TypeKind::Slice(inner) => v.visit_type(inner),
        TypeKind::Array { len, elem } => {
            if let Some(len) = len {
                v.visit_expr(len);
            }
            v.visit_type(elem);
        }
        TypeKind::Map { key, value } => {
            v.visit_type(key);
            v.visit_type(value);
        }
        TypeKind::Chan { elem, .. } | TypeKind::ChanMarker { elem, .. } => v.visit_type(elem),
        TypeKind::Func(sig) => {
            for field in sig.params.iter_mut().chain(sig.results.iter_mut()) {
                v.visit_type(&mut field.ty);
            }
        }
        TypeKind::Struct(fields) => {
            for field in fields {
                v.visit_type(&mut field.ty);
            }
        }
        TypeKind::Interface(methods) => {
            for method in methods {
                if let Some(embedded) = &mut method.embedded {
                    v.visit_type(embedded);
                }
            }
        }
    }
}
