//! Small tree-building helpers shared by every rewrite submodule, so a
//! `moxie.Foo(a, b)` call or a bare `Named` type doesn't get reassembled
//! field-by-field in five different places.

use crate::ast::{Expr, ExprKind, TypeExpr, TypeKind};
use crate::position::Position;

pub fn selector(pos: &Position, pkg: &str, name: &str) -> Expr {
    Expr::new(
        pos.clone(),
        ExprKind::Selector {
            x: Box::new(Expr::new(pos.clone(), ExprKind::Ident(pkg.to_string()))),
            name: name.to_string(),
        },
    )
}

pub fn moxie_selector(pos: &Position, name: &str) -> Expr {
    selector(pos, "moxie", name)
}

pub fn bytes_selector(pos: &Position, name: &str) -> Expr {
    selector(pos, "bytes", name)
}

pub fn call_expr(func: Expr, args: Vec<Expr>, type_args: Vec<TypeExpr>) -> ExprKind {
    ExprKind::Call {
        func: Box::new(func),
        args,
        ellipsis: false,
        type_args,
    }
}

pub fn named_type(pos: &Position, name: &str) -> TypeExpr {
    TypeExpr::new(
        pos.clone(),
        TypeKind::Named {
            pkg: None,
            name: name.to_string(),
        },
    )
}

#[must_use]
pub fn is_named(ty: &TypeExpr, want: &str) -> bool {
    matches!(&ty.kind, TypeKind::Named { pkg: None, name } if name == want)
}
