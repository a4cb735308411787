//! Pass 8: `&__MoxieChan[T]{N}` (the parser's [`ChanMarker`](crate::ast::TypeKind::ChanMarker)
//! composite literal under `&`) lowers to `make(chan T, N)`. The buffer
//! size is the literal's first element; an explicit `0` is dropped, since
//! `make(chan T, 0)` and `make(chan T)` are equivalent but the dialect's
//! documented convention prefers the unbuffered form bare.

use crate::ast::{Expr, ExprKind, LitKind, TypeExpr, TypeKind, UnaryOp};

pub fn try_rewrite(expr: &Expr) -> Option<Expr> {
    let ExprKind::Unary {
        op: UnaryOp::Addr,
        operand,
    } = &expr.kind
    else {
        return None;
    };
    let ExprKind::CompositeLit {
        ty: Some(ty),
        elements,
    } = &operand.kind
    else {
        return None;
    };
    let TypeKind::ChanMarker { dir, elem } = &ty.kind else {
        return None;
    };
    let chan_ty = TypeExpr::new(
        ty.pos.clone(),
        TypeKind::Chan {
            dir: *dir,
            elem: elem.clone(),
        },
    );
    let mut args = vec![Expr::new(ty.pos.clone(), ExprKind::Type(Box::new(chan_ty)))];
    if let Some(first) = elements.first() {
        let is_zero = matches!(&first.kind, ExprKind::BasicLit { kind: LitKind::Int, text } if text == "0");
        if !is_zero {
            args.push(first.clone());
        }
    }
    Some(Expr::new(
        expr.pos.clone(),
        ExprKind::Call {
            func: Box::new(Expr::new(expr.pos.clone(), ExprKind::Ident("make".to_string()))),
            args,
            ellipsis: false,
            type_args: vec![],
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ChanDir;
    use crate::position::Position;
    use crate::source_file::SourceFile;

    fn pos() -> Position {
        Position::start_of(SourceFile::new(std::path::PathBuf::from("t.mx"), String::new()))
    }

    #[test]
    fn buffered_channel_literal_becomes_make_with_size() {
        let elem = TypeExpr::new(pos(), TypeKind::Named { pkg: None, name: "int".into() });
        let marker = TypeExpr::new(pos(), TypeKind::ChanMarker { dir: ChanDir::Both, elem: Box::new(elem) });
        let ten = Expr::new(pos(), ExprKind::BasicLit { kind: LitKind::Int, text: "10".into() });
        let composite = Expr::new(pos(), ExprKind::CompositeLit { ty: Some(Box::new(marker)), elements: vec![ten] });
        let addr = Expr::new(pos(), ExprKind::Unary { op: UnaryOp::Addr, operand: Box::new(composite) });
        let rewritten = try_rewrite(&addr).expect("rewrites");
        let ExprKind::Call { func, args, .. } = rewritten.kind else {
            panic!("expected call");
        };
        assert!(matches!(func.kind, ExprKind::Ident(name) if name == "make"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn zero_size_is_omitted() {
        let elem = TypeExpr::new(pos(), TypeKind::Named { pkg: None, name: "int".into() });
        let marker = TypeExpr::new(pos(), TypeKind::ChanMarker { dir: ChanDir::Both, elem: Box::new(elem) });
        let zero = Expr::new(pos(), ExprKind::BasicLit { kind: LitKind::Int, text: "0".into() });
        let composite = Expr::new(pos(), ExprKind::CompositeLit { ty: Some(Box::new(marker)), elements: vec![zero] });
        let addr = Expr::new(pos(), ExprKind::Unary { op: UnaryOp::Addr, operand: Box::new(composite) });
        let rewritten = try_rewrite(&addr).expect("rewrites");
        let ExprKind::Call { args, .. } = rewritten.kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);
    }
}
