//! Pass 6 (and the struct-field half of pass 9): lowers string literals to
//! `&[]byte{...}` composites wherever a byte-slice is expected —
//! assignment RHS, return values, function arguments (except
//! `fmt.*` calls, which still want native strings), and composite-literal
//! field values (except within an explicit `[]string`/`[N]string`).
//!
//! Applied explicitly at those syntactic positions rather than as a blanket
//! `visit_expr` override, since a string literal used as, say, a `switch`
//! tag or a map key is not one of the documented contexts.

use crate::ast::{Expr, ExprKind, LitKind, TypeExpr, TypeKind, UnaryOp};
use crate::diagnostics::Diagnostics;
use crate::literal::{byte_to_rune_literal, decode_escaped_bytes};
use crate::position::Position;

pub fn lower_in_context(expr: &mut Expr, diags: &mut Diagnostics) {
    match &mut expr.kind {
        ExprKind::BasicLit {
            kind: LitKind::String,
            text,
        } => {
            let pos = expr.pos.clone();
            let bytes_literal = string_to_byteslice(&pos, text);
            expr.kind = bytes_literal.kind;
        }
        ExprKind::Binary { left, right, .. } => {
            lower_in_context(left, diags);
            lower_in_context(right, diags);
        }
        ExprKind::Unary { operand, .. } => lower_in_context(operand, diags),
        ExprKind::Paren(inner) => lower_in_context(inner, diags),
        ExprKind::Call { .. } => lower_call_args(expr, diags),
        ExprKind::CompositeLit { ty, elements } => {
            let ty = ty.as_deref();
            if is_string_array_type(ty) {
                return;
            }
            for el in elements {
                match &mut el.kind {
                    ExprKind::KeyValue(kv) => lower_in_context(&mut kv.value, diags),
                    _ => lower_in_context(el, diags),
                }
            }
        }
        _ => {}
    }
}

/// Applies lowering to a call's arguments unless the callee is a `fmt.*`
/// selector, which expects native strings.
pub fn lower_call_args(expr: &mut Expr, diags: &mut Diagnostics) {
    if let ExprKind::Call { func, args, .. } = &mut expr.kind {
        if is_fmt_call(func) {
            return;
        }
        for a in args.iter_mut() {
            lower_in_context(a, diags);
        }
    }
}

fn is_fmt_call(func: &Expr) -> bool {
    matches!(&func.kind, ExprKind::Selector { x, .. } if matches!(&x.kind, ExprKind::Ident(pkg) if pkg == "fmt"))
}

fn is_string_array_type(ty: Option<&TypeExpr>) -> bool {
    match ty.map(|t| &t.kind) {
        Some(TypeKind::Slice(elem) | TypeKind::Array { elem, .. }) => {
            matches!(&elem.kind, TypeKind::Named { pkg: None, name } if name == "string")
        }
        _ => false,
    }
}

fn string_to_byteslice(pos: &Position, text: &str) -> Expr {
    let bytes = decode_escaped_bytes(text);
    let elements = bytes
        .iter()
        .map(|&b| {
            Expr::new(
                pos.clone(),
                ExprKind::BasicLit {
                    kind: LitKind::Rune,
                    text: byte_to_rune_literal(b),
                },
            )
        })
        .collect();
    let byte_ty = TypeExpr::new(
        pos.clone(),
        TypeKind::Named {
            pkg: None,
            name: "byte".to_string(),
        },
    );
    let slice_ty = TypeExpr::new(pos.clone(), TypeKind::Slice(Box::new(byte_ty)));
    let composite = Expr::new(
        pos.clone(),
        ExprKind::CompositeLit {
            ty: Some(Box::new(slice_ty)),
            elements,
        },
    );
    Expr::new(
        pos.clone(),
        ExprKind::Unary {
            op: UnaryOp::Addr,
            operand: Box::new(composite),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::start_of(crate::source_file::SourceFile::new(
            std::path::PathBuf::from("t.mx"),
            String::new(),
        ))
    }

    #[test]
    fn lowers_simple_string_literal() {
        let mut e = Expr::new(
            pos(),
            ExprKind::BasicLit {
                kind: LitKind::String,
                text: "\"hi\"".to_string(),
            },
        );
        let mut diags = Diagnostics::new();
        lower_in_context(&mut e, &mut diags);
        let ExprKind::Unary { op: UnaryOp::Addr, operand } = &e.kind else {
            panic!("expected address-of composite");
        };
        let ExprKind::CompositeLit { elements, .. } = &operand.kind else {
            panic!("expected composite literal");
        };
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn skips_fmt_call_arguments() {
        let fmt_println = Expr::new(
            pos(),
            ExprKind::Selector {
                x: Box::new(Expr::new(pos(), ExprKind::Ident("fmt".into()))),
                name: "Println".to_string(),
            },
        );
        let mut call = Expr::new(
            pos(),
            ExprKind::Call {
                func: Box::new(fmt_println),
                args: vec![Expr::new(
                    pos(),
                    ExprKind::BasicLit {
                        kind: LitKind::String,
                        text: "\"hi\"".to_string(),
                    },
                )],
                ellipsis: false,
                type_args: vec![],
            },
        );
        let mut diags = Diagnostics::new();
        lower_call_args(&mut call, &mut diags);
        let ExprKind::Call { args, .. } = &call.kind else {
            unreachable!()
        };
        assert!(matches!(args[0].kind, ExprKind::BasicLit { kind: LitKind::String, .. }));
    }
}
