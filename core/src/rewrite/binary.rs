//! Pass 5: operator rewriting. `+` lowers to a runtime
//! concat call when either operand plausibly denotes a slice; the six
//! comparison operators lower to `bytes.Equal`/`bytes.Compare` when either
//! operand looks like a byte-slice reference.

use super::support::{bytes_selector, call_expr, is_named, moxie_selector};
use crate::ast::{BinaryOp, Expr, ExprKind, LitKind, UnaryOp};
use crate::diagnostics::{Category, Diagnostic, Diagnostics, Severity};
use crate::type_tracker::{Category as Cat, TypeTracker};

pub struct BinaryRewrite {
    pub kind: ExprKind,
    pub runtime_import: bool,
    pub bytes_import: bool,
}

pub fn try_rewrite(
    tracker: &TypeTracker,
    diags: &mut Diagnostics,
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
) -> Option<BinaryRewrite> {
    if op == BinaryOp::Add {
        return try_concat(tracker, diags, left, right);
    }
    if op.is_comparison() {
        return try_compare(tracker, op, left, right);
    }
    None
}

fn try_concat(
    tracker: &TypeTracker,
    diags: &mut Diagnostics,
    left: &Expr,
    right: &Expr,
) -> Option<BinaryRewrite> {
    if !tracker.looks_like_slice_operand(left) && !tracker.looks_like_slice_operand(right) {
        return None;
    }
    let pos = left.pos.clone();
    let elem = tracker.element_type(BinaryOp::Add, left, right);
    let (name, type_args) = match &elem {
        Some(t) if is_named(t, "byte") => ("Concat", vec![]),
        Some(t) => ("ConcatSlice", vec![t.clone()]),
        None => {
            diags.push(Diagnostic::new(
                pos.clone(),
                Severity::Warning,
                Category::ConcatUnknownElementType,
                "cannot infer element type for +; falling back to untyped ConcatSlice",
            ));
            ("ConcatSlice", vec![])
        }
    };
    Some(BinaryRewrite {
        kind: call_expr(
            moxie_selector(&pos, name),
            vec![left.clone(), right.clone()],
            type_args,
        ),
        runtime_import: true,
        bytes_import: false,
    })
}

fn try_compare(tracker: &TypeTracker, op: BinaryOp, left: &Expr, right: &Expr) -> Option<BinaryRewrite> {
    if !is_byte_slice_like(tracker, left) && !is_byte_slice_like(tracker, right) {
        return None;
    }
    let pos = left.pos.clone();
    let a = byteslice_value(left);
    let b = byteslice_value(right);
    let kind = match op {
        BinaryOp::Eq => call_expr(bytes_selector(&pos, "Equal"), vec![a, b], vec![]),
        BinaryOp::Ne => ExprKind::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::new(
                pos.clone(),
                call_expr(bytes_selector(&pos, "Equal"), vec![a, b], vec![]),
            )),
        },
        _ => {
            let cmp = Expr::new(
                pos.clone(),
                call_expr(bytes_selector(&pos, "Compare"), vec![a, b], vec![]),
            );
            let zero = Expr::new(
                pos.clone(),
                ExprKind::BasicLit {
                    kind: LitKind::Int,
                    text: "0".to_string(),
                },
            );
            ExprKind::Binary {
                op,
                left: Box::new(cmp),
                right: Box::new(zero),
            }
        }
    };
    Some(BinaryRewrite {
        kind,
        runtime_import: false,
        bytes_import: true,
    })
}

fn is_byte_slice_like(tracker: &TypeTracker, e: &Expr) -> bool {
    match tracker.category_of_expr(e) {
        Cat::ByteString => true,
        Cat::SliceOf(t) => is_named(&t, "byte"),
        _ => false,
    }
}

/// An address-of composite operand loses its `&` (the runtime call takes the
/// slice value); anything else is dereferenced once, since ordinary
/// identifiers here denote `*[]byte`/`*[]T` pointers.
fn byteslice_value(e: &Expr) -> Expr {
    if let ExprKind::Unary {
        op: UnaryOp::Addr,
        operand,
    } = &e.kind
    {
        (**operand).clone()
    } else {
        Expr::new(
            e.pos.clone(),
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand: Box::new(e.clone()),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::SourceFile;

    fn pos() -> crate::position::Position {
        crate::position::Position::start_of(SourceFile::new(std::path::PathBuf::from("t.mx"), String::new()))
    }

    #[test]
    fn concat_falls_back_without_element_type() {
        let tracker = TypeTracker::new();
        let mut diags = Diagnostics::new();
        let a = Expr::new(pos(), ExprKind::Unary { op: UnaryOp::Deref, operand: Box::new(Expr::new(pos(), ExprKind::Ident("a".into()))) });
        let b = Expr::new(pos(), ExprKind::Ident("b".into()));
        let rewrite = try_rewrite(&tracker, &mut diags, BinaryOp::Add, &a, &b).expect("rewrites");
        assert!(rewrite.runtime_import);
        assert!(matches!(diags.all().first().map(|d| d.category), Some(Category::ConcatUnknownElementType)));
    }
}
