//! Pass 7: call-expression dispatch. The largest table
//! in the rewrite engine: each dialect builtin or conversion-looking call
//! lowers to a specific runtime-library selector, chosen either by name
//! alone or by the tracked category of the first argument.

use super::support::{call_expr, is_named, moxie_selector, named_type};
use crate::ast::{Expr, ExprKind, LitKind, TypeExpr, TypeKind, UnaryOp};
use crate::diagnostics::{Category, Diagnostic, Diagnostics, Severity};
use crate::position::Position;
use crate::type_tracker::{Category as Cat, TypeTracker};
use std::collections::HashSet;

pub struct CallRewrite {
    pub kind: ExprKind,
    pub runtime_import: bool,
}

fn rewrite(kind: ExprKind) -> Option<CallRewrite> {
    Some(CallRewrite {
        kind,
        runtime_import: true,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn try_rewrite(
    tracker: &TypeTracker,
    diags: &mut Diagnostics,
    flagged: &mut HashSet<usize>,
    pos: &Position,
    func: &Expr,
    args: &[Expr],
    ellipsis: bool,
    type_args: &[TypeExpr],
) -> Option<CallRewrite> {
    match &func.kind {
        ExprKind::Ident(name) if name == "make" => {
            rewrite_make(diags, flagged, pos, args);
            None
        }
        ExprKind::Ident(name) if matches!(name.as_str(), "grow" | "clone" | "free") => {
            rewrite_grow_clone_free(tracker, diags, flagged, pos, name, args)
        }
        ExprKind::Ident(name) if name == "clear" => rewrite_clear(func, args, ellipsis, type_args),
        ExprKind::Ident(name) if matches!(name.as_str(), "dlopen" | "dlsym" | "dlclose" | "dlerror") => {
            rewrite(call_expr(
                moxie_selector(pos, &capitalize(name)),
                args.to_vec(),
                type_args.to_vec(),
            ))
        }
        ExprKind::Ident(name) if name == "string" && args.len() == 1 => {
            rewrite_string_conversion(diags, pos, &args[0])
                .map(|callee| CallRewrite { kind: call_expr(callee, args.to_vec(), vec![]), runtime_import: true })
        }
        ExprKind::Type(ty) if is_rune_slice(ty) && args.len() == 1 => {
            rewrite(call_expr(moxie_selector(pos, "StringToRunes"), args.to_vec(), vec![]))
        }
        ExprKind::Paren(inner) => rewrite_cast(tracker, diags, pos, inner, args),
        _ => None,
    }
}

fn rewrite_make(diags: &mut Diagnostics, flagged: &mut HashSet<usize>, pos: &Position, args: &[Expr]) {
    let is_chan = args.first().is_some_and(|a| {
        matches!(&a.kind, ExprKind::Type(t) if matches!(t.kind, TypeKind::Chan { .. }))
    });
    if is_chan {
        return;
    }
    if flagged.insert(pos.offset) {
        diags.push(
            Diagnostic::new(
                pos.clone(),
                Severity::Error,
                Category::BareMake,
                "make used for a non-channel type",
            )
            .with_help("use &[]T{...} or &map[K]V{...} instead"),
        );
    }
}

fn rewrite_grow_clone_free(
    tracker: &TypeTracker,
    diags: &mut Diagnostics,
    flagged: &mut HashSet<usize>,
    pos: &Position,
    name: &str,
    args: &[Expr],
) -> Option<CallRewrite> {
    if name == "grow" {
        if args.len() < 2 {
            flag_missing_argument(diags, flagged, pos, name);
            return None;
        }
        return rewrite(call_expr(moxie_selector(pos, "Grow"), args.to_vec(), vec![]));
    }
    let Some(first) = args.first() else {
        flag_missing_argument(diags, flagged, pos, name);
        return None;
    };
    let cat = tracker.category_of_expr(first);
    let (func_name, type_args) = match (name, &cat) {
        ("clone", Cat::SliceOf(t)) => ("CloneSlice", vec![(**t).clone()]),
        ("clone", Cat::MapOf(k, v)) => ("CloneMap", vec![(**k).clone(), (**v).clone()]),
        ("clone", Cat::Struct(Some(t))) => ("DeepCopy", vec![named_type(pos, t)]),
        ("clone", _) => ("DeepCopy", vec![]),
        ("free", Cat::SliceOf(t)) => ("FreeSlice", vec![(**t).clone()]),
        ("free", Cat::MapOf(k, v)) => ("FreeMap", vec![(**k).clone(), (**v).clone()]),
        ("free", Cat::Struct(Some(t))) => ("Free", vec![named_type(pos, t)]),
        ("free", _) => ("Free", vec![]),
        _ => unreachable!("only clone/free reach this arm"),
    };
    rewrite(call_expr(moxie_selector(pos, func_name), vec![first.clone()], type_args))
}

fn flag_missing_argument(diags: &mut Diagnostics, flagged: &mut HashSet<usize>, pos: &Position, name: &str) {
    if flagged.insert(pos.offset) {
        diags.push(Diagnostic::new(
            pos.clone(),
            Severity::Error,
            Category::MissingCloneFreeArgument,
            format!("{name} requires an argument"),
        ));
    }
}

fn rewrite_clear(func: &Expr, args: &[Expr], ellipsis: bool, type_args: &[TypeExpr]) -> Option<CallRewrite> {
    let first = args.first()?;
    let already = matches!(
        first.kind,
        ExprKind::Unary {
            op: UnaryOp::Deref,
            ..
        }
    );
    if already {
        return None;
    }
    let arg = Expr::new(
        first.pos.clone(),
        ExprKind::Unary {
            op: UnaryOp::Deref,
            operand: Box::new(first.clone()),
        },
    );
    Some(CallRewrite {
        kind: ExprKind::Call {
            func: Box::new(func.clone()),
            args: vec![arg],
            ellipsis,
            type_args: type_args.to_vec(),
        },
        runtime_import: false,
    })
}

fn rewrite_string_conversion(diags: &mut Diagnostics, pos: &Position, arg: &Expr) -> Option<Expr> {
    let (target, note) = match &arg.kind {
        ExprKind::BasicLit { kind: LitKind::Int, .. } => ("IntToString", None),
        ExprKind::BasicLit { kind: LitKind::Rune, .. } => ("RuneToString", None),
        ExprKind::Unary { op: UnaryOp::Deref, .. } => ("RunesToString", None),
        ExprKind::Ident(name) if matches!(name.as_str(), "r" | "ch" | "c") => {
            ("RuneToString", Some("guessed rune conversion from single-letter name"))
        }
        ExprKind::Ident(name) if name.to_lowercase().ends_with("runes") => {
            ("RunesToString", Some("guessed slice-of-runes conversion from name suffix"))
        }
        _ => ("IntToString", Some("no heuristic matched; defaulting to integer conversion")),
    };
    if let Some(note) = note {
        diags.push(Diagnostic::new(
            pos.clone(),
            Severity::Info,
            Category::StringDispatchHeuristic,
            format!("string(x) dispatch: {note}"),
        ));
    }
    Some(moxie_selector(pos, target))
}

fn rewrite_cast(
    tracker: &TypeTracker,
    diags: &mut Diagnostics,
    pos: &Position,
    inner: &Expr,
    args: &[Expr],
) -> Option<CallRewrite> {
    if args.len() != 1 {
        return None;
    }
    let src = &args[0];
    let (ty_expr, endian) = match &inner.kind {
        ExprKind::Type(t) => (t.as_ref(), None),
        ExprKind::KeyValue(kv) => {
            let ExprKind::Type(t) = &kv.key.as_ref()?.kind else {
                return None;
            };
            (t.as_ref(), Some(kv.value.as_ref()))
        }
        _ => return None,
    };
    let TypeKind::Pointer(slice_ty) = &ty_expr.kind else {
        return None;
    };
    let TypeKind::Slice(target_elem) = &slice_ty.kind else {
        return None;
    };
    if is_rune_named(target_elem) {
        return rewrite(call_expr(moxie_selector(pos, "StringToRunes"), vec![src.clone()], vec![]));
    }
    let source_ty = match tracker.category_of_expr(src) {
        Cat::SliceOf(t) => (*t).clone(),
        _ => {
            diags.push(
                Diagnostic::new(
                    pos.clone(),
                    Severity::Warning,
                    Category::CoerceUnknownSourceType,
                    "cannot infer source element type for Coerce",
                )
                .with_help("defaulting to byte"),
            );
            named_type(pos, "byte")
        }
    };
    let mut call_args = vec![src.clone()];
    if let Some(endian_expr) = endian {
        call_args.push(endian_selector(pos, endian_expr));
    }
    rewrite(call_expr(
        moxie_selector(pos, "Coerce"),
        call_args,
        vec![source_ty, (**target_elem).clone()],
    ))
}

/// The endian argument was parsed as a bare `Ident` (`LittleEndian`); pass 1
/// may or may not have already turned it into `moxie.LittleEndian` by the
/// time this call is dispatched, depending on traversal order, so both
/// shapes are accepted here.
fn endian_selector(pos: &Position, e: &Expr) -> Expr {
    match &e.kind {
        ExprKind::Ident(name) => moxie_selector(pos, name),
        _ => e.clone(),
    }
}

fn is_rune_named(t: &TypeExpr) -> bool {
    is_named(t, "rune")
}

pub(super) fn is_rune_slice(t: &TypeExpr) -> bool {
    matches!(&t.kind, TypeKind::Slice(elem) if is_rune_named(elem))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::SourceFile;

    fn pos() -> Position {
        Position::start_of(SourceFile::new(std::path::PathBuf::from("t.mx"), String::new()))
    }

    #[test]
    fn bare_make_is_flagged_once_per_call_site() {
        let mut diags = Diagnostics::new();
        let mut flagged = HashSet::new();
        let p = pos();
        let int_ty = Expr::new(p.clone(), ExprKind::Type(Box::new(named_type(&p, "int"))));
        rewrite_make(&mut diags, &mut flagged, &p, std::slice::from_ref(&int_ty));
        rewrite_make(&mut diags, &mut flagged, &p, std::slice::from_ref(&int_ty));
        assert_eq!(diags.all().len(), 1);
    }

    #[test]
    fn dlsym_keeps_type_args() {
        let func = Expr::new(pos(), ExprKind::Ident("dlsym".into()));
        let p = pos();
        let args = vec![Expr::new(p.clone(), ExprKind::Ident("h".into()))];
        let type_args = vec![named_type(&p, "func()")];
        let result = try_rewrite(
            &TypeTracker::new(),
            &mut Diagnostics::new(),
            &mut HashSet::new(),
            &p,
            &func,
            &args,
            false,
            &type_args,
        )
        .expect("rewrites");
        if let ExprKind::Call { type_args, .. } = result.kind {
            assert_eq!(type_args.len(), 1);
        } else {
            panic!("expected call");
        }
    }
}
