//! A lightweight, rewrite-time type tracker: records the structural
//! category (slice / map / struct / byte-string / scalar) of identifiers
//! across a compilation unit, inferred from declared types and `:=`/`=`
//! right-hand sides, as the rewrite walk proceeds. Plain `HashMap`s
//! populated eagerly, looked up with a documented `Unknown` fallback
//! wherever a dispatch rule needs one, rather than a general type-inference
//! framework.

use crate::ast::{BinaryOp, Expr, ExprKind, Signature, TypeExpr, TypeKind, UnaryOp};
use std::collections::HashMap;

/// The structural category the rewrite dispatch rules need. Carries
/// enough of the element type to build `CloneSlice[T]`/`CloneMap[K,V]`
/// calls without a full type system.
#[derive(Clone, Debug, PartialEq)]
pub enum Category {
    SliceOf(Box<TypeExpr>),
    MapOf(Box<TypeExpr>, Box<TypeExpr>),
    /// A struct value or pointer-to-struct; carries the type name when
    /// known, for `DeepCopy[T]`/`Free[T]`'s explicit type argument.
    Struct(Option<String>),
    ByteString,
    Scalar,
    Unknown,
}

#[derive(Debug, Default)]
pub struct TypeTracker {
    vars: HashMap<String, Category>,
    funcs: HashMap<String, Signature>,
}

impl TypeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, category: Category) {
        if category != Category::Unknown {
            self.vars.insert(name.into(), category);
        }
    }

    pub fn record_func(&mut self, name: impl Into<String>, sig: Signature) {
        self.funcs.insert(name.into(), sig);
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Category {
        self.vars.get(name).cloned().unwrap_or(Category::Unknown)
    }

    /// Type-expression inference rules (declared types).
    #[must_use]
    pub fn category_of_type(ty: &TypeExpr) -> Category {
        match &ty.kind {
            TypeKind::Slice(elem) => Category::SliceOf(elem.clone()),
            TypeKind::Map { key, value } => Category::MapOf(key.clone(), value.clone()),
            TypeKind::ByteString => Category::ByteString,
            TypeKind::Pointer(inner) => match &inner.kind {
                TypeKind::Named { name, .. } => Category::Struct(Some(name.clone())),
                _ => Self::category_of_type(inner),
            },
            TypeKind::Named { pkg: None, name } if crate::registries::is_builtin_type(name) => {
                if name == "string" {
                    Category::ByteString
                } else {
                    Category::Scalar
                }
            }
            TypeKind::Named { name, .. } => Category::Struct(Some(name.clone())),
            TypeKind::Array { elem, .. } => Category::SliceOf(elem.clone()),
            _ => Category::Unknown,
        }
    }

    /// Expression inference rules (RHS of `:=`/`=`, and
    /// the recursive rules `grow`/`clone`/`x[_]`/`*x` depend on).
    #[must_use]
    pub fn category_of_expr(&self, expr: &Expr) -> Category {
        match &expr.kind {
            ExprKind::Unary {
                op: UnaryOp::Addr,
                operand,
            } => match &operand.kind {
                ExprKind::CompositeLit { ty: Some(ty), .. } => Self::category_of_type(ty),
                _ => Category::Unknown,
            },
            ExprKind::CompositeLit { ty: Some(ty), .. } => Self::category_of_type(ty),
            ExprKind::Ident(name) => self.lookup(name),
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => self.category_of_expr(operand),
            ExprKind::Index { x, .. } => match self.category_of_expr(x) {
                Category::SliceOf(elem) => Self::category_of_type(&elem),
                Category::MapOf(_, value) => Self::category_of_type(&value),
                other => other,
            },
            ExprKind::Call { func, args, .. } => self.category_of_call(func, args),
            ExprKind::Paren(inner) => self.category_of_expr(inner),
            _ => Category::Unknown,
        }
    }

    fn category_of_call(&self, func: &Expr, args: &[Expr]) -> Category {
        match &func.kind {
            ExprKind::Ident(name) if name == "make" => {
                args.first().map_or(Category::Unknown, |a| match &a.kind {
                    ExprKind::Type(ty) => Self::category_of_type(ty),
                    _ => Category::Unknown,
                })
            }
            ExprKind::Ident(name) if matches!(name.as_str(), "grow" | "clone") => {
                args.first().map_or(Category::Unknown, |a| self.category_of_expr(a))
            }
            ExprKind::Selector { x, name } => {
                if let ExprKind::Ident(pkg) = &x.kind {
                    if pkg == "moxie" {
                        return match name.as_str() {
                            "Concat" => Category::ByteString,
                            "ConcatSlice" => args
                                .first()
                                .map_or(Category::Unknown, |a| self.category_of_expr(a)),
                            "CloneSlice" | "Grow" | "CloneMap" => args
                                .first()
                                .map_or(Category::Unknown, |a| self.category_of_expr(a)),
                            _ => Category::Unknown,
                        };
                    }
                }
                Category::Unknown
            }
            // Single-argument call `T(x)`: a type conversion.
            ExprKind::Ident(name) if args.len() == 1 && crate::registries::is_builtin_type(name) => {
                Category::Scalar
            }
            ExprKind::Ident(name) if args.len() == 1 => Category::Struct(Some(name.clone())),
            _ => Category::Unknown,
        }
    }

    /// Whether a binary `+` operand plausibly denotes a slice reference
    /// denote a slice reference: an address-of composite literal, an identifier,
    /// a dereferenced identifier, or a runtime concat call result.
    #[must_use]
    pub fn looks_like_slice_operand(&self, expr: &Expr) -> bool {
        !matches!(self.category_of_expr(expr), Category::Unknown | Category::Scalar)
            || matches!(
                &expr.kind,
                ExprKind::Unary { op: UnaryOp::Addr, .. } | ExprKind::Unary { op: UnaryOp::Deref, .. }
            )
    }

    /// Element type discoverable from either binary operand, for
    /// `moxie.ConcatSlice[T]`/`moxie.Concat` dispatch.
    #[must_use]
    pub fn element_type(&self, op: BinaryOp, left: &Expr, right: &Expr) -> Option<TypeExpr> {
        debug_assert_eq!(op, BinaryOp::Add);
        for side in [left, right] {
            match self.category_of_expr(side) {
                Category::SliceOf(elem) => return Some(*elem),
                Category::ByteString => {
                    return Some(TypeExpr::new(
                        side.pos.clone(),
                        TypeKind::Named {
                            pkg: None,
                            name: "byte".to_string(),
                        },
                    ))
                }
                _ => {}
            }
        }
        None
    }

    #[must_use]
    pub fn lookup_func(&self, name: &str) -> Option<&Signature> {
        self.funcs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::source_file::SourceFile;

    fn pos() -> Position {
        Position::start_of(SourceFile::new(std::path::PathBuf::from("t.mx"), String::new()))
    }

    #[test]
    fn tracks_slice_declaration() {
        let mut t = TypeTracker::new();
        let elem = TypeExpr::new(
            pos(),
            TypeKind::Named {
                pkg: None,
                name: "int".to_string(),
            },
        );
        t.record("s", Category::SliceOf(Box::new(elem)));
        assert!(matches!(t.lookup("s"), Category::SliceOf(_)));
        assert!(matches!(t.lookup("missing"), Category::Unknown));
    }
}
