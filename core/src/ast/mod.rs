//! The language-neutral syntax tree model: an owned, boxed algebraic
//! variant shaped after small hand-rolled Go-AST crates (an
//! `ast::Expression`/`ast::Statement` split), since the rewrite engine
//! needs in-place replacement across parent boundaries that a borrowed
//! tree can't offer.
//!
//! Every node carries a [`Position`](crate::position::Position) referencing
//! the *original* source — rewrites replace a node's `kind`, never its
//! `pos`, so diagnostics raised against a rewritten node still point at
//! wherever the construct first appeared.

pub mod comment;
pub mod cursor;
pub mod decl;
pub mod expr;
pub mod file;
pub mod stmt;
pub mod ty;

pub use comment::Comment;
pub use cursor::MutVisitor;
pub use decl::{ConstSpec, Decl, DeclKind, Field, FuncDecl, Signature, TypeSpec, VarSpec};
pub use expr::{BinaryOp, Expr, ExprKind, KeyValue, LitKind, UnaryOp};
pub use file::{File, ImportSpec};
pub use stmt::{
    AssignOp, Block, BranchKind, CaseClause, CommClause, RangeTok, Stmt, StmtKind,
};
pub use ty::{ChanDir, InterfaceMethod, TypeExpr, TypeKind};
