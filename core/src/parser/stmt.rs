use super::Parser;
use crate::ast::{AssignOp, Block, CaseClause, CommClause, Decl, RangeTok, Stmt, StmtKind, TypeExpr};
use crate::diagnostics::{Category, Diagnostic, Diagnostics, Severity};
use crate::lexer::TokenKind;
use crate::position::Position;

fn assign_op(tok: &TokenKind) -> Option<AssignOp> {
    Some(match tok {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::Define => AssignOp::Define,
        TokenKind::PlusAssign => AssignOp::AddAssign,
        TokenKind::MinusAssign => AssignOp::SubAssign,
        TokenKind::StarAssign => AssignOp::MulAssign,
        TokenKind::SlashAssign => AssignOp::QuoAssign,
        TokenKind::PercentAssign => AssignOp::RemAssign,
        TokenKind::AmpAssign => AssignOp::AndAssign,
        TokenKind::PipeAssign => AssignOp::OrAssign,
        TokenKind::CaretAssign => AssignOp::XorAssign,
        TokenKind::ShlAssign => AssignOp::ShlAssign,
        TokenKind::ShrAssign => AssignOp::ShrAssign,
        TokenKind::AmpCaretAssign => AssignOp::AndNotAssign,
        _ => return None,
    })
}

fn is_kw(tok: &TokenKind, kw: &str) -> bool {
    matches!(tok, TokenKind::Ident(s) if s == kw)
}

impl Parser {
    pub(super) fn parse_block(&mut self, diags: &mut Diagnostics) -> Block {
        let pos = self.pos_tok();
        self.expect(&TokenKind::LBrace, diags, "'{'");
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            stmts.push(self.parse_stmt(diags));
            self.eat(&TokenKind::Semicolon);
        }
        self.expect(&TokenKind::RBrace, diags, "'}'");
        Block { pos, stmts }
    }

    pub(super) fn parse_stmt(&mut self, diags: &mut Diagnostics) -> Stmt {
        let pos = self.pos_tok();
        match self.peek().clone() {
            TokenKind::Semicolon | TokenKind::RBrace => Stmt::new(pos, StmtKind::Empty),
            TokenKind::LBrace => Stmt::new(pos, StmtKind::Block(self.parse_block(diags))),
            TokenKind::Ident(kw) if kw == "return" => {
                self.bump();
                let values = if matches!(self.peek(), TokenKind::Semicolon | TokenKind::RBrace) {
                    Vec::new()
                } else {
                    self.parse_expr_list(diags)
                };
                Stmt::new(pos, StmtKind::Return(values))
            }
            TokenKind::Ident(kw) if matches!(kw.as_str(), "break" | "continue" | "goto" | "fallthrough") => {
                self.bump();
                let tok = match kw.as_str() {
                    "break" => crate::ast::BranchKind::Break,
                    "continue" => crate::ast::BranchKind::Continue,
                    "goto" => crate::ast::BranchKind::Goto,
                    _ => crate::ast::BranchKind::Fallthrough,
                };
                let label = if let TokenKind::Ident(name) = self.peek().clone() {
                    self.bump();
                    Some(name)
                } else {
                    None
                };
                Stmt::new(pos, StmtKind::Branch { tok, label })
            }
            TokenKind::Ident(kw) if kw == "if" => {
                self.bump();
                self.parse_if_stmt(pos, diags)
            }
            TokenKind::Ident(kw) if kw == "for" => {
                self.bump();
                self.parse_for_stmt(pos, diags)
            }
            TokenKind::Ident(kw) if kw == "switch" => {
                self.bump();
                self.parse_switch_stmt(pos, diags)
            }
            TokenKind::Ident(kw) if kw == "select" => {
                self.bump();
                self.parse_select_stmt(pos, diags)
            }
            TokenKind::Ident(kw) if kw == "defer" => {
                self.bump();
                let e = self.parse_expr(diags);
                Stmt::new(pos, StmtKind::Defer(e))
            }
            TokenKind::Ident(kw) if kw == "go" => {
                self.bump();
                let e = self.parse_expr(diags);
                Stmt::new(pos, StmtKind::Go(e))
            }
            TokenKind::Ident(kw) if kw == "const" => {
                self.bump();
                let specs = self.parse_specs(diags, Self::parse_const_spec);
                Stmt::new(pos, StmtKind::Decl(Decl::new(pos.clone(), crate::ast::DeclKind::Const(specs))))
            }
            TokenKind::Ident(kw) if kw == "var" => {
                self.bump();
                let specs = self.parse_specs(diags, Self::parse_var_spec);
                Stmt::new(pos, StmtKind::Decl(Decl::new(pos.clone(), crate::ast::DeclKind::Var(specs))))
            }
            TokenKind::Ident(kw) if kw == "type" => {
                self.bump();
                let specs = self.parse_specs(diags, Self::parse_type_spec);
                Stmt::new(pos, StmtKind::Decl(Decl::new(pos.clone(), crate::ast::DeclKind::Type(specs))))
            }
            TokenKind::Ident(name) if matches!(self.peek_at(1), TokenKind::Colon) => {
                self.bump();
                self.bump();
                let inner = self.parse_stmt(diags);
                Stmt::new(
                    pos,
                    StmtKind::Labeled {
                        label: name,
                        stmt: Box::new(inner),
                    },
                )
            }
            _ => self.parse_simple_stmt(diags),
        }
    }

    /// A statement that can also stand as a `for`/`if`/`switch` header
    /// clause: an expression, an assignment (plain or `:=`), a send, an
    /// inc/dec, or — detected here so `for` doesn't need its own copy of
    /// this logic — a `range` clause's `key, value := range expr` form.
    pub(super) fn parse_simple_stmt(&mut self, diags: &mut Diagnostics) -> Stmt {
        let pos = self.pos_tok();
        let first = self.parse_expr_list(diags);
        match self.peek().clone() {
            TokenKind::Inc => {
                self.bump();
                Stmt::new(
                    pos,
                    StmtKind::IncDec {
                        expr: first.into_iter().next().expect("non-empty expr list"),
                        inc: true,
                    },
                )
            }
            TokenKind::Dec => {
                self.bump();
                Stmt::new(
                    pos,
                    StmtKind::IncDec {
                        expr: first.into_iter().next().expect("non-empty expr list"),
                        inc: false,
                    },
                )
            }
            TokenKind::Arrow => {
                self.bump();
                let value = self.parse_expr(diags);
                Stmt::new(
                    pos,
                    StmtKind::Send {
                        chan: first.into_iter().next().expect("non-empty expr list"),
                        value,
                    },
                )
            }
            tok if assign_op(&tok).is_some() => {
                let is_define = matches!(tok, TokenKind::Define);
                self.bump();
                if is_kw(self.peek(), "range") {
                    self.bump();
                    let expr = self.parse_expr(diags);
                    let mut it = first.into_iter();
                    let key = it.next();
                    let value = it.next();
                    return Stmt::new(
                        pos.clone(),
                        StmtKind::Range {
                            tok: if is_define { RangeTok::Define } else { RangeTok::Assign },
                            key,
                            value,
                            expr,
                            body: Block { pos, stmts: Vec::new() },
                        },
                    );
                }
                let rhs = self.parse_expr_list(diags);
                Stmt::new(
                    pos,
                    StmtKind::Assign {
                        tok: assign_op(&tok).expect("checked above"),
                        lhs: first,
                        rhs,
                    },
                )
            }
            _ => {
                if first.len() > 1 {
                    diags.push(Diagnostic::new(
                        pos.clone(),
                        Severity::Error,
                        Category::SyntaxError,
                        "unexpected comma-separated expression list outside assignment",
                    ));
                }
                Stmt::new(
                    pos,
                    StmtKind::Expr(first.into_iter().next().expect("non-empty expr list")),
                )
            }
        }
    }

    fn parse_if_stmt(&mut self, pos: Position, diags: &mut Diagnostics) -> Stmt {
        let simple = self.parse_simple_stmt(diags);
        let (init, cond) = if self.eat(&TokenKind::Semicolon) {
            let cond = self.parse_expr(diags);
            (Some(Box::new(simple)), cond)
        } else if let StmtKind::Expr(e) = simple.kind {
            (None, e)
        } else {
            diags.push(Diagnostic::new(
                pos.clone(),
                Severity::Error,
                Category::SyntaxError,
                "if condition must be a boolean expression",
            ));
            (
                None,
                crate::ast::Expr::new(pos.clone(), crate::ast::ExprKind::ident("true")),
            )
        };
        let body = self.parse_block(diags);
        let else_ = if is_kw(self.peek(), "else") {
            self.bump();
            if is_kw(self.peek(), "if") {
                self.bump();
                let ipos = self.pos_tok();
                Some(Box::new(self.parse_if_stmt(ipos, diags)))
            } else {
                let bpos = self.pos_tok();
                Some(Box::new(Stmt::new(bpos, StmtKind::Block(self.parse_block(diags)))))
            }
        } else {
            None
        };
        Stmt::new(
            pos,
            StmtKind::If {
                init,
                cond,
                body,
                else_,
            },
        )
    }

    fn finish_for_clause(
        &mut self,
        pos: Position,
        diags: &mut Diagnostics,
        init: Option<Box<Stmt>>,
    ) -> Stmt {
        self.expect(&TokenKind::Semicolon, diags, "';'");
        let cond = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(diags))
        };
        self.expect(&TokenKind::Semicolon, diags, "';'");
        let post = if self.at(&TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt(diags)))
        };
        let body = self.parse_block(diags);
        Stmt::new(
            pos,
            StmtKind::For {
                init,
                cond,
                post,
                body,
            },
        )
    }

    fn parse_for_stmt(&mut self, pos: Position, diags: &mut Diagnostics) -> Stmt {
        if self.at(&TokenKind::LBrace) {
            let body = self.parse_block(diags);
            return Stmt::new(
                pos,
                StmtKind::For {
                    init: None,
                    cond: None,
                    post: None,
                    body,
                },
            );
        }
        if is_kw(self.peek(), "range") {
            self.bump();
            let expr = self.parse_expr(diags);
            let body = self.parse_block(diags);
            return Stmt::new(
                pos,
                StmtKind::Range {
                    tok: RangeTok::Assign,
                    key: None,
                    value: None,
                    expr,
                    body,
                },
            );
        }
        if self.at(&TokenKind::Semicolon) {
            return self.finish_for_clause(pos, diags, None);
        }
        let mut simple = self.parse_simple_stmt(diags);
        if let StmtKind::Range { ref mut body, .. } = simple.kind {
            *body = self.parse_block(diags);
            return Stmt::new(pos, simple.kind);
        }
        if self.at(&TokenKind::LBrace) {
            if let StmtKind::Expr(e) = simple.kind {
                let body = self.parse_block(diags);
                return Stmt::new(
                    pos,
                    StmtKind::For {
                        init: None,
                        cond: Some(e),
                        post: None,
                        body,
                    },
                );
            }
            diags.push(Diagnostic::new(
                pos.clone(),
                Severity::Error,
                Category::SyntaxError,
                "for loop condition must be a boolean expression",
            ));
            let body = self.parse_block(diags);
            return Stmt::new(
                pos,
                StmtKind::For {
                    init: None,
                    cond: None,
                    post: None,
                    body,
                },
            );
        }
        self.finish_for_clause(pos, diags, Some(Box::new(simple)))
    }

    fn parse_switch_stmt(&mut self, pos: Position, diags: &mut Diagnostics) -> Stmt {
        let mut init = None;
        let mut header = if self.at(&TokenKind::LBrace) {
            None
        } else {
            Some(self.parse_simple_stmt(diags))
        };
        if self.eat(&TokenKind::Semicolon) {
            init = header.take().map(Box::new);
            header = if self.at(&TokenKind::LBrace) {
                None
            } else {
                Some(self.parse_simple_stmt(diags))
            };
        }

        // Type-switch guard: `x.(type)` or `name := x.(type)`.
        let type_switch_assign = match &header {
            Some(Stmt {
                kind: StmtKind::Expr(e),
                ..
            }) if matches!(e.kind, crate::ast::ExprKind::TypeAssert { ty: None, .. }) => {
                Some((None, e.clone()))
            }
            Some(Stmt {
                kind:
                    StmtKind::Assign {
                        tok: AssignOp::Define,
                        lhs,
                        rhs,
                    },
                ..
            }) if rhs.len() == 1
                && matches!(rhs[0].kind, crate::ast::ExprKind::TypeAssert { ty: None, .. })
                && lhs.len() == 1 =>
            {
                if let crate::ast::ExprKind::Ident(name) = &lhs[0].kind {
                    Some((Some(name.clone()), rhs[0].clone()))
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some((binding, assign)) = type_switch_assign {
            let cases = self.parse_type_case_clauses(diags);
            return Stmt::new(
                pos,
                StmtKind::TypeSwitch {
                    init,
                    binding,
                    assign: Box::new(assign),
                    cases,
                },
            );
        }

        let tag = header.and_then(|s| match s.kind {
            StmtKind::Expr(e) => Some(e),
            _ => None,
        });
        let cases = self.parse_case_clauses(diags);
        Stmt::new(pos, StmtKind::Switch { init, tag, cases })
    }

    fn parse_case_clauses(&mut self, diags: &mut Diagnostics) -> Vec<CaseClause> {
        self.expect(&TokenKind::LBrace, diags, "'{'");
        let mut cases = Vec::new();
        while is_kw(self.peek(), "case") || is_kw(self.peek(), "default") {
            let cpos = self.pos_tok();
            let values = if is_kw(self.peek(), "case") {
                self.bump();
                self.parse_expr_list(diags)
            } else {
                self.bump();
                Vec::new()
            };
            self.expect(&TokenKind::Colon, diags, "':'");
            let body = self.parse_case_body(diags);
            cases.push(CaseClause {
                pos: cpos,
                values,
                body,
            });
        }
        self.expect(&TokenKind::RBrace, diags, "'}'");
        cases
    }

    fn parse_type_case_clauses(
        &mut self,
        diags: &mut Diagnostics,
    ) -> Vec<(Vec<TypeExpr>, Vec<Stmt>, Position)> {
        self.expect(&TokenKind::LBrace, diags, "'{'");
        let mut cases = Vec::new();
        while is_kw(self.peek(), "case") || is_kw(self.peek(), "default") {
            let cpos = self.pos_tok();
            let types = if is_kw(self.peek(), "case") {
                self.bump();
                let mut v = vec![self.parse_type(diags)];
                while self.eat(&TokenKind::Comma) {
                    v.push(self.parse_type(diags));
                }
                v
            } else {
                self.bump();
                Vec::new()
            };
            self.expect(&TokenKind::Colon, diags, "':'");
            let body = self.parse_case_body(diags);
            cases.push((types, body, cpos));
        }
        self.expect(&TokenKind::RBrace, diags, "'}'");
        cases
    }

    fn parse_case_body(&mut self, diags: &mut Diagnostics) -> Vec<Stmt> {
        let mut body = Vec::new();
        while !is_kw(self.peek(), "case")
            && !is_kw(self.peek(), "default")
            && !self.at(&TokenKind::RBrace)
            && !self.at(&TokenKind::Eof)
        {
            body.push(self.parse_stmt(diags));
            self.eat(&TokenKind::Semicolon);
        }
        body
    }

    fn parse_select_stmt(&mut self, pos: Position, diags: &mut Diagnostics) -> Stmt {
        self.expect(&TokenKind::LBrace, diags, "'{'");
        let mut cases = Vec::new();
        while is_kw(self.peek(), "case") || is_kw(self.peek(), "default") {
            let cpos = self.pos_tok();
            let comm = if is_kw(self.peek(), "case") {
                self.bump();
                Some(Box::new(self.parse_simple_stmt(diags)))
            } else {
                self.bump();
                None
            };
            self.expect(&TokenKind::Colon, diags, "':'");
            let body = self.parse_case_body(diags);
            cases.push(CommClause {
                pos: cpos,
                comm,
                body,
            });
        }
        self.expect(&TokenKind::RBrace, diags, "'}'");
        Stmt::new(pos, StmtKind::Select { cases })
    }
}
