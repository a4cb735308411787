use super::Parser;
use crate::ast::{BinaryOp, Expr, ExprKind, KeyValue, LitKind, TypeKind, UnaryOp};
use crate::diagnostics::{Category, Diagnostic, Diagnostics, Severity};
use crate::lexer::TokenKind;
use crate::position::Position;

fn binary_prec(tok: &TokenKind) -> Option<(u8, BinaryOp)> {
    Some(match tok {
        TokenKind::LOr => (1, BinaryOp::LOr),
        TokenKind::LAnd => (2, BinaryOp::LAnd),
        TokenKind::Eq => (3, BinaryOp::Eq),
        TokenKind::Ne => (3, BinaryOp::Ne),
        TokenKind::Lt => (3, BinaryOp::Lt),
        TokenKind::Le => (3, BinaryOp::Le),
        TokenKind::Gt => (3, BinaryOp::Gt),
        TokenKind::Ge => (3, BinaryOp::Ge),
        TokenKind::Plus => (4, BinaryOp::Add),
        TokenKind::Minus => (4, BinaryOp::Sub),
        TokenKind::Pipe => (4, BinaryOp::Or),
        TokenKind::Caret => (4, BinaryOp::Xor),
        TokenKind::Star => (5, BinaryOp::Mul),
        TokenKind::Slash => (5, BinaryOp::Quo),
        TokenKind::Percent => (5, BinaryOp::Rem),
        TokenKind::Shl => (5, BinaryOp::Shl),
        TokenKind::Shr => (5, BinaryOp::Shr),
        TokenKind::Amp => (5, BinaryOp::And),
        TokenKind::AmpCaret => (5, BinaryOp::AndNot),
        _ => return None,
    })
}

/// Converts an already-parsed ident/selector chain into the [`TypeExpr`] a
/// composite literal's type prefix or a typed conversion's callee denotes.
fn expr_to_type(e: &Expr) -> crate::ast::TypeExpr {
    match &e.kind {
        ExprKind::Ident(name) => crate::ast::TypeExpr::new(
            e.pos.clone(),
            TypeKind::Named {
                pkg: None,
                name: name.clone(),
            },
        ),
        ExprKind::Selector { x, name } => {
            if let ExprKind::Ident(pkg) = &x.kind {
                crate::ast::TypeExpr::new(
                    e.pos.clone(),
                    TypeKind::Named {
                        pkg: Some(pkg.clone()),
                        name: name.clone(),
                    },
                )
            } else {
                crate::ast::TypeExpr::new(
                    e.pos.clone(),
                    TypeKind::Named {
                        pkg: None,
                        name: name.clone(),
                    },
                )
            }
        }
        ExprKind::Type(ty) => (**ty).clone(),
        _ => crate::ast::TypeExpr::new(
            e.pos.clone(),
            TypeKind::Named {
                pkg: None,
                name: String::new(),
            },
        ),
    }
}

impl Parser {
    pub(super) fn parse_expr_list(&mut self, diags: &mut Diagnostics) -> Vec<Expr> {
        let mut exprs = vec![self.parse_expr(diags)];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expr(diags));
        }
        exprs
    }

    pub(super) fn parse_expr(&mut self, diags: &mut Diagnostics) -> Expr {
        self.parse_binary_expr(diags, 1)
    }

    fn parse_binary_expr(&mut self, diags: &mut Diagnostics, min_prec: u8) -> Expr {
        let mut left = self.parse_unary_expr(diags);
        while let Some((prec, op)) = binary_prec(self.peek()) {
            if prec < min_prec {
                break;
            }
            let pos = left.pos.clone();
            self.bump();
            let right = self.parse_binary_expr(diags, prec + 1);
            left = Expr::new(
                pos,
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        }
        left
    }

    fn parse_unary_expr(&mut self, diags: &mut Diagnostics) -> Expr {
        let pos = self.pos_tok();
        match self.peek().clone() {
            TokenKind::Amp => {
                self.bump();
                let operand = self.parse_primary_expr(diags, true);
                Expr::new(
                    pos,
                    ExprKind::Unary {
                        op: UnaryOp::Addr,
                        operand: Box::new(operand),
                    },
                )
            }
            TokenKind::Star => {
                self.bump();
                let operand = self.parse_unary_expr(diags);
                Expr::new(
                    pos,
                    ExprKind::Unary {
                        op: UnaryOp::Deref,
                        operand: Box::new(operand),
                    },
                )
            }
            TokenKind::Minus => {
                self.bump();
                let operand = self.parse_unary_expr(diags);
                Expr::new(
                    pos,
                    ExprKind::Unary {
                        op: UnaryOp::Minus,
                        operand: Box::new(operand),
                    },
                )
            }
            TokenKind::Plus => {
                self.bump();
                let operand = self.parse_unary_expr(diags);
                Expr::new(
                    pos,
                    ExprKind::Unary {
                        op: UnaryOp::Plus,
                        operand: Box::new(operand),
                    },
                )
            }
            TokenKind::Not => {
                self.bump();
                let operand = self.parse_unary_expr(diags);
                Expr::new(
                    pos,
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(operand),
                    },
                )
            }
            TokenKind::Caret => {
                self.bump();
                let operand = self.parse_unary_expr(diags);
                Expr::new(
                    pos,
                    ExprKind::Unary {
                        op: UnaryOp::Xor,
                        operand: Box::new(operand),
                    },
                )
            }
            TokenKind::Arrow => {
                self.bump();
                let operand = self.parse_unary_expr(diags);
                Expr::new(
                    pos,
                    ExprKind::Unary {
                        op: UnaryOp::Recv,
                        operand: Box::new(operand),
                    },
                )
            }
            _ => self.parse_primary_expr(diags, false),
        }
    }

    /// `under_addr` is `true` only when this primary expression is the
    /// direct operand of a `&`; it's threaded through so a channel
    /// composite literal (legal only under `&`) can be flagged when it
    /// appears bare.
    pub(super) fn parse_primary_expr(&mut self, diags: &mut Diagnostics, under_addr: bool) -> Expr {
        let mut e = self.parse_primary_start(diags, under_addr);
        loop {
            match self.peek().clone() {
                TokenKind::Dot => {
                    let pos = e.pos.clone();
                    self.bump();
                    if self.eat(&TokenKind::LParen) {
                        if matches!(self.peek(), TokenKind::Ident(s) if s == "type") {
                            self.bump();
                            self.expect(&TokenKind::RParen, diags, "')'");
                            e = Expr::new(
                                pos,
                                ExprKind::TypeAssert {
                                    x: Box::new(e),
                                    ty: None,
                                },
                            );
                        } else {
                            let ty = self.parse_type(diags);
                            self.expect(&TokenKind::RParen, diags, "')'");
                            e = Expr::new(
                                pos,
                                ExprKind::TypeAssert {
                                    x: Box::new(e),
                                    ty: Some(Box::new(ty)),
                                },
                            );
                        }
                    } else {
                        let name = self.ident_text(diags);
                        e = Expr::new(
                            pos,
                            ExprKind::Selector {
                                x: Box::new(e),
                                name,
                            },
                        );
                    }
                }
                TokenKind::LBracket => {
                    let pos = e.pos.clone();
                    self.bump();
                    e = self.parse_index_or_slice(diags, pos, e);
                }
                TokenKind::LParen => {
                    let pos = e.pos.clone();
                    self.bump();
                    let (args, ellipsis) = self.parse_call_args(diags);
                    e = Expr::new(
                        pos,
                        ExprKind::Call {
                            func: Box::new(e),
                            args,
                            ellipsis,
                            type_args: Vec::new(),
                        },
                    );
                }
                _ => break,
            }
        }
        e
    }

    fn parse_index_or_slice(&mut self, diags: &mut Diagnostics, pos: Position, x: Expr) -> Expr {
        if self.eat(&TokenKind::Colon) {
            return self.finish_slice(diags, pos, x, None);
        }
        let first = self.parse_expr(diags);
        if self.eat(&TokenKind::Colon) {
            return self.finish_slice(diags, pos, x, Some(first));
        }
        if self.eat(&TokenKind::Comma) {
            let mut indices = vec![first];
            loop {
                indices.push(self.parse_expr(diags));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                if self.at(&TokenKind::RBracket) {
                    break;
                }
            }
            self.expect(&TokenKind::RBracket, diags, "']'");
            return Expr::new(
                pos,
                ExprKind::IndexList {
                    x: Box::new(x),
                    indices,
                },
            );
        }
        self.expect(&TokenKind::RBracket, diags, "']'");
        Expr::new(
            pos,
            ExprKind::Index {
                x: Box::new(x),
                index: Box::new(first),
            },
        )
    }

    fn finish_slice(
        &mut self,
        diags: &mut Diagnostics,
        pos: Position,
        x: Expr,
        low: Option<Expr>,
    ) -> Expr {
        let high = if matches!(self.peek(), TokenKind::Colon | TokenKind::RBracket) {
            None
        } else {
            Some(self.parse_expr(diags))
        };
        let max = if self.eat(&TokenKind::Colon) {
            Some(self.parse_expr(diags))
        } else {
            None
        };
        self.expect(&TokenKind::RBracket, diags, "']'");
        Expr::new(
            pos,
            ExprKind::Slice3 {
                x: Box::new(x),
                low: low.map(Box::new),
                high: high.map(Box::new),
                max: max.map(Box::new),
            },
        )
    }

    fn parse_call_args(&mut self, diags: &mut Diagnostics) -> (Vec<Expr>, bool) {
        let mut args = Vec::new();
        let mut ellipsis = false;
        while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
            args.push(self.parse_expr(diags));
            if self.eat(&TokenKind::Ellipsis) {
                ellipsis = true;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, diags, "')'");
        (args, ellipsis)
    }

    fn parse_composite_value(&mut self, diags: &mut Diagnostics) -> Expr {
        if self.at(&TokenKind::LBrace) {
            let pos = self.pos_tok();
            let elements = self.parse_composite_elements(diags);
            Expr::new(pos, ExprKind::CompositeLit { ty: None, elements })
        } else {
            self.parse_expr(diags)
        }
    }

    pub(super) fn parse_composite_elements(&mut self, diags: &mut Diagnostics) -> Vec<Expr> {
        self.expect(&TokenKind::LBrace, diags, "'{'");
        let mut elements = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let first = self.parse_composite_value(diags);
            let elem = if self.eat(&TokenKind::Colon) {
                let pos = first.pos.clone();
                let value = self.parse_composite_value(diags);
                Expr::new(
                    pos,
                    ExprKind::KeyValue(KeyValue {
                        key: Some(Box::new(first)),
                        value: Box::new(value),
                    }),
                )
            } else {
                first
            };
            elements.push(elem);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, diags, "'}'");
        elements
    }

    /// After parsing a `[]T`/`[N]T`/`map[K]V`/`struct{...}` type prefix,
    /// decides whether it starts a composite literal (`{`) or is itself
    /// being used as a conversion function (`(`), e.g. `[]rune(s)`.
    fn finish_typed_literal_or_conversion(
        &mut self,
        diags: &mut Diagnostics,
        pos: Position,
        ty: crate::ast::TypeExpr,
    ) -> Expr {
        if self.at(&TokenKind::LBrace) {
            let elements = self.parse_composite_elements(diags);
            Expr::new(
                pos,
                ExprKind::CompositeLit {
                    ty: Some(Box::new(ty)),
                    elements,
                },
            )
        } else {
            Expr::new(pos, ExprKind::Type(Box::new(ty)))
        }
    }

    fn parse_primary_start(&mut self, diags: &mut Diagnostics, under_addr: bool) -> Expr {
        let pos = self.pos_tok();
        match self.peek().clone() {
            TokenKind::Int(s) => {
                self.bump();
                Expr::new(pos, ExprKind::BasicLit { kind: LitKind::Int, text: s })
            }
            TokenKind::Float(s) => {
                self.bump();
                Expr::new(pos, ExprKind::BasicLit { kind: LitKind::Float, text: s })
            }
            TokenKind::Imag(s) => {
                self.bump();
                Expr::new(pos, ExprKind::BasicLit { kind: LitKind::Imag, text: s })
            }
            TokenKind::Rune(s) => {
                self.bump();
                Expr::new(pos, ExprKind::BasicLit { kind: LitKind::Rune, text: s })
            }
            TokenKind::String(s) => {
                self.bump();
                Expr::new(pos, ExprKind::BasicLit { kind: LitKind::String, text: s })
            }
            TokenKind::LParen => self.parse_paren_or_cast(diags, pos),
            TokenKind::LBracket => {
                let ty = self.parse_type(diags);
                self.finish_typed_literal_or_conversion(diags, pos, ty)
            }
            TokenKind::Ident(kw) if kw == "map" || kw == "struct" => {
                let ty = self.parse_type(diags);
                self.finish_typed_literal_or_conversion(diags, pos, ty)
            }
            TokenKind::Ident(kw) if kw == "chan" => self.parse_chan_literal_or_type(diags, pos, under_addr),
            TokenKind::Arrow if matches!(self.peek_at(1), TokenKind::Ident(s) if s == "chan") => {
                self.parse_chan_literal_or_type(diags, pos, under_addr)
            }
            TokenKind::Ident(kw) if kw == "func" => {
                self.bump();
                let signature = self.parse_signature(diags);
                let body = self.parse_block(diags);
                Expr::new(pos, ExprKind::FuncLit { signature, body })
            }
            TokenKind::Ident(name) => {
                self.bump();
                if self.eat(&TokenKind::Dot) {
                    let member = self.ident_text(diags);
                    let sel = Expr::new(
                        pos.clone(),
                        ExprKind::Selector {
                            x: Box::new(Expr::new(pos.clone(), ExprKind::Ident(name))),
                            name: member,
                        },
                    );
                    if self.at(&TokenKind::LBrace) {
                        let ty = expr_to_type(&sel);
                        let elements = self.parse_composite_elements(diags);
                        Expr::new(
                            pos,
                            ExprKind::CompositeLit {
                                ty: Some(Box::new(ty)),
                                elements,
                            },
                        )
                    } else {
                        sel
                    }
                } else if self.at(&TokenKind::LBrace) {
                    let ty = crate::ast::TypeExpr::new(
                        pos.clone(),
                        TypeKind::Named {
                            pkg: None,
                            name: name.clone(),
                        },
                    );
                    let elements = self.parse_composite_elements(diags);
                    Expr::new(
                        pos,
                        ExprKind::CompositeLit {
                            ty: Some(Box::new(ty)),
                            elements,
                        },
                    )
                } else {
                    Expr::new(pos, ExprKind::Ident(name))
                }
            }
            other => {
                diags.push(Diagnostic::new(
                    pos.clone(),
                    Severity::Error,
                    Category::SyntaxError,
                    format!("expected expression, found {other:?}"),
                ));
                self.bump();
                Expr::new(pos, ExprKind::Ident(String::new()))
            }
        }
    }

    /// Recognises `(*[]TargetT)(src)`-shaped casts: the
    /// token sequence `( * [` after an opening paren can't start any other
    /// expression, so it's used as the (cheap, local) signal to switch from
    /// parsing a parenthesised expression to parsing a parenthesised type,
    /// optionally followed by `, Endianness`.
    fn parse_paren_or_cast(&mut self, diags: &mut Diagnostics, pos: Position) -> Expr {
        self.bump(); // '('
        let looks_like_cast = matches!(self.peek(), TokenKind::Star)
            && matches!(self.peek_at(1), TokenKind::LBracket);
        if looks_like_cast {
            let ty = self.parse_type(diags);
            let ty_pos = ty.pos.clone();
            if self.eat(&TokenKind::Comma) {
                let endian_pos = self.pos_tok();
                let endian = self.ident_text(diags);
                self.expect(&TokenKind::RParen, diags, "')'");
                return Expr::new(
                    pos,
                    ExprKind::Paren(Box::new(Expr::new(
                        ty_pos.clone(),
                        ExprKind::KeyValue(KeyValue {
                            key: Some(Box::new(Expr::new(ty_pos, ExprKind::Type(Box::new(ty))))),
                            value: Box::new(Expr::new(endian_pos, ExprKind::Ident(endian))),
                        }),
                    ))),
                );
            }
            self.expect(&TokenKind::RParen, diags, "')'");
            return Expr::new(
                pos,
                ExprKind::Paren(Box::new(Expr::new(
                    ty_pos,
                    ExprKind::Type(Box::new(ty)),
                ))),
            );
        }
        let inner = self.parse_expr(diags);
        self.expect(&TokenKind::RParen, diags, "')'");
        Expr::new(pos, ExprKind::Paren(Box::new(inner)))
    }

    /// Parses `chan T{N}` / `chan<- T{N}` / `<-chan T{N}` as the dialect's
    /// synthetic channel-marker composite literal, or falls back to a
    /// plain channel *type* (no literal) when no `{`
    /// follows, for `make(chan T)` and similar ordinary-Go uses.
    fn parse_chan_literal_or_type(
        &mut self,
        diags: &mut Diagnostics,
        pos: Position,
        under_addr: bool,
    ) -> Expr {
        let ty = self.parse_type(diags);
        let TypeKind::Chan { dir, elem } = ty.kind else {
            unreachable!("parse_type always returns Chan for this dispatch")
        };
        if self.at(&TokenKind::LBrace) {
            if !under_addr {
                diags.push(Diagnostic::new(
                    pos.clone(),
                    Severity::Error,
                    Category::BareChannelLiteral,
                    "channels must use &chan T{...}",
                ));
            }
            let marker = crate::ast::TypeExpr::new(ty.pos, TypeKind::ChanMarker { dir, elem });
            let elements = self.parse_composite_elements(diags);
            Expr::new(
                pos,
                ExprKind::CompositeLit {
                    ty: Some(Box::new(marker)),
                    elements,
                },
            )
        } else {
            Expr::new(
                pos.clone(),
                ExprKind::Type(Box::new(crate::ast::TypeExpr::new(
                    pos,
                    TypeKind::Chan { dir, elem },
                ))),
            )
        }
    }
}
