use super::Parser;
use crate::ast::{ChanDir, Field, InterfaceMethod, TypeExpr, TypeKind};
use crate::diagnostics::{Category, Diagnostic, Diagnostics, Severity};
use crate::lexer::TokenKind;

impl Parser {
    pub(super) fn parse_type(&mut self, diags: &mut Diagnostics) -> TypeExpr {
        let pos = self.pos_tok();
        match self.peek().clone() {
            TokenKind::Star => {
                self.bump();
                let inner = self.parse_type(diags);
                TypeExpr::new(pos, TypeKind::Pointer(Box::new(inner)))
            }
            TokenKind::LBracket => {
                self.bump();
                if self.eat(&TokenKind::RBracket) {
                    let elem = self.parse_type(diags);
                    TypeExpr::new(pos, TypeKind::Slice(Box::new(elem)))
                } else if self.eat(&TokenKind::Ellipsis) {
                    self.expect(&TokenKind::RBracket, diags, "']'");
                    let elem = self.parse_type(diags);
                    TypeExpr::new(
                        pos,
                        TypeKind::Array {
                            len: None,
                            elem: Box::new(elem),
                        },
                    )
                } else {
                    let len = self.parse_expr(diags);
                    self.expect(&TokenKind::RBracket, diags, "']'");
                    let elem = self.parse_type(diags);
                    TypeExpr::new(
                        pos,
                        TypeKind::Array {
                            len: Some(Box::new(len)),
                            elem: Box::new(elem),
                        },
                    )
                }
            }
            TokenKind::Ident(kw) if kw == "map" => {
                self.bump();
                self.expect(&TokenKind::LBracket, diags, "'['");
                let key = self.parse_type(diags);
                self.expect(&TokenKind::RBracket, diags, "']'");
                let value = self.parse_type(diags);
                TypeExpr::new(
                    pos,
                    TypeKind::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    },
                )
            }
            TokenKind::Arrow => {
                self.bump();
                match self.peek().clone() {
                    TokenKind::Ident(kw) if kw == "chan" => self.bump(),
                    _ => {
                        diags.push(Diagnostic::new(
                            self.pos_tok(),
                            Severity::Error,
                            Category::SyntaxError,
                            "expected 'chan' after '<-'",
                        ));
                    }
                };
                let elem = self.parse_type(diags);
                TypeExpr::new(
                    pos,
                    TypeKind::Chan {
                        dir: ChanDir::Recv,
                        elem: Box::new(elem),
                    },
                )
            }
            TokenKind::Ident(kw) if kw == "chan" => {
                self.bump();
                let dir = if self.eat(&TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let elem = self.parse_type(diags);
                TypeExpr::new(
                    pos,
                    TypeKind::Chan {
                        dir,
                        elem: Box::new(elem),
                    },
                )
            }
            TokenKind::Ident(kw) if kw == "func" => {
                self.bump();
                let sig = self.parse_signature(diags);
                TypeExpr::new(pos, TypeKind::Func(sig))
            }
            TokenKind::Ident(kw) if kw == "struct" => {
                self.bump();
                self.expect(&TokenKind::LBrace, diags, "'{'");
                let mut fields = Vec::new();
                while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
                    fields.push(self.parse_struct_field(diags));
                    self.eat(&TokenKind::Semicolon);
                }
                self.expect(&TokenKind::RBrace, diags, "'}'");
                TypeExpr::new(pos, TypeKind::Struct(fields))
            }
            TokenKind::Ident(kw) if kw == "interface" => {
                self.bump();
                self.expect(&TokenKind::LBrace, diags, "'{'");
                let mut methods = Vec::new();
                while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
                    let mpos = self.pos_tok();
                    let name = self.ident_text(diags);
                    if self.at(&TokenKind::LParen) {
                        let signature = self.parse_signature(diags);
                        methods.push(InterfaceMethod {
                            pos: mpos,
                            name,
                            signature: Some(signature),
                            embedded: None,
                        });
                    } else {
                        // embedded interface/constraint element.
                        let embedded = TypeExpr::new(mpos.clone(), TypeKind::Named { pkg: None, name });
                        methods.push(InterfaceMethod {
                            pos: mpos,
                            name: String::new(),
                            signature: None,
                            embedded: Some(Box::new(embedded)),
                        });
                    }
                    self.eat(&TokenKind::Semicolon);
                }
                self.expect(&TokenKind::RBrace, diags, "'}'");
                TypeExpr::new(pos, TypeKind::Interface(methods))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_type(diags);
                self.expect(&TokenKind::RParen, diags, "')'");
                TypeExpr::new(pos, TypeKind::Paren(Box::new(inner)))
            }
            TokenKind::Ident(kw) if kw == "const" => {
                self.bump();
                let inner = self.parse_type(diags);
                TypeExpr::new(pos, TypeKind::Const(Box::new(inner)))
            }
            TokenKind::Ident(name) => {
                self.bump();
                if self.eat(&TokenKind::Dot) {
                    let member = self.ident_text(diags);
                    TypeExpr::new(
                        pos,
                        TypeKind::Named {
                            pkg: Some(name),
                            name: member,
                        },
                    )
                } else {
                    TypeExpr::new(pos, TypeKind::Named { pkg: None, name })
                }
            }
            other => {
                diags.push(Diagnostic::new(
                    pos.clone(),
                    Severity::Error,
                    Category::SyntaxError,
                    format!("expected type, found {other:?}"),
                ));
                TypeExpr::new(pos, TypeKind::Named {
                    pkg: None,
                    name: String::new(),
                })
            }
        }
    }

    fn parse_struct_field(&mut self, diags: &mut Diagnostics) -> Field {
        let pos = self.pos_tok();
        let names = self.parse_ident_list(diags);
        let ty = if names.len() == 1
            && matches!(
                self.peek(),
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::String(_)
            )
        {
            // Embedded field: the "name" just parsed was actually the type.
            TypeExpr::new(pos.clone(), TypeKind::Named {
                pkg: None,
                name: names[0].clone(),
            })
        } else {
            self.parse_type(diags)
        };
        let tag = if let TokenKind::String(s) = self.peek().clone() {
            self.bump();
            Some(s)
        } else {
            None
        };
        Field {
            pos,
            names,
            ty,
            tag,
            variadic: false,
        }
    }
}
