//! The parser façade: a small recursive-descent parser over
//! `crate::lexer`'s token stream. A `Parser` struct holds a token cursor;
//! `parse_*` methods mirror the Go grammar productions, with diagnostics
//! collected rather than thrown so recovery can continue and return a
//! partial tree wherever possible.
//!
//! Dialect forms not present in plain Go — `&chan T{N}` channel literals
//! and the typed-slice-cast forms — are recognized inline in the relevant
//! `parse_*` methods below rather than as a separate textual pass, since
//! this parser owns its own grammar outright and can build the right tree
//! shape directly (see `DESIGN.md`).

mod expr;
mod stmt;
mod ty;

use crate::ast::*;
use crate::diagnostics::{Category, Diagnostic, Diagnostics, Severity};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::position::Position;
use crate::source_file::SourceFile;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: SourceFile,
    comments: Vec<Comment>,
}

/// Parses `src` (already read from `path`) into a [`File`] plus
/// diagnostics. Never panics; syntax errors are collected and a best-effort
/// partial tree is still returned so callers can decide whether to attempt
/// translation anyway.
#[must_use]
pub fn parse(file: SourceFile) -> (File, Diagnostics) {
    let mut diags = Diagnostics::new();
    let contents = file.contents().to_string();
    let all_tokens = Lexer::new(file.clone(), &contents).tokenize(&mut diags);

    let mut comments = Vec::new();
    let tokens: Vec<Token> = all_tokens
        .into_iter()
        .filter(|t| {
            if let TokenKind::Comment { text, trailing } = &t.kind {
                comments.push(Comment {
                    pos: t.pos.clone(),
                    text: text.clone(),
                    trailing: *trailing,
                });
                false
            } else {
                true
            }
        })
        .collect();

    let mut parser = Parser {
        tokens,
        pos: 0,
        file: file.clone(),
        comments,
    };
    let result = parser.parse_file(&mut diags);
    (result, diags)
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn pos_tok(&self) -> Position {
        self.tokens[self.pos.min(self.tokens.len() - 1)].pos.clone()
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, diags: &mut Diagnostics, what: &str) {
        if !self.eat(kind) {
            diags.push(Diagnostic::new(
                self.pos_tok(),
                Severity::Error,
                Category::SyntaxError,
                format!("expected {what}, found {:?}", self.peek()),
            ));
        }
    }

    /// Skips tokens up to and including the next statement-ending `;` or
    /// block-closing `}` at the current nesting depth, so one malformed
    /// statement doesn't derail the rest of the file.
    fn recover_to_stmt_boundary(&mut self) {
        let mut depth = 0i32;
        loop {
            match self.peek() {
                TokenKind::Eof => return,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    self.bump();
                }
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth -= 1;
                    self.bump();
                }
                TokenKind::Semicolon if depth <= 0 => {
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn ident_text(&mut self, diags: &mut Diagnostics) -> String {
        if let TokenKind::Ident(s) = self.peek().clone() {
            self.bump();
            s
        } else {
            diags.push(Diagnostic::new(
                self.pos_tok(),
                Severity::Error,
                Category::SyntaxError,
                format!("expected identifier, found {:?}", self.peek()),
            ));
            String::new()
        }
    }

    fn parse_file(&mut self, diags: &mut Diagnostics) -> File {
        let start = self.pos_tok();
        match self.peek().clone() {
            TokenKind::Ident(kw) if kw == "package" => {
                self.bump();
            }
            _ => diags.push(Diagnostic::new(
                self.pos_tok(),
                Severity::Error,
                Category::SyntaxError,
                "expected 'package' keyword",
            )),
        }
        let package = self.ident_text(diags);
        self.eat(&TokenKind::Semicolon);

        let mut imports = Vec::new();
        while matches!(self.peek(), TokenKind::Ident(s) if s == "import") {
            self.bump();
            if self.eat(&TokenKind::LParen) {
                while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
                    imports.push(self.parse_import_spec(diags));
                    self.eat(&TokenKind::Semicolon);
                }
                self.expect(&TokenKind::RParen, diags, "')'");
            } else {
                imports.push(self.parse_import_spec(diags));
            }
            self.eat(&TokenKind::Semicolon);
        }

        let mut decls = Vec::new();
        while !self.at(&TokenKind::Eof) {
            match self.parse_top_level_decl(diags) {
                Some(decl) => decls.push(decl),
                None => self.recover_to_stmt_boundary(),
            }
            self.eat(&TokenKind::Semicolon);
        }

        File {
            pos: start,
            package,
            imports,
            decls,
            comments: std::mem::take(&mut self.comments),
        }
    }

    fn parse_import_spec(&mut self, diags: &mut Diagnostics) -> ImportSpec {
        let pos = self.pos_tok();
        let alias = match self.peek().clone() {
            TokenKind::Ident(s) => {
                self.bump();
                Some(s)
            }
            TokenKind::Dot => {
                self.bump();
                Some(".".to_string())
            }
            _ => None,
        };
        let path = if let TokenKind::String(s) = self.peek().clone() {
            self.bump();
            crate::literal::unquote_interpreted(&s)
        } else {
            diags.push(Diagnostic::new(
                pos.clone(),
                Severity::Error,
                Category::SyntaxError,
                "expected import path string",
            ));
            String::new()
        };
        ImportSpec { pos, alias, path }
    }

    fn parse_top_level_decl(&mut self, diags: &mut Diagnostics) -> Option<Decl> {
        let pos = self.pos_tok();
        match self.peek().clone() {
            TokenKind::Ident(kw) if kw == "const" => {
                self.bump();
                Some(Decl::new(pos, DeclKind::Const(self.parse_specs(diags, Self::parse_const_spec))))
            }
            TokenKind::Ident(kw) if kw == "var" => {
                self.bump();
                Some(Decl::new(pos, DeclKind::Var(self.parse_specs(diags, Self::parse_var_spec))))
            }
            TokenKind::Ident(kw) if kw == "type" => {
                self.bump();
                Some(Decl::new(pos, DeclKind::Type(self.parse_specs(diags, Self::parse_type_spec))))
            }
            TokenKind::Ident(kw) if kw == "func" => {
                self.bump();
                Some(Decl::new(pos, DeclKind::Func(self.parse_func_decl(pos, diags))))
            }
            _ => {
                diags.push(Diagnostic::new(
                    pos,
                    Severity::Error,
                    Category::SyntaxError,
                    format!("expected declaration, found {:?}", self.peek()),
                ));
                None
            }
        }
    }

    fn parse_specs<T>(
        &mut self,
        diags: &mut Diagnostics,
        mut one: impl FnMut(&mut Self, &mut Diagnostics) -> T,
    ) -> Vec<T> {
        if self.eat(&TokenKind::LParen) {
            let mut specs = Vec::new();
            while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
                specs.push(one(self, diags));
                self.eat(&TokenKind::Semicolon);
            }
            self.expect(&TokenKind::RParen, diags, "')'");
            specs
        } else {
            vec![one(self, diags)]
        }
    }

    fn parse_ident_list(&mut self, diags: &mut Diagnostics) -> Vec<String> {
        let mut names = vec![self.ident_text(diags)];
        while self.eat(&TokenKind::Comma) {
            names.push(self.ident_text(diags));
        }
        names
    }

    fn parse_const_spec(&mut self, diags: &mut Diagnostics) -> ConstSpec {
        let pos = self.pos_tok();
        let names = self.parse_ident_list(diags);
        let ty = self.parse_optional_type(diags);
        let values = if self.eat(&TokenKind::Assign) {
            self.parse_expr_list(diags)
        } else {
            Vec::new()
        };
        ConstSpec {
            pos,
            names,
            ty,
            values,
        }
    }

    fn parse_var_spec(&mut self, diags: &mut Diagnostics) -> VarSpec {
        let pos = self.pos_tok();
        let names = self.parse_ident_list(diags);
        let ty = self.parse_optional_type(diags);
        let values = if self.eat(&TokenKind::Assign) {
            self.parse_expr_list(diags)
        } else {
            Vec::new()
        };
        VarSpec {
            pos,
            names,
            ty,
            values,
        }
    }

    fn parse_type_spec(&mut self, diags: &mut Diagnostics) -> TypeSpec {
        let pos = self.pos_tok();
        let name = self.ident_text(diags);
        let is_alias = self.eat(&TokenKind::Assign);
        let ty = self.parse_type(diags);
        TypeSpec {
            pos,
            name,
            ty,
            is_alias,
        }
    }

    /// A type annotation is "optional" when the next token can't start one
    /// (i.e. we're looking at `=` or the spec's end).
    fn parse_optional_type(&mut self, diags: &mut Diagnostics) -> Option<TypeExpr> {
        if matches!(
            self.peek(),
            TokenKind::Assign | TokenKind::Semicolon | TokenKind::RParen | TokenKind::Comma
        ) {
            None
        } else {
            Some(self.parse_type(diags))
        }
    }

    fn parse_func_decl(&mut self, pos: Position, diags: &mut Diagnostics) -> FuncDecl {
        let receiver = if self.at(&TokenKind::LParen) {
            Some(self.parse_receiver(diags))
        } else {
            None
        };
        let name = self.ident_text(diags);
        let type_params = if self.at(&TokenKind::LBracket) {
            self.parse_type_param_list(diags)
        } else {
            Vec::new()
        };
        let signature = self.parse_signature(diags);
        let body = if self.at(&TokenKind::LBrace) {
            Some(self.parse_block(diags))
        } else {
            self.eat(&TokenKind::Semicolon);
            None
        };
        FuncDecl {
            pos,
            receiver,
            name,
            type_params,
            signature,
            body,
        }
    }

    fn parse_receiver(&mut self, diags: &mut Diagnostics) -> Field {
        let pos = self.pos_tok();
        self.expect(&TokenKind::LParen, diags, "'('");
        let mut names = Vec::new();
        // A receiver is `(name Type)`, `(name *Type)`, or the anonymous
        // `(*Type)`/`(Type)` form; only the named form binds an identifier
        // the rewrite engine's type tracker needs to see.
        if let TokenKind::Ident(name) = self.peek().clone() {
            if !matches!(self.peek_at(1), TokenKind::RParen) {
                self.bump();
                names.push(name);
            }
        }
        let ty = self.parse_type(diags);
        self.expect(&TokenKind::RParen, diags, "')'");
        Field {
            pos,
            names,
            ty,
            tag: None,
            variadic: false,
        }
    }

    fn parse_type_param_list(&mut self, diags: &mut Diagnostics) -> Vec<Field> {
        self.expect(&TokenKind::LBracket, diags, "'['");
        let mut fields = Vec::new();
        while !self.at(&TokenKind::RBracket) && !self.at(&TokenKind::Eof) {
            let pos = self.pos_tok();
            let names = self.parse_ident_list(diags);
            let ty = self.parse_type(diags);
            fields.push(Field {
                pos,
                names,
                ty,
                tag: None,
                variadic: false,
            });
            self.eat(&TokenKind::Comma);
        }
        self.expect(&TokenKind::RBracket, diags, "']'");
        fields
    }

    fn parse_signature(&mut self, diags: &mut Diagnostics) -> Signature {
        let params = self.parse_param_list(diags);
        let results = if self.at(&TokenKind::LParen) {
            self.parse_param_list(diags)
        } else if !matches!(
            self.peek(),
            TokenKind::LBrace | TokenKind::Semicolon | TokenKind::Eof
        ) {
            let pos = self.pos_tok();
            let ty = self.parse_type(diags);
            vec![Field {
                pos,
                names: Vec::new(),
                ty,
                tag: None,
                variadic: false,
            }]
        } else {
            Vec::new()
        };
        Signature { params, results }
    }

    fn parse_param_list(&mut self, diags: &mut Diagnostics) -> Vec<Field> {
        self.expect(&TokenKind::LParen, diags, "'('");
        let mut raw: Vec<(Position, Vec<String>, TypeExpr, bool)> = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
            let pos = self.pos_tok();
            let mut variadic = self.eat(&TokenKind::Ellipsis);
            // Look ahead: `name Type` vs bare `Type`. A bare type starts
            // with anything other than an identifier immediately followed
            // by another type-starting token; we use the common heuristic
            // of grouping consecutive bare idents as names only if a type
            // follows on the same field group, else each ident is its own
            // unnamed-type field.
            if let TokenKind::Ident(name) = self.peek().clone() {
                let save = self.pos;
                self.bump();
                if matches!(
                    self.peek(),
                    TokenKind::Comma | TokenKind::RParen
                ) {
                    // bare named type (e.g. `int` or a previously-declared
                    // type name used standalone) — restore and parse as type.
                    self.pos = save;
                    let ty = self.parse_type(diags);
                    raw.push((pos, Vec::new(), ty, variadic));
                } else {
                    let mut names = vec![name];
                    while self.eat(&TokenKind::Comma) {
                        if let TokenKind::Ident(n) = self.peek().clone() {
                            let save2 = self.pos;
                            self.bump();
                            if matches!(self.peek(), TokenKind::Comma) || self.at(&TokenKind::RParen)
                            {
                                self.pos = save2;
                                break;
                            }
                            names.push(n);
                        } else {
                            break;
                        }
                    }
                    variadic |= self.eat(&TokenKind::Ellipsis);
                    let ty = self.parse_type(diags);
                    raw.push((pos, names, ty, variadic));
                }
            } else {
                let ty = self.parse_type(diags);
                raw.push((pos, Vec::new(), ty, variadic));
            }
            self.eat(&TokenKind::Comma);
        }
        self.expect(&TokenKind::RParen, diags, "')'");
        raw.into_iter()
            .map(|(pos, names, ty, variadic)| Field {
                pos,
                names,
                ty,
                tag: None,
                variadic,
            })
            .collect()
    }
}
