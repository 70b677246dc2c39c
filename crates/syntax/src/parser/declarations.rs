use super::Parser;
use crate::ast::{
    BasicLit, File, FuncDecl, GenDecl, Ident, ImportDecl, ImportSpec, Item, ItemKind, LitKind,
    Spec, SpecKind, TypeSpec, ValueSpec,
};
use crate::error::ParseError;
use crate::lexer::{Keyword, Punct, Token};

impl Parser {
    pub(super) fn file(&mut self) -> Result<File, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_terminators();
            match self.peek() {
                Token::Eof => break,
                Token::Punct(p @ (Punct::RBrace | Punct::RParen)) => {
                    return Err(self.err(format!("unexpected '{}'", p.text())));
                }
                _ => {}
            }
            let mut comments = self.leading();
            let pos = self.cur_pos();
            let kind = self.item()?;
            self.finish(&mut comments);
            self.expect_terminator()?;
            items.push(Item {
                kind,
                pos,
                comments,
            });
        }
        Ok(File {
            items,
            trailing_comments: self.remaining_comments(),
        })
    }

    fn item(&mut self) -> Result<ItemKind, ParseError> {
        match self.peek().clone() {
            Token::Keyword(Keyword::Package) => {
                Err(self.err("package clause is not allowed in a class file"))
            }
            Token::Keyword(Keyword::Import) => Ok(ItemKind::Import(self.import_decl()?)),
            Token::Keyword(kw @ (Keyword::Var | Keyword::Const | Keyword::Type)) => {
                Ok(ItemKind::Decl(self.gen_decl(kw)?))
            }
            Token::Keyword(Keyword::Func)
                if matches!(self.peek_at(1), Token::Ident(_) | Token::Punct(Punct::LParen))
                    && !self.func_literal_ahead() =>
            {
                Ok(ItemKind::Func(self.func_decl()?))
            }
            _ => Ok(ItemKind::Stmt(self.stmt()?)),
        }
    }

    /// `func(...) {...}(...)` at top level is a statement, not a method.
    fn func_literal_ahead(&self) -> bool {
        if self.peek_at(1) != &Token::Punct(Punct::LParen) {
            return false;
        }
        let mut depth = 0usize;
        let mut i = self.pos + 1;
        while let Some(t) = self.tokens.get(i) {
            match t.token {
                Token::Punct(Punct::LParen) => depth += 1,
                Token::Punct(Punct::RParen) => {
                    depth -= 1;
                    if depth == 0 {
                        return !matches!(
                            self.tokens.get(i + 1).map(|t| &t.token),
                            Some(Token::Ident(_))
                        );
                    }
                }
                Token::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    pub(super) fn gen_decl(&mut self, keyword: Keyword) -> Result<GenDecl, ParseError> {
        self.expect_kw(keyword)?;
        if !self.at(Punct::LParen) {
            let kind = self.spec(keyword)?;
            return Ok(GenDecl {
                keyword,
                specs: vec![Spec {
                    kind,
                    comments: Default::default(),
                }],
                grouped: false,
                closing_comments: Vec::new(),
            });
        }
        self.advance();
        let mut specs = Vec::new();
        loop {
            self.skip_terminators();
            if self.at(Punct::RParen) {
                break;
            }
            if self.peek() == &Token::Eof {
                return Err(self.err("unterminated declaration group"));
            }
            let mut comments = self.leading();
            let kind = self.spec(keyword)?;
            self.finish(&mut comments);
            self.expect_terminator()?;
            specs.push(Spec { kind, comments });
        }
        let closing_comments = self.comments_before(self.cur().pos.offset);
        self.expect(Punct::RParen)?;
        Ok(GenDecl {
            keyword,
            specs,
            grouped: true,
            closing_comments,
        })
    }

    fn spec(&mut self, keyword: Keyword) -> Result<SpecKind, ParseError> {
        if keyword == Keyword::Type {
            let name = self.ident()?;
            let assign = self.eat(Punct::Assign);
            let ty = self.ty()?;
            return Ok(SpecKind::Type(TypeSpec { name, assign, ty }));
        }
        let mut names = vec![self.ident()?];
        while self.eat(Punct::Comma) {
            names.push(self.ident()?);
        }
        let ty = if self.at(Punct::Assign) || self.at_terminator() || self.at(Punct::RParen) {
            None
        } else {
            Some(self.ty()?)
        };
        let values = if self.eat(Punct::Assign) {
            self.expr_list()?
        } else {
            Vec::new()
        };
        Ok(SpecKind::Value(ValueSpec { names, ty, values }))
    }

    fn import_decl(&mut self) -> Result<ImportDecl, ParseError> {
        self.expect_kw(Keyword::Import)?;
        if !self.at(Punct::LParen) {
            let spec = self.import_spec()?;
            return Ok(ImportDecl {
                specs: vec![spec],
                grouped: false,
                closing_comments: Vec::new(),
            });
        }
        self.advance();
        let mut specs = Vec::new();
        loop {
            self.skip_terminators();
            if self.at(Punct::RParen) {
                break;
            }
            if self.peek() == &Token::Eof {
                return Err(self.err("unterminated import group"));
            }
            let mut comments = self.leading();
            let mut spec = self.import_spec()?;
            self.finish(&mut comments);
            self.expect_terminator()?;
            spec.comments = comments;
            specs.push(spec);
        }
        let closing_comments = self.comments_before(self.cur().pos.offset);
        self.expect(Punct::RParen)?;
        Ok(ImportDecl {
            specs,
            grouped: true,
            closing_comments,
        })
    }

    fn import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let name = match self.peek() {
            Token::Ident(_) => Some(self.ident()?),
            Token::Punct(Punct::Period) => {
                let pos = self.advance();
                Some(Ident {
                    name: ".".to_owned(),
                    pos,
                })
            }
            _ => None,
        };
        let Token::Str(value) = self.peek().clone() else {
            return Err(self.err(format!("expected import path, found {}", self.describe())));
        };
        let pos = self.advance();
        Ok(ImportSpec {
            name,
            path: BasicLit {
                kind: LitKind::String,
                value,
                pos,
            },
            comments: Default::default(),
        })
    }

    fn func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        self.expect_kw(Keyword::Func)?;
        let recv = if self.at(Punct::LParen) {
            Some(self.params()?)
        } else {
            None
        };
        let name = self.ident()?;
        let sig = self.signature()?;
        let body = if self.at(Punct::LBrace) {
            Some(self.block()?)
        } else {
            None
        };
        Ok(FuncDecl {
            recv,
            name,
            sig,
            body,
        })
    }
}
