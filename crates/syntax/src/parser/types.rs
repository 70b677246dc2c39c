use super::Parser;
use crate::ast::{
    ArrayLen, ArrayType, BasicLit, ChanDir, ChanType, Expr, Field, FieldBlock, FuncType, Ident,
    IndexExpr, LitKind, MapType, SelectorExpr,
};
use crate::error::ParseError;
use crate::lexer::{Keyword, Punct, Token};

/// One entry of a parameter list before names are grouped with types.
enum ParamItem {
    Named(Ident, Expr),
    Bare(Expr),
}

impl Parser {
    pub(super) fn ty(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Ident(_) => {
                let name = self.ident()?;
                let mut x = Expr::Ident(name);
                if self.at(Punct::Period) && matches!(self.peek_at(1), Token::Ident(_)) {
                    self.advance();
                    let sel = self.ident()?;
                    x = Expr::Selector(SelectorExpr {
                        x: Box::new(x),
                        sel,
                        line_break: false,
                    });
                }
                if self.at(Punct::LBrack) && !self.cur().space_before {
                    self.advance();
                    let mut indices = vec![self.ty()?];
                    while self.eat(Punct::Comma) {
                        indices.push(self.ty()?);
                    }
                    self.expect(Punct::RBrack)?;
                    x = Expr::Index(IndexExpr {
                        x: Box::new(x),
                        indices,
                    });
                }
                Ok(x)
            }
            Token::Punct(Punct::Mul) => {
                self.advance();
                Ok(Expr::Star(Box::new(self.ty()?)))
            }
            Token::Punct(Punct::LBrack) => {
                self.advance();
                let len = if self.eat(Punct::RBrack) {
                    ArrayLen::Slice
                } else if self.at(Punct::Ellipsis) {
                    self.advance();
                    self.expect(Punct::RBrack)?;
                    ArrayLen::Inferred
                } else {
                    self.expr_lev += 1;
                    let len = self.expr()?;
                    self.expr_lev -= 1;
                    self.expect(Punct::RBrack)?;
                    ArrayLen::Fixed(Box::new(len))
                };
                let elt = self.ty()?;
                Ok(Expr::ArrayType(ArrayType {
                    len,
                    elt: Box::new(elt),
                }))
            }
            Token::Punct(Punct::LParen) => {
                self.advance();
                let x = self.ty()?;
                self.expect(Punct::RParen)?;
                Ok(Expr::Paren(Box::new(x)))
            }
            Token::Punct(Punct::Arrow) => {
                self.advance();
                self.expect_kw(Keyword::Chan)?;
                let value = self.ty()?;
                Ok(Expr::ChanType(ChanType {
                    dir: ChanDir::Recv,
                    value: Box::new(value),
                }))
            }
            Token::Punct(Punct::Ellipsis) => {
                self.advance();
                Ok(Expr::Ellipsis(Some(Box::new(self.ty()?))))
            }
            Token::Keyword(Keyword::Map) => {
                self.advance();
                self.expect(Punct::LBrack)?;
                let key = self.ty()?;
                self.expect(Punct::RBrack)?;
                let value = self.ty()?;
                Ok(Expr::MapType(MapType {
                    key: Box::new(key),
                    value: Box::new(value),
                }))
            }
            Token::Keyword(Keyword::Chan) => {
                self.advance();
                let dir = if self.eat(Punct::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = self.ty()?;
                Ok(Expr::ChanType(ChanType {
                    dir,
                    value: Box::new(value),
                }))
            }
            Token::Keyword(Keyword::Func) => {
                self.advance();
                Ok(Expr::FuncType(self.signature()?))
            }
            Token::Keyword(Keyword::Struct) => {
                self.advance();
                Ok(Expr::StructType(self.struct_fields()?))
            }
            Token::Keyword(Keyword::Interface) => {
                self.advance();
                Ok(Expr::InterfaceType(self.interface_methods()?))
            }
            _ => Err(self.err(format!("expected type, found {}", self.describe()))),
        }
    }

    pub(super) fn signature(&mut self) -> Result<FuncType, ParseError> {
        let params = self.params()?;
        let (results, results_paren) = if self.at(Punct::LParen) {
            (self.params()?, true)
        } else if self.result_type_follows() {
            (
                vec![Field {
                    names: Vec::new(),
                    ty: self.ty()?,
                    tag: None,
                }],
                false,
            )
        } else {
            (Vec::new(), false)
        };
        Ok(FuncType {
            params,
            results,
            results_paren,
        })
    }

    fn result_type_follows(&self) -> bool {
        matches!(
            self.peek(),
            Token::Ident(_)
                | Token::Punct(Punct::Mul | Punct::LBrack | Punct::Arrow)
                | Token::Keyword(
                    Keyword::Map | Keyword::Chan | Keyword::Func | Keyword::Struct | Keyword::Interface
                )
        )
    }

    /// `(a, b int, c string)` or `(int, string)`.
    pub(super) fn params(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(Punct::LParen)?;
        self.expr_lev += 1;
        let mut items = Vec::new();
        while !self.at(Punct::RParen) {
            items.push(self.param_item()?);
            if !self.eat(Punct::Comma) {
                break;
            }
        }
        self.expr_lev -= 1;
        self.expect(Punct::RParen)?;

        let named = items.iter().any(|i| matches!(i, ParamItem::Named(..)));
        let mut fields = Vec::new();
        if !named {
            for item in items {
                if let ParamItem::Bare(ty) = item {
                    fields.push(Field {
                        names: Vec::new(),
                        ty,
                        tag: None,
                    });
                }
            }
            return Ok(fields);
        }
        let mut pending = Vec::new();
        for item in items {
            match item {
                ParamItem::Bare(Expr::Ident(id)) => pending.push(id),
                ParamItem::Bare(_) => {
                    return Err(self.err("mixed named and unnamed parameters"));
                }
                ParamItem::Named(name, ty) => {
                    let mut names = std::mem::take(&mut pending);
                    names.push(name);
                    fields.push(Field {
                        names,
                        ty,
                        tag: None,
                    });
                }
            }
        }
        if !pending.is_empty() {
            return Err(self.err("mixed named and unnamed parameters"));
        }
        Ok(fields)
    }

    fn param_item(&mut self) -> Result<ParamItem, ParseError> {
        if matches!(self.peek(), Token::Ident(_)) {
            let spaced = self
                .tokens
                .get(self.pos + 1)
                .is_some_and(|t| t.space_before);
            match self.peek_at(1) {
                Token::Punct(Punct::Comma | Punct::RParen | Punct::Period) => {}
                Token::Punct(Punct::LBrack) if !spaced => {}
                _ => {
                    let name = self.ident()?;
                    let ty = self.ty()?;
                    return Ok(ParamItem::Named(name, ty));
                }
            }
        }
        Ok(ParamItem::Bare(self.ty()?))
    }

    fn struct_fields(&mut self) -> Result<FieldBlock, ParseError> {
        let open = self.expect(Punct::LBrace)?;
        let mut fields = Vec::new();
        loop {
            self.skip_terminators();
            if self.at(Punct::RBrace) {
                break;
            }
            let embedded = match self.peek() {
                Token::Punct(Punct::Mul) => true,
                Token::Ident(_) => matches!(
                    self.peek_at(1),
                    Token::Newline
                        | Token::Str(_)
                        | Token::Punct(Punct::Semicolon | Punct::RBrace | Punct::Period)
                ),
                _ => return Err(self.err(format!("expected field, found {}", self.describe()))),
            };
            let (names, ty) = if embedded {
                (Vec::new(), self.ty()?)
            } else {
                let mut names = vec![self.ident()?];
                while self.eat(Punct::Comma) {
                    names.push(self.ident()?);
                }
                (names, self.ty()?)
            };
            let tag = match self.peek().clone() {
                Token::Str(value) => {
                    let pos = self.advance();
                    Some(BasicLit {
                        kind: LitKind::String,
                        value,
                        pos,
                    })
                }
                _ => None,
            };
            fields.push(Field { names, ty, tag });
            self.expect_terminator()?;
        }
        let close = self.expect(Punct::RBrace)?;
        Ok(FieldBlock {
            fields,
            compact: close.line == open.line,
        })
    }

    fn interface_methods(&mut self) -> Result<FieldBlock, ParseError> {
        let open = self.expect(Punct::LBrace)?;
        let mut methods = Vec::new();
        loop {
            self.skip_terminators();
            if self.at(Punct::RBrace) {
                break;
            }
            if matches!(self.peek(), Token::Ident(_)) && self.peek_at(1) == &Token::Punct(Punct::LParen)
            {
                let name = self.ident()?;
                let sig = self.signature()?;
                methods.push(Field {
                    names: vec![name],
                    ty: Expr::FuncType(sig),
                    tag: None,
                });
            } else {
                methods.push(Field {
                    names: Vec::new(),
                    ty: self.ty()?,
                    tag: None,
                });
            }
            self.expect_terminator()?;
        }
        let close = self.expect(Punct::RBrace)?;
        Ok(FieldBlock {
            fields: methods,
            compact: close.line == open.line,
        })
    }
}
