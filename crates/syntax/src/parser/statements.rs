use super::Parser;
use crate::ast::{
    Block, CallExpr, CaseClause, Comment, Expr, ForStmt, Ident, IfStmt, RangeStmt, RangeStyle,
    Stmt, StmtKind, SwitchStmt,
};
use crate::error::ParseError;
use crate::lexer::{Keyword, Punct, Token};

impl Parser {
    pub(super) fn block(&mut self) -> Result<Block, ParseError> {
        let lbrace = self.expect(Punct::LBrace)?;
        let open_comments = self.trailing_comments();
        let prev = self.expr_lev;
        self.expr_lev = 0;
        let (stmts, closing_comments) = self.stmt_list()?;
        self.expr_lev = prev;
        let rbrace = self.expect(Punct::RBrace)?;
        Ok(Block {
            stmts,
            open_comments,
            closing_comments,
            compact: rbrace.line == lbrace.line,
        })
    }

    /// Statements up to a closing brace or the next case clause. Comments
    /// just before a closing brace are returned separately.
    pub(super) fn stmt_list(&mut self) -> Result<(Vec<Stmt>, Vec<Comment>), ParseError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_terminators();
            match self.peek() {
                Token::Punct(Punct::RBrace) | Token::Eof => {
                    let closing = self.comments_before(self.cur().pos.offset);
                    return Ok((stmts, closing));
                }
                Token::Keyword(Keyword::Case | Keyword::Default) => {
                    return Ok((stmts, Vec::new()));
                }
                Token::Punct(Punct::RParen) => {
                    return Err(self.err("unexpected ')'"));
                }
                _ => {}
            }
            let mut comments = self.leading();
            let pos = self.cur_pos();
            let kind = self.stmt()?;
            self.finish(&mut comments);
            self.expect_terminator()?;
            stmts.push(Stmt {
                kind,
                pos,
                comments,
            });
        }
    }

    pub(super) fn stmt(&mut self) -> Result<StmtKind, ParseError> {
        match self.peek().clone() {
            Token::Keyword(kw @ (Keyword::Var | Keyword::Const | Keyword::Type)) => {
                Ok(StmtKind::Decl(self.gen_decl(kw)?))
            }
            Token::Keyword(Keyword::Return) => {
                self.advance();
                if self.at_terminator() || self.at(Punct::RBrace) {
                    Ok(StmtKind::Return(Vec::new()))
                } else {
                    Ok(StmtKind::Return(self.expr_list()?))
                }
            }
            Token::Keyword(kw @ (Keyword::Break | Keyword::Continue | Keyword::Fallthrough)) => {
                self.advance();
                let label = match self.peek() {
                    Token::Ident(_) if kw != Keyword::Fallthrough => Some(self.ident()?),
                    _ => None,
                };
                Ok(StmtKind::Branch { keyword: kw, label })
            }
            Token::Keyword(Keyword::Goto) => self.goto_stmt(),
            Token::Keyword(Keyword::Go) => {
                self.advance();
                Ok(StmtKind::Go(self.expr()?))
            }
            Token::Keyword(Keyword::Defer) => {
                self.advance();
                Ok(StmtKind::Defer(self.expr()?))
            }
            Token::Keyword(Keyword::If) => Ok(StmtKind::If(self.if_stmt()?)),
            Token::Keyword(Keyword::For) => self.for_stmt(),
            Token::Keyword(Keyword::Switch) => Ok(StmtKind::Switch(self.switch_stmt()?)),
            Token::Keyword(Keyword::Select) => {
                Err(self.err("select statements are not supported"))
            }
            Token::Punct(Punct::LBrace) => Ok(StmtKind::Block(self.block()?)),
            Token::Ident(_) if self.peek_at(1) == &Token::Punct(Punct::Colon) => {
                let label = self.ident()?;
                self.advance();
                self.skip_terminators();
                let stmt = if self.at(Punct::RBrace) || self.peek() == &Token::Eof {
                    None
                } else {
                    let pos = self.cur_pos();
                    let kind = self.stmt()?;
                    Some(Box::new(Stmt {
                        kind,
                        pos,
                        comments: Default::default(),
                    }))
                };
                Ok(StmtKind::Labeled { label, stmt })
            }
            _ => self.simple_stmt(true),
        }
    }

    /// `goto label` is a jump; any other use of the word is a call to a
    /// sprite method of that name (`goto "Target"`, `goto(x)`).
    fn goto_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let pos = self.advance();
        let fun = Expr::Ident(Ident {
            name: Keyword::Goto.as_str().to_owned(),
            pos,
        });
        if matches!(self.peek(), Token::Ident(_))
            && matches!(
                self.peek_at(1),
                Token::Newline | Token::Eof | Token::Punct(Punct::Semicolon | Punct::RBrace)
            )
        {
            let label = self.ident()?;
            return Ok(StmtKind::Branch {
                keyword: Keyword::Goto,
                label: Some(label),
            });
        }
        let call = if self.at(Punct::LParen) && !self.cur().space_before {
            self.call_args(fun)?
        } else {
            let mut call = CallExpr::new(fun, self.expr_list()?);
            call.command = true;
            call
        };
        Ok(StmtKind::Expr(Expr::Call(call)))
    }

    pub(super) fn simple_stmt(&mut self, allow_command: bool) -> Result<StmtKind, ParseError> {
        let lhs = if allow_command {
            let first = self.stmt_expr()?;
            if matches!(&first, Expr::Call(c) if c.command) {
                return Ok(StmtKind::Expr(first));
            }
            let mut lhs = vec![first];
            while self.eat(Punct::Comma) {
                lhs.push(self.expr()?);
            }
            lhs
        } else {
            self.expr_list()?
        };
        self.simple_rest(lhs)
    }

    fn simple_rest(&mut self, mut lhs: Vec<Expr>) -> Result<StmtKind, ParseError> {
        match self.peek().clone() {
            Token::Punct(op) if op.is_assign_op() => {
                self.advance();
                let rhs = self.expr_list()?;
                Ok(StmtKind::Assign { lhs, op, rhs })
            }
            Token::Punct(op @ (Punct::Inc | Punct::Dec)) if lhs.len() == 1 => {
                self.advance();
                Ok(StmtKind::IncDec {
                    x: lhs.remove(0),
                    op,
                })
            }
            Token::Punct(Punct::Arrow) if lhs.len() == 1 => {
                self.advance();
                let value = self.expr()?;
                Ok(StmtKind::Send {
                    chan: lhs.remove(0),
                    value,
                })
            }
            _ if lhs.len() == 1 => Ok(StmtKind::Expr(lhs.remove(0))),
            _ => Err(self.err(format!(
                "expected assignment after expression list, found {}",
                self.describe()
            ))),
        }
    }

    fn cond_expr(&self, stmt: StmtKind) -> Result<Expr, ParseError> {
        match stmt {
            StmtKind::Expr(e) => Ok(e),
            _ => Err(self.err("expected condition expression")),
        }
    }

    fn if_stmt(&mut self) -> Result<IfStmt, ParseError> {
        self.expect_kw(Keyword::If)?;
        let prev = self.expr_lev;
        self.expr_lev = -1;
        let first = if self.at(Punct::Semicolon) {
            None
        } else {
            Some(self.simple_stmt(false)?)
        };
        let (init, cond) = if self.eat(Punct::Semicolon) {
            let init = first.map(|kind| Box::new(Stmt::new(kind)));
            (init, self.expr()?)
        } else {
            match first {
                Some(kind) => (None, self.cond_expr(kind)?),
                None => return Err(self.err("missing condition in if statement")),
            }
        };
        self.expr_lev = prev;
        let then = self.block()?;
        let els = if self.at_kw(Keyword::Else) {
            self.advance();
            let pos = self.cur_pos();
            let kind = if self.at_kw(Keyword::If) {
                StmtKind::If(self.if_stmt()?)
            } else {
                StmtKind::Block(self.block()?)
            };
            Some(Box::new(Stmt {
                kind,
                pos,
                comments: Default::default(),
            }))
        } else {
            None
        };
        Ok(IfStmt {
            init,
            cond,
            then,
            els,
        })
    }

    /// `for x in xs` / `for k, v <- m` lookahead.
    fn in_range_ahead(&self) -> Option<usize> {
        if !matches!(self.peek(), Token::Ident(_)) {
            return None;
        }
        let mut n = 1;
        if self.peek_at(1) == &Token::Punct(Punct::Comma) && matches!(self.peek_at(2), Token::Ident(_))
        {
            n = 3;
        }
        match self.peek_at(n) {
            Token::Ident(w) if w == "in" => Some(n),
            Token::Punct(Punct::Arrow) => Some(n),
            _ => None,
        }
    }

    fn for_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_kw(Keyword::For)?;
        let prev = self.expr_lev;
        self.expr_lev = -1;
        let header = self.for_header();
        self.expr_lev = prev;
        let header = header?;
        let body = self.block()?;
        Ok(match header {
            ForHeader::Range(mut range) => {
                range.body = body;
                StmtKind::Range(range)
            }
            ForHeader::Loop {
                init,
                cond,
                post,
                clauses,
            } => StmtKind::For(ForStmt {
                init,
                cond,
                post,
                clauses,
                body,
            }),
        })
    }

    fn for_header(&mut self) -> Result<ForHeader, ParseError> {
        if self.at(Punct::LBrace) {
            return Ok(ForHeader::Loop {
                init: None,
                cond: None,
                post: None,
                clauses: false,
            });
        }
        if self.at_kw(Keyword::Range) {
            self.advance();
            let x = self.expr()?;
            return Ok(ForHeader::Range(RangeStmt {
                key: None,
                value: None,
                tok: None,
                style: RangeStyle::Range,
                x,
                cond: None,
                body: Block::default(),
            }));
        }
        if let Some(n) = self.in_range_ahead() {
            let first = Expr::Ident(self.ident()?);
            let (key, value) = if n == 3 {
                self.advance();
                (Some(first), Some(Expr::Ident(self.ident()?)))
            } else {
                (None, Some(first))
            };
            let style = if self.at(Punct::Arrow) {
                RangeStyle::Arrow
            } else {
                RangeStyle::In
            };
            self.advance();
            let x = self.range_operand()?;
            let cond = self.phrase_cond()?;
            return Ok(ForHeader::Range(RangeStmt {
                key,
                value,
                tok: None,
                style,
                x,
                cond,
                body: Block::default(),
            }));
        }

        let first = if self.at(Punct::Semicolon) {
            None
        } else {
            let mut lhs = self.expr_list()?;
            if (self.at(Punct::Define) || self.at(Punct::Assign))
                && self.peek_at(1) == &Token::Keyword(Keyword::Range)
            {
                let Token::Punct(tok) = *self.peek() else {
                    return Err(self.err("expected assignment"));
                };
                self.advance();
                self.advance();
                let x = self.expr()?;
                let value = if lhs.len() > 1 { Some(lhs.remove(1)) } else { None };
                return Ok(ForHeader::Range(RangeStmt {
                    key: Some(lhs.remove(0)),
                    value,
                    tok: Some(tok),
                    style: RangeStyle::Range,
                    x,
                    cond: None,
                    body: Block::default(),
                }));
            }
            Some(self.simple_rest(lhs)?)
        };

        if !self.eat(Punct::Semicolon) {
            let cond = match first {
                Some(kind) => Some(self.cond_expr(kind)?),
                None => None,
            };
            return Ok(ForHeader::Loop {
                init: None,
                cond,
                post: None,
                clauses: false,
            });
        }
        let init = first.map(|kind| Box::new(Stmt::new(kind)));
        let cond = if self.at(Punct::Semicolon) {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(Punct::Semicolon)?;
        let post = if self.at(Punct::LBrace) {
            None
        } else {
            Some(Box::new(Stmt::new(self.simple_stmt(false)?)))
        };
        Ok(ForHeader::Loop {
            init,
            cond,
            post,
            clauses: true,
        })
    }

    fn switch_stmt(&mut self) -> Result<SwitchStmt, ParseError> {
        self.expect_kw(Keyword::Switch)?;
        let prev = self.expr_lev;
        self.expr_lev = -1;
        let mut init = None;
        let mut tag = None;
        if !self.at(Punct::LBrace) {
            let first = if self.at(Punct::Semicolon) {
                None
            } else {
                Some(self.simple_stmt(false)?)
            };
            if self.eat(Punct::Semicolon) {
                init = first.map(|kind| Box::new(Stmt::new(kind)));
                if !self.at(Punct::LBrace) {
                    tag = Some(Box::new(Stmt::new(self.simple_stmt(false)?)));
                }
            } else {
                tag = first.map(|kind| Box::new(Stmt::new(kind)));
            }
        }
        self.expr_lev = prev;
        self.expect(Punct::LBrace)?;
        let mut clauses = Vec::new();
        let mut closing_comments = Vec::new();
        loop {
            self.skip_terminators();
            if self.at(Punct::RBrace) || self.peek() == &Token::Eof {
                break;
            }
            let mut comments = self.leading();
            let list = if self.at_kw(Keyword::Default) {
                self.advance();
                None
            } else {
                self.expect_kw(Keyword::Case)?;
                Some(self.expr_list()?)
            };
            self.expect(Punct::Colon)?;
            comments.trailing = self.trailing_comments();
            let (body, closing) = self.stmt_list()?;
            closing_comments = closing;
            clauses.push(CaseClause {
                list,
                body,
                comments,
            });
        }
        closing_comments.extend(self.comments_before(self.cur().pos.offset));
        self.expect(Punct::RBrace)?;
        Ok(SwitchStmt {
            init,
            tag,
            clauses,
            closing_comments,
        })
    }
}

enum ForHeader {
    Range(RangeStmt),
    Loop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        clauses: bool,
    },
}
