//! Recursive-descent parser for spx class files.
//!
//! The grammar is Go's with the XGo additions spx projects rely on:
//! command-style calls (`play "bgm", true`), lambdas (`=> { ... }`,
//! `(key) => { ... }`), slice literals (`[a, b]`), untyped composite
//! literals (`{Title: "x"}`), `for x in xs` with `a:b:c` ranges,
//! comprehensions and the `!`/`?` error operators. A file is a flat list
//! of items; bare statements are the class's entry body.
use crate::ast::{Comment, Comments, File, Ident, Pos};
use crate::error::ParseError;
use crate::lexer::{lex, Keyword, Punct, Spanned, Token};

mod declarations;
mod expressions;
mod statements;
mod types;

/// Parse one source file. `filename` is only used in error messages.
pub fn parse_file(src: &str, filename: &str) -> Result<File, ParseError> {
    let lexed = lex(src, filename)?;
    let mut p = Parser::new(lexed.tokens, lexed.comments, filename);
    p.file()
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    filename: String,
    comments: Vec<Comment>,
    next_comment: usize,
    /// End offset and line of the last consumed non-terminator token.
    prev_end: usize,
    prev_line: u32,
    /// Last source line covered by a consumed token or attached comment.
    last_line: u32,
    /// Below zero inside control clauses, where `T{` opens a block rather
    /// than a composite literal.
    expr_lev: i32,
}

impl Parser {
    fn new(tokens: Vec<Spanned>, comments: Vec<Comment>, filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
            comments,
            next_comment: 0,
            prev_end: 0,
            prev_line: 0,
            last_line: 0,
            expr_lev: 0,
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].token
    }

    fn cur_pos(&self) -> Pos {
        self.cur().pos
    }

    fn advance(&mut self) -> Pos {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        let pos = t.pos;
        if t.token != Token::Newline && t.token != Token::Eof {
            self.prev_end = t.end;
            self.prev_line = t.end_line;
            self.last_line = self.last_line.max(t.end_line);
        }
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        pos
    }

    fn at(&self, p: Punct) -> bool {
        self.peek() == &Token::Punct(p)
    }

    fn at_kw(&self, kw: Keyword) -> bool {
        self.peek() == &Token::Keyword(kw)
    }

    fn eat(&mut self, p: Punct) -> bool {
        if self.at(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, p: Punct) -> Result<Pos, ParseError> {
        if self.at(p) {
            Ok(self.advance())
        } else {
            Err(self.err(format!("expected '{}', found {}", p.text(), self.describe())))
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> Result<Pos, ParseError> {
        if self.at_kw(kw) {
            Ok(self.advance())
        } else {
            Err(self.err(format!(
                "expected '{}', found {}",
                kw.as_str(),
                self.describe()
            )))
        }
    }

    fn ident(&mut self) -> Result<Ident, ParseError> {
        if let Token::Ident(name) = self.peek() {
            let name = name.clone();
            let pos = self.advance();
            Ok(Ident { name, pos })
        } else {
            Err(self.err(format!("expected identifier, found {}", self.describe())))
        }
    }

    fn at_terminator(&self) -> bool {
        matches!(
            self.peek(),
            Token::Newline | Token::Eof | Token::Punct(Punct::Semicolon)
        )
    }

    fn skip_terminators(&mut self) {
        while matches!(
            self.peek(),
            Token::Newline | Token::Punct(Punct::Semicolon)
        ) {
            self.advance();
        }
    }

    /// A statement or spec must end at a terminator or before a closer.
    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Newline | Token::Punct(Punct::Semicolon) => {
                self.advance();
                Ok(())
            }
            Token::Eof | Token::Punct(Punct::RBrace | Punct::RParen) => Ok(()),
            _ => Err(self.err(format!(
                "unexpected {} at end of statement",
                self.describe()
            ))),
        }
    }

    fn describe(&self) -> String {
        match self.peek() {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::Keyword(kw) => format!("'{}'", kw.as_str()),
            Token::Int(s) | Token::Float(s) | Token::Imag(s) | Token::Char(s) | Token::Str(s) => {
                format!("literal {}", s)
            }
            Token::Punct(p) => format!("'{}'", p.text()),
            Token::Newline => "newline".to_owned(),
            Token::Eof => "end of file".to_owned(),
        }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(&self.filename, self.cur_pos(), msg)
    }

    // -- Comment attachment ----------------------------

    /// Detach every pending comment that starts before `offset`.
    fn comments_before(&mut self, offset: usize) -> Vec<Comment> {
        let mut out = Vec::new();
        while let Some(c) = self.comments.get(self.next_comment) {
            if c.pos.offset >= offset {
                break;
            }
            let mut c = c.clone();
            c.blank_before = self.last_line > 0 && c.pos.line > self.last_line + 1;
            self.last_line = self.last_line.max(c.end_line);
            self.next_comment += 1;
            out.push(c);
        }
        out
    }

    /// Comments on the same line as the last consumed token.
    fn trailing_comments(&mut self) -> Vec<Comment> {
        self.trailing_until(usize::MAX)
    }

    /// Same-line comments of the last consumed token that start before
    /// `limit`.
    fn trailing_until(&mut self, limit: usize) -> Vec<Comment> {
        let mut out = Vec::new();
        while let Some(c) = self.comments.get(self.next_comment) {
            if c.pos.line != self.prev_line || c.pos.offset < self.prev_end || c.pos.offset >= limit
            {
                break;
            }
            let c = c.clone();
            self.last_line = self.last_line.max(c.end_line);
            self.next_comment += 1;
            out.push(c);
        }
        out
    }

    /// Leading comments for the construct starting at the current token,
    /// plus whether a blank line separates it from what came before.
    fn leading(&mut self) -> Comments {
        let leading = self.comments_before(self.cur().pos.offset);
        let blank_before = self.last_line > 0 && self.cur().pos.line > self.last_line + 1;
        Comments {
            leading,
            trailing: Vec::new(),
            blank_before,
        }
    }

    /// Finish a construct: comments stranded inside it join its leading
    /// comments, and same-line comments become trailing ones.
    fn finish(&mut self, comments: &mut Comments) {
        let mut inner = self.comments_before(self.prev_end);
        for c in &mut inner {
            c.blank_before = false;
        }
        comments.leading.append(&mut inner);
        comments.trailing = self.trailing_comments();
    }

    fn remaining_comments(&mut self) -> Vec<Comment> {
        self.comments_before(usize::MAX)
    }
}

#[cfg(test)]
mod tests;
