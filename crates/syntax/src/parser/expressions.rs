use super::Parser;
use crate::ast::{
    ArrayLen, ArrayType, BasicLit, CallExpr, Comments, CompositeLit, Comprehension,
    ComprehensionKind, ErrWrapExpr, Expr, ForPhrase, FuncLit, Ident, IndexExpr, KeyValueExpr,
    Lambda, LambdaBody, ListComments, LitKind, PhraseCond, RangeExpr, RangeStyle, SelectorExpr,
    SliceExpr, SliceLit, TypeAssertExpr, UnaryExpr,
};
use crate::error::ParseError;
use crate::lexer::{Keyword, Punct, Token};

impl Parser {
    pub(super) fn expr(&mut self) -> Result<Expr, ParseError> {
        self.binary_expr(1)
    }

    pub(super) fn expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut list = vec![self.expr()?];
        while self.eat(Punct::Comma) {
            list.push(self.expr()?);
        }
        Ok(list)
    }

    /// First expression of a statement. A name or selector followed on the
    /// same line by something that can start an argument is a
    /// command-style call: `play "bgm", true`, `onStart => { ... }`.
    pub(super) fn stmt_expr(&mut self) -> Result<Expr, ParseError> {
        if !matches!(self.peek(), Token::Ident(_)) {
            return self.expr();
        }
        let x = self.primary_expr(true)?;
        if is_command_target(&x) && self.command_arg_follows() {
            let mut call = CallExpr::new(x, Vec::new());
            call.command = true;
            loop {
                call.args.push(self.expr()?);
                if self.eat(Punct::Ellipsis) {
                    call.ellipsis = true;
                    break;
                }
                if !self.eat(Punct::Comma) {
                    break;
                }
            }
            return Ok(Expr::Call(call));
        }
        self.binary_rest(x, 1)
    }

    fn command_arg_follows(&self) -> bool {
        let t = self.cur();
        if !t.space_before {
            return false;
        }
        match &t.token {
            Token::Ident(_)
            | Token::Int(_)
            | Token::Float(_)
            | Token::Imag(_)
            | Token::Char(_)
            | Token::Str(_) => true,
            Token::Keyword(Keyword::Func) => true,
            Token::Punct(Punct::LBrack | Punct::LParen | Punct::Lambda | Punct::Not) => true,
            // `turn -90` is a command, `x - 1` is not.
            Token::Punct(Punct::Sub | Punct::Add | Punct::Mul | Punct::And | Punct::Xor) => self
                .tokens
                .get(self.pos + 1)
                .is_some_and(|next| !next.space_before),
            _ => false,
        }
    }

    fn binary_expr(&mut self, prec1: u8) -> Result<Expr, ParseError> {
        let x = self.unary_expr()?;
        self.binary_rest(x, prec1)
    }

    fn binary_rest(&mut self, mut x: Expr, prec1: u8) -> Result<Expr, ParseError> {
        loop {
            let Token::Punct(op) = *self.peek() else {
                return Ok(x);
            };
            let prec = op.precedence();
            if prec == 0 || prec < prec1 {
                return Ok(x);
            }
            self.advance();
            let y = self.binary_expr(prec + 1)?;
            x = Expr::Binary(crate::ast::BinaryExpr {
                op,
                x: Box::new(x),
                y: Box::new(y),
            });
        }
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Punct(
                op @ (Punct::Sub | Punct::Add | Punct::Not | Punct::Xor | Punct::And | Punct::Arrow),
            ) => {
                self.advance();
                let x = self.unary_expr()?;
                Ok(Expr::Unary(UnaryExpr {
                    op,
                    x: Box::new(x),
                }))
            }
            Token::Punct(Punct::Mul) => {
                self.advance();
                Ok(Expr::Star(Box::new(self.unary_expr()?)))
            }
            _ => self.primary_expr(false),
        }
    }

    /// Operand plus selectors, indexing, calls and composite literals. At
    /// statement start a spaced `[` or `(` after a name begins command
    /// arguments instead of indexing or calling it.
    fn primary_expr(&mut self, stmt_start: bool) -> Result<Expr, ParseError> {
        let mut x = self.operand(stmt_start)?;
        loop {
            let spaced = self.cur().space_before;
            match self.peek() {
                Token::Punct(Punct::Period) => {
                    self.advance();
                    x = self.selector_or_assert(x)?;
                }
                Token::Punct(Punct::LBrack) => {
                    if stmt_start && spaced && is_command_target(&x) {
                        break;
                    }
                    x = self.index_or_slice(x)?;
                }
                Token::Punct(Punct::LParen) => {
                    if stmt_start && spaced && is_command_target(&x) {
                        break;
                    }
                    x = Expr::Call(self.call_args(x)?);
                }
                Token::Punct(Punct::LBrace) => {
                    if is_literal_type(&x) && (self.expr_lev >= 0 || !is_type_name(&x)) {
                        x = self.composite(Some(x))?;
                    } else {
                        break;
                    }
                }
                Token::Punct(tok @ (Punct::Not | Punct::Question)) if !spaced => {
                    let tok = *tok;
                    self.advance();
                    let default = if tok == Punct::Question
                        && self.at(Punct::Colon)
                        && !self.cur().space_before
                    {
                        self.advance();
                        Some(Box::new(self.unary_expr()?))
                    } else {
                        None
                    };
                    x = Expr::ErrWrap(ErrWrapExpr {
                        x: Box::new(x),
                        tok,
                        default,
                    });
                }
                _ => break,
            }
        }
        Ok(x)
    }

    fn operand(&mut self, stmt_start: bool) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Ident(_) => {
                if !stmt_start && self.peek_at(1) == &Token::Punct(Punct::Lambda) {
                    let param = self.ident()?;
                    return self.lambda(vec![param], false);
                }
                Ok(Expr::Ident(self.ident()?))
            }
            Token::Int(v) => Ok(self.basic_lit(LitKind::Int, v)),
            Token::Float(v) => Ok(self.basic_lit(LitKind::Float, v)),
            Token::Imag(v) => Ok(self.basic_lit(LitKind::Imag, v)),
            Token::Char(v) => Ok(self.basic_lit(LitKind::Char, v)),
            Token::Str(v) => Ok(self.basic_lit(LitKind::String, v)),
            Token::Punct(Punct::LParen) => {
                if let Some(params) = self.paren_lambda_params() {
                    return self.lambda(params, true);
                }
                self.advance();
                self.expr_lev += 1;
                let x = self.expr()?;
                self.expr_lev -= 1;
                self.expect(Punct::RParen)?;
                Ok(Expr::Paren(Box::new(x)))
            }
            Token::Punct(Punct::Lambda) => self.lambda(Vec::new(), false),
            Token::Punct(Punct::LBrack) => self.bracket_operand(),
            Token::Punct(Punct::LBrace) => self.composite(None),
            Token::Keyword(Keyword::Func) => {
                self.advance();
                let sig = self.signature()?;
                if self.at(Punct::LBrace) {
                    let body = self.block()?;
                    Ok(Expr::FuncLit(FuncLit { sig, body }))
                } else {
                    Ok(Expr::FuncType(sig))
                }
            }
            Token::Keyword(Keyword::Map | Keyword::Chan | Keyword::Struct | Keyword::Interface) => {
                self.ty()
            }
            _ => Err(self.err(format!("expected expression, found {}", self.describe()))),
        }
    }

    fn basic_lit(&mut self, kind: LitKind, value: String) -> Expr {
        let pos = self.advance();
        Expr::BasicLit(BasicLit { kind, value, pos })
    }

    /// `(a, b) =>` lookahead; returns the parameter names when it matches.
    fn paren_lambda_params(&self) -> Option<Vec<Ident>> {
        let mut params = Vec::new();
        let mut i = self.pos + 1;
        loop {
            let t = self.tokens.get(i)?;
            match &t.token {
                Token::Punct(Punct::RParen) if params.is_empty() => break,
                Token::Ident(name) => {
                    params.push(Ident {
                        name: name.clone(),
                        pos: t.pos,
                    });
                    i += 1;
                    match &self.tokens.get(i)?.token {
                        Token::Punct(Punct::Comma) => i += 1,
                        Token::Punct(Punct::RParen) => break,
                        _ => return None,
                    }
                }
                _ => return None,
            }
        }
        (self.tokens.get(i + 1)?.token == Token::Punct(Punct::Lambda)).then_some(params)
    }

    fn lambda(&mut self, params: Vec<Ident>, parens: bool) -> Result<Expr, ParseError> {
        if parens {
            self.expect(Punct::LParen)?;
            while !self.at(Punct::RParen) {
                self.advance();
            }
            self.expect(Punct::RParen)?;
        }
        self.expect(Punct::Lambda)?;
        let body = if self.at(Punct::LBrace) {
            LambdaBody::Block(self.block()?)
        } else {
            LambdaBody::Expr(Box::new(self.expr()?))
        };
        Ok(Expr::Lambda(Lambda {
            params,
            parens,
            body,
        }))
    }

    /// `[]T`, `[...]T`, `[N]T` or a slice literal `[a, b]`.
    fn bracket_operand(&mut self) -> Result<Expr, ParseError> {
        self.expect(Punct::LBrack)?;
        if self.at(Punct::RBrack) {
            self.advance();
            if self.type_start_attached() {
                let elt = self.ty()?;
                return Ok(Expr::ArrayType(ArrayType {
                    len: ArrayLen::Slice,
                    elt: Box::new(elt),
                }));
            }
            return Ok(Expr::SliceLit(SliceLit {
                elts: Vec::new(),
                multiline: false,
                comments: ListComments::default(),
            }));
        }
        if self.at(Punct::Ellipsis) && self.peek_at(1) == &Token::Punct(Punct::RBrack) {
            self.advance();
            self.advance();
            let elt = self.ty()?;
            return Ok(Expr::ArrayType(ArrayType {
                len: ArrayLen::Inferred,
                elt: Box::new(elt),
            }));
        }
        self.expr_lev += 1;
        let mut elts = Vec::new();
        let mut comments = ListComments::default();
        let mut trailing_comma = false;
        while !self.at(Punct::RBrack) {
            let mut c = self.leading();
            elts.push(self.element()?);
            if elts.len() == 1 && self.at_kw(Keyword::For) {
                let elt = elts.remove(0);
                let x = self.comprehension(ComprehensionKind::List, elt);
                self.expr_lev -= 1;
                let x = x?;
                self.expect(Punct::RBrack)?;
                return Ok(x);
            }
            trailing_comma = self.end_element(&mut c);
            comments.elts.push(c);
            if !trailing_comma {
                break;
            }
        }
        self.expr_lev -= 1;
        let last_line = self.prev_line;
        comments.closing = self.comments_before(self.cur().pos.offset);
        let rbrack = self.expect(Punct::RBrack)?;
        if elts.len() == 1 && !trailing_comma && self.type_start_attached() {
            let len = elts.remove(0);
            let elt = self.ty()?;
            return Ok(Expr::ArrayType(ArrayType {
                len: ArrayLen::Fixed(Box::new(len)),
                elt: Box::new(elt),
            }));
        }
        Ok(Expr::SliceLit(SliceLit {
            multiline: !elts.is_empty() && rbrack.line > last_line,
            elts,
            comments,
        }))
    }

    fn type_start_attached(&self) -> bool {
        !self.cur().space_before
            && matches!(
                self.peek(),
                Token::Ident(_)
                    | Token::Keyword(
                        Keyword::Map
                            | Keyword::Chan
                            | Keyword::Func
                            | Keyword::Struct
                            | Keyword::Interface
                    )
                    | Token::Punct(Punct::Mul | Punct::LBrack)
            )
    }

    fn composite(&mut self, ty: Option<Expr>) -> Result<Expr, ParseError> {
        self.expect(Punct::LBrace)?;
        let prev = self.expr_lev;
        self.expr_lev = 1;
        let mut elts = Vec::new();
        let mut comments = ListComments::default();
        while !self.at(Punct::RBrace) {
            let mut c = self.leading();
            elts.push(self.element()?);
            if ty.is_none() && elts.len() == 1 && self.at_kw(Keyword::For) {
                let elt = elts.remove(0);
                let x = self.comprehension(ComprehensionKind::Map, elt);
                self.expr_lev = prev;
                let x = x?;
                self.expect(Punct::RBrace)?;
                return Ok(x);
            }
            let comma = self.end_element(&mut c);
            comments.elts.push(c);
            if !comma {
                break;
            }
        }
        self.expr_lev = prev;
        let last_line = self.prev_line;
        comments.closing = self.comments_before(self.cur().pos.offset);
        let rbrace = self.expect(Punct::RBrace)?;
        Ok(Expr::Composite(CompositeLit {
            ty: ty.map(Box::new),
            multiline: !elts.is_empty() && rbrace.line > last_line,
            elts,
            comments,
        }))
    }

    /// Comments up to and on the line of the element's comma trail it.
    /// Returns whether a comma followed.
    fn end_element(&mut self, comments: &mut Comments) -> bool {
        let mut inner = self.comments_before(self.prev_end);
        for c in &mut inner {
            c.blank_before = false;
        }
        comments.leading.append(&mut inner);
        comments.trailing = self.trailing_until(self.cur().pos.offset);
        if !self.eat(Punct::Comma) {
            return false;
        }
        let mut after = self.trailing_until(self.cur().pos.offset);
        comments.trailing.append(&mut after);
        true
    }

    /// The rest of `[elt for ...]` or `{k: v for ...}` after `elt`.
    fn comprehension(&mut self, kind: ComprehensionKind, elt: Expr) -> Result<Expr, ParseError> {
        let mut phrases = Vec::new();
        while self.at_kw(Keyword::For) {
            self.advance();
            phrases.push(self.for_phrase()?);
        }
        Ok(Expr::Comprehension(Comprehension {
            kind,
            elt: Box::new(elt),
            phrases,
        }))
    }

    fn for_phrase(&mut self) -> Result<ForPhrase, ParseError> {
        let first = self.ident()?;
        let (key, value) = if self.eat(Punct::Comma) {
            (Some(first), self.ident()?)
        } else {
            (None, first)
        };
        let style = match self.peek() {
            Token::Punct(Punct::Arrow) => RangeStyle::Arrow,
            Token::Ident(w) if w == "in" => RangeStyle::In,
            _ => {
                return Err(self.err(format!("expected 'in' or '<-', found {}", self.describe())))
            }
        };
        self.advance();
        let x = self.range_operand()?;
        let cond = self.phrase_cond()?;
        Ok(ForPhrase {
            key,
            value,
            style,
            x: Box::new(x),
            cond,
        })
    }

    /// What follows `<-` or `in`: an expression or a range `start:end`,
    /// `:end` or `start:end:step`.
    pub(super) fn range_operand(&mut self) -> Result<Expr, ParseError> {
        let low = if self.at(Punct::Colon) {
            None
        } else {
            let x = self.expr()?;
            if !self.at(Punct::Colon) {
                return Ok(x);
            }
            Some(Box::new(x))
        };
        self.expect(Punct::Colon)?;
        let high = self.expr()?;
        let step = if self.eat(Punct::Colon) {
            Some(Box::new(self.expr()?))
        } else {
            None
        };
        Ok(Expr::Range(RangeExpr {
            low,
            high: Box::new(high),
            step,
        }))
    }

    /// `if cond` or `, cond` after the iterated operand.
    pub(super) fn phrase_cond(&mut self) -> Result<Option<PhraseCond>, ParseError> {
        let comma = if self.at_kw(Keyword::If) {
            false
        } else if self.at(Punct::Comma) {
            true
        } else {
            return Ok(None);
        };
        self.advance();
        Ok(Some(PhraseCond {
            expr: self.expr()?,
            comma,
        }))
    }

    /// A literal element, optionally `key: value`.
    fn element(&mut self) -> Result<Expr, ParseError> {
        let x = self.expr()?;
        if self.eat(Punct::Colon) {
            let value = self.expr()?;
            return Ok(Expr::KeyValue(KeyValueExpr {
                key: Box::new(x),
                value: Box::new(value),
            }));
        }
        Ok(x)
    }

    fn selector_or_assert(&mut self, x: Expr) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Ident(name) => {
                let line_break = self.cur_pos().line > self.prev_line;
                let pos = self.advance();
                Ok(Expr::Selector(SelectorExpr {
                    x: Box::new(x),
                    sel: Ident { name, pos },
                    line_break,
                }))
            }
            // Keywords are valid member names: `sprite.goto "Target"`.
            Token::Keyword(kw) => {
                let line_break = self.cur_pos().line > self.prev_line;
                let pos = self.advance();
                Ok(Expr::Selector(SelectorExpr {
                    x: Box::new(x),
                    sel: Ident {
                        name: kw.as_str().to_owned(),
                        pos,
                    },
                    line_break,
                }))
            }
            Token::Punct(Punct::LParen) => {
                self.advance();
                let ty = if self.at_kw(Keyword::Type) {
                    self.advance();
                    None
                } else {
                    Some(Box::new(self.ty()?))
                };
                self.expect(Punct::RParen)?;
                Ok(Expr::TypeAssert(TypeAssertExpr { x: Box::new(x), ty }))
            }
            _ => Err(self.err(format!(
                "expected selector or type assertion, found {}",
                self.describe()
            ))),
        }
    }

    fn index_or_slice(&mut self, x: Expr) -> Result<Expr, ParseError> {
        self.expect(Punct::LBrack)?;
        self.expr_lev += 1;
        let mut parts: [Option<Box<Expr>>; 3] = [None, None, None];
        if !self.at(Punct::Colon) {
            parts[0] = Some(Box::new(self.expr_or_type()?));
        }
        let mut colons = 0;
        while self.at(Punct::Colon) && colons < 2 {
            self.advance();
            colons += 1;
            if !self.at(Punct::Colon) && !self.at(Punct::RBrack) {
                parts[colons] = Some(Box::new(self.expr()?));
            }
        }
        let mut extra = Vec::new();
        if colons == 0 {
            while self.eat(Punct::Comma) {
                if self.at(Punct::RBrack) {
                    break;
                }
                extra.push(self.expr_or_type()?);
            }
        }
        self.expr_lev -= 1;
        self.expect(Punct::RBrack)?;
        let [low, high, max] = parts;
        if colons > 0 {
            return Ok(Expr::Slice(SliceExpr {
                x: Box::new(x),
                low,
                high,
                max,
            }));
        }
        let mut indices: Vec<Expr> = low.map(|b| *b).into_iter().collect();
        indices.extend(extra);
        Ok(Expr::Index(IndexExpr {
            x: Box::new(x),
            indices,
        }))
    }

    pub(super) fn call_args(&mut self, fun: Expr) -> Result<CallExpr, ParseError> {
        self.expect(Punct::LParen)?;
        self.expr_lev += 1;
        let mut call = CallExpr::new(fun, Vec::new());
        while !self.at(Punct::RParen) {
            let mut c = self.leading();
            call.args.push(self.expr_or_type()?);
            if self.eat(Punct::Ellipsis) {
                call.ellipsis = true;
            }
            let comma = self.end_element(&mut c);
            call.comments.elts.push(c);
            if !comma {
                break;
            }
        }
        self.expr_lev -= 1;
        let last_line = self.prev_line;
        call.comments.closing = self.comments_before(self.cur().pos.offset);
        let rparen = self.expect(Punct::RParen)?;
        call.multiline = !call.args.is_empty() && rparen.line > last_line;
        Ok(call)
    }

    /// Call arguments and index expressions may be bare types: `make([]int, 3)`.
    fn expr_or_type(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Token::Keyword(Keyword::Map | Keyword::Chan | Keyword::Struct | Keyword::Interface) => {
                let ty = self.ty()?;
                if self.at(Punct::LBrace) {
                    return self.composite(Some(ty));
                }
                Ok(ty)
            }
            _ => self.expr(),
        }
    }
}

fn is_command_target(x: &Expr) -> bool {
    matches!(x, Expr::Ident(_) | Expr::Selector(_))
}

fn is_type_name(x: &Expr) -> bool {
    match x {
        Expr::Ident(_) => true,
        Expr::Selector(sel) => matches!(*sel.x, Expr::Ident(_)),
        _ => false,
    }
}

fn is_literal_type(x: &Expr) -> bool {
    match x {
        Expr::Ident(_) | Expr::ArrayType(_) | Expr::MapType(_) | Expr::StructType(_) => true,
        Expr::Selector(sel) => matches!(*sel.x, Expr::Ident(_)),
        Expr::Index(ix) => is_type_name(&ix.x),
        _ => false,
    }
}
