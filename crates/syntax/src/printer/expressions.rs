use super::align::CELL;
use super::{BlockStyle, Printer};
use crate::ast::{
    ArrayLen, BinaryExpr, CallExpr, ChanDir, Comment, Comments, Comprehension, ComprehensionKind,
    Expr, Field, FieldBlock, FuncType, LambdaBody, ListComments, RangeStyle, UnaryExpr,
};
use crate::lexer::Punct;

const LOWEST_PREC: u8 = 0;
const UNARY_PREC: u8 = 6;
const HIGHEST_PREC: u8 = 7;

impl Printer {
    pub(super) fn expr(&mut self, e: &Expr) {
        self.expr1(e, LOWEST_PREC, 1);
    }

    pub(super) fn expr0(&mut self, e: &Expr, depth: i32) {
        self.expr1(e, LOWEST_PREC, depth);
    }

    pub(super) fn expr_list(&mut self, list: &[Expr], depth: i32) {
        for (i, e) in list.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            self.expr0(e, depth);
        }
    }

    pub(super) fn expr_refs(&mut self, list: &[&Expr]) {
        for (i, e) in list.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            self.expr(e);
        }
    }

    /// Elements between `open` and `close`, one per line when `multiline`.
    #[allow(clippy::too_many_arguments)]
    fn bracketed(
        &mut self,
        open: &str,
        list: &[Expr],
        comments: &ListComments,
        close: &str,
        multiline: bool,
        depth: i32,
        ellipsis: bool,
    ) {
        self.word(open);
        if !multiline || list.is_empty() {
            self.inline_list(list, comments, depth);
            if ellipsis {
                self.word("...");
            }
            self.word(close);
            return;
        }
        let align_pairs = list.len() > 1;
        let none = Comments::default();
        self.end_line();
        self.indent += 1;
        let mut after_multiline = false;
        for (i, e) in list.iter().enumerate() {
            let last = i + 1 == list.len();
            let c = comments.get(i).unwrap_or(&none);
            after_multiline = self.element(c, i > 0, false, after_multiline, |p| {
                match e {
                    Expr::KeyValue(kv) if align_pairs => {
                        p.expr(&kv.key);
                        p.word(":");
                        p.out.push(CELL);
                        p.expr(&kv.value);
                    }
                    _ => p.expr0(e, depth),
                }
                if ellipsis && last {
                    p.word("...");
                }
                p.word(",");
            });
        }
        for c in comments.elts.iter().skip(list.len()) {
            self.closing(&c.leading);
            self.closing(&c.trailing);
        }
        self.closing(&comments.closing);
        self.indent -= 1;
        self.start_line();
        self.word(close);
    }

    /// A list on one line. A line comment inside it breaks the line and
    /// the rest of the list continues one level deeper.
    fn inline_list(&mut self, list: &[Expr], comments: &ListComments, depth: i32) {
        if comments.is_empty() {
            self.expr_list(list, depth);
            return;
        }
        let none = Comments::default();
        let mut fresh_line = false;
        for (i, e) in list.iter().enumerate() {
            let c = comments.get(i).unwrap_or(&none);
            if i > 0 {
                self.word(",");
                let prev = comments.get(i - 1).unwrap_or(&none);
                fresh_line = self.after_comments(&prev.trailing);
                if !fresh_line {
                    self.word(" ");
                }
            }
            for lc in &c.leading {
                if is_line_comment(lc) {
                    if !fresh_line {
                        self.continuation_line();
                    }
                    self.word(&lc.text);
                    self.continuation_line();
                    fresh_line = true;
                } else {
                    self.word(&lc.text);
                    self.word(" ");
                }
            }
            self.expr0(e, depth);
            fresh_line = false;
        }
        if let Some(c) = list.len().checked_sub(1).and_then(|i| comments.get(i)) {
            self.after_comments(&c.trailing);
        }
        for c in comments.elts.iter().skip(list.len()) {
            self.after_comments(&c.leading);
            self.after_comments(&c.trailing);
        }
        self.after_comments(&comments.closing);
    }

    /// Comments following an element on its line. Returns whether a line
    /// comment ended the line.
    fn after_comments(&mut self, comments: &[Comment]) -> bool {
        let mut broke = false;
        for c in comments {
            if !broke {
                self.word(" ");
            }
            self.word(&c.text);
            broke = is_line_comment(c);
            if broke {
                self.continuation_line();
            }
        }
        broke
    }

    /// Continue the current expression on a new line, one level deeper.
    fn continuation_line(&mut self) {
        self.end_line();
        self.indent += 1;
        self.start_line();
        self.indent -= 1;
    }

    pub(super) fn expr1(&mut self, e: &Expr, prec1: u8, depth: i32) {
        match e {
            Expr::Ident(id) => self.word(&id.name),
            Expr::BasicLit(lit) => self.word(&lit.value),
            Expr::Composite(c) => {
                if let Some(ty) = &c.ty {
                    self.expr1(ty, HIGHEST_PREC, depth);
                }
                self.bracketed("{", &c.elts, &c.comments, "}", c.multiline, 1, false);
            }
            Expr::SliceLit(s) => {
                self.bracketed("[", &s.elts, &s.comments, "]", s.multiline, 1, false)
            }
            Expr::FuncLit(f) => {
                self.word("func");
                self.signature(&f.sig);
                self.word(" ");
                self.block(&f.body, BlockStyle::Func);
            }
            Expr::Lambda(l) => {
                if l.parens {
                    self.word("(");
                    let names: Vec<&str> = l.params.iter().map(|p| p.name.as_str()).collect();
                    self.word(&names.join(", "));
                    self.word(") ");
                } else if let Some(param) = l.params.first() {
                    self.word(&param.name);
                    self.word(" ");
                }
                self.word("=> ");
                match &l.body {
                    LambdaBody::Block(b) => self.block(b, BlockStyle::Normal),
                    LambdaBody::Expr(x) => self.expr(x),
                }
            }
            Expr::Paren(x) => {
                if let Expr::Paren(_) = **x {
                    self.expr0(x, depth);
                } else {
                    self.word("(");
                    self.expr0(x, reduce_depth(depth));
                    self.word(")");
                }
            }
            Expr::Selector(s) => {
                self.expr1(&s.x, HIGHEST_PREC, depth);
                self.word(".");
                if s.line_break {
                    self.continuation_line();
                }
                self.word(&s.sel.name);
            }
            Expr::Index(ix) => {
                self.expr1(&ix.x, HIGHEST_PREC, 1);
                self.word("[");
                for (i, index) in ix.indices.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.expr0(index, depth + 1);
                }
                self.word("]");
            }
            Expr::Slice(s) => {
                self.expr1(&s.x, HIGHEST_PREC, 1);
                self.word("[");
                let mut indices = vec![s.low.as_deref(), s.high.as_deref()];
                if s.max.is_some() {
                    indices.push(s.max.as_deref());
                }
                let present = indices.iter().filter(|x| x.is_some()).count();
                let has_binaries = indices
                    .iter()
                    .any(|x| matches!(x, Some(Expr::Binary(_))));
                let blanks = depth <= 1 && present > 1 && has_binaries;
                for (i, x) in indices.iter().enumerate() {
                    if i > 0 {
                        if indices[i - 1].is_some() && blanks {
                            self.word(" ");
                        }
                        self.word(":");
                        if x.is_some() && blanks {
                            self.word(" ");
                        }
                    }
                    if let Some(x) = x {
                        self.expr0(x, depth + 1);
                    }
                }
                self.word("]");
            }
            Expr::TypeAssert(t) => {
                self.expr1(&t.x, HIGHEST_PREC, depth);
                self.word(".(");
                match &t.ty {
                    Some(ty) => self.expr(ty),
                    None => self.word("type"),
                }
                self.word(")");
            }
            Expr::Call(call) => self.call(call, depth),
            Expr::Star(x) => {
                if UNARY_PREC < prec1 {
                    self.word("(*");
                    self.expr(x);
                    self.word(")");
                } else {
                    self.word("*");
                    self.expr(x);
                }
            }
            Expr::Unary(u) => {
                if UNARY_PREC < prec1 {
                    self.word("(");
                    self.expr(e);
                    self.word(")");
                } else {
                    self.word(u.op.text());
                    self.expr1(&u.x, UNARY_PREC, depth);
                }
            }
            Expr::Binary(b) => self.binary(b, prec1, cutoff(b, depth), depth),
            Expr::KeyValue(kv) => {
                self.expr(&kv.key);
                self.word(": ");
                self.expr(&kv.value);
            }
            Expr::ArrayType(a) => {
                self.word("[");
                match &a.len {
                    ArrayLen::Slice => {}
                    ArrayLen::Inferred => self.word("..."),
                    ArrayLen::Fixed(len) => self.expr(len),
                }
                self.word("]");
                self.expr(&a.elt);
            }
            Expr::MapType(m) => {
                self.word("map[");
                self.expr(&m.key);
                self.word("]");
                self.expr(&m.value);
            }
            Expr::ChanType(c) => {
                self.word(match c.dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(&c.value);
            }
            Expr::FuncType(sig) => {
                self.word("func");
                self.signature(sig);
            }
            Expr::StructType(fields) => self.field_block("struct", fields),
            Expr::InterfaceType(methods) => self.field_block("interface", methods),
            Expr::Ellipsis(elt) => {
                self.word("...");
                if let Some(elt) = elt {
                    self.expr(elt);
                }
            }
            Expr::Range(r) => {
                if let Some(low) = &r.low {
                    self.expr0(low, depth + 1);
                }
                self.word(":");
                self.expr0(&r.high, depth + 1);
                if let Some(step) = &r.step {
                    self.word(":");
                    self.expr0(step, depth + 1);
                }
            }
            Expr::Comprehension(c) => self.comprehension(c, depth),
            Expr::ErrWrap(w) => {
                self.expr1(&w.x, HIGHEST_PREC, depth);
                self.word(w.tok.text());
                if let Some(default) = &w.default {
                    self.word(":");
                    self.expr1(default, UNARY_PREC, depth);
                }
            }
        }
    }

    fn comprehension(&mut self, c: &Comprehension, depth: i32) {
        let (open, close) = match c.kind {
            ComprehensionKind::List => ("[", "]"),
            ComprehensionKind::Map => ("{", "}"),
        };
        self.word(open);
        self.expr0(&c.elt, depth + 1);
        for phrase in &c.phrases {
            self.word(" for ");
            if let Some(key) = &phrase.key {
                self.word(&key.name);
                self.word(", ");
            }
            self.word(&phrase.value.name);
            self.word(match phrase.style {
                RangeStyle::Arrow => " <- ",
                _ => " in ",
            });
            self.expr0(&phrase.x, depth + 1);
            if let Some(cond) = &phrase.cond {
                self.word(if cond.comma { ", " } else { " if " });
                self.expr0(&cond.expr, depth + 1);
            }
        }
        self.word(close);
    }

    fn call(&mut self, call: &CallExpr, depth: i32) {
        let depth = if call.args.len() > 1 { depth + 1 } else { depth };
        self.expr1(&call.fun, HIGHEST_PREC, depth);
        if call.command && is_command_safe(call) {
            self.word(" ");
            self.inline_list(&call.args, &call.comments, depth);
            if call.ellipsis {
                self.word("...");
            }
            return;
        }
        self.bracketed(
            "(",
            &call.args,
            &call.comments,
            ")",
            call.multiline,
            depth,
            call.ellipsis,
        );
    }

    fn binary(&mut self, b: &BinaryExpr, prec1: u8, cutoff: u8, depth: i32) {
        let prec = b.op.precedence();
        if prec < prec1 {
            let depth = reduce_depth(depth);
            self.word("(");
            self.binary(b, LOWEST_PREC, self::cutoff(b, depth), depth);
            self.word(")");
            return;
        }
        let blank = prec < cutoff;
        self.expr1(&b.x, prec, depth + diff_prec(&b.x, prec));
        if blank {
            self.word(" ");
        }
        self.word(b.op.text());
        if blank {
            self.word(" ");
        }
        self.expr1(&b.y, prec + 1, depth + 1);
    }

    pub(super) fn signature(&mut self, sig: &FuncType) {
        self.word("(");
        self.fields(&sig.params);
        self.word(")");
        if sig.results.is_empty() {
            return;
        }
        let bare = !sig.results_paren && sig.results.len() == 1 && sig.results[0].names.is_empty();
        if bare {
            self.word(" ");
            self.expr(&sig.results[0].ty);
        } else {
            self.word(" (");
            self.fields(&sig.results);
            self.word(")");
        }
    }

    pub(super) fn fields(&mut self, fields: &[Field]) {
        for (i, f) in fields.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            if !f.names.is_empty() {
                let names: Vec<&str> = f.names.iter().map(|n| n.name.as_str()).collect();
                self.word(&names.join(", "));
                self.word(" ");
            }
            self.expr(&f.ty);
        }
    }

    fn field_block(&mut self, keyword: &str, block: &FieldBlock) {
        self.word(keyword);
        if block.fields.is_empty() {
            self.word("{}");
            return;
        }
        if block.compact {
            self.word("{ ");
            for (i, f) in block.fields.iter().enumerate() {
                if i > 0 {
                    self.word("; ");
                }
                self.field(f, ' ');
            }
            self.word(" }");
            return;
        }
        self.word(" {");
        self.end_line();
        self.indent += 1;
        for f in &block.fields {
            self.start_line();
            self.field(f, CELL);
            self.end_line();
        }
        self.indent -= 1;
        self.start_line();
        self.word("}");
    }

    fn field(&mut self, f: &Field, sep: char) {
        if !f.names.is_empty() {
            let names: Vec<&str> = f.names.iter().map(|n| n.name.as_str()).collect();
            self.word(&names.join(", "));
            if let Expr::FuncType(sig) = &f.ty {
                self.signature(sig);
            } else {
                self.out.push(sep);
                self.expr(&f.ty);
            }
        } else {
            self.expr(&f.ty);
        }
        if let Some(tag) = &f.tag {
            self.out.push(sep);
            self.word(&tag.value);
        }
    }
}

/// A command call reparses as one only when its first argument starts
/// with a token that can open command arguments.
fn is_command_safe(call: &CallExpr) -> bool {
    if !matches!(*call.fun, Expr::Ident(_) | Expr::Selector(_)) {
        return false;
    }
    call.args.first().is_some_and(starts_command_arg)
}

fn starts_command_arg(e: &Expr) -> bool {
    match e {
        Expr::Ident(_)
        | Expr::BasicLit(_)
        | Expr::SliceLit(_)
        | Expr::ArrayType(_)
        | Expr::FuncLit(_)
        | Expr::FuncType(_)
        | Expr::Lambda(_)
        | Expr::Paren(_)
        | Expr::Star(_) => true,
        Expr::Unary(u) => !matches!(u.op, Punct::Arrow),
        Expr::Composite(c) => c.ty.as_deref().is_some_and(starts_command_arg),
        Expr::Selector(s) => starts_command_arg(&s.x),
        Expr::Index(ix) => starts_command_arg(&ix.x),
        Expr::Slice(s) => starts_command_arg(&s.x),
        Expr::TypeAssert(t) => starts_command_arg(&t.x),
        Expr::Call(c) => starts_command_arg(&c.fun),
        Expr::Binary(b) => starts_command_arg(&b.x),
        Expr::ErrWrap(w) => starts_command_arg(&w.x),
        Expr::Comprehension(c) => c.kind == ComprehensionKind::List,
        _ => false,
    }
}

fn is_line_comment(c: &Comment) -> bool {
    c.text.starts_with("//")
}

fn reduce_depth(depth: i32) -> i32 {
    (depth - 1).max(1)
}

fn diff_prec(x: &Expr, prec: u8) -> i32 {
    match x {
        Expr::Binary(b) if b.op.precedence() == prec => 0,
        _ => 1,
    }
}

fn cutoff(e: &BinaryExpr, depth: i32) -> u8 {
    let (has4, has5, max_problem) = walk_binary(e);
    if max_problem > 0 {
        return max_problem + 1;
    }
    if has4 && has5 {
        if depth == 1 {
            return 5;
        }
        return 4;
    }
    if depth == 1 {
        return 6;
    }
    4
}

fn walk_binary(e: &BinaryExpr) -> (bool, bool, u8) {
    let prec = e.op.precedence();
    let mut has4 = prec == 4;
    let mut has5 = prec == 5;
    let mut max_problem = 0;

    if let Expr::Binary(l) = &*e.x {
        if l.op.precedence() >= prec {
            let (h4, h5, mp) = walk_binary(l);
            has4 |= h4;
            has5 |= h5;
            max_problem = max_problem.max(mp);
        }
    }

    match &*e.y {
        Expr::Binary(r) => {
            if r.op.precedence() > prec {
                let (h4, h5, mp) = walk_binary(r);
                has4 |= h4;
                has5 |= h5;
                max_problem = max_problem.max(mp);
            }
        }
        Expr::Star(_) => {
            // `a / *b` would print as the start of a comment.
            if e.op == Punct::Quo {
                max_problem = 5;
            }
        }
        Expr::Unary(UnaryExpr { op, .. }) => match (e.op, *op) {
            (Punct::And, Punct::And) | (Punct::And, Punct::Xor) => max_problem = 5,
            (Punct::Add, Punct::Add) | (Punct::Sub, Punct::Sub) => {
                max_problem = max_problem.max(4)
            }
            _ => {}
        },
        _ => {}
    }
    (has4, has5, max_problem)
}
