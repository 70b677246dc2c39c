//! gofmt-style serializer for the syntax tree.
//!
//! Output uses tab indentation, gofmt's operator spacing, aligned grouped
//! declarations and trailing comments, and prints calls flagged as
//! commands without parentheses. Printing a freshly parsed file and parsing
//! the result again yields the same tree.
use crate::ast::{
    Block, CaseClause, Comment, Comments, File, FuncDecl, GenDecl, ImportDecl, ItemKind,
    RangeStyle, Spec, SpecKind, Stmt, StmtKind,
};
use crate::lexer::Keyword;

mod align;
mod expressions;

use align::{CELL, SECTION};

/// Serialize a file. The result always ends with a newline.
pub fn print_file(file: &File) -> String {
    let mut p = Printer::default();
    p.file(file);
    let mut out = align::align(&p.out);
    while out.ends_with("\n\n") {
        out.pop();
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
    /// The next line must not align with the lines above it.
    section: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ItemClass {
    Import,
    Decl(Keyword),
    Func,
    Stmt,
}

fn item_class(kind: &ItemKind) -> ItemClass {
    match kind {
        ItemKind::Import(_) => ItemClass::Import,
        ItemKind::Decl(d) => ItemClass::Decl(d.keyword),
        ItemKind::Func(_) => ItemClass::Func,
        ItemKind::Stmt(_) => ItemClass::Stmt,
    }
}

/// How a statement block may be laid out.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BlockStyle {
    /// Function bodies written on one line stay on one line.
    Func,
    Normal,
}

impl Printer {
    fn start_line(&mut self) {
        if std::mem::take(&mut self.section) {
            self.out.push(SECTION);
        }
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn end_line(&mut self) {
        self.out.push('\n');
    }

    fn blank_line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn word(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn comment_line(&mut self, c: &Comment) {
        self.start_line();
        self.word(&c.text);
        self.end_line();
    }

    fn trailing(&mut self, comments: &[Comment]) {
        for (i, c) in comments.iter().enumerate() {
            if i == 0 {
                self.out.push(CELL);
            } else {
                self.out.push(' ');
            }
            self.word(&c.text);
        }
    }

    /// Comments before a closing brace or parenthesis.
    fn closing(&mut self, comments: &[Comment]) {
        for c in comments {
            if c.blank_before {
                self.blank_line();
            }
            self.comment_line(c);
        }
    }

    /// Print one element of a statement, spec or item list with its
    /// comments. Returns whether the element spanned several lines.
    fn element(
        &mut self,
        comments: &Comments,
        allow_blank: bool,
        force_blank: bool,
        after_multiline: bool,
        body: impl FnOnce(&mut Self),
    ) -> bool {
        let mut need_blank = force_blank;
        let mut allow_blank = allow_blank;
        for c in &comments.leading {
            if allow_blank && (c.blank_before || need_blank) {
                self.blank_line();
            }
            need_blank = false;
            allow_blank = true;
            self.comment_line(c);
        }
        if allow_blank && (comments.blank_before || need_blank) {
            self.blank_line();
        }
        self.section = after_multiline;
        let start = self.out.len();
        self.start_line();
        body(self);
        self.trailing(&comments.trailing);
        self.end_line();
        self.out[start..].matches('\n').count() > 1
    }

    // ── Files and declarations ───────────────────────────────────────

    fn file(&mut self, file: &File) {
        let mut prev: Option<ItemClass> = None;
        let mut after_multiline = false;
        for item in &file.items {
            let class = item_class(&item.kind);
            let force_blank = match prev {
                None => false,
                Some(prev) => {
                    let is_decl = class != ItemClass::Stmt;
                    (prev != class && !(prev == ItemClass::Stmt && class == ItemClass::Stmt))
                        || (is_decl && !item.comments.leading.is_empty())
                }
            };
            after_multiline = self.element(
                &item.comments,
                prev.is_some(),
                force_blank,
                after_multiline,
                |p| p.item(&item.kind),
            );
            prev = Some(class);
        }
        let at_start = self.out.is_empty();
        for c in &file.trailing_comments {
            if c.blank_before && !at_start {
                self.blank_line();
            }
            self.comment_line(c);
        }
    }

    fn item(&mut self, kind: &ItemKind) {
        match kind {
            ItemKind::Import(d) => self.import_decl(d),
            ItemKind::Decl(d) => self.gen_decl(d),
            ItemKind::Func(f) => self.func_decl(f),
            ItemKind::Stmt(s) => self.stmt(s),
        }
    }

    fn import_decl(&mut self, d: &ImportDecl) {
        self.word("import");
        if !d.grouped {
            if let Some(spec) = d.specs.first() {
                self.word(" ");
                self.import_spec(spec);
            }
            return;
        }
        self.word(" (");
        self.end_line();
        self.indent += 1;
        for spec in &d.specs {
            self.element(&spec.comments, true, false, false, |p| p.import_spec(spec));
        }
        self.closing(&d.closing_comments);
        self.indent -= 1;
        self.start_line();
        self.word(")");
    }

    fn import_spec(&mut self, spec: &crate::ast::ImportSpec) {
        if let Some(name) = &spec.name {
            self.word(&name.name);
            self.word(" ");
        }
        self.word(&spec.path.value);
    }

    pub(super) fn gen_decl(&mut self, d: &GenDecl) {
        self.word(d.keyword.as_str());
        if !d.grouped {
            if let Some(spec) = d.specs.first() {
                self.word(" ");
                self.spec(spec, false);
            }
            return;
        }
        if d.specs.is_empty() && d.closing_comments.is_empty() {
            self.word(" ()");
            return;
        }
        self.word(" (");
        self.end_line();
        self.indent += 1;
        let align = d.specs.len() > 1;
        let mut after_multiline = false;
        for spec in &d.specs {
            after_multiline = self.element(&spec.comments, true, false, after_multiline, |p| {
                p.spec(spec, align)
            });
        }
        self.closing(&d.closing_comments);
        self.indent -= 1;
        self.start_line();
        self.word(")");
    }

    fn spec(&mut self, spec: &Spec, align: bool) {
        let sep = if align { CELL.to_string() } else { " ".to_owned() };
        match &spec.kind {
            SpecKind::Value(v) => {
                let names: Vec<&str> = v.names.iter().map(|n| n.name.as_str()).collect();
                self.word(&names.join(", "));
                if let Some(ty) = &v.ty {
                    self.word(&sep);
                    self.expr(ty);
                }
                if !v.values.is_empty() {
                    self.word(&sep);
                    self.word("= ");
                    self.expr_list(&v.values, 1);
                }
            }
            SpecKind::Type(t) => {
                self.word(&t.name.name);
                self.word(&sep);
                if t.assign {
                    self.word("= ");
                }
                self.expr(&t.ty);
            }
        }
    }

    fn func_decl(&mut self, f: &FuncDecl) {
        self.word("func ");
        if let Some(recv) = &f.recv {
            self.word("(");
            self.fields(recv);
            self.word(") ");
        }
        self.word(&f.name.name);
        self.signature(&f.sig);
        if let Some(body) = &f.body {
            self.word(" ");
            self.block(body, BlockStyle::Func);
        }
    }

    // ── Statements ───────────────────────────────────────────────────

    fn stmt_list(&mut self, stmts: &[Stmt]) {
        let mut after_multiline = false;
        for s in stmts {
            after_multiline =
                self.element(&s.comments, true, false, after_multiline, |p| p.stmt(&s.kind));
        }
    }

    pub(super) fn block(&mut self, b: &Block, style: BlockStyle) {
        if style == BlockStyle::Func && b.compact && b.closing_comments.is_empty() {
            if let Some(line) = one_line_body(&b.stmts) {
                self.word(&line);
                return;
            }
        }
        self.word("{");
        self.trailing_inline(&b.open_comments);
        self.end_line();
        self.indent += 1;
        self.stmt_list(&b.stmts);
        self.closing(&b.closing_comments);
        self.indent -= 1;
        self.start_line();
        self.word("}");
    }

    fn trailing_inline(&mut self, comments: &[Comment]) {
        for c in comments {
            self.word(" ");
            self.word(&c.text);
        }
    }

    fn stmt(&mut self, s: &StmtKind) {
        match s {
            StmtKind::Expr(e) => self.expr(e),
            StmtKind::Assign { lhs, op, rhs } => {
                let depth = if lhs.len() > 1 && rhs.len() > 1 { 2 } else { 1 };
                self.expr_list(lhs, depth);
                self.word(" ");
                self.word(op.text());
                self.word(" ");
                self.expr_list(rhs, depth);
            }
            StmtKind::IncDec { x, op } => {
                self.expr0(x, 2);
                self.word(op.text());
            }
            StmtKind::Send { chan, value } => {
                self.expr(chan);
                self.word(" <- ");
                self.expr(value);
            }
            StmtKind::Decl(d) => self.gen_decl(d),
            StmtKind::Block(b) => self.block(b, BlockStyle::Normal),
            StmtKind::If(s) => self.if_stmt(s),
            StmtKind::For(f) => {
                self.word("for ");
                let has_clauses = f.clauses && (f.init.is_some() || f.post.is_some());
                if has_clauses {
                    if let Some(init) = &f.init {
                        self.stmt(&init.kind);
                    }
                    self.word("; ");
                    if let Some(cond) = &f.cond {
                        self.expr(strip_parens(cond));
                    }
                    self.word("; ");
                    if let Some(post) = &f.post {
                        self.stmt(&post.kind);
                        self.word(" ");
                    }
                } else if let Some(cond) = &f.cond {
                    self.expr(strip_parens(cond));
                    self.word(" ");
                }
                self.block(&f.body, BlockStyle::Normal);
            }
            StmtKind::Range(r) => {
                self.word("for ");
                let vars: Vec<&crate::ast::Expr> = r.key.iter().chain(r.value.iter()).collect();
                match r.style {
                    RangeStyle::Range => {
                        if !vars.is_empty() {
                            self.expr_refs(&vars);
                            self.word(" ");
                            self.word(r.tok.map_or(":=", |t| t.text()));
                            self.word(" ");
                        }
                        self.word("range ");
                    }
                    RangeStyle::In => {
                        self.expr_refs(&vars);
                        self.word(" in ");
                    }
                    RangeStyle::Arrow => {
                        self.expr_refs(&vars);
                        self.word(" <- ");
                    }
                }
                self.expr(strip_parens(&r.x));
                if let Some(cond) = &r.cond {
                    self.word(if cond.comma { ", " } else { " if " });
                    self.expr(&cond.expr);
                }
                self.word(" ");
                self.block(&r.body, BlockStyle::Normal);
            }
            StmtKind::Switch(sw) => {
                self.word("switch ");
                if let Some(init) = &sw.init {
                    self.stmt(&init.kind);
                    self.word("; ");
                }
                if let Some(tag) = &sw.tag {
                    match &tag.kind {
                        StmtKind::Expr(e) => self.expr(strip_parens(e)),
                        other => self.stmt(other),
                    }
                    self.word(" ");
                }
                self.word("{");
                self.end_line();
                for clause in &sw.clauses {
                    self.case_clause(clause);
                }
                self.indent += 1;
                self.closing(&sw.closing_comments);
                self.indent -= 1;
                self.start_line();
                self.word("}");
            }
            StmtKind::Return(results) => {
                self.word("return");
                if !results.is_empty() {
                    self.word(" ");
                    self.expr_list(results, 1);
                }
            }
            StmtKind::Branch { keyword, label } => {
                self.word(keyword.as_str());
                if let Some(label) = label {
                    self.word(" ");
                    self.word(&label.name);
                }
            }
            StmtKind::Labeled { label, stmt } => {
                if self.indent > 0 && self.out.ends_with('\t') {
                    self.out.pop();
                }
                self.word(&label.name);
                self.word(":");
                if let Some(stmt) = stmt {
                    self.end_line();
                    self.start_line();
                    self.stmt(&stmt.kind);
                }
            }
            StmtKind::Go(e) => {
                self.word("go ");
                self.expr(e);
            }
            StmtKind::Defer(e) => {
                self.word("defer ");
                self.expr(e);
            }
            StmtKind::Empty => {}
        }
    }

    fn if_stmt(&mut self, s: &crate::ast::IfStmt) {
        self.word("if ");
        if let Some(init) = &s.init {
            self.stmt(&init.kind);
            self.word("; ");
        }
        self.expr(strip_parens(&s.cond));
        self.word(" ");
        self.block(&s.then, BlockStyle::Normal);
        if let Some(els) = &s.els {
            self.word(" else ");
            match &els.kind {
                StmtKind::If(inner) => self.if_stmt(inner),
                StmtKind::Block(b) => self.block(b, BlockStyle::Normal),
                other => self.stmt(other),
            }
        }
    }

    fn case_clause(&mut self, clause: &CaseClause) {
        self.element(&clause.comments, true, false, false, |p| match &clause.list {
            Some(list) => {
                p.word("case ");
                p.expr_list(list, 1);
                p.word(":");
            }
            None => p.word("default:"),
        });
        self.indent += 1;
        self.stmt_list(&clause.body);
        self.indent -= 1;
    }
}

/// `{ a; b }` for a short one-line function body, `{}` when empty.
fn one_line_body(stmts: &[Stmt]) -> Option<String> {
    if stmts.is_empty() {
        return Some("{}".to_owned());
    }
    if stmts.len() > 5 {
        return None;
    }
    let mut parts = Vec::with_capacity(stmts.len());
    for s in stmts {
        if !s.comments.is_empty() {
            return None;
        }
        let mut p = Printer::default();
        p.stmt(&s.kind);
        if p.out.contains('\n') || p.out.contains(CELL) {
            return None;
        }
        parts.push(p.out);
    }
    let line = format!("{{ {} }}", parts.join("; "));
    (line.len() <= 100).then_some(line)
}

fn strip_parens(mut e: &crate::ast::Expr) -> &crate::ast::Expr {
    while let crate::ast::Expr::Paren(inner) = e {
        if matches!(**inner, crate::ast::Expr::Composite(_)) {
            break;
        }
        e = inner;
    }
    e
}

#[cfg(test)]
mod tests;
