//! Mutable tree traversal.
//!
//! Override the `visit_*` hooks and call the matching `walk_*` function to
//! continue into children. `walk_expr` visits only the children of an
//! expression, so a hook that replaces a node can walk the replacement
//! without seeing it twice.
use crate::ast::{
    ArrayLen, Block, Expr, File, GenDecl, ItemKind, LambdaBody, SpecKind, StmtKind,
};

pub trait VisitMut {
    fn visit_stmt(&mut self, stmt: &mut StmtKind) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        walk_expr(self, expr);
    }

    fn visit_block(&mut self, block: &mut Block) {
        walk_block(self, block);
    }
}

pub fn walk_file<V: VisitMut + ?Sized>(v: &mut V, file: &mut File) {
    for item in &mut file.items {
        match &mut item.kind {
            ItemKind::Import(_) => {}
            ItemKind::Decl(d) => walk_gen_decl(v, d),
            ItemKind::Func(f) => {
                if let Some(body) = &mut f.body {
                    v.visit_block(body);
                }
            }
            ItemKind::Stmt(s) => v.visit_stmt(s),
        }
    }
}

pub fn walk_block<V: VisitMut + ?Sized>(v: &mut V, block: &mut Block) {
    for stmt in &mut block.stmts {
        v.visit_stmt(&mut stmt.kind);
    }
}

fn walk_gen_decl<V: VisitMut + ?Sized>(v: &mut V, d: &mut GenDecl) {
    for spec in &mut d.specs {
        if let SpecKind::Value(vs) = &mut spec.kind {
            for value in &mut vs.values {
                v.visit_expr(value);
            }
        }
    }
}

pub fn walk_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut StmtKind) {
    match stmt {
        StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => v.visit_expr(e),
        StmtKind::Assign { lhs, rhs, .. } => {
            for e in lhs.iter_mut().chain(rhs.iter_mut()) {
                v.visit_expr(e);
            }
        }
        StmtKind::IncDec { x, .. } => v.visit_expr(x),
        StmtKind::Send { chan, value } => {
            v.visit_expr(chan);
            v.visit_expr(value);
        }
        StmtKind::Decl(d) => walk_gen_decl(v, d),
        StmtKind::Block(b) => v.visit_block(b),
        StmtKind::If(s) => {
            if let Some(init) = &mut s.init {
                v.visit_stmt(&mut init.kind);
            }
            v.visit_expr(&mut s.cond);
            v.visit_block(&mut s.then);
            if let Some(els) = &mut s.els {
                v.visit_stmt(&mut els.kind);
            }
        }
        StmtKind::For(f) => {
            if let Some(init) = &mut f.init {
                v.visit_stmt(&mut init.kind);
            }
            if let Some(cond) = &mut f.cond {
                v.visit_expr(cond);
            }
            if let Some(post) = &mut f.post {
                v.visit_stmt(&mut post.kind);
            }
            v.visit_block(&mut f.body);
        }
        StmtKind::Range(r) => {
            v.visit_expr(&mut r.x);
            if let Some(cond) = &mut r.cond {
                v.visit_expr(&mut cond.expr);
            }
            v.visit_block(&mut r.body);
        }
        StmtKind::Switch(sw) => {
            if let Some(init) = &mut sw.init {
                v.visit_stmt(&mut init.kind);
            }
            if let Some(tag) = &mut sw.tag {
                v.visit_stmt(&mut tag.kind);
            }
            for clause in &mut sw.clauses {
                for e in clause.list.iter_mut().flatten() {
                    v.visit_expr(e);
                }
                for s in &mut clause.body {
                    v.visit_stmt(&mut s.kind);
                }
            }
        }
        StmtKind::Return(results) => {
            for e in results {
                v.visit_expr(e);
            }
        }
        StmtKind::Labeled { stmt, .. } => {
            if let Some(s) = stmt {
                v.visit_stmt(&mut s.kind);
            }
        }
        StmtKind::Branch { .. } | StmtKind::Empty => {}
    }
}

pub fn walk_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Ident(_) | Expr::BasicLit(_) => {}
        Expr::Composite(c) => {
            if let Some(ty) = &mut c.ty {
                v.visit_expr(ty);
            }
            for e in &mut c.elts {
                v.visit_expr(e);
            }
        }
        Expr::SliceLit(s) => {
            for e in &mut s.elts {
                v.visit_expr(e);
            }
        }
        Expr::FuncLit(f) => v.visit_block(&mut f.body),
        Expr::Lambda(l) => match &mut l.body {
            LambdaBody::Block(b) => v.visit_block(b),
            LambdaBody::Expr(e) => v.visit_expr(e),
        },
        Expr::Paren(x) | Expr::Star(x) => v.visit_expr(x),
        Expr::Selector(s) => v.visit_expr(&mut s.x),
        Expr::Index(ix) => {
            v.visit_expr(&mut ix.x);
            for e in &mut ix.indices {
                v.visit_expr(e);
            }
        }
        Expr::Slice(s) => {
            v.visit_expr(&mut s.x);
            for e in [&mut s.low, &mut s.high, &mut s.max].into_iter().flatten() {
                v.visit_expr(e);
            }
        }
        Expr::TypeAssert(t) => v.visit_expr(&mut t.x),
        Expr::Call(call) => {
            v.visit_expr(&mut call.fun);
            for arg in &mut call.args {
                v.visit_expr(arg);
            }
        }
        Expr::Unary(u) => v.visit_expr(&mut u.x),
        Expr::Binary(b) => {
            v.visit_expr(&mut b.x);
            v.visit_expr(&mut b.y);
        }
        Expr::KeyValue(kv) => {
            v.visit_expr(&mut kv.key);
            v.visit_expr(&mut kv.value);
        }
        Expr::ArrayType(a) => {
            if let ArrayLen::Fixed(len) = &mut a.len {
                v.visit_expr(len);
            }
        }
        Expr::Range(r) => {
            for e in [&mut r.low, &mut r.step].into_iter().flatten() {
                v.visit_expr(e);
            }
            v.visit_expr(&mut r.high);
        }
        Expr::Comprehension(c) => {
            v.visit_expr(&mut c.elt);
            for phrase in &mut c.phrases {
                v.visit_expr(&mut phrase.x);
                if let Some(cond) = &mut phrase.cond {
                    v.visit_expr(&mut cond.expr);
                }
            }
        }
        Expr::ErrWrap(w) => {
            v.visit_expr(&mut w.x);
            if let Some(default) = &mut w.default {
                v.visit_expr(default);
            }
        }
        Expr::MapType(_)
        | Expr::ChanType(_)
        | Expr::FuncType(_)
        | Expr::StructType(_)
        | Expr::InterfaceType(_)
        | Expr::Ellipsis(_) => {}
    }
}
