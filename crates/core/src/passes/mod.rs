//! The rewrite passes, in the order the migrator runs them.
//!
//! Every pass re-parses each class file from the current file set, rewrites
//! matching call sites in place and reprints only the files it changed.
//! Files that do not parse are left untouched. A rewritten call that forms
//! a whole statement is printed in command style (`setLayer Front`);
//! rewritten calls nested in expressions keep their parentheses.

pub mod animation;
pub mod auto_binding;
pub mod backdrop;
pub mod broadcast;
pub mod costume;
pub mod effect;
pub mod layer;
pub mod movement;
pub mod sound;
pub mod touch_start;

use crate::error::PassError;
use crate::naming::{is_spx_file, preserve_case};
use crate::FileSet;
use spx_syntax::ast::{CallExpr, Expr, File, StmtKind};
use spx_syntax::visit::{walk_expr, walk_file, walk_stmt, VisitMut};
use spx_syntax::{parse_file, print_file};
use tracing::{debug, warn};

/// A call-site rewrite applied across every class file.
pub(crate) trait CallRewrite {
    /// Rewrite `call` in place. Returns whether anything changed.
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool;

    /// Whether a bare `name` or `obj.name` statement is an argument-less
    /// call this rewrite should see.
    fn rewrites_bare_names(&self) -> bool {
        false
    }

    /// Rewrite a whole statement in place. Runs before any call rewriting.
    fn rewrite_stmt(&mut self, _stmt: &mut StmtKind) -> bool {
        false
    }
}

struct Walker<'r, R: ?Sized> {
    rewrite: &'r mut R,
    count: usize,
}

impl<R: CallRewrite + ?Sized> Walker<'_, R> {
    fn expr_stmt(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Call(call) => {
                if self.rewrite.rewrite_call(call) {
                    call.command = true;
                    self.count += 1;
                }
            }
            Expr::Ident(_) | Expr::Selector(_) if self.rewrite.rewrites_bare_names() => {
                let mut call = CallExpr::new(expr.clone(), Vec::new());
                if self.rewrite.rewrite_call(&mut call) {
                    call.command = true;
                    *expr = Expr::Call(call);
                    self.count += 1;
                }
            }
            _ => {}
        }
        // Children only: the statement's own call was handled above.
        walk_expr(self, expr);
    }
}

impl<R: CallRewrite + ?Sized> VisitMut for Walker<'_, R> {
    fn visit_stmt(&mut self, stmt: &mut StmtKind) {
        if self.rewrite.rewrite_stmt(stmt) {
            self.count += 1;
            return;
        }
        match stmt {
            StmtKind::Expr(expr) => self.expr_stmt(expr),
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        if let Expr::Call(call) = expr {
            if self.rewrite.rewrite_call(call) {
                self.count += 1;
            }
        }
        walk_expr(self, expr);
    }
}

/// Apply `rewrite` to every class file. Returns the number of rewritten
/// call sites.
pub(crate) fn rewrite_spx_files<R: CallRewrite + ?Sized>(
    files: &mut FileSet,
    rewrite: &mut R,
) -> Result<usize, PassError> {
    let mut total = 0;
    for (path, content) in files.iter_mut() {
        if !is_spx_file(path) {
            continue;
        }
        let Some(mut file) = parse_source(path, content) else {
            continue;
        };
        let mut walker = Walker {
            rewrite: &mut *rewrite,
            count: 0,
        };
        walk_file(&mut walker, &mut file);
        if walker.count > 0 {
            debug!(path = %path, rewritten = walker.count, "rewrote file");
            *content = format_source(path, &file)?;
            total += walker.count;
        }
    }
    Ok(total)
}

/// Parse a class file, or log why it is being skipped.
pub(crate) fn parse_source(path: &str, content: &[u8]) -> Option<File> {
    let src = match std::str::from_utf8(content) {
        Ok(src) => src,
        Err(err) => {
            warn!(path, %err, "skipping file that is not UTF-8");
            return None;
        }
    };
    match parse_file(src, path) {
        Ok(file) => Some(file),
        Err(err) => {
            warn!(path, %err, "skipping file that does not parse");
            None
        }
    }
}

/// Rename the called function or method to `target`, keeping the case of
/// its first letter.
pub(crate) fn rename_callee(call: &mut CallExpr, target: &str) {
    if let Some(id) = call.callee_ident_mut() {
        id.name = preserve_case(&id.name, target);
    }
}

/// Print a rewritten tree, checking that the output still parses.
pub(crate) fn format_source(path: &str, file: &File) -> Result<Vec<u8>, PassError> {
    let out = print_file(file);
    parse_file(&out, path).map_err(|source| PassError::Format {
        path: path.to_owned(),
        source,
    })?;
    Ok(out.into_bytes())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::FileSet;

    pub fn project(files: &[(&str, &str)]) -> FileSet {
        files
            .iter()
            .map(|(path, src)| (path.to_string(), src.as_bytes().to_vec()))
            .collect()
    }

    pub fn source(files: &FileSet, path: &str) -> String {
        String::from_utf8(files[path].clone()).expect("utf-8 source")
    }
}
