//! Detection of APIs that were removed with no replacement.
//!
//! Projects using any of them need a human to rework the call sites, so the
//! migrator refuses them before rewriting anything.

use crate::naming::{is_spx_file, matches_api_name};
use crate::passes::parse_source;
use crate::FileSet;
use serde::Serialize;
use spx_syntax::ast::{callee_ident, Expr, Ident, StmtKind};
use spx_syntax::visit::{walk_expr, walk_file, walk_stmt, VisitMut};
use std::fmt;

/// Canonical name and reason for every removed API.
pub const REMOVED_APIS: &[(&str, &str)] = &[
    // Game
    ("isRunned", "Game.isRunned removed; no replacement"),
    ("layout", "Game.layout removed; internal engine responsibility"),
    ("mouseHitItem", "Game.mouseHitItem removed; no replacement"),
    // Sprite
    ("setDying", "Sprite.setDying removed; no replacement"),
    ("parent", "Sprite.parent removed; no replacement"),
    ("bounds", "Sprite.bounds removed; no replacement"),
    ("costumeWidth", "Sprite.costumeWidth removed; no replacement"),
    ("costumeHeight", "Sprite.costumeHeight removed; no replacement"),
    ("onMoving", "Sprite.onMoving event removed; refactor motion logic"),
    ("onTurning", "Sprite.onTurning event removed; refactor turning logic"),
];

/// One use of a removed API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedUsage {
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// Canonical API name.
    pub name: String,
    pub note: String,
}

/// Every removed-API use in a project, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedApisError {
    pub usages: Vec<RemovedUsage>,
}

impl fmt::Display for RemovedApisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.usages.is_empty() {
            return f.write_str("removed APIs used");
        }
        writeln!(
            f,
            "Detected removed APIs with no replacements; aborting migration. {} occurrence(s) found:",
            self.usages.len()
        )?;
        for u in &self.usages {
            writeln!(
                f,
                "  {}:{}:{}: {} ({})",
                u.file, u.line, u.column, u.name, u.note
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for RemovedApisError {}

fn removed_api(name: &str) -> Option<(&'static str, &'static str)> {
    REMOVED_APIS
        .iter()
        .copied()
        .find(|(canonical, _)| matches_api_name(name, canonical))
}

/// Scan every class file for removed APIs used as bare statements
/// (`mouseHitItem`, `obj.parent`) or as the callee of any call. Files that
/// do not parse are skipped. Results are ordered by file, line and column.
pub fn scan_removed_apis(files: &FileSet) -> Vec<RemovedUsage> {
    let mut usages = Vec::new();
    for (path, content) in files {
        if !is_spx_file(path) {
            continue;
        }
        let Some(mut file) = parse_source(path, content) else {
            continue;
        };
        let mut scanner = Scanner {
            path,
            usages: &mut usages,
        };
        walk_file(&mut scanner, &mut file);
    }
    usages.sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
    usages
}

struct Scanner<'a> {
    path: &'a str,
    usages: &'a mut Vec<RemovedUsage>,
}

impl Scanner<'_> {
    fn record(&mut self, ident: &Ident) {
        if let Some((name, note)) = removed_api(&ident.name) {
            self.usages.push(RemovedUsage {
                file: self.path.to_owned(),
                line: ident.pos.line,
                column: ident.pos.column,
                name: name.to_owned(),
                note: note.to_owned(),
            });
        }
    }
}

impl VisitMut for Scanner<'_> {
    fn visit_stmt(&mut self, stmt: &mut StmtKind) {
        if let StmtKind::Expr(expr @ (Expr::Ident(_) | Expr::Selector(_))) = stmt {
            if let Some(ident) = callee_ident(expr) {
                self.record(ident);
            }
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        if let Expr::Call(call) = expr {
            if let Some(ident) = callee_ident(&call.fun) {
                self.record(ident);
            }
        }
        walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<RemovedUsage> {
        let files: FileSet = [("Cat.spx".to_owned(), src.as_bytes().to_vec())]
            .into_iter()
            .collect();
        scan_removed_apis(&files)
    }

    #[test]
    fn finds_bare_selector_and_call_forms() {
        let usages = scan(
            "onStart => {\n\tmouseHitItem\n\tthis.setDying\n\tif isRunned() {\n\t\tsay costumeWidth()\n\t}\n}\n",
        );
        let found: Vec<(&str, u32, u32)> = usages
            .iter()
            .map(|u| (u.name.as_str(), u.line, u.column))
            .collect();
        assert_eq!(
            found,
            [
                ("mouseHitItem", 2, 2),
                ("setDying", 3, 7),
                ("isRunned", 4, 5),
                ("costumeWidth", 5, 7),
            ]
        );
    }

    #[test]
    fn capitalized_method_spelling_matches() {
        let usages = scan("Cat.OnMoving => {\n}\n");
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].name, "onMoving");
        assert_eq!(usages[0].note, "Sprite.onMoving event removed; refactor motion logic");
    }

    #[test]
    fn plain_identifiers_in_expressions_are_not_reported() {
        assert!(scan("x := parent\nsay bounds\n").is_empty());
    }

    #[test]
    fn error_lists_every_occurrence() {
        let err = RemovedApisError {
            usages: scan("mouseHitItem\nlayout\n"),
        };
        assert_eq!(
            err.to_string(),
            "Detected removed APIs with no replacements; aborting migration. 2 occurrence(s) found:\n\
             \x20 Cat.spx:1:1: mouseHitItem (Game.mouseHitItem removed; no replacement)\n\
             \x20 Cat.spx:2:1: layout (Game.layout removed; internal engine responsibility)\n"
        );
    }
}
