//! Name matching and small syntax predicates shared by the passes.
//!
//! spx spells every API both as a lowercase command (`play`) and as a
//! capitalized method (`Play`), so names compare equal when they differ only
//! in the case of their first letter.

use spx_syntax::ast::{Expr, LitKind};
use spx_syntax::lexer::Punct;

/// `actual` names the API `canonical`: the first letter matches in either
/// case and the rest matches exactly.
pub fn matches_api_name(actual: &str, canonical: &str) -> bool {
    let mut a = actual.chars();
    let mut c = canonical.chars();
    match (a.next(), c.next()) {
        (Some(x), Some(y)) => x.to_lowercase().eq(y.to_lowercase()) && a.as_str() == c.as_str(),
        (None, None) => true,
        _ => false,
    }
}

/// `target` with its first letter upper-cased when `original` starts with
/// an upper-case letter, and lower-cased otherwise.
pub fn preserve_case(original: &str, target: &str) -> String {
    let mut chars = target.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let upper = original.chars().next().is_some_and(char::is_uppercase);
    let mut out = String::with_capacity(target.len());
    if upper {
        out.extend(first.to_uppercase());
    } else {
        out.extend(first.to_lowercase());
    }
    out.push_str(chars.as_str());
    out
}

pub fn is_spx_file(path: &str) -> bool {
    path.ends_with(".spx")
}

/// The project's entry class file, at the root or inside one directory.
pub fn is_entry_file(path: &str) -> bool {
    path == "main.spx" || path.ends_with("/main.spx")
}

/// `true` or `false` written as a literal.
pub fn bool_literal(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Ident(id) if id.name == "true" => Some(true),
        Expr::Ident(id) if id.name == "false" => Some(false),
        _ => None,
    }
}

/// Whether a wait argument asks to block. Only a literal `true` does.
pub fn should_use_wait(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(id) => id.name.eq_ignore_ascii_case("true"),
        Expr::BasicLit(lit) => lit.value.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

pub fn is_string_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::BasicLit(lit) if lit.kind == LitKind::String)
}

/// An integer or float literal, optionally negated: `10`, `-1.5`.
pub fn is_numeric_literal(expr: &Expr) -> bool {
    let numeric = |e: &Expr| {
        matches!(e, Expr::BasicLit(lit) if matches!(lit.kind, LitKind::Int | LitKind::Float))
    };
    match expr {
        Expr::Unary(u) if u.op == Punct::Sub => numeric(&u.x),
        other => numeric(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spx_syntax::ast::{BasicLit, CallExpr, Pos, UnaryExpr};

    #[test]
    fn first_letter_is_case_insensitive() {
        assert!(matches_api_name("play", "play"));
        assert!(matches_api_name("Play", "play"));
        assert!(matches_api_name("nextCostume", "NextCostume"));
    }

    #[test]
    fn remainder_is_case_sensitive() {
        assert!(!matches_api_name("PLAY", "play"));
        assert!(!matches_api_name("nextcostume", "nextCostume"));
        assert!(!matches_api_name("plays", "play"));
        assert!(!matches_api_name("", "play"));
    }

    #[test]
    fn preserve_case_follows_the_original() {
        assert_eq!(preserve_case("nextCostume", "setCostume"), "setCostume");
        assert_eq!(preserve_case("NextCostume", "setCostume"), "SetCostume");
        assert_eq!(preserve_case("Play", "playAndWait"), "PlayAndWait");
        assert_eq!(preserve_case("goto", "StepTo"), "stepTo");
    }

    #[test]
    fn entry_file_detection() {
        assert!(is_entry_file("main.spx"));
        assert!(is_entry_file("project/main.spx"));
        assert!(!is_entry_file("domain.spx"));
        assert!(!is_entry_file("Cat.spx"));
    }

    #[test]
    fn literal_predicates() {
        let int = Expr::BasicLit(BasicLit {
            kind: LitKind::Int,
            value: "10".into(),
            pos: Pos::default(),
        });
        let neg = Expr::Unary(UnaryExpr {
            op: Punct::Sub,
            x: Box::new(int.clone()),
        });
        let call = Expr::Call(CallExpr::new(Expr::ident("float64"), vec![int.clone()]));
        assert!(is_numeric_literal(&int));
        assert!(is_numeric_literal(&neg));
        assert!(!is_numeric_literal(&call));
        assert!(!is_numeric_literal(&Expr::ident("speed")));
        assert!(is_string_literal(&Expr::BasicLit(BasicLit::string("run"))));

        assert_eq!(bool_literal(&Expr::ident("true")), Some(true));
        assert_eq!(bool_literal(&Expr::ident("false")), Some(false));
        assert_eq!(bool_literal(&Expr::ident("wait")), None);
        assert!(should_use_wait(&Expr::ident("true")));
        assert!(!should_use_wait(&Expr::ident("wait")));
    }
}
