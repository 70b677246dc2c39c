//! Movement calls.
//!
//! - `goto Target` (parsed as a `goto` statement) and `goto(x)` → `stepTo`
//! - `step n` → `step float64(n)` unless `n` is a numeric literal, since the
//!   integer overload is gone
//! - `step n, "anim"` → `step float64(n), 1.0, "anim"` (explicit speed)

use super::{rename_callee, rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::{is_numeric_literal, is_string_literal, matches_api_name};
use crate::FileSet;
use spx_syntax::ast::{BasicLit, CallExpr, Expr, StmtKind};
use spx_syntax::lexer::Keyword;

pub fn convert_movement_apis(files: &mut FileSet) -> Result<usize, PassError> {
    rewrite_spx_files(files, &mut MovementApis)
}

struct MovementApis;

impl CallRewrite for MovementApis {
    fn rewrite_stmt(&mut self, stmt: &mut StmtKind) -> bool {
        let StmtKind::Branch {
            keyword: Keyword::Goto,
            label: Some(label),
        } = stmt
        else {
            return false;
        };
        let mut call = CallExpr::new(Expr::ident("stepTo"), vec![Expr::ident(label.name.clone())]);
        call.command = true;
        *stmt = StmtKind::Expr(Expr::Call(call));
        true
    }

    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        let Some(name) = call.callee_name() else {
            return false;
        };
        if matches_api_name(name, "goto") {
            rename_callee(call, "stepTo");
            return true;
        }
        if !matches_api_name(name, "step") {
            return false;
        }
        match call.args.len() {
            1 if needs_float(&call.args[0]) => {
                let n = call.args.remove(0);
                call.args.push(float64(n));
                true
            }
            2 if is_string_literal(&call.args[1]) => {
                let anim = call.args.remove(1);
                let mut n = call.args.remove(0);
                if needs_float(&n) {
                    n = float64(n);
                }
                call.args = vec![n, Expr::BasicLit(BasicLit::float("1.0")), anim];
                true
            }
            _ => false,
        }
    }
}

fn needs_float(expr: &Expr) -> bool {
    let converted = matches!(expr, Expr::Call(c) if c.fun.as_ident().is_some_and(|id| id.name == "float64"));
    !converted && !is_numeric_literal(expr)
}

fn float64(x: Expr) -> Expr {
    Expr::Call(CallExpr::new(Expr::ident("float64"), vec![x]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing::{project, source};
    use pretty_assertions::assert_eq;

    fn convert(src: &str) -> (String, usize) {
        let mut files = project(&[("Cat.spx", src)]);
        let n = convert_movement_apis(&mut files).unwrap();
        (source(&files, "Cat.spx"), n)
    }

    #[test]
    fn goto_statement_becomes_step_to() {
        assert_eq!(
            convert("onClick => {\n\tgoto Dog\n}\n"),
            ("onClick => {\n\tstepTo Dog\n}\n".to_owned(), 1)
        );
    }

    #[test]
    fn goto_calls_keep_receiver_and_case() {
        assert_eq!(
            convert("goto \"Dog\"\nthis.Goto(mouseX, mouseY)\n").0,
            "stepTo \"Dog\"\nthis.StepTo mouseX, mouseY\n"
        );
    }

    #[test]
    fn step_wraps_non_literal_distance() {
        let (out, n) = convert("step 10\nstep -5\nstep speed\nstep float64(speed)\n");
        assert_eq!(out, "step 10\nstep -5\nstep float64(speed)\nstep float64(speed)\n");
        assert_eq!(n, 1);
    }

    // Known limitation: only bare (optionally negated) literals count as
    // numeric, so a parenthesized literal still gets wrapped.
    #[test]
    fn parenthesized_literal_is_wrapped() {
        assert_eq!(
            convert("step((10))\n"),
            ("step(float64((10)))\n".to_owned(), 1)
        );
    }

    #[test]
    fn step_with_animation_gets_default_speed() {
        assert_eq!(
            convert("step 10, \"walk\"\nthis.Step dist, \"run\"\n").0,
            "step 10, 1.0, \"walk\"\nthis.Step float64(dist), 1.0, \"run\"\n"
        );
    }

    #[test]
    fn already_migrated_calls_are_stable() {
        let src = "stepTo Dog\nstep float64(n), 1.0, \"walk\"\n";
        assert_eq!(convert(src), (src.to_owned(), 0));
    }
}
