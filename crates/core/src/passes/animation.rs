//! `animate` → `animateAndWait`. The legacy call blocked until the
//! animation finished; the current `animate` returns immediately.

use super::{rename_callee, rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::matches_api_name;
use crate::FileSet;
use spx_syntax::ast::CallExpr;

pub fn convert_animation_apis(files: &mut FileSet) -> Result<usize, PassError> {
    rewrite_spx_files(files, &mut AnimationApis)
}

struct AnimationApis;

impl CallRewrite for AnimationApis {
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        if !call.callee_name().is_some_and(|n| matches_api_name(n, "animate")) {
            return false;
        }
        rename_callee(call, "animateAndWait");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing::{project, source};
    use pretty_assertions::assert_eq;

    #[test]
    fn animate_blocks_explicitly() {
        let mut files = project(&[("Cat.spx", "onClick => {\n\tanimate \"jump\"\n\tthis.Animate(\"walk\")\n}\n")]);
        assert_eq!(convert_animation_apis(&mut files).unwrap(), 2);
        assert_eq!(
            source(&files, "Cat.spx"),
            "onClick => {\n\tanimateAndWait \"jump\"\n\tthis.AnimateAndWait \"walk\"\n}\n"
        );
    }

    #[test]
    fn calls_inside_range_loops_are_converted() {
        let src = "onClick => {\n\tfor i <- 1:5 {\n\t\tanimate \"jump\"\n\t}\n\tfor i <- 0:10:2 {\n\t}\n}\n";
        let mut files = project(&[("Cat.spx", src)]);
        assert_eq!(convert_animation_apis(&mut files).unwrap(), 1);
        assert_eq!(source(&files, "Cat.spx"), src.replace("animate ", "animateAndWait "));
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut files = project(&[("Cat.spx", "animateAndWait \"jump\"\n")]);
        assert_eq!(convert_animation_apis(&mut files).unwrap(), 0);
    }
}
