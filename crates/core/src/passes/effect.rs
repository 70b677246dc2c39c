//! `setEffect` / `changeEffect` → `setGraphicEffect` / `changeGraphicEffect`.
//! Arguments are unchanged.

use super::{rename_callee, rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::matches_api_name;
use crate::FileSet;
use spx_syntax::ast::CallExpr;

const RENAMES: &[(&str, &str)] = &[
    ("setEffect", "setGraphicEffect"),
    ("changeEffect", "changeGraphicEffect"),
];

pub fn convert_effect_apis(files: &mut FileSet) -> Result<usize, PassError> {
    rewrite_spx_files(files, &mut EffectApis)
}

struct EffectApis;

impl CallRewrite for EffectApis {
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        let Some(name) = call.callee_name() else {
            return false;
        };
        let Some(&(_, target)) = RENAMES.iter().find(|(old, _)| matches_api_name(name, old)) else {
            return false;
        };
        rename_callee(call, target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing::{project, source};
    use pretty_assertions::assert_eq;

    #[test]
    fn renames_both_effect_calls() {
        let mut files = project(&[(
            "Cat.spx",
            "onStart => {\n\tsetEffect ColorEffect, 50\n\tthis.ChangeEffect(GhostEffect, 10)\n\tclearGraphicEffects\n}\n",
        )]);
        assert_eq!(convert_effect_apis(&mut files).unwrap(), 2);
        assert_eq!(
            source(&files, "Cat.spx"),
            "onStart => {\n\tsetGraphicEffect ColorEffect, 50\n\tthis.ChangeGraphicEffect GhostEffect, 10\n\tclearGraphicEffects\n}\n"
        );
    }

    #[test]
    fn already_renamed_calls_are_stable() {
        let src = "setGraphicEffect ColorEffect, 50\n";
        let mut files = project(&[("Cat.spx", src)]);
        assert_eq!(convert_effect_apis(&mut files).unwrap(), 0);
        assert_eq!(source(&files, "Cat.spx"), src);
    }
}
