//! Layer calls.
//!
//! - `gotoBack` / `gotoFront` → `setLayer Back` / `setLayer Front`
//! - `goBackLayers n` → `setLayer Backward, n`

use super::{rename_callee, rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::matches_api_name;
use crate::FileSet;
use spx_syntax::ast::{CallExpr, Expr};

pub fn convert_layer_apis(files: &mut FileSet) -> Result<usize, PassError> {
    rewrite_spx_files(files, &mut LayerApis)
}

struct LayerApis;

impl CallRewrite for LayerApis {
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        let Some(name) = call.callee_name() else {
            return false;
        };
        let args = if matches_api_name(name, "gotoBack") {
            vec![Expr::ident("Back")]
        } else if matches_api_name(name, "gotoFront") {
            vec![Expr::ident("Front")]
        } else if matches_api_name(name, "goBackLayers") && call.args.len() == 1 {
            let n = call.args.remove(0);
            vec![Expr::ident("Backward"), n]
        } else {
            return false;
        };
        rename_callee(call, "setLayer");
        call.args = args;
        true
    }

    fn rewrites_bare_names(&self) -> bool {
        true
    }
}
