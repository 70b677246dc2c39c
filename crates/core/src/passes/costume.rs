//! `nextCostume` / `prevCostume` → `setCostume Next` / `setCostume Prev`.

use super::{rename_callee, rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::matches_api_name;
use crate::FileSet;
use spx_syntax::ast::{CallExpr, Expr};

pub fn convert_costume_apis(files: &mut FileSet) -> Result<usize, PassError> {
    rewrite_spx_files(files, &mut CostumeApis)
}

struct CostumeApis;

impl CallRewrite for CostumeApis {
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        let direction = match call.callee_name() {
            Some(name) if matches_api_name(name, "nextCostume") => "Next",
            Some(name) if matches_api_name(name, "prevCostume") => "Prev",
            _ => return false,
        };
        rename_callee(call, "setCostume");
        call.args = vec![Expr::ident(direction)];
        true
    }

    fn rewrites_bare_names(&self) -> bool {
        true
    }
}
