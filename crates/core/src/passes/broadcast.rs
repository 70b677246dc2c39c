//! `broadcast msg, wait` / `broadcast msg, data, wait` → `broadcastAndWait`
//! or `broadcast` without the flag. Only a literal `true`/`false` flag is
//! recognized; anything else might be real broadcast data.

use super::{rename_callee, rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::{bool_literal, matches_api_name};
use crate::FileSet;
use spx_syntax::ast::CallExpr;

pub fn convert_broadcast_apis(files: &mut FileSet) -> Result<usize, PassError> {
    rewrite_spx_files(files, &mut BroadcastApis)
}

struct BroadcastApis;

impl CallRewrite for BroadcastApis {
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        if !call.callee_name().is_some_and(|n| matches_api_name(n, "broadcast")) {
            return false;
        }
        if !matches!(call.args.len(), 2 | 3) {
            return false;
        }
        let Some(wait) = call.args.last().and_then(bool_literal) else {
            return false;
        };
        call.args.pop();
        if wait {
            rename_callee(call, "broadcastAndWait");
        }
        true
    }
}
