//! Backdrop calls.
//!
//! | legacy                         | current                                  |
//! |--------------------------------|------------------------------------------|
//! | `startBackdrop x`              | `setBackdrop x`                          |
//! | `startBackdrop x, wait`        | `setBackdropAndWait x` / `setBackdrop x` |
//! | `nextBackdrop`                 | `setBackdrop Next`                       |
//! | `nextBackdrop wait`            | `setBackdropAndWait Next` / `setBackdrop Next` |
//! | `prevBackdrop` (same as next)  | `setBackdrop Prev`                       |
//!
//! The wait argument selects the call and is then dropped. Anything but a
//! literal `true` counts as not waiting.

use super::{rename_callee, rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::{matches_api_name, should_use_wait};
use crate::FileSet;
use spx_syntax::ast::{CallExpr, Expr};

pub fn convert_backdrop_apis(files: &mut FileSet) -> Result<usize, PassError> {
    rewrite_spx_files(files, &mut BackdropApis)
}

struct BackdropApis;

impl CallRewrite for BackdropApis {
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        let Some(name) = call.callee_name() else {
            return false;
        };
        if matches_api_name(name, "startBackdrop") {
            start_backdrop(call)
        } else if matches_api_name(name, "nextBackdrop") {
            step_backdrop(call, "Next")
        } else if matches_api_name(name, "prevBackdrop") {
            step_backdrop(call, "Prev")
        } else {
            false
        }
    }

    fn rewrites_bare_names(&self) -> bool {
        true
    }
}

fn set_backdrop(wait: bool) -> &'static str {
    if wait {
        "setBackdropAndWait"
    } else {
        "setBackdrop"
    }
}

fn start_backdrop(call: &mut CallExpr) -> bool {
    match call.args.len() {
        1 => rename_callee(call, "setBackdrop"),
        2 => {
            let wait = should_use_wait(&call.args[1]);
            rename_callee(call, set_backdrop(wait));
            call.args.truncate(1);
        }
        _ => return false,
    }
    true
}

fn step_backdrop(call: &mut CallExpr, direction: &str) -> bool {
    let wait = match call.args.as_slice() {
        [] => false,
        [wait] => should_use_wait(wait),
        _ => return false,
    };
    rename_callee(call, set_backdrop(wait));
    call.args = vec![Expr::ident(direction)];
    true
}
