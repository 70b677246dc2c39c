//! Sound calls.
//!
//! | legacy                                       | current               |
//! |----------------------------------------------|-----------------------|
//! | `play bgm` (`bgm` a sound resource)          | `play "bgm"`          |
//! | `play bgm, true` / `play bgm, false`         | `playAndWait "bgm"` / `play "bgm"` |
//! | `play bgm, &PlayOptions{Action: PlayStop}`   | `stopPlaying "bgm"`   |
//! | `play bgm, &PlayOptions{Action: PlayPause}`  | `pausePlaying "bgm"`  |
//! | `play bgm, &PlayOptions{Action: PlayResume}` | `resumePlaying "bgm"` |
//! | `play bgm, &PlayOptions{Loop: true}`         | `play "bgm", true`    |
//! | `play bgm, &PlayOptions{Wait: true}`         | `playAndWait "bgm"`   |
//!
//! A variable holding a sound name (`name := "bgm"; play name`) is still
//! valid and is left alone.

use super::{rename_callee, rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::{bool_literal, matches_api_name};
use crate::resources::ResourceSet;
use crate::FileSet;
use spx_syntax::ast::{BasicLit, CallExpr, CompositeLit, Expr};
use spx_syntax::lexer::Punct;

pub fn convert_sound_calls(files: &mut FileSet, resources: &ResourceSet) -> Result<usize, PassError> {
    rewrite_spx_files(files, &mut SoundCalls { resources })
}

struct SoundCalls<'a> {
    resources: &'a ResourceSet,
}

impl CallRewrite for SoundCalls<'_> {
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        if !is_play_call(call) || call.args.is_empty() {
            return false;
        }
        let resource_arg = convert_sound_argument(call, self.resources);
        // `play "x", true` already means "loop" in the current API, so the
        // wait flag is only collapsed on calls that still name a resource
        // variable.
        let wait_collapsed = resource_arg && collapse_wait_flag(call);
        let options_converted = convert_play_options(call);
        resource_arg || wait_collapsed || options_converted
    }
}

/// `play`, `playAndWait`, and the `Play__0`-style method overloads.
fn is_play_call(call: &CallExpr) -> bool {
    match call.fun.as_ref() {
        Expr::Ident(id) => is_play_name(&id.name),
        Expr::Selector(sel) => {
            let name = &sel.sel.name;
            is_play_name(name) || is_play_overload(name)
        }
        _ => false,
    }
}

fn is_play_name(name: &str) -> bool {
    matches_api_name(name, "play") || matches_api_name(name, "playAndWait")
}

fn is_play_overload(name: &str) -> bool {
    name.split_once("__").is_some_and(|(base, n)| {
        matches_api_name(base, "play") && !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())
    })
}

/// `play bgm` → `play "bgm"` when `bgm` is a sound resource.
fn convert_sound_argument(call: &mut CallExpr, resources: &ResourceSet) -> bool {
    let Some(id) = call.args[0].as_ident() else {
        return false;
    };
    if !resources.is_sound(&id.name) {
        return false;
    }
    call.args[0] = Expr::BasicLit(BasicLit::string(&id.name));
    true
}

/// `play x, true` → `playAndWait x`; `play x, false` → `play x`.
fn collapse_wait_flag(call: &mut CallExpr) -> bool {
    if call.args.len() != 2 {
        return false;
    }
    let Some(wait) = bool_literal(&call.args[1]) else {
        return false;
    };
    if wait {
        rename_callee(call, "playAndWait");
    }
    call.args.truncate(1);
    true
}

const SPX_PACKAGE: &str = "spx";

/// The `PlayOptions` literal passed as the second argument, if any:
/// `&PlayOptions{...}`, `PlayOptions{...}`, `spx.PlayOptions{...}` or an
/// untyped `{...}`.
fn play_options(expr: &Expr) -> Option<&CompositeLit> {
    let lit = match expr {
        Expr::Unary(u) if u.op == Punct::And => match u.x.as_ref() {
            Expr::Composite(lit) => lit,
            _ => return None,
        },
        Expr::Composite(lit) => lit,
        _ => return None,
    };
    let typed_as_options = match lit.ty.as_deref() {
        None => true,
        Some(Expr::Ident(id)) => id.name == "PlayOptions",
        Some(Expr::Selector(sel)) => {
            sel.sel.name == "PlayOptions"
                && sel.x.as_ident().is_some_and(|pkg| pkg.name == SPX_PACKAGE)
        }
        Some(_) => false,
    };
    typed_as_options.then_some(lit)
}

#[derive(Default)]
struct PlayOptions {
    action: Option<String>,
    looping: bool,
    wait: bool,
}

fn read_options(lit: &CompositeLit) -> PlayOptions {
    let is_true = |e: &Expr| match e {
        Expr::Ident(id) => id.name.eq_ignore_ascii_case("true"),
        Expr::BasicLit(lit) => lit.value.eq_ignore_ascii_case("true"),
        _ => false,
    };
    let mut opts = PlayOptions::default();
    for elt in &lit.elts {
        let Expr::KeyValue(kv) = elt else { continue };
        let Some(key) = kv.key.as_ident() else { continue };
        match key.name.as_str() {
            "Action" => {
                if let Some(action) = kv.value.as_ident() {
                    opts.action = Some(action.name.clone());
                }
            }
            "Loop" => opts.looping = is_true(&kv.value),
            "Wait" => opts.wait = is_true(&kv.value),
            _ => {}
        }
    }
    opts
}

/// Replace a `PlayOptions` argument with the dedicated call. `Action`
/// wins over `Loop`, which wins over `Wait`; with none of them set the
/// call becomes a plain `play`.
fn convert_play_options(call: &mut CallExpr) -> bool {
    if call.args.len() < 2 {
        return false;
    }
    let Some(lit) = play_options(&call.args[1]) else {
        return false;
    };
    let opts = read_options(lit);

    let action_target = match opts.action.as_deref() {
        Some("PlayStop") => Some("stopPlaying"),
        Some("PlayPause") => Some("pausePlaying"),
        Some("PlayResume" | "PlayContinue") => Some("resumePlaying"),
        _ => None,
    };
    call.args.truncate(1);
    if let Some(target) = action_target {
        rename_callee(call, target);
    } else if opts.looping {
        rename_callee(call, "play");
        call.args.push(Expr::ident("true"));
    } else if opts.wait {
        rename_callee(call, "playAndWait");
    } else {
        rename_callee(call, "play");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing::{project, source};
    use pretty_assertions::assert_eq;

    fn resources() -> ResourceSet {
        ResourceSet {
            sounds: ["bgm".to_owned(), "meow".to_owned()].into(),
            sprites: Default::default(),
        }
    }

    fn convert(src: &str) -> (String, usize) {
        let mut files = project(&[("main.spx", src)]);
        let n = convert_sound_calls(&mut files, &resources()).unwrap();
        (source(&files, "main.spx"), n)
    }

    #[test]
    fn resource_identifier_becomes_string() {
        assert_eq!(convert("play bgm\n"), ("play \"bgm\"\n".to_owned(), 1));
    }

    #[test]
    fn ordinary_variables_are_untouched() {
        let src = "name := \"bgm\"\nplay name\n";
        assert_eq!(convert(src), (src.to_owned(), 0));
    }

    #[test]
    fn wait_flag_selects_the_call() {
        assert_eq!(
            convert("play bgm, true\nplay meow, false\n").0,
            "playAndWait \"bgm\"\nplay \"meow\"\n"
        );
    }

    #[test]
    fn already_migrated_loop_call_is_stable() {
        let src = "play \"bgm\", true\nplayAndWait \"meow\"\n";
        assert_eq!(convert(src), (src.to_owned(), 0));
    }

    #[test]
    fn play_options_map_to_dedicated_calls() {
        let (out, n) = convert(
            "play bgm, &PlayOptions{Action: PlayStop}\n\
             play bgm, &PlayOptions{Action: PlayPause}\n\
             play bgm, &PlayOptions{Action: PlayContinue}\n\
             play bgm, &PlayOptions{Loop: true, Wait: true}\n\
             play bgm, PlayOptions{Wait: true}\n\
             play bgm, {Action: PlayRewind}\n",
        );
        assert_eq!(
            out,
            "stopPlaying \"bgm\"\n\
             pausePlaying \"bgm\"\n\
             resumePlaying \"bgm\"\n\
             play \"bgm\", true\n\
             playAndWait \"bgm\"\n\
             play \"bgm\"\n"
        );
        assert_eq!(n, 6);
    }

    #[test]
    fn qualified_play_options() {
        let (out, n) = convert(
            "play bgm, &spx.PlayOptions{Action: PlayStop}\n\
             play bgm, spx.PlayOptions{Loop: true}\n",
        );
        assert_eq!(out, "stopPlaying \"bgm\"\nplay \"bgm\", true\n");
        assert_eq!(n, 2);
    }

    #[test]
    fn options_struct_from_another_package_is_kept() {
        let (out, n) = convert("play bgm, &audio.PlayOptions{Action: PlayStop}\n");
        assert_eq!(out, "play \"bgm\", &audio.PlayOptions{Action: PlayStop}\n");
        assert_eq!(n, 1);
    }

    #[test]
    fn method_spelling_keeps_its_case() {
        assert_eq!(
            convert("onClick => {\n\tthis.Play bgm, true\n}\n").0,
            "onClick => {\n\tthis.PlayAndWait \"bgm\"\n}\n"
        );
        assert_eq!(
            convert("this.Play__1 bgm, &PlayOptions{Action: PlayStop}\n").0,
            "this.StopPlaying \"bgm\"\n"
        );
    }

    #[test]
    fn nested_calls_keep_parentheses() {
        assert_eq!(
            convert("run(play(bgm, true))\n").0,
            "run(playAndWait(\"bgm\"))\n"
        );
    }

    #[test]
    fn top_level_calls_switch_to_command_style() {
        assert_eq!(convert("play(bgm)\n").0, "play \"bgm\"\n");
    }
}
