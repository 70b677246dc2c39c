//! `onTouchStart` handlers gain an explicit sprite selector.
//!
//! The legacy event fired for a touch by any sprite; the current one takes
//! the sprites to listen for. Handlers without a selector are given every
//! sprite in the project:
//!
//! ```text
//! onTouchStart => { ... }       →  onTouchStart ["Cat", "Dog"], => { ... }
//! onTouchStart s => { ... }     →  onTouchStart ["Cat", "Dog"], s => { ... }
//! onTouchStart "Cat", => { ... }   (unchanged)
//! ```

use super::{rewrite_spx_files, CallRewrite};
use crate::error::PassError;
use crate::naming::{is_string_literal, matches_api_name};
use crate::resources::ResourceSet;
use crate::FileSet;
use spx_syntax::ast::{BasicLit, CallExpr, Expr, ListComments, SliceLit};

pub fn convert_touch_start(files: &mut FileSet, resources: &ResourceSet) -> Result<usize, PassError> {
    let sprites: Vec<&str> = resources.sprites.iter().map(String::as_str).collect();
    rewrite_spx_files(files, &mut TouchStart { sprites })
}

struct TouchStart<'a> {
    /// Sorted.
    sprites: Vec<&'a str>,
}

impl TouchStart<'_> {
    fn selector(&self) -> Expr {
        Expr::SliceLit(SliceLit {
            elts: self
                .sprites
                .iter()
                .map(|name| Expr::BasicLit(BasicLit::string(name)))
                .collect(),
            multiline: false,
            comments: ListComments::default(),
        })
    }
}

impl CallRewrite for TouchStart<'_> {
    fn rewrite_call(&mut self, call: &mut CallExpr) -> bool {
        if !call.callee_name().is_some_and(|n| matches_api_name(n, "onTouchStart")) {
            return false;
        }
        if call.args.first().is_some_and(is_sprite_selector) {
            return false;
        }
        call.insert_arg(0, self.selector());
        true
    }
}

/// `"Cat"`, `["Cat", "Dog"]` or `[]string{"Cat", "Dog"}`.
fn is_sprite_selector(expr: &Expr) -> bool {
    match expr {
        Expr::SliceLit(_) => true,
        Expr::Composite(lit) => matches!(
            lit.ty.as_deref(),
            Some(Expr::ArrayType(arr)) if arr.elt.as_ident().is_some_and(|id| id.name == "string")
        ),
        other => is_string_literal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing::{project, source};
    use pretty_assertions::assert_eq;

    fn convert(src: &str) -> (String, usize) {
        let mut files = project(&[("Dog.spx", src), ("Cat.spx", ""), ("main.spx", "")]);
        let resources = ResourceSet {
            sounds: Default::default(),
            sprites: ["Dog".to_owned(), "Cat".to_owned()].into(),
        };
        let n = convert_touch_start(&mut files, &resources).unwrap();
        (source(&files, "Dog.spx"), n)
    }

    #[test]
    fn handler_gets_every_sprite_in_order() {
        assert_eq!(
            convert("onTouchStart => {\n\tsay \"ouch\"\n}\n"),
            (
                "onTouchStart [\"Cat\", \"Dog\"], => {\n\tsay \"ouch\"\n}\n".to_owned(),
                1
            )
        );
    }

    #[test]
    fn handler_with_parameter() {
        assert_eq!(
            convert("onTouchStart s => {\n\tsay s.name\n}\n").0,
            "onTouchStart [\"Cat\", \"Dog\"], s => {\n\tsay s.name\n}\n"
        );
    }

    #[test]
    fn existing_selectors_are_kept() {
        let src = "onTouchStart \"Cat\", => {\n}\n\
                   onTouchStart [\"Cat\"], => {\n}\n\
                   onTouchStart []string{\"Cat\"}, => {\n}\n";
        assert_eq!(convert(src), (src.to_owned(), 0));
    }

    #[test]
    fn call_without_arguments_gets_selector_only() {
        assert_eq!(convert("this.OnTouchStart()\n").0, "this.OnTouchStart [\"Cat\", \"Dog\"]\n");
    }
}
