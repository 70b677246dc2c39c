//! Removal of auto-binding declarations from the entry file.
//!
//! The legacy runtime bound entry-file variables to resources by name:
//!
//! ```text
//! var (
//!     bgm Sound      // sound resource "bgm"
//!     Cat Cat        // sprite "Cat"; also *Cat, Sprite, *Sprite
//! )
//! ```
//!
//! The current runtime does not, and code refers to sounds by name instead
//! (see [`super::sound`]), so those names are dropped. Only the first `var`
//! declaration of the entry file is considered, and only names without an
//! initializer.

use super::{format_source, parse_source};
use crate::error::PassError;
use crate::naming::is_entry_file;
use crate::resources::ResourceSet;
use crate::FileSet;
use spx_syntax::ast::{Comment, Expr, File, GenDecl, ItemKind, SpecKind};
use spx_syntax::lexer::Keyword;
use tracing::debug;

pub fn remove_auto_bindings(files: &mut FileSet, resources: &ResourceSet) -> Result<usize, PassError> {
    let (path, content) = files
        .iter_mut()
        .find(|(path, _)| is_entry_file(path))
        .ok_or(PassError::EntryFileNotFound)?;
    let Some(mut file) = parse_source(path, content) else {
        return Ok(0);
    };
    let removed = remove_from_first_var(&mut file, resources);
    if removed > 0 {
        debug!(path = %path, removed, "removed auto-binding declarations");
        *content = format_source(path, &file)?;
    }
    Ok(removed)
}

fn remove_from_first_var(file: &mut File, resources: &ResourceSet) -> usize {
    let Some(idx) = file
        .items
        .iter()
        .position(|item| matches!(&item.kind, ItemKind::Decl(d) if d.keyword == Keyword::Var))
    else {
        return 0;
    };
    let ItemKind::Decl(decl) = &mut file.items[idx].kind else {
        return 0;
    };
    let removed = trim_decl(decl, resources);
    if removed == 0 || !decl.specs.is_empty() {
        return removed;
    }

    let mut item = file.items.remove(idx);
    let mut orphaned = item.comments.take_all();
    if let ItemKind::Decl(decl) = &mut item.kind {
        orphaned.append(&mut decl.closing_comments);
    }
    match file.items.get_mut(idx) {
        Some(next) if orphaned.is_empty() => {
            next.comments.blank_before |= item.comments.blank_before;
        }
        Some(next) => {
            next.comments.blank_before = false;
            prepend(&mut next.comments.leading, orphaned);
        }
        None => prepend(&mut file.trailing_comments, orphaned),
    }
    removed
}

/// Drop auto-bound names from `decl`. Specs left without names are removed
/// and their comments move to the next spec, or before the closing
/// parenthesis.
fn trim_decl(decl: &mut GenDecl, resources: &ResourceSet) -> usize {
    let mut removed = 0;
    let mut orphaned: Vec<Comment> = Vec::new();
    let mut blank_before = false;
    let mut kept = Vec::with_capacity(decl.specs.len());

    for mut spec in std::mem::take(&mut decl.specs) {
        if let SpecKind::Value(vs) = &mut spec.kind {
            if vs.values.is_empty() {
                let before = vs.names.len();
                let ty = vs.ty.as_ref();
                vs.names
                    .retain(|name| !is_auto_binding(ty, &name.name, resources));
                removed += before - vs.names.len();
                if vs.names.is_empty() {
                    orphaned.extend(spec.comments.take_all());
                    blank_before |= spec.comments.blank_before;
                    continue;
                }
            }
        }
        prepend(&mut spec.comments.leading, std::mem::take(&mut orphaned));
        spec.comments.blank_before |= std::mem::take(&mut blank_before);
        kept.push(spec);
    }
    if let Some(first) = kept.first_mut() {
        first.comments.blank_before = false;
    }
    prepend(&mut decl.closing_comments, orphaned);
    decl.specs = kept;
    removed
}

fn prepend(dst: &mut Vec<Comment>, mut comments: Vec<Comment>) {
    if comments.is_empty() {
        return;
    }
    comments.append(dst);
    *dst = comments;
}

/// `var snd Sound` / `var snd *Sound` for a sound resource, or
/// `var Cat Cat` / `var Cat *Cat` / `var Cat Sprite` / `var Cat *Sprite`
/// for a sprite.
fn is_auto_binding(ty: Option<&Expr>, name: &str, resources: &ResourceSet) -> bool {
    let Some(type_name) = ty.and_then(base_type_name) else {
        return false;
    };
    if type_name == "Sound" && resources.is_sound(name) {
        return true;
    }
    resources.is_sprite(name) && (type_name == name || type_name == "Sprite")
}

/// `T`, `spx.T` and pointers to either.
fn base_type_name(ty: &Expr) -> Option<&str> {
    match ty {
        Expr::Ident(id) => Some(&id.name),
        Expr::Selector(sel) => match sel.x.as_ref() {
            Expr::Ident(pkg) if pkg.name == "spx" => Some(&sel.sel.name),
            _ => None,
        },
        Expr::Star(inner) => base_type_name(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing::{project, source};
    use pretty_assertions::assert_eq;

    fn resources() -> ResourceSet {
        ResourceSet {
            sounds: ["bgm".to_owned()].into(),
            sprites: ["Cat".to_owned(), "Dog".to_owned(), "Fox".to_owned()].into(),
        }
    }

    fn remove(src: &str) -> (String, usize) {
        let mut files = project(&[("main.spx", src), ("Cat.spx", "")]);
        let n = remove_auto_bindings(&mut files, &resources()).unwrap();
        (source(&files, "main.spx"), n)
    }

    #[test]
    fn every_binding_form_is_removed() {
        let (out, n) = remove(
            "var (\n\tCat Cat\n\tDog *Sprite\n\tFox spx.Sprite\n\tbgm *Sound\n\tscore int\n)\n\nonStart => {\n}\n",
        );
        assert_eq!(out, "var (\n\tscore int\n)\n\nonStart => {\n}\n");
        assert_eq!(n, 4);
    }

    #[test]
    fn block_left_empty_is_deleted() {
        let (out, n) = remove("var (\n\tbgm Sound\n\tCat Cat\n)\n\nonStart => {\n}\n");
        assert_eq!(out, "onStart => {\n}\n");
        assert_eq!(n, 2);
    }

    #[test]
    fn names_are_trimmed_within_a_spec() {
        assert_eq!(
            remove("var (\n\tCat, score Cat\n)\n").0,
            "var (\n\tscore Cat\n)\n"
        );
    }

    #[test]
    fn non_bindings_are_kept() {
        // Wrong type, unknown resource, initialized, or not the first var.
        let src = "var (\n\tbgm Sprite\n\tmeow Sound\n\tDog Cat\n\tCat Cat = nil\n)\n\nvar Fox Fox\n";
        assert_eq!(remove(src), (src.to_owned(), 0));
    }

    #[test]
    fn comments_of_removed_specs_move_on() {
        assert_eq!(
            remove("var (\n\t// sprites\n\tCat Cat\n\tscore int\n)\n").0,
            "var (\n\t// sprites\n\tscore int\n)\n"
        );
        assert_eq!(
            remove("// bindings\nvar bgm Sound\n\nonStart => {\n}\n").0,
            "// bindings\nonStart => {\n}\n"
        );
    }

    #[test]
    fn entry_file_in_a_directory() {
        let mut files = project(&[
            ("game/main.spx", "var bgm Sound\n\nplay bgm\n"),
            ("assets/.keep", ""),
        ]);
        assert_eq!(remove_auto_bindings(&mut files, &resources()).unwrap(), 1);
        assert_eq!(source(&files, "game/main.spx"), "play bgm\n");
    }

    #[test]
    fn missing_entry_file_is_an_error() {
        let mut files = project(&[("Cat.spx", "var bgm Sound\n")]);
        let err = remove_auto_bindings(&mut files, &resources()).unwrap_err();
        assert!(matches!(err, PassError::EntryFileNotFound));
    }
}
