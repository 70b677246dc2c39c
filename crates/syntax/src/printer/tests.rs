use super::print_file;
use crate::parser::parse_file;
use pretty_assertions::assert_eq;

fn format(src: &str) -> String {
    print_file(&parse_file(src, "fmt.spx").expect("parse"))
}

fn assert_stable(src: &str) {
    assert_eq!(format(src), src);
}

#[test]
fn formatted_entry_file_is_stable() {
    assert_stable(
        r#"// Game entry.

import "math"

var (
	MySprite MySprite
	bgm      Sound // music
)

onStart => {
	play bgm, true
	for i := 0; i < 3; i++ {
		step 10
	}
	if x := math.floor(2.5); x > 1 {
		say "big"
	} else {
		say "small"
	}
}

onKey [KeyLeft, KeyRight], (key) => {
	println key
}

run "assets", {Title: "My Game"}
"#,
    );
}

#[test]
fn grouped_specs_align_in_columns() {
    assert_eq!(
        format("var (\n\tx int\n\tlongName string = \"a\"\n)\n"),
        "var (\n\tx        int\n\tlongName string = \"a\"\n)\n"
    );
}

#[test]
fn single_spec_uses_plain_spaces() {
    assert_stable("var score int = 1\n");
}

#[test]
fn trailing_comments_align() {
    assert_eq!(
        format("say \"hi\" // one\nstep 100 // two\n"),
        "say \"hi\" // one\nstep 100 // two\n"
    );
    assert_eq!(
        format("x := 1 // one\nlonger := 2 // two\n"),
        "x := 1      // one\nlonger := 2 // two\n"
    );
}

#[test]
fn comments_and_blank_lines_survive() {
    assert_stable("// leading\nsay \"hi\" // trailing\n\n/* block */\nsay \"bye\"\n");
}

#[test]
fn multiline_composite_aligns_keys() {
    assert_eq!(
        format("run \"assets\", {\n\tTitle: \"My Game\",\n\tW: 480,\n}\n"),
        "run \"assets\", {\n\tTitle: \"My Game\",\n\tW:     480,\n}\n"
    );
}

#[test]
fn empty_lambda_body_expands() {
    assert_eq!(format("onTouchStart => {}\n"), "onTouchStart => {\n}\n");
}

#[test]
fn one_line_function_bodies_stay_on_one_line() {
    assert_stable("func onStart() {}\n");
    assert_stable("f := func() { say \"hi\" }\n");
}

#[test]
fn comment_after_open_brace_stays_on_that_line() {
    assert_stable("onStart => { // setup\n\tsay \"hi\"\n}\n");
}

#[test]
fn labels_are_outdented() {
    assert_stable("func f() {\nloop:\n\tfor {\n\t\tbreak loop\n\t}\n}\n");
}

#[test]
fn type_switch() {
    assert_stable(
        "switch x := v.(type) {\ncase int:\n\tsay \"int\"\ndefault:\n\tsay \"other\"\n}\n",
    );
}

#[test]
fn control_headers_drop_redundant_parens() {
    assert_eq!(
        format("if (x > 1) {\n\tsay x\n}\n"),
        "if x > 1 {\n\tsay x\n}\n"
    );
}

#[test]
fn different_item_kinds_get_a_blank_line() {
    assert_eq!(
        format("var x int\nfunc f() {}\nsay x\n"),
        "var x int\n\nfunc f() {}\n\nsay x\n"
    );
}

#[test]
fn missing_final_newline_is_added() {
    assert_eq!(format("say 1"), "say 1\n");
}

#[test]
fn range_loops() {
    assert_stable("for i <- 1:5 {\n\tsay i\n}\n");
    assert_stable("for i in :n {\n\tsay i\n}\n");
    assert_stable("for i <- 0:10:2 {\n\tsay i\n}\n");
    assert_stable("for x in xs if x > 3 {\n\tsay x\n}\n");
    assert_stable("for k, v <- m, v != \"\" {\n\tsay k\n}\n");
}

#[test]
fn comprehensions() {
    assert_stable("xs := [x*2 for x <- nums]\n");
    assert_stable("m := {k: v for k, v <- src if v > 0}\n");
    assert_stable("evens := [x for x in 0:10, x%2 == 0]\n");
}

#[test]
fn error_operators() {
    assert_stable("data := load()!\n");
    assert_stable("n := parse(s)?\n");
    assert_stable("n := parse(s)?:0\n");
    assert_stable("save()!\nsay \"saved\"\n");
}

#[test]
fn comments_inside_lists_stay_with_their_elements() {
    assert_stable("p := Point{\n\tX: 1, // x\n\tY: 2,\n}\n");
    assert_stable("xs := [\n\t// first\n\t1,\n\t2, /* two */\n\t3,\n]\n");
    assert_stable("x := foo(\n\t1, // one\n\t2,\n\t// done\n)\n");
    assert_stable("x := foo(1, // one\n\t2)\n");
    assert_stable("x := [1, 2] // pair\n");
}

#[test]
fn selector_chains_keep_their_line_breaks() {
    assert_stable("x := a.\n\tb().\n\tc()\n");
}

#[test]
fn one_line_struct_types_stay_on_one_line() {
    assert_stable("type Point struct{ X, Y int }\n");
    assert_stable("var p struct{ X int; Y string }\n");
    assert_stable("type Point struct {\n\tX int\n\tY int\n}\n");
}
