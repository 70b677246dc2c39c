use super::parse_file;
use crate::ast::*;
use crate::lexer::{Keyword, Punct};

fn stmts(src: &str) -> Vec<StmtKind> {
    parse_file(src, "test.spx")
        .expect("parse")
        .items
        .into_iter()
        .filter_map(|item| match item.kind {
            ItemKind::Stmt(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn call(stmt: &StmtKind) -> &CallExpr {
    match stmt {
        StmtKind::Expr(Expr::Call(c)) => c,
        other => panic!("expected call statement, got {:?}", other),
    }
}

#[test]
fn command_call_with_arguments() {
    let s = stmts("play bgm, true\n");
    let c = call(&s[0]);
    assert!(c.command);
    assert_eq!(c.callee_name(), Some("play"));
    assert_eq!(c.args.len(), 2);
    assert!(matches!(&c.args[1], Expr::Ident(id) if id.name == "true"));
}

#[test]
fn method_command_call() {
    let s = stmts("Cat.say \"hi\"\n");
    let c = call(&s[0]);
    assert!(c.command);
    assert!(matches!(c.fun.as_ref(), Expr::Selector(sel) if sel.sel.name == "say"));
}

#[test]
fn parenthesized_call_is_not_a_command() {
    let s = stmts("play(bgm)\n");
    assert!(!call(&s[0]).command);
}

#[test]
fn spaced_operator_is_a_binary_expression() {
    let s = stmts("x - 1\n");
    assert!(matches!(&s[0], StmtKind::Expr(Expr::Binary(b)) if b.op == Punct::Sub));
    let s = stmts("turn -90\n");
    assert!(call(&s[0]).command);
}

#[test]
fn lambda_arguments() {
    let s = stmts("onKey [KeyLeft, KeyRight], (key) => {\n\tprintln key\n}\nonStart => {\n}\n");
    let c = call(&s[0]);
    assert!(matches!(&c.args[0], Expr::SliceLit(lit) if lit.elts.len() == 2));
    match &c.args[1] {
        Expr::Lambda(l) => {
            assert!(l.parens);
            assert_eq!(l.params[0].name, "key");
            assert!(matches!(&l.body, LambdaBody::Block(b) if b.stmts.len() == 1));
        }
        other => panic!("expected lambda, got {:?}", other),
    }
    let c = call(&s[1]);
    assert!(matches!(&c.args[0], Expr::Lambda(l) if l.params.is_empty() && !l.parens));
}

#[test]
fn single_parameter_lambda_in_call_arguments() {
    let s = stmts("onTouchStart(s => {\n})\n");
    let c = call(&s[0]);
    assert!(matches!(&c.args[0], Expr::Lambda(l) if l.params[0].name == "s" && !l.parens));
}

#[test]
fn goto_label_is_a_branch_and_goto_with_value_is_a_call() {
    let s = stmts("goto done\ngoto \"Target\"\ndone:\n");
    assert!(matches!(
        &s[0],
        StmtKind::Branch { keyword: Keyword::Goto, label: Some(l) } if l.name == "done"
    ));
    let c = call(&s[1]);
    assert_eq!(c.callee_name(), Some("goto"));
    assert!(matches!(&s[2], StmtKind::Labeled { label, stmt: None } if label.name == "done"));
}

#[test]
fn keyword_member_names() {
    let s = stmts("Cat.goto Dog\n");
    let c = call(&s[0]);
    assert_eq!(c.callee_name(), Some("goto"));
}

#[test]
fn range_forms() {
    let s = stmts("for v in items {\n}\nfor k, v := range m {\n}\nfor x <- ch {\n}\n");
    assert!(matches!(&s[0], StmtKind::Range(r) if r.style == RangeStyle::In && r.key.is_none()));
    assert!(matches!(&s[1], StmtKind::Range(r) if r.style == RangeStyle::Range && r.value.is_some()));
    assert!(matches!(&s[2], StmtKind::Range(r) if r.style == RangeStyle::Arrow));
}

#[test]
fn range_expressions_in_for_clauses() {
    let s = stmts("for i <- 1:5 {\n}\nfor i in :n {\n}\nfor i <- 0:10:2 {\n}\n");
    let ranges: Vec<&RangeExpr> = s
        .iter()
        .map(|stmt| match stmt {
            StmtKind::Range(RangeStmt {
                x: Expr::Range(r), ..
            }) => r,
            other => panic!("expected range loop, got {:?}", other),
        })
        .collect();
    assert!(ranges[0].low.is_some() && ranges[0].step.is_none());
    assert!(ranges[1].low.is_none());
    assert!(matches!(ranges[1].high.as_ref(), Expr::Ident(id) if id.name == "n"));
    assert!(ranges[2].step.is_some());
}

#[test]
fn range_loop_filter() {
    let s = stmts("for x <- xs, x > 3 {\n}\nfor x in xs if x > 3 {\n}\n");
    assert!(matches!(&s[0], StmtKind::Range(r) if r.cond.as_ref().is_some_and(|c| c.comma)));
    assert!(matches!(&s[1], StmtKind::Range(r) if r.cond.as_ref().is_some_and(|c| !c.comma)));
}

#[test]
fn list_and_map_comprehensions() {
    let s = stmts("a := [x*2 for x <- xs]\nb := {v: k for k, v in m if v != \"\"}\n");
    let rhs = |stmt: &StmtKind| match stmt {
        StmtKind::Assign { rhs, .. } => rhs[0].clone(),
        other => panic!("expected assignment, got {:?}", other),
    };
    let Expr::Comprehension(list) = rhs(&s[0]) else {
        panic!("expected comprehension");
    };
    assert_eq!(list.kind, ComprehensionKind::List);
    assert!(matches!(list.elt.as_ref(), Expr::Binary(_)));
    assert_eq!(list.phrases[0].value.name, "x");
    assert_eq!(list.phrases[0].style, RangeStyle::Arrow);

    let Expr::Comprehension(map) = rhs(&s[1]) else {
        panic!("expected comprehension");
    };
    assert_eq!(map.kind, ComprehensionKind::Map);
    assert!(matches!(map.elt.as_ref(), Expr::KeyValue(_)));
    let phrase = &map.phrases[0];
    assert_eq!(phrase.key.as_ref().map(|k| k.name.as_str()), Some("k"));
    assert_eq!(phrase.style, RangeStyle::In);
    assert!(phrase.cond.is_some());
}

#[test]
fn postfix_error_operators() {
    let s = stmts("load()!\nn := atoi(s)?\nm := atoi(s)?:0\n");
    assert!(matches!(
        &s[0],
        StmtKind::Expr(Expr::ErrWrap(w)) if w.tok == Punct::Not && matches!(w.x.as_ref(), Expr::Call(_))
    ));
    let StmtKind::Assign { rhs, .. } = &s[1] else {
        panic!("expected assignment");
    };
    assert!(matches!(&rhs[0], Expr::ErrWrap(w) if w.tok == Punct::Question && w.default.is_none()));
    let StmtKind::Assign { rhs, .. } = &s[2] else {
        panic!("expected assignment");
    };
    assert!(matches!(&rhs[0], Expr::ErrWrap(w) if w.default.is_some()));
}

#[test]
fn spaced_not_still_starts_a_command_argument() {
    let s = stmts("show !hidden\n");
    let c = call(&s[0]);
    assert!(matches!(&c.args[0], Expr::Unary(u) if u.op == Punct::Not));
}

#[test]
fn element_comments_stay_with_their_element() {
    let s = stmts("p := Point{\n\tX: 1, // x\n\t// y next\n\tY: 2,\n} // done\n");
    let StmtKind::Assign { rhs, .. } = &s[0] else {
        panic!("expected assignment");
    };
    let Expr::Composite(lit) = &rhs[0] else {
        panic!("expected composite literal");
    };
    assert_eq!(lit.comments.elts[0].trailing[0].text, "// x");
    assert_eq!(lit.comments.elts[1].leading[0].text, "// y next");

    let file = parse_file("p := Point{\n\tX: 1, // x\n} // done\n", "c.spx").expect("parse");
    assert!(file.items[0].comments.leading.is_empty());
    assert_eq!(file.items[0].comments.trailing[0].text, "// done");
}

#[test]
fn selector_on_next_line_is_recorded() {
    let s = stmts("x := a.\n\tb()\n");
    let StmtKind::Assign { rhs, .. } = &s[0] else {
        panic!("expected assignment");
    };
    let Expr::Call(c) = &rhs[0] else {
        panic!("expected call");
    };
    assert!(matches!(c.fun.as_ref(), Expr::Selector(sel) if sel.line_break));
}

#[test]
fn composite_literal_not_allowed_in_if_header() {
    let s = stmts("if x == y {\n\tsay \"eq\"\n}\n");
    match &s[0] {
        StmtKind::If(i) => {
            assert!(matches!(&i.cond, Expr::Binary(_)));
            assert_eq!(i.then.stmts.len(), 1);
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn grouped_var_declaration() {
    let file = parse_file(
        "var (\n\tMySprite\n\tbgm Sound\n\tn int = 3\n)\n",
        "main.spx",
    )
    .expect("parse");
    let ItemKind::Decl(d) = &file.items[0].kind else {
        panic!("expected declaration");
    };
    assert!(d.grouped);
    assert_eq!(d.keyword, Keyword::Var);
    let specs: Vec<&ValueSpec> = d
        .specs
        .iter()
        .map(|s| match &s.kind {
            SpecKind::Value(v) => v,
            SpecKind::Type(_) => panic!("unexpected type spec"),
        })
        .collect();
    assert!(specs[0].ty.is_none());
    assert!(matches!(&specs[1].ty, Some(Expr::Ident(t)) if t.name == "Sound"));
    assert_eq!(specs[2].values.len(), 1);
}

#[test]
fn functions_and_types() {
    let file = parse_file(
        "type Score int\n\nfunc add(a, b int) int {\n\treturn a + b\n}\n\nfunc (p *Point) Move(dx float64) {\n}\n",
        "f.spx",
    )
    .expect("parse");
    assert!(matches!(&file.items[0].kind, ItemKind::Decl(d) if d.keyword == Keyword::Type));
    let ItemKind::Func(f) = &file.items[1].kind else {
        panic!("expected func");
    };
    assert_eq!(f.sig.params[0].names.len(), 2);
    assert_eq!(f.sig.results.len(), 1);
    let ItemKind::Func(m) = &file.items[2].kind else {
        panic!("expected method");
    };
    assert!(m.recv.is_some());
}

#[test]
fn comments_attach_to_statements() {
    let file = parse_file(
        "// first\nsay \"a\" // same line\n\n/* second */\nsay \"b\"\n// tail\n",
        "c.spx",
    )
    .expect("parse");
    let first = &file.items[0].comments;
    assert_eq!(first.leading[0].text, "// first");
    assert_eq!(first.trailing[0].text, "// same line");
    let second = &file.items[1].comments;
    assert!(second.leading[0].blank_before);
    assert_eq!(second.leading[0].text, "/* second */");
    assert_eq!(file.trailing_comments[0].text, "// tail");
}

#[test]
fn identifier_positions_are_one_based() {
    let s = stmts("\n  mouseHitItem\n");
    assert!(matches!(&s[0], StmtKind::Expr(Expr::Ident(id)) if id.pos.line == 2 && id.pos.column == 3));
}

#[test]
fn errors_carry_location() {
    let err = parse_file("x := )\n", "bad.spx").unwrap_err();
    assert_eq!(err.file, "bad.spx");
    assert_eq!((err.line, err.column), (1, 6));
    assert!(err.message.contains("expected expression"));
}

#[test]
fn unbalanced_brace_is_an_error() {
    assert!(parse_file("onStart => {\n\tsay 1\n", "open.spx").is_err());
    assert!(parse_file("}\n", "close.spx").is_err());
}
