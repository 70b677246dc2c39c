//! Syntax tree for spx class files.
//!
//! Nodes own their children (`Box`/`Vec`), so a tree is a plain value that
//! passes can mutate in place through [`crate::visit::VisitMut`]. Positions
//! are kept only where diagnostics need them; nodes synthesized by rewrites
//! carry `Pos::default()`.

use crate::lexer::{Keyword, Punct};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub offset: usize,
    /// 1-based.
    pub line: u32,
    /// 1-based, counted in bytes.
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Raw text including the `//` or `/* */` delimiters.
    pub text: String,
    pub pos: Pos,
    pub end_line: u32,
    /// Preceded by at least one empty line.
    pub blank_before: bool,
}

/// Comments attached to a statement, declaration, spec or list element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Comments {
    pub leading: Vec<Comment>,
    pub trailing: Vec<Comment>,
    pub blank_before: bool,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }

    fn is_blank(&self) -> bool {
        self.is_empty() && !self.blank_before
    }

    /// Detach every comment, leading first.
    pub fn take_all(&mut self) -> Vec<Comment> {
        let mut all = std::mem::take(&mut self.leading);
        all.append(&mut self.trailing);
        all
    }
}

/// Comments inside a bracketed list: literal elements or call arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListComments {
    /// Indexed like the list. Entries past the end of the list are printed
    /// before the closing bracket.
    pub elts: Vec<Comments>,
    /// Own-line comments before the closing bracket.
    pub closing: Vec<Comment>,
}

impl ListComments {
    pub fn is_empty(&self) -> bool {
        self.closing.is_empty() && self.elts.iter().all(Comments::is_blank)
    }

    pub fn get(&self, i: usize) -> Option<&Comments> {
        self.elts.get(i)
    }

    /// Keep entries aligned with a list that gained an element at `i`.
    pub fn insert(&mut self, i: usize) {
        if i < self.elts.len() {
            self.elts.insert(i, Comments::default());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Ident {
            name: name.into(),
            pos: Pos::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub kind: LitKind,
    /// Source spelling, quotes included for strings.
    pub value: String,
    pub pos: Pos,
}

impl BasicLit {
    /// A double-quoted string literal for `s`.
    pub fn string(s: &str) -> Self {
        let mut value = String::with_capacity(s.len() + 2);
        value.push('"');
        for c in s.chars() {
            match c {
                '"' => value.push_str("\\\""),
                '\\' => value.push_str("\\\\"),
                '\n' => value.push_str("\\n"),
                '\t' => value.push_str("\\t"),
                c => value.push(c),
            }
        }
        value.push('"');
        BasicLit {
            kind: LitKind::String,
            value,
            pos: Pos::default(),
        }
    }

    pub fn float(value: &str) -> Self {
        BasicLit {
            kind: LitKind::Float,
            value: value.to_owned(),
            pos: Pos::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    Composite(CompositeLit),
    /// `[a, b, c]`
    SliceLit(SliceLit),
    FuncLit(FuncLit),
    Lambda(Lambda),
    Paren(Box<Expr>),
    Selector(SelectorExpr),
    Index(IndexExpr),
    Slice(SliceExpr),
    TypeAssert(TypeAssertExpr),
    Call(CallExpr),
    /// `*x`: dereference or pointer type.
    Star(Box<Expr>),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    KeyValue(KeyValueExpr),
    ArrayType(ArrayType),
    MapType(MapType),
    ChanType(ChanType),
    FuncType(FuncType),
    StructType(FieldBlock),
    InterfaceType(FieldBlock),
    /// `...T` in a parameter list.
    Ellipsis(Option<Box<Expr>>),
    /// `start:end:step` after `<-` or `in`.
    Range(RangeExpr),
    /// `[x*2 for x <- xs]`, `{k: v for k, v <- m}`
    Comprehension(Comprehension),
    /// `f()!`, `f()?` and `f()?:fallback`
    ErrWrap(ErrWrapExpr),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name))
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    /// `None` for the untyped `{k: v}` form.
    pub ty: Option<Box<Expr>>,
    pub elts: Vec<Expr>,
    pub multiline: bool,
    pub comments: ListComments,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceLit {
    pub elts: Vec<Expr>,
    pub multiline: bool,
    pub comments: ListComments,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncLit {
    pub sig: FuncType,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<Ident>,
    /// `(x) => ...` rather than `x => ...`.
    pub parens: bool,
    pub body: LambdaBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Block(Block),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    pub x: Box<Expr>,
    pub sel: Ident,
    /// The selector starts a new line: `a.\n\tb()`.
    pub line_break: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub x: Box<Expr>,
    pub indices: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    pub x: Box<Expr>,
    pub low: Option<Box<Expr>>,
    pub high: Option<Box<Expr>>,
    pub max: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAssertExpr {
    pub x: Box<Expr>,
    /// `None` for `x.(type)`.
    pub ty: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub args: Vec<Expr>,
    /// Trailing `...` on the last argument.
    pub ellipsis: bool,
    /// Printed without parentheses: `play "bgm", true`.
    pub command: bool,
    pub multiline: bool,
    pub comments: ListComments,
}

impl CallExpr {
    pub fn new(fun: Expr, args: Vec<Expr>) -> Self {
        CallExpr {
            fun: Box::new(fun),
            args,
            ellipsis: false,
            command: false,
            multiline: false,
            comments: ListComments::default(),
        }
    }

    pub fn insert_arg(&mut self, i: usize, arg: Expr) {
        self.args.insert(i, arg);
        self.comments.insert(i);
    }

    /// Name of the called function or method: `f` in `f(x)` and `obj.f(x)`.
    pub fn callee_name(&self) -> Option<&str> {
        callee_ident(&self.fun).map(|id| id.name.as_str())
    }

    pub fn callee_ident_mut(&mut self) -> Option<&mut Ident> {
        match self.fun.as_mut() {
            Expr::Ident(id) => Some(id),
            Expr::Selector(sel) => Some(&mut sel.sel),
            _ => None,
        }
    }
}

/// The identifier naming `expr` when it is `name` or `x.name`.
pub fn callee_ident(expr: &Expr) -> Option<&Ident> {
    match expr {
        Expr::Ident(id) => Some(id),
        Expr::Selector(sel) => Some(&sel.sel),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: Punct,
    pub x: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: Punct,
    pub x: Box<Expr>,
    pub y: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueExpr {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayLen {
    /// `[]T`
    Slice,
    /// `[...]T`
    Inferred,
    Fixed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub len: ArrayLen,
    pub elt: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChanType {
    pub dir: ChanDir,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    /// Results written as `(T)` even when a single unnamed type.
    pub results_paren: bool,
}

/// Fields of a `struct` or methods of an `interface`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldBlock {
    pub fields: Vec<Field>,
    /// Written on one line: `struct{ X int }`.
    pub compact: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeExpr {
    pub low: Option<Box<Expr>>,
    pub high: Box<Expr>,
    pub step: Option<Box<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComprehensionKind {
    List,
    Map,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub kind: ComprehensionKind,
    /// A `KeyValue` for map comprehensions.
    pub elt: Box<Expr>,
    pub phrases: Vec<ForPhrase>,
}

/// `for k, v <- x if cond` inside a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct ForPhrase {
    pub key: Option<Ident>,
    pub value: Ident,
    /// `In` or `Arrow`.
    pub style: RangeStyle,
    pub x: Box<Expr>,
    pub cond: Option<PhraseCond>,
}

/// Filter of a `for ... <- x` loop or phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseCond {
    pub expr: Expr,
    /// Written `x, cond` rather than `x if cond`.
    pub comma: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrWrapExpr {
    pub x: Box<Expr>,
    /// `Not` for `x!`, `Question` for `x?`.
    pub tok: Punct,
    /// `x?:fallback`
    pub default: Option<Box<Expr>>,
}

/// A parameter, result, struct field or interface method.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
}

// ── Statements ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    /// Comments on the line of the opening brace.
    pub open_comments: Vec<Comment>,
    /// Comments between the last statement and the closing brace.
    pub closing_comments: Vec<Comment>,
    /// Both braces on one line in the source.
    pub compact: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Pos,
    pub comments: Comments,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt {
            kind,
            pos: Pos::default(),
            comments: Comments::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Assign {
        lhs: Vec<Expr>,
        op: Punct,
        rhs: Vec<Expr>,
    },
    IncDec {
        x: Expr,
        op: Punct,
    },
    Send {
        chan: Expr,
        value: Expr,
    },
    Decl(GenDecl),
    Block(Block),
    If(IfStmt),
    For(ForStmt),
    Range(RangeStmt),
    Switch(SwitchStmt),
    Return(Vec<Expr>),
    /// `break`, `continue`, `goto` and `fallthrough`.
    Branch {
        keyword: Keyword,
        label: Option<Ident>,
    },
    Labeled {
        label: Ident,
        stmt: Option<Box<Stmt>>,
    },
    Go(Expr),
    Defer(Expr),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then: Block,
    /// Either another `If` or a `Block`.
    pub els: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    /// `for init; cond; post` rather than `for cond`.
    pub clauses: bool,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStyle {
    /// `for k, v := range x`
    Range,
    /// `for v in x`
    In,
    /// `for v <- x`
    Arrow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// `:=` or `=` for the `range` form.
    pub tok: Option<Punct>,
    pub style: RangeStyle,
    pub x: Expr,
    /// Only for the `in` and `<-` forms.
    pub cond: Option<PhraseCond>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub init: Option<Box<Stmt>>,
    /// An expression statement, or `v := x.(type)` for type switches.
    pub tag: Option<Box<Stmt>>,
    pub clauses: Vec<CaseClause>,
    pub closing_comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    /// `None` for `default:`.
    pub list: Option<Vec<Expr>>,
    pub body: Vec<Stmt>,
    pub comments: Comments,
}

// ── Declarations ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    /// `var`, `const` or `type`.
    pub keyword: Keyword,
    pub specs: Vec<Spec>,
    /// Written with parentheses.
    pub grouped: bool,
    pub closing_comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    pub kind: SpecKind,
    pub comments: Comments,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpecKind {
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    /// Alias declaration `type A = B`.
    pub assign: bool,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specs: Vec<ImportSpec>,
    pub grouped: bool,
    pub closing_comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub name: Option<Ident>,
    pub path: BasicLit,
    pub comments: Comments,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub recv: Option<Vec<Field>>,
    pub name: Ident,
    pub sig: FuncType,
    pub body: Option<Block>,
}

/// One top-level element of a class file. Bare statements form the
/// class's entry body, in source order with the declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Pos,
    pub comments: Comments,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Import(ImportDecl),
    Decl(GenDecl),
    Func(FuncDecl),
    Stmt(StmtKind),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub items: Vec<Item>,
    /// Comments after the last item.
    pub trailing_comments: Vec<Comment>,
}
