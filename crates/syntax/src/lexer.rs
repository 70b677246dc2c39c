use crate::ast::{Comment, Pos};
use crate::error::ParseError;

/// Reserved words. `in` is not reserved: it only has meaning inside a
/// `for` header and stays usable as an identifier everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Chan => "chan",
            Keyword::Const => "const",
            Keyword::Continue => "continue",
            Keyword::Default => "default",
            Keyword::Defer => "defer",
            Keyword::Else => "else",
            Keyword::Fallthrough => "fallthrough",
            Keyword::For => "for",
            Keyword::Func => "func",
            Keyword::Go => "go",
            Keyword::Goto => "goto",
            Keyword::If => "if",
            Keyword::Import => "import",
            Keyword::Interface => "interface",
            Keyword::Map => "map",
            Keyword::Package => "package",
            Keyword::Range => "range",
            Keyword::Return => "return",
            Keyword::Select => "select",
            Keyword::Struct => "struct",
            Keyword::Switch => "switch",
            Keyword::Type => "type",
            Keyword::Var => "var",
        }
    }

    fn from_word(word: &str) -> Option<Keyword> {
        let kw = match word {
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "chan" => Keyword::Chan,
            "const" => Keyword::Const,
            "continue" => Keyword::Continue,
            "default" => Keyword::Default,
            "defer" => Keyword::Defer,
            "else" => Keyword::Else,
            "fallthrough" => Keyword::Fallthrough,
            "for" => Keyword::For,
            "func" => Keyword::Func,
            "go" => Keyword::Go,
            "goto" => Keyword::Goto,
            "if" => Keyword::If,
            "import" => Keyword::Import,
            "interface" => Keyword::Interface,
            "map" => Keyword::Map,
            "package" => Keyword::Package,
            "range" => Keyword::Range,
            "return" => Keyword::Return,
            "select" => Keyword::Select,
            "struct" => Keyword::Struct,
            "switch" => Keyword::Switch,
            "type" => Keyword::Type,
            "var" => Keyword::Var,
            _ => return None,
        };
        Some(kw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punct {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    LAnd,
    LOr,
    Arrow,
    Inc,
    Dec,
    Eql,
    Lss,
    Gtr,
    Assign,
    Not,
    Neq,
    Leq,
    Geq,
    Define,
    Ellipsis,
    LParen,
    LBrack,
    LBrace,
    Comma,
    Period,
    RParen,
    RBrack,
    RBrace,
    Semicolon,
    Colon,
    Lambda,
    Question,
    Tilde,
}

/// Longest spellings first so that greedy matching picks `<<=` over `<<`.
const PUNCTS: &[(&str, Punct)] = &[
    ("&^=", Punct::AndNotAssign),
    ("<<=", Punct::ShlAssign),
    (">>=", Punct::ShrAssign),
    ("...", Punct::Ellipsis),
    ("&^", Punct::AndNot),
    ("<<", Punct::Shl),
    (">>", Punct::Shr),
    ("+=", Punct::AddAssign),
    ("-=", Punct::SubAssign),
    ("*=", Punct::MulAssign),
    ("/=", Punct::QuoAssign),
    ("%=", Punct::RemAssign),
    ("&=", Punct::AndAssign),
    ("|=", Punct::OrAssign),
    ("^=", Punct::XorAssign),
    ("&&", Punct::LAnd),
    ("||", Punct::LOr),
    ("<-", Punct::Arrow),
    ("++", Punct::Inc),
    ("--", Punct::Dec),
    ("==", Punct::Eql),
    ("!=", Punct::Neq),
    ("<=", Punct::Leq),
    (">=", Punct::Geq),
    (":=", Punct::Define),
    ("=>", Punct::Lambda),
    ("+", Punct::Add),
    ("-", Punct::Sub),
    ("*", Punct::Mul),
    ("/", Punct::Quo),
    ("%", Punct::Rem),
    ("&", Punct::And),
    ("|", Punct::Or),
    ("^", Punct::Xor),
    ("<", Punct::Lss),
    (">", Punct::Gtr),
    ("=", Punct::Assign),
    ("!", Punct::Not),
    ("(", Punct::LParen),
    ("[", Punct::LBrack),
    ("{", Punct::LBrace),
    (",", Punct::Comma),
    (".", Punct::Period),
    (")", Punct::RParen),
    ("]", Punct::RBrack),
    ("}", Punct::RBrace),
    (";", Punct::Semicolon),
    (":", Punct::Colon),
    ("?", Punct::Question),
    ("~", Punct::Tilde),
];

impl Punct {
    pub fn text(self) -> &'static str {
        PUNCTS
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(s, _)| *s)
            .unwrap_or("")
    }

    /// Binary operator precedence (Go rules); 0 for non-binary tokens.
    pub fn precedence(self) -> u8 {
        match self {
            Punct::LOr => 1,
            Punct::LAnd => 2,
            Punct::Eql | Punct::Neq | Punct::Lss | Punct::Leq | Punct::Gtr | Punct::Geq => 3,
            Punct::Add | Punct::Sub | Punct::Or | Punct::Xor => 4,
            Punct::Mul
            | Punct::Quo
            | Punct::Rem
            | Punct::Shl
            | Punct::Shr
            | Punct::And
            | Punct::AndNot => 5,
            _ => 0,
        }
    }

    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            Punct::Assign
                | Punct::Define
                | Punct::AddAssign
                | Punct::SubAssign
                | Punct::MulAssign
                | Punct::QuoAssign
                | Punct::RemAssign
                | Punct::AndAssign
                | Punct::OrAssign
                | Punct::XorAssign
                | Punct::ShlAssign
                | Punct::ShrAssign
                | Punct::AndNotAssign
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Keyword(Keyword),
    /// Literals keep their exact source spelling, quotes included.
    Int(String),
    Float(String),
    Imag(String),
    Char(String),
    Str(String),
    Punct(Punct),
    /// Statement terminator inserted at a line break (Go's automatic semicolon).
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub pos: Pos,
    /// Byte offset just past the token.
    pub end: usize,
    /// Line of the token's last byte; differs from `pos.line` only for raw strings.
    pub end_line: u32,
    pub space_before: bool,
}

#[derive(Debug, Clone)]
pub struct Lexed {
    pub tokens: Vec<Spanned>,
    pub comments: Vec<Comment>,
}

pub fn lex(src: &str, filename: &str) -> Result<Lexed, ParseError> {
    Lexer {
        src,
        file: filename,
        offset: 0,
        line: 1,
        line_start: 0,
        space_before: true,
        tokens: Vec::new(),
        comments: Vec::new(),
    }
    .run()
}

struct Lexer<'a> {
    src: &'a str,
    file: &'a str,
    offset: usize,
    line: u32,
    line_start: usize,
    space_before: bool,
    tokens: Vec<Spanned>,
    comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    fn pos(&self) -> Pos {
        Pos {
            offset: self.offset,
            line: self.line,
            column: (self.offset - self.line_start + 1) as u32,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.offset..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.offset;
        }
        Some(c)
    }

    fn err(&self, pos: Pos, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.file, pos, msg)
    }

    fn push(&mut self, token: Token, pos: Pos) {
        self.tokens.push(Spanned {
            token,
            pos,
            end: self.offset,
            end_line: self.line,
            space_before: self.space_before,
        });
        self.space_before = false;
    }

    fn needs_terminator(&self) -> bool {
        match self.tokens.last().map(|t| &t.token) {
            Some(
                Token::Ident(_)
                | Token::Int(_)
                | Token::Float(_)
                | Token::Imag(_)
                | Token::Char(_)
                | Token::Str(_),
            ) => true,
            Some(Token::Keyword(kw)) => matches!(
                kw,
                Keyword::Break | Keyword::Continue | Keyword::Fallthrough | Keyword::Return
            ),
            Some(Token::Punct(p)) => matches!(
                p,
                Punct::Inc
                    | Punct::Dec
                    | Punct::RParen
                    | Punct::RBrack
                    | Punct::RBrace
                    // `f()!` and `f()?` at the end of a line.
                    | Punct::Not
                    | Punct::Question
            ),
            _ => false,
        }
    }

    fn terminate_line(&mut self, pos: Pos) {
        if self.needs_terminator() {
            self.tokens.push(Spanned {
                token: Token::Newline,
                pos,
                end: pos.offset,
                end_line: pos.line,
                space_before: true,
            });
        }
    }

    fn run(mut self) -> Result<Lexed, ParseError> {
        loop {
            let Some(c) = self.peek() else {
                let pos = self.pos();
                self.terminate_line(pos);
                self.push(Token::Eof, pos);
                break;
            };
            let pos = self.pos();
            match c {
                '\n' => {
                    self.terminate_line(pos);
                    self.bump();
                    self.space_before = true;
                }
                c if c.is_whitespace() => {
                    self.bump();
                    self.space_before = true;
                }
                '/' if self.peek_nth(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                    self.comment(pos);
                }
                '/' if self.peek_nth(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.err(pos, "comment not terminated")),
                        }
                    }
                    if self.line > pos.line {
                        self.terminate_line(pos);
                    }
                    self.comment(pos);
                }
                '"' => self.string(pos)?,
                '`' => self.raw_string(pos)?,
                '\'' => self.char_lit(pos)?,
                c if c.is_alphabetic() || c == '_' => self.word(pos),
                c if c.is_ascii_digit() => self.number(pos)?,
                '.' if self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) => self.number(pos)?,
                _ => self.punct(pos)?,
            }
        }
        Ok(Lexed {
            tokens: self.tokens,
            comments: self.comments,
        })
    }

    fn comment(&mut self, pos: Pos) {
        self.comments.push(Comment {
            text: self.src[pos.offset..self.offset].to_owned(),
            pos,
            end_line: self.line,
            blank_before: false,
        });
        self.space_before = true;
    }

    fn string(&mut self, pos: Pos) -> Result<(), ParseError> {
        self.bump();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(self.err(pos, "string literal not terminated"));
                    }
                }
                Some('\n') | None => return Err(self.err(pos, "string literal not terminated")),
                Some(_) => {}
            }
        }
        let text = self.src[pos.offset..self.offset].to_owned();
        self.push(Token::Str(text), pos);
        Ok(())
    }

    fn raw_string(&mut self, pos: Pos) -> Result<(), ParseError> {
        self.bump();
        loop {
            match self.bump() {
                Some('`') => break,
                Some(_) => {}
                None => return Err(self.err(pos, "raw string literal not terminated")),
            }
        }
        let text = self.src[pos.offset..self.offset].to_owned();
        self.push(Token::Str(text), pos);
        Ok(())
    }

    fn char_lit(&mut self, pos: Pos) -> Result<(), ParseError> {
        self.bump();
        loop {
            match self.bump() {
                Some('\'') => break,
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(self.err(pos, "rune literal not terminated"));
                    }
                }
                Some('\n') | None => return Err(self.err(pos, "rune literal not terminated")),
                Some(_) => {}
            }
        }
        let text = self.src[pos.offset..self.offset].to_owned();
        self.push(Token::Char(text), pos);
        Ok(())
    }

    fn word(&mut self, pos: Pos) {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let word = &self.src[pos.offset..self.offset];
        let token = match Keyword::from_word(word) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Ident(word.to_owned()),
        };
        self.push(token, pos);
    }

    fn digits(&mut self, radix: u32) {
        while let Some(c) = self.peek() {
            if c == '_' || c.is_digit(radix) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn number(&mut self, pos: Pos) -> Result<(), ParseError> {
        let mut float = false;
        let prefix = match (self.peek(), self.peek_nth(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('b' | 'B')) => Some(2),
            (Some('0'), Some('o' | 'O')) => Some(8),
            _ => None,
        };
        if let Some(radix) = prefix {
            self.bump();
            self.bump();
            self.digits(radix);
        } else {
            self.digits(10);
            if self.peek() == Some('.') && self.peek_nth(1) != Some('.') {
                float = true;
                self.bump();
                self.digits(10);
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                float = true;
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                let exp_start = self.offset;
                self.digits(10);
                if self.offset == exp_start {
                    return Err(self.err(pos, "exponent has no digits"));
                }
            }
        }
        let token = if self.peek() == Some('i') {
            self.bump();
            Token::Imag(self.src[pos.offset..self.offset].to_owned())
        } else if float {
            Token::Float(self.src[pos.offset..self.offset].to_owned())
        } else {
            Token::Int(self.src[pos.offset..self.offset].to_owned())
        };
        self.push(token, pos);
        Ok(())
    }

    fn punct(&mut self, pos: Pos) -> Result<(), ParseError> {
        let rest = &self.src[self.offset..];
        let Some(&(text, punct)) = PUNCTS.iter().find(|(text, _)| rest.starts_with(text)) else {
            let c = rest.chars().next().unwrap_or('\0');
            return Err(self.err(pos, format!("invalid character {:?}", c)));
        };
        self.offset += text.len();
        self.push(Token::Punct(punct), pos);
        Ok(())
    }
}
