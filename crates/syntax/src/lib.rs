//! Syntax support for spx class files: lexer, tree, parser and a
//! gofmt-style printer.
//!
//! ```
//! let file = spx_syntax::parse_file("play bgm, true\n", "Cat.spx").unwrap();
//! assert_eq!(spx_syntax::print_file(&file), "play bgm, true\n");
//! ```
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod visit;

pub use error::ParseError;
pub use parser::parse_file;
pub use printer::print_file;
