//! # Go Syntax Module
//!
//! A small Go front end: lexer with automatic semicolon insertion, a
//! declaration-level recursive-descent parser, and a printer that renders type
//! expressions back to gofmt-style text.
//!
//! Function bodies, variables and constants are skipped; the generator only
//! needs package clauses, imports and type declarations.
//!
//! ```rust
//! use kitboiler::syntax::parse_type_expr;
//!
//! let ty = parse_type_expr("map[string][]*model.Item").unwrap();
//! assert_eq!(ty.to_string(), "map[string][]*model.Item");
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod printer;
mod token;


pub use ast::{
    is_exported, ChanDir, Field, File, ImportSpec, InterfaceElem, PackageRef, Signature,
    StructField, TypeExpr, TypeSpec, TypeTerm,
};
pub use error::{ParseError, ParseResult};
pub use lexer::{unquote, Lexer};
pub use parser::{parse_file, parse_type_expr, Parser};
pub use printer::TypePrinter;
pub use token::{Spanned, Token};
