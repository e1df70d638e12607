//! Hand-rolled recursive descent parser for the Verilog-2005 subset that
//! Silica synthesizes.
//!
//! The supported subset is: a single-level module with ANSI ports and
//! parameters, wire/reg declarations (including one-dimensional register
//! files), continuous assignments, `always` blocks with `begin`/`end`,
//! `if`/`else`, and `case`, and expressions over identifiers, sized/unsized
//! literals, `!`, `+`, `-`, `==`, `!=`, `&&`, `||`, replication, and indexed
//! reads.
//!
//! Parsing is fail-fast: the first syntax error aborts with a [`ParseError`]
//! carrying a line/column position. There is no error recovery — downstream
//! stages never see a partial tree.

#![warn(missing_docs)]

pub mod ast;
pub mod lexer;
mod parser;
pub mod token;

pub use ast::SourceFile;
pub use parser::ParseError;

/// Parses Verilog source text into a [`SourceFile`].
pub fn parse_source(source: &str) -> Result<SourceFile, ParseError> {
    let tokens = lexer::lex(source)?;
    parser::Parser::new(source, tokens).parse_source_file()
}
