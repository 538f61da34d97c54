//! Lexing and pipeline parsing.
//!
//! [`lexer`] turns one input line into a token stream; [`pipeline`] groups
//! that stream into a [`pipeline::Pipeline`] of [`pipeline::Stage`]s with
//! their redirections extracted.

pub mod lexer;
pub mod pipeline;
pub mod span;
pub mod tokens;

pub use pipeline::{Pipeline, Stage};
pub use tokens::{RedirectMode, RedirectOp, Token};

use crate::error::ShellError;
use crate::logging::shell_debug;

/// Lex and parse one input line into a pipeline, end to end.
pub fn parse_line(line: &str) -> Result<Pipeline, ShellError> {
    let tokens = lexer::Lexer::tokenize(line)?;
    let pipeline = pipeline::parse(tokens)?;
    shell_debug!(target: "shell.parse", stages = pipeline.len(), "parsed pipeline");
    Ok(pipeline)
}
