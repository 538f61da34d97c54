//! Error types for the shell core.
//!
//! Each stage of the pipeline (lexing, parsing, history, execution) gets its
//! own `thiserror` enum, mirroring the rest of the crate's "small typed error
//! per concern" style. [`ShellError`] is the aggregate the REPL actually
//! matches on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning a raw input line into tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// `at` is the byte offset of the quote character that was never
    /// closed.
    #[error("unclosed quotes (opened at byte offset {at})")]
    UnclosedQuotes { at: usize },
}

/// Errors raised while grouping tokens into a pipeline of command stages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error near unexpected token '|'")]
    EmptyPipelineSegment,

    #[error("missing filename")]
    MissingFilename,

    #[error("empty command in pipeline")]
    EmptyCommand,
}

/// Errors raised while resolving and applying a stage's `Redirection`s.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("{path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to duplicate file descriptor: {0}")]
    Dup(#[source] std::io::Error),
}

/// Errors raised by the history engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history: event not found")]
    EventNotFound,

    #[error("history: failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("history: failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// Errors raised while forking, wiring pipes, or execing a pipeline.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to create pipe: {0}")]
    Pipe(#[source] std::io::Error),

    #[error("failed to fork: {0}")]
    Fork(#[source] std::io::Error),

    #[error(transparent)]
    Redirect(#[from] RedirectError),

    #[error("failed to wait for child: {0}")]
    Wait(#[source] std::io::Error),
}

/// The aggregate error type surfaced by the REPL as a single stderr line.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Redirect(#[from] RedirectError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("cd: {0}")]
    Cd(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
