//! Core engine for an interactive POSIX-style command shell.
//!
//! This crate has no opinion about terminals or line editing: it exposes
//! a [`repl::LineEditor`] collaborator trait that a front end (such as
//! `rsh-cli`, built on `rustyline`) implements, and drives the
//! read-expand-lex-parse-dispatch loop against it.
//!
//! # Quick start
//!
//! ```no_run
//! use rsh_core::shell::Shell;
//!
//! let mut shell = Shell::new();
//! let pipeline = rsh_core::parser::parse_line("echo hello | tr a-z A-Z").unwrap();
//! shell.dispatch(&pipeline).unwrap();
//! ```

pub mod builtins;
pub mod error;
pub mod exec;
pub mod exec_cache;
pub mod history;
pub mod logging;
pub mod parser;
pub mod repl;
pub mod shell;

pub use error::{Result, ShellError};
pub use shell::Shell;
