//! rsh - interactive front end.
//!
//! Wires a `rustyline` line editor in as the [`rsh_core::repl::LineEditor`]
//! collaborator and drives `rsh_core::repl::run` against it. All shell
//! semantics (lexing, parsing, execution, history) live in `rsh-core`; this
//! crate only owns the terminal.

use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use rsh_core::repl::LineEditor;
use rsh_core::shell::Shell;

/// An interactive POSIX-style command shell.
#[derive(Parser, Debug)]
#[command(name = "rsh", author, version, about, long_about = None)]
struct Args {
    /// Disable structured tracing output regardless of RUST_LOG.
    #[arg(long)]
    quiet: bool,

    /// Override the history file path (otherwise `$HISTFILE`, falling back
    /// to `$HOME/.my_shell_history`, falling back to `.my_shell_history`).
    #[arg(long = "history-file")]
    histfile: Option<PathBuf>,
}

/// Command-position completion against the shell's builtin + `$PATH` set.
/// Matches are refreshed once per prompt by [`RustylineEditor::sync_completions`]
/// rather than re-scanning `$PATH` on every keystroke.
struct ShellHelper {
    candidates: RefCell<Vec<String>>,
}

impl Helper for ShellHelper {}
impl Highlighter for ShellHelper {}
impl Validator for ShellHelper {}

impl Hinter for ShellHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);

        // Only the command position gets builtin/PATH completion; everything
        // else falls back to rustyline's default (no-op here, filename
        // completion is not wired up — out of scope for this shell).
        if start != 0 {
            return Ok((pos, Vec::new()));
        }

        let prefix = &line[start..pos];
        if prefix.is_empty() {
            return Ok((pos, Vec::new()));
        }

        let pairs: Vec<Pair> = self
            .candidates
            .borrow()
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{name} "),
            })
            .collect();

        Ok((start, pairs))
    }
}

/// Adapts a `rustyline::Editor` to [`LineEditor`].
struct RustylineEditor {
    inner: Editor<ShellHelper, rustyline::history::DefaultHistory>,
}

impl RustylineEditor {
    fn new() -> rustyline::Result<Self> {
        let config = rustyline::Config::builder()
            .completion_type(rustyline::CompletionType::List)
            .build();
        let mut inner = Editor::with_config(config)?;
        inner.set_helper(Some(ShellHelper {
            candidates: RefCell::new(Vec::new()),
        }));
        Ok(Self { inner })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        match self.inner.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(e) => Err(std::io::Error::other(e)),
        }
    }

    fn record(&mut self, line: &str) {
        let _ = self.inner.add_history_entry(line);
    }

    fn sync_completions(&mut self, candidates: &[String]) {
        if let Some(helper) = self.inner.helper_mut() {
            *helper.candidates.borrow_mut() = candidates.to_vec();
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !args.quiet {
        init_tracing();
    }

    let mut shell = match args.histfile {
        Some(path) => Shell::with_histfile(path),
        None => Shell::new(),
    };
    let mut editor = RustylineEditor::new()?;
    let status = rsh_core::repl::run(&mut shell, &mut editor);
    std::process::exit(status);
}
