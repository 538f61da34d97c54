//! The read-expand-lex-parse-dispatch loop.
//!
//! This module knows nothing about terminals or line editing; it consumes
//! a [`LineEditor`] collaborator so `rsh-cli` can plug in `rustyline` (or a
//! test harness can plug in a canned script) without this crate depending
//! on either.

use crate::logging::shell_debug;
use crate::parser::{self, Pipeline};
use crate::shell::{Outcome, Shell};

const PROMPT: &str = "$ ";

/// True when `pipeline` is exactly the single-stage `history -c` command —
/// the one accepted line that must not itself be recorded. Compares the
/// already-parsed `argv` rather than the raw input text, so whitespace or
/// quoting differences that lex to the same command (`history  -c`, a
/// stray tab) are still recognized, and this can't drift out of sync with
/// `builtins/history.rs`'s own argv matching.
fn is_history_clear(pipeline: &Pipeline) -> bool {
    pipeline.is_single_stage()
        && pipeline.stages[0].argv == ["history", "-c"]
}

/// The REPL's view of an interactive line editor.
pub trait LineEditor {
    /// Prompt and read one line. `Ok(None)` signals EOF.
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;
    /// Record an accepted line in the editor's own (in-memory/persisted)
    /// history, independent of this crate's [`crate::history::HistoryEngine`].
    fn record(&mut self, line: &str);
    /// Refresh the editor's command-position completion candidates. Called
    /// once per prompt with the union of builtin names and `$PATH`
    /// executables ([`Shell::completion_candidates`]). No-op by default for
    /// editors that don't complete.
    fn sync_completions(&mut self, _candidates: &[String]) {}
}

/// Run the loop until EOF or `exit`, returning the process exit status.
pub fn run(shell: &mut Shell, editor: &mut dyn LineEditor) -> i32 {
    loop {
        shell_debug!(target: "shell.repl", "prompting");
        editor.sync_completions(&shell.completion_candidates());
        let line = match editor.read_line(PROMPT) {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("rsh: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let expanded = match shell.history.expand(&line) {
            Ok(expanded) => expanded,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let pipeline = match parser::parse_line(&expanded) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        if !is_history_clear(&pipeline) {
            shell.history.push(line.clone());
        }
        editor.record(&line);

        shell_debug!(target: "shell.repl", line = %expanded, "dispatching command");

        match shell.dispatch(&pipeline) {
            Ok(Outcome::Continue(_status)) => continue,
            Ok(Outcome::Exit(status)) => {
                let _ = shell.persist_history();
                return status;
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    let _ = shell.persist_history();
    0
}
