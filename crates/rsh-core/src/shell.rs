//! The shell's single explicit owner of cross-cutting state: the builtin
//! table, the history engine, and the resolved history-file path.

use std::env;
use std::path::PathBuf;

use crate::builtins::{BuiltinContext, BuiltinRegistry};
use crate::error::ShellError;
use crate::exec::{pipeline as pipeline_exec, redirect::SavedFds};
use crate::exec_cache::ExecutableCache;
use crate::history::HistoryEngine;
use crate::parser::Pipeline;

const DEFAULT_HISTORY_CAPACITY: usize = 1000;
const DEFAULT_HISTORY_FILENAME: &str = ".my_shell_history";

/// What the REPL should do after running one pipeline.
pub enum Outcome {
    /// Keep looping; the stage reported this exit status.
    Continue(i32),
    /// `exit` was invoked; the process should terminate with this status.
    Exit(i32),
}

pub struct Shell {
    pub builtins: BuiltinRegistry,
    pub history: HistoryEngine,
    pub histfile: PathBuf,
    pub exe_cache: ExecutableCache,
}

impl Shell {
    /// Build a shell with a freshly resolved `HISTFILE` and its contents
    /// (if any) loaded into memory.
    pub fn new() -> Self {
        Self::with_histfile(Self::resolve_histfile())
    }

    pub fn with_histfile(histfile: PathBuf) -> Self {
        let mut history = HistoryEngine::new(DEFAULT_HISTORY_CAPACITY);
        let _ = history.load_file(&histfile);
        history.mark_checkpoint();
        Self {
            builtins: BuiltinRegistry::new(),
            history,
            histfile,
            exe_cache: ExecutableCache::new(),
        }
    }

    /// `$HISTFILE`, falling back to `$HOME/.my_shell_history`, falling back
    /// to `.my_shell_history` in the current directory.
    pub fn resolve_histfile() -> PathBuf {
        if let Ok(path) = env::var("HISTFILE") {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        if let Ok(home) = env::var("HOME") {
            return PathBuf::from(home).join(DEFAULT_HISTORY_FILENAME);
        }
        PathBuf::from(DEFAULT_HISTORY_FILENAME)
    }

    /// Run one already-parsed pipeline and report what the REPL should do
    /// next.
    pub fn dispatch(&mut self, pipeline: &Pipeline) -> Result<Outcome, ShellError> {
        if pipeline.is_single_stage() {
            let stage = &pipeline.stages[0];
            if stage.argv.is_empty() {
                return Ok(Outcome::Continue(self.run_noop_redirection(stage)?));
            }
            if self.builtins.is_builtin(&stage.argv[0]) {
                return self.run_builtin_in_process(stage);
            }
        }

        let status =
            pipeline_exec::run(pipeline, &self.builtins, &mut self.history, &self.histfile)?;
        Ok(Outcome::Continue(status))
    }

    fn run_noop_redirection(
        &mut self,
        stage: &crate::parser::Stage,
    ) -> Result<i32, ShellError> {
        let saved = SavedFds::capture()?;
        let result = crate::exec::redirect::apply_redirections(stage);
        drop(saved);
        result?;
        Ok(0)
    }

    fn run_builtin_in_process(
        &mut self,
        stage: &crate::parser::Stage,
    ) -> Result<Outcome, ShellError> {
        let saved = SavedFds::capture()?;
        if let Err(e) = crate::exec::redirect::apply_redirections(stage) {
            drop(saved);
            eprintln!("{e}");
            return Ok(Outcome::Continue(1));
        }

        let builtin = self
            .builtins
            .get(&stage.argv[0])
            .expect("caller already checked is_builtin");
        let names = self.builtins.names().to_vec();
        let mut exit_requested = None;
        let status = {
            let mut ctx = BuiltinContext {
                history: &mut self.history,
                builtin_names: &names,
                histfile: &self.histfile,
                exit_requested: &mut exit_requested,
            };
            builtin.run(&stage.argv[1..], &mut ctx)
        };
        drop(saved);

        match exit_requested {
            Some(code) => Ok(Outcome::Exit(code)),
            None => Ok(Outcome::Continue(status)),
        }
    }

    /// Flush history to disk. Called on clean exit (`exit`/EOF).
    pub fn persist_history(&mut self) -> Result<(), ShellError> {
        self.history.append_since_checkpoint(&self.histfile)?;
        Ok(())
    }

    /// The union of builtin names and `$PATH` executables, for a line
    /// editor's command-position completion.
    pub fn completion_candidates(&mut self) -> Vec<String> {
        let path_var = env::var("PATH").unwrap_or_default();
        let mut candidates: Vec<String> = self
            .builtins
            .names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        candidates.extend(self.exe_cache.names_for(&path_var).iter().cloned());
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}
