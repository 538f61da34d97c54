//! Forks one process per pipeline stage, wires their stdio through
//! anonymous pipes, applies per-stage redirections, and waits for all of
//! them to finish.

use std::os::unix::io::{IntoRawFd, RawFd};
use std::path::Path;

use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, dup2, fork, pipe, ForkResult};

use crate::builtins::{BuiltinContext, BuiltinRegistry};
use crate::error::ExecError;
use crate::exec::{external, redirect};
use crate::history::HistoryEngine;
use crate::logging::shell_debug;
use crate::parser::{Pipeline, Stage};

/// Run every stage of `pipeline` as a real OS process and return the exit
/// status of the last stage.
///
/// This is the only path for multi-stage pipelines; a lone builtin stage
/// with no pipe is instead handled by the shell's in-process fast path so
/// that it can mutate the shell's own state (see [`crate::shell::Shell`]).
pub fn run(
    pipeline: &Pipeline,
    builtins: &BuiltinRegistry,
    history: &mut HistoryEngine,
    histfile: &Path,
) -> Result<i32, ExecError> {
    let n = pipeline.stages.len();
    shell_debug!(target: "shell.pipeline", stages = n, "driving pipeline");
    let mut pipe_fds: Vec<(RawFd, RawFd)> = Vec::with_capacity(n.saturating_sub(1));
    for _ in 0..n.saturating_sub(1) {
        let (read_end, write_end) = pipe().map_err(|e| ExecError::Pipe(e.into()))?;
        pipe_fds.push((read_end.into_raw_fd(), write_end.into_raw_fd()));
    }

    let mut children = Vec::with_capacity(n);
    for (i, stage) in pipeline.stages.iter().enumerate() {
        // SAFETY: this shell is single-threaded (see the concurrency model
        // in the design docs), so forking here carries none of the usual
        // multi-threaded async-signal-safety hazards.
        let fork_result = unsafe { fork() };
        match fork_result {
            Ok(ForkResult::Parent { child }) => children.push(child),
            Ok(ForkResult::Child) => {
                wire_child_stdio(&pipe_fds, i, n);
                if let Err(e) = redirect::apply_redirections(stage) {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
                run_child_stage(stage, builtins, history, histfile);
            }
            Err(e) => {
                // A later stage failed to fork: the pipes and the children
                // already launched for earlier stages are still live. Close
                // every pipe fd and reap every child already spawned before
                // reporting the error, so we don't leak fds or leave those
                // children's pipes dangling.
                for (r, w) in &pipe_fds {
                    let _ = close(*r);
                    let _ = close(*w);
                }
                for pid in &children {
                    let _ = waitpid(*pid, None);
                }
                return Err(ExecError::Fork(e.into()));
            }
        }
    }

    for (r, w) in &pipe_fds {
        let _ = close(*r);
        let _ = close(*w);
    }

    let mut last_status = 0;
    for (i, pid) in children.iter().enumerate() {
        let status = match waitpid(*pid, None).map_err(|e| ExecError::Wait(e.into()))? {
            WaitStatus::Exited(_, code) => code,
            WaitStatus::Signaled(_, _, _) => 1,
            _ => 1,
        };
        if i == children.len() - 1 {
            last_status = status;
        }
    }
    shell_debug!(target: "shell.pipeline", status = last_status, "pipeline finished");
    Ok(last_status)
}

/// Dup the appropriate pipe ends onto stdin/stdout for stage `i` of `n`,
/// then close every pipe descriptor (both ends, every pipe) so the child
/// doesn't hold the pipeline open past its own use of it.
fn wire_child_stdio(pipe_fds: &[(RawFd, RawFd)], i: usize, n: usize) {
    if i > 0 {
        let _ = dup2(pipe_fds[i - 1].0, 0);
    }
    if i < n - 1 {
        let _ = dup2(pipe_fds[i].1, 1);
    }
    for (r, w) in pipe_fds {
        let _ = close(*r);
        let _ = close(*w);
    }
}

/// Run one pipeline stage in the current (forked child) process and exit
/// with its status. Never returns.
fn run_child_stage(
    stage: &Stage,
    builtins: &BuiltinRegistry,
    history: &mut HistoryEngine,
    histfile: &Path,
) -> ! {
    if stage.argv.is_empty() {
        std::process::exit(0);
    }

    let name = stage.argv[0].clone();
    // `exit` in a pipeline stage always reports status 0 from the child,
    // regardless of any numeric argument it was given. Only the
    // single-stage fast path (`shell.rs::run_builtin_in_process`) is allowed
    // to turn `exit N` into the REPL's own process exit status.
    if name == "exit" {
        std::process::exit(0);
    }
    if let Some(builtin) = builtins.get(&name) {
        let names = builtins.names().to_vec();
        let mut exit_requested = None;
        let mut ctx = BuiltinContext {
            history,
            builtin_names: &names,
            histfile,
            exit_requested: &mut exit_requested,
        };
        let status = builtin.run(&stage.argv[1..], &mut ctx);
        std::process::exit(exit_requested.unwrap_or(status));
    }

    let path_var = std::env::var("PATH").unwrap_or_default();
    match external::resolve(&name, &path_var) {
        Some(path) => {
            let err = external::exec(&path, &stage.argv);
            eprintln!("{name}: {err}");
            std::process::exit(127);
        }
        None => {
            eprintln!("{name}: not found");
            std::process::exit(127);
        }
    }
}
