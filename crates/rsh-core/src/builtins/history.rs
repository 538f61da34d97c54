//! `history` - inspect and manage the session's command history.

use std::path::Path;

use super::{Builtin, BuiltinContext};

pub struct History;

impl Builtin for History {
    fn run(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> i32 {
        match args {
            [] => {
                print_all(ctx, None);
                0
            }
            [n] if n.parse::<usize>().is_ok() => {
                print_all(ctx, n.parse::<usize>().ok());
                0
            }
            [flag] if flag == "-c" => {
                ctx.history.clear();
                if ctx.histfile.exists() {
                    if let Err(e) = std::fs::remove_file(ctx.histfile) {
                        eprintln!("history: failed to remove {}: {e}", ctx.histfile.display());
                        return 1;
                    }
                }
                0
            }
            [flag, path] if flag == "-r" => run_file_op(ctx, path, FileOp::Read),
            [flag, path] if flag == "-w" => run_file_op(ctx, path, FileOp::Write),
            [flag, path] if flag == "-a" => run_file_op(ctx, path, FileOp::Append),
            _ => {
                eprintln!("history: invalid usage");
                1
            }
        }
    }
}

enum FileOp {
    Read,
    Write,
    Append,
}

fn run_file_op(ctx: &mut BuiltinContext<'_>, path: &str, op: FileOp) -> i32 {
    let path = Path::new(path);
    let result = match op {
        FileOp::Read => ctx.history.load_file(path),
        FileOp::Write => ctx.history.write_file(path),
        FileOp::Append => ctx.history.append_since_checkpoint(path),
    };
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}

fn print_all(ctx: &BuiltinContext<'_>, last_n: Option<usize>) {
    let total = ctx.history.len();
    let skip = last_n.map(|n| total.saturating_sub(n)).unwrap_or(0);
    for (i, entry) in ctx.history.iter().enumerate().skip(skip) {
        println!("{:5}  {}", i + 1, entry);
    }
}
