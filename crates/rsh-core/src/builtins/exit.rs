//! `exit [N]` - terminate the shell, optionally with an explicit status.

use super::{Builtin, BuiltinContext};

pub struct Exit;

impl Builtin for Exit {
    fn run(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> i32 {
        let status = match args.first() {
            None => 0,
            Some(arg) => match arg.parse::<i32>() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("exit: {arg}: numeric argument required");
                    2
                }
            },
        };
        *ctx.exit_requested = Some(status);
        status
    }
}
