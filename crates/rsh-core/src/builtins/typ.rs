//! `type` - report whether a name is a builtin or resolves on `$PATH`.
//!
//! Named `typ` at the module level because `type` is a Rust keyword.

use std::env;

use super::{Builtin, BuiltinContext};
use crate::exec::external;
use crate::logging::{redact_env_value, shell_debug};

pub struct Type;

impl Builtin for Type {
    fn run(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> i32 {
        let Some(name) = args.first() else {
            eprintln!("type: missing operand");
            return 1;
        };

        if ctx.builtin_names.contains(&name.as_str()) {
            println!("{name} is a shell builtin");
            return 0;
        }

        let path_var = env::var("PATH").unwrap_or_default();
        shell_debug!(
            target: "shell.builtin",
            path = %redact_env_value("PATH", &path_var),
            "type searching PATH"
        );
        match external::resolve(name, &path_var) {
            Some(path) => {
                println!("{name} is {}", path.display());
                0
            }
            None => {
                println!("{name}: not found");
                1
            }
        }
    }
}
