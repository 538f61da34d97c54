//! `echo` - write its arguments, space-joined, followed by a newline.

use super::{Builtin, BuiltinContext};

pub struct Echo;

impl Builtin for Echo {
    fn run(&self, args: &[String], _ctx: &mut BuiltinContext<'_>) -> i32 {
        println!("{}", args.join(" "));
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEngine;

    #[test]
    fn echo_always_succeeds() {
        let mut history = HistoryEngine::new(1000);
        let mut exit_requested = None;
        let mut ctx = BuiltinContext {
            history: &mut history,
            builtin_names: &[],
            histfile: std::path::Path::new("/dev/null"),
            exit_requested: &mut exit_requested,
        };
        let status = Echo.run(&["a".into(), "b".into()], &mut ctx);
        assert_eq!(status, 0);
    }
}
