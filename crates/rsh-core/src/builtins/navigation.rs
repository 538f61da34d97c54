//! `cd` and `pwd` - real working-directory navigation.

use std::env;
use std::path::PathBuf;

use super::{Builtin, BuiltinContext};
use crate::logging::{redact_env_value, shell_debug};

pub struct Cd;

impl Builtin for Cd {
    fn run(&self, args: &[String], _ctx: &mut BuiltinContext<'_>) -> i32 {
        let target = match resolve_target(args.first().map(String::as_str)) {
            Ok(t) => t,
            Err(msg) => {
                eprintln!("cd: {msg}");
                return 1;
            }
        };
        let old_cwd = match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("cd: {e}");
                return 1;
            }
        };

        if let Err(e) = env::set_current_dir(&target) {
            eprintln!("cd: {}: {}", target.display(), describe_chdir_error(&e));
            return 1;
        }

        env::set_var("OLDPWD", &old_cwd);
        if let Ok(new_cwd) = env::current_dir() {
            env::set_var("PWD", &new_cwd);
        }
        0
    }
}

fn describe_chdir_error(e: &std::io::Error) -> String {
    if e.kind() == std::io::ErrorKind::NotFound {
        "No such file or directory".to_string()
    } else {
        e.to_string()
    }
}

/// Resolve `cd`'s target argument per the shell's rules: no argument means
/// `$HOME`, `-` means `$OLDPWD` (printed, unlike bash, this implementation
/// keeps silent per the coarser spec this shell follows), `~`/`~/...`
/// expand against `$HOME`, anything else is used literally.
fn resolve_target(arg: Option<&str>) -> Result<PathBuf, String> {
    match arg {
        None => read_env_var("HOME").map(PathBuf::from),
        Some("-") => read_env_var("OLDPWD").map(PathBuf::from),
        Some("~") => read_env_var("HOME").map(PathBuf::from),
        Some(path) if path.starts_with("~/") => {
            let home = read_env_var("HOME")?;
            Ok(PathBuf::from(home).join(&path[2..]))
        }
        Some(path) => Ok(PathBuf::from(path)),
    }
}

/// Read `name` from the environment, logging its (possibly redacted) value
/// at debug level before returning it, and reporting "not set" uniformly.
fn read_env_var(name: &str) -> Result<String, String> {
    let value = env::var(name).map_err(|_| format!("{name} not set"))?;
    shell_debug!(
        target: "shell.builtin",
        name,
        value = %redact_env_value(name, &value),
        "cd read environment variable"
    );
    Ok(value)
}

pub struct Pwd;

impl Builtin for Pwd {
    fn run(&self, _args: &[String], _ctx: &mut BuiltinContext<'_>) -> i32 {
        match env::current_dir() {
            Ok(cwd) => {
                println!("{}", cwd.display());
                0
            }
            Err(e) => {
                eprintln!("pwd: {e}");
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEngine;
    use serial_test::serial;

    #[test]
    #[serial(shell_env)]
    fn resolve_target_defaults_to_home() {
        std::env::set_var("HOME", "/home/testuser");
        assert_eq!(resolve_target(None).unwrap(), PathBuf::from("/home/testuser"));
    }

    #[test]
    #[serial(shell_env)]
    fn resolve_target_expands_tilde_slash() {
        std::env::set_var("HOME", "/home/testuser");
        assert_eq!(
            resolve_target(Some("~/projects")).unwrap(),
            PathBuf::from("/home/testuser/projects")
        );
    }

    #[test]
    #[serial(shell_env)]
    fn resolve_target_dash_uses_oldpwd() {
        std::env::set_var("OLDPWD", "/tmp");
        assert_eq!(resolve_target(Some("-")).unwrap(), PathBuf::from("/tmp"));
    }

    #[test]
    #[serial(shell_env)]
    fn resolve_target_literal_path_is_used_as_is() {
        assert_eq!(
            resolve_target(Some("/var/log")).unwrap(),
            PathBuf::from("/var/log")
        );
    }

    #[test]
    #[serial(shell_env)]
    fn cd_updates_oldpwd_and_pwd() {
        let dir = tempfile::tempdir().unwrap();
        let start = std::env::current_dir().unwrap();
        std::env::set_var("HOME", dir.path());

        let mut history = HistoryEngine::new(1000);
        let mut exit_requested = None;
        let mut ctx = BuiltinContext {
            history: &mut history,
            builtin_names: &[],
            histfile: std::path::Path::new("/dev/null"),
            exit_requested: &mut exit_requested,
        };
        let status = Cd.run(&[], &mut ctx);
        assert_eq!(status, 0);
        assert_eq!(
            std::fs::canonicalize(std::env::current_dir().unwrap()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
        assert_eq!(std::env::var("OLDPWD").unwrap(), start.to_string_lossy());

        std::env::set_current_dir(&start).unwrap();
    }
}
