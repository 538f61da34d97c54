//! Locating and running non-builtin programs.

use std::ffi::CString;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Search `path_var` (a `:`-separated `PATH` value) for an executable named
/// `name`, returning the first match.
pub fn resolve(name: &str, path_var: &str) -> Option<PathBuf> {
    if name.contains('/') {
        return is_executable_file(Path::new(name)).then(|| PathBuf::from(name));
    }
    path_var.split(':').find_map(|dir| {
        if dir.is_empty() {
            return None;
        }
        let candidate = Path::new(dir).join(name);
        is_executable_file(&candidate).then_some(candidate)
    })
}

fn is_executable_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// Replace the current process image with `program`, passing `argv` as the
/// full argument vector (`argv[0]` is the program name as seen by the
/// child). Only returns on failure, matching `execvp`'s contract.
pub fn exec(program: &Path, argv: &[String]) -> std::io::Error {
    let c_program = match CString::new(program.as_os_str().as_encoded_bytes()) {
        Ok(s) => s,
        Err(_) => return std::io::Error::other("program path contains a NUL byte"),
    };
    let c_argv: Vec<CString> = match argv.iter().map(|a| CString::new(a.as_str())).collect() {
        Ok(v) => v,
        Err(_) => return std::io::Error::other("argument contains a NUL byte"),
    };
    // execv never returns on success; unwrap_err is just a typed panic-free
    // way to get at the error without caring whether this nix version's
    // `Ok` side is `()` or `Infallible`.
    nix::unistd::execv(&c_program, &c_argv).unwrap_err().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_an_executable_on_path() {
        let path_var = "/nonexistent:/bin:/usr/bin";
        let found = resolve("ls", path_var);
        assert!(found.is_some(), "expected to find `ls` on {path_var}");
    }

    #[test]
    fn missing_program_resolves_to_none() {
        let found = resolve("definitely-not-a-real-program-xyz", "/bin:/usr/bin");
        assert!(found.is_none());
    }

    #[test]
    fn a_path_containing_a_slash_is_used_directly() {
        let found = resolve("/bin/sh", "/ignored");
        assert_eq!(found, Some(PathBuf::from("/bin/sh")));
    }
}
