//! Opens redirection targets and remaps standard file descriptors.

use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

use nix::unistd::{close, dup, dup2};

use crate::error::RedirectError;
use crate::parser::{RedirectMode, Stage};

/// Open and apply every redirection in `stage`, in listed order, so that a
/// later entry on the same `target_fd` overrides an earlier one.
///
/// Safe to call in a forked child (exits the process on failure is the
/// caller's responsibility, not this function's) or in the parent (the
/// caller is expected to have already snapshotted fds 0/1/2 via
/// [`SavedFds`]).
pub fn apply_redirections(stage: &Stage) -> Result<(), RedirectError> {
    for (target_fd, mode, filename) in &stage.redirs {
        let file = open_target(filename, *mode)?;
        let raw = file.as_raw_fd();
        dup2(raw, *target_fd).map_err(|e| RedirectError::Dup(e.into()))?;
        // `file` owns `raw`; dropping it here closes the original descriptor
        // once dup2 has pointed `target_fd` at the same underlying file.
    }
    Ok(())
}

fn open_target(filename: &str, mode: RedirectMode) -> Result<std::fs::File, RedirectError> {
    let path = Path::new(filename);
    let result = match mode {
        RedirectMode::Read => OpenOptions::new().read(true).open(path),
        RedirectMode::Trunc => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(path),
        RedirectMode::Append => OpenOptions::new()
            .write(true)
            .create(true)
            .append(true)
            .mode(0o644)
            .open(path),
    };
    result.map_err(|source| RedirectError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Duplicates of fds 0/1/2 taken immediately before redirecting the parent
/// process for an in-process builtin, restored on drop.
///
/// This is what lets `pwd > f` run in the shell's own process (so it can
/// mutate history/cwd/env) without leaving the REPL's stdin/stdout/stderr
/// pointed at `f` for the next prompt.
pub struct SavedFds {
    saved: [Option<RawFd>; 3],
}

impl SavedFds {
    /// Snapshot fds 0, 1 and 2.
    pub fn capture() -> Result<Self, RedirectError> {
        let mut saved = [None; 3];
        for fd in 0..3 {
            saved[fd as usize] = Some(dup(fd).map_err(|e| RedirectError::Dup(e.into()))?);
        }
        Ok(Self { saved })
    }
}

impl Drop for SavedFds {
    fn drop(&mut self) {
        for (fd, saved) in self.saved.iter().enumerate() {
            if let Some(saved_fd) = saved {
                let _ = dup2(*saved_fd, fd as RawFd);
                let _ = close(*saved_fd);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;
    use std::io::Read;
    use std::os::unix::fs::PermissionsExt;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn trunc_redirection_creates_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"stale").unwrap();

        let pipeline = parse_line(&format!("echo hi > {}", path.display())).unwrap();
        let stage = &pipeline.stages[0];

        let saved = SavedFds::capture().unwrap();
        apply_redirections(stage).unwrap();
        println!("hi");
        drop(saved);

        let mut contents = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "hi\n");
    }

    #[test]
    fn append_redirection_grows_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        for _ in 0..2 {
            let pipeline = parse_line(&format!("echo hi >> {}", path.display())).unwrap();
            let saved = SavedFds::capture().unwrap();
            apply_redirections(&pipeline.stages[0]).unwrap();
            println!("hi");
            drop(saved);
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "hi\nhi\n");
    }

    #[test]
    #[serial(umask)]
    fn trunc_creates_the_file_with_mode_0644_regardless_of_umask() {
        use nix::sys::stat::{umask, Mode};

        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        // A restrictive umask would otherwise mask bits out of a plain
        // `OpenOptions::create`; §4.3 requires `0644` literally, so the
        // open call must pass the mode explicitly rather than rely on it.
        let previous = umask(Mode::from_bits_truncate(0o077));
        let pipeline = parse_line(&format!("echo hi > {}", path.display())).unwrap();
        let saved = SavedFds::capture().unwrap();
        apply_redirections(&pipeline.stages[0]).unwrap();
        drop(saved);
        umask(previous);

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn missing_read_target_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist.txt");
        let pipeline = parse_line(&format!("cat < {}", path.display())).unwrap();
        let err = apply_redirections(&pipeline.stages[0]);
        assert!(err.is_err());
    }
}
