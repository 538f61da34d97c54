//! Caches the set of executable base-names found on `$PATH`, for use by a
//! line editor's tab-completion. Invalidated whenever the `PATH` value it
//! was built from changes.

use std::collections::BTreeSet;
use std::os::unix::fs::PermissionsExt;

pub struct ExecutableCache {
    built_from: Option<String>,
    names: Vec<String>,
}

impl ExecutableCache {
    pub fn new() -> Self {
        Self {
            built_from: None,
            names: Vec::new(),
        }
    }

    /// Return the cached executable names for `path_var`, rebuilding the
    /// cache first if `path_var` differs from what it was last built with.
    pub fn names_for(&mut self, path_var: &str) -> &[String] {
        if self.built_from.as_deref() != Some(path_var) {
            self.names = scan(path_var);
            self.built_from = Some(path_var.to_string());
        }
        &self.names
    }
}

impl Default for ExecutableCache {
    fn default() -> Self {
        Self::new()
    }
}

fn scan(path_var: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for dir in path_var.split(':') {
        if dir.is_empty() {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if meta.is_file() && meta.permissions().mode() & 0o111 != 0 {
                if let Some(name) = entry.file_name().to_str() {
                    names.insert(name.to_string());
                }
            }
        }
    }
    names.into_iter().collect()
}
