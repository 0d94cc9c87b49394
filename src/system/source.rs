//! Read access to the kernel's `/proc` counters.
//!
//! The collector never touches `std::fs` directly; it goes through a
//! [`ProcSource`] so the sampling logic can run against synthetic counters in
//! tests and benches.

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::PathBuf;

/// Paths handed to a source are relative to the proc root (`"stat"`,
/// `"1234/cmdline"`, `""` for the root itself).
pub trait ProcSource {
    fn read_to_string(&self, path: &str) -> io::Result<String>;

    fn read_bytes(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Names of the entries directly under `path`.
    fn list_dir(&self, path: &str) -> io::Result<Vec<String>>;
}

/// The host's real proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/proc"),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcSource for ProcFs {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }

    fn read_bytes(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(self.resolve(path))? {
            // Entries can vanish while iterating; skip them.
            let Ok(entry) = entry else {
                continue;
            };
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

/// In-memory stand-in for `/proc`, for tests and benches.
///
/// Directories are implied by the files added under them.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_file(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn remove_file(&mut self, path: &str) {
        self.files.remove(path);
    }

    /// Adds `<pid>/stat` and `<pid>/cmdline`.
    pub fn set_process(&mut self, pid: u32, stat: &str, cmdline: &[u8]) {
        self.set_file(format!("{pid}/stat"), stat);
        self.set_file(format!("{pid}/cmdline"), cmdline);
    }

    /// Drops every file of `pid`, as if the process exited.
    pub fn remove_process(&mut self, pid: u32) {
        let prefix = format!("{pid}/");
        self.files.retain(|path, _| !path.starts_with(&prefix));
    }
}

impl ProcSource for InMemorySource {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read_bytes(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };

        let names: BTreeSet<String> = self
            .files
            .keys()
            .filter_map(|file| file.strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.split('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()));
        }
        Ok(names.into_iter().collect())
    }
}
