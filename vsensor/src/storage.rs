// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Script persistence.
//!
//! A sensor persists its script once, at creation, and from then on only
//! refers to it through the returned [`ScriptHandle`].

use serde::Serialize;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Reference to a stored script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScriptHandle {
    name: String,
    location: PathBuf,
}

impl ScriptHandle {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Sensor name the script was stored under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the script lives; passed to the interpreter as its argument.
    pub fn location(&self) -> &Path {
        &self.location
    }
}

// Shared by every store in the process, so two stores over the same
// directory never hand out the same isolated file name.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Storage capability for sensor scripts.
pub trait ScriptStore: Send + Sync + Debug {
    /// Persist `script` under a key derived from `name`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the write fails.
    fn store(&self, name: &str, script: &[u8]) -> io::Result<ScriptHandle>;

    /// Read back a stored script.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, `NotFound` for unknown handles.
    fn load(&self, handle: &ScriptHandle) -> io::Result<Vec<u8>>;

    /// Delete a stored script. Removing an unknown handle is not an error.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the delete fails.
    fn remove(&self, handle: &ScriptHandle) -> io::Result<()>;
}

/// Stores scripts as `sensor-<name>*.py` files in a directory.
///
/// Isolated stores (the default) append the process id and a process-wide
/// sequence number so that two sensors sharing a name never overwrite each
/// other. A shared store uses the bare `sensor-<name>.py` layout, where the
/// last writer wins.
#[derive(Debug)]
pub struct TempDirStore {
    root: PathBuf,
    isolate: bool,
}

impl TempDirStore {
    /// Store under the system temporary directory.
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            isolate: true,
        }
    }

    #[must_use]
    pub fn isolated(mut self, isolate: bool) -> Self {
        self.isolate = isolate;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name(&self, name: &str) -> String {
        let name = sanitize(name);
        if self.isolate {
            let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
            format!("sensor-{name}-{}-{sequence}.py", std::process::id())
        } else {
            format!("sensor-{name}.py")
        }
    }
}

impl Default for TempDirStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptStore for TempDirStore {
    fn store(&self, name: &str, script: &[u8]) -> io::Result<ScriptHandle> {
        fs::create_dir_all(&self.root)?;
        let location = self.root.join(self.file_name(name));
        fs::write(&location, script)?;
        Ok(ScriptHandle::new(name, location))
    }

    fn load(&self, handle: &ScriptHandle) -> io::Result<Vec<u8>> {
        fs::read(handle.location())
    }

    fn remove(&self, handle: &ScriptHandle) -> io::Result<()> {
        match fs::remove_file(handle.location()) {
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

// Keeps names from escaping the store directory.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
