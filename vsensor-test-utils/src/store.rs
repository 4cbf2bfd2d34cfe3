// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use vsensor::{ScriptHandle, ScriptStore};

/// In-memory script store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scripts: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scripts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.lock().is_empty()
    }
}

impl ScriptStore for MemoryStore {
    fn store(&self, name: &str, script: &[u8]) -> io::Result<ScriptHandle> {
        let location = PathBuf::from(format!("memory://sensor-{name}"));
        self.scripts
            .lock()
            .insert(location.clone(), script.to_vec());
        Ok(ScriptHandle::new(name, location))
    }

    fn load(&self, handle: &ScriptHandle) -> io::Result<Vec<u8>> {
        self.scripts
            .lock()
            .get(handle.location())
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "script not stored"))
    }

    fn remove(&self, handle: &ScriptHandle) -> io::Result<()> {
        self.scripts.lock().remove(handle.location());
        Ok(())
    }
}

/// Store whose writes always fail.
#[derive(Debug, Clone, Copy)]
pub struct FailingStore(pub io::ErrorKind);

impl Default for FailingStore {
    fn default() -> Self {
        Self(io::ErrorKind::PermissionDenied)
    }
}

impl ScriptStore for FailingStore {
    fn store(&self, _name: &str, _script: &[u8]) -> io::Result<ScriptHandle> {
        Err(io::Error::new(self.0, "injected storage failure"))
    }

    fn load(&self, _handle: &ScriptHandle) -> io::Result<Vec<u8>> {
        Err(io::Error::new(self.0, "injected storage failure"))
    }

    fn remove(&self, _handle: &ScriptHandle) -> io::Result<()> {
        Err(io::Error::new(self.0, "injected storage failure"))
    }
}
