//! Append-only audit log: one JSON array per hook, at `<dir>/<hook>.json`.
//!
//! The read-modify-write cycle holds an exclusive advisory lock on the log
//! file. A log that does not parse as a JSON array is replaced by a fresh one.

use fs2::FileExt;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit log io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("audit log encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Audit log for a single hook.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Log for `hook_name` under `dir` (file `<dir>/<hook_name>.json`).
    pub fn new(dir: impl AsRef<Path>, hook_name: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", hook_name)),
        }
    }

    /// Log for `hook_name` under `<cwd>/logs`.
    pub fn in_current_dir(hook_name: &str) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(cwd.join("logs"), hook_name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `record` to the array, creating directories and file as needed.
    pub fn append(&self, record: &Value) -> Result<(), AuditError> {
        let io_err = |source| AuditError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(io_err)?;
        FileExt::lock_exclusive(&file).map_err(io_err)?;

        let mut entries = read_entries(&mut file).map_err(io_err)?;
        entries.push(record.clone());
        let body = serde_json::to_string_pretty(&Value::Array(entries))?;

        file.set_len(0).map_err(io_err)?;
        file.seek(SeekFrom::Start(0)).map_err(io_err)?;
        file.write_all(body.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        drop(file);
        Ok(())
    }

    /// Current entries; missing or corrupted log reads as empty.
    pub fn entries(&self) -> Vec<Value> {
        match File::open(&self.path) {
            Ok(mut file) => read_entries(&mut file).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

fn read_entries(file: &mut File) -> std::io::Result<Vec<Value>> {
    let mut content = String::new();
    if let Err(e) = file.read_to_string(&mut content) {
        if e.kind() == std::io::ErrorKind::InvalidData {
            log::debug!("audit log is not valid utf-8, starting a new one");
            return Ok(Vec::new());
        }
        return Err(e);
    }
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(entries)) => Ok(entries),
        _ => {
            log::debug!("audit log is not a JSON array, starting a new one");
            Ok(Vec::new())
        }
    }
}
