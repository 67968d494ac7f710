//! ConfigStore — append-only line-delimited JSON node list.
//!
//! One `NodeSpec` per line, insertion order, trailing newline on
//! every record. The file must exist (possibly empty) before the
//! monitor starts; `/add` extends it one line at a time.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::types::NodeSpec;

/// Handle to the durable node list.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse every record, in file order.
    ///
    /// Blank lines are skipped; any malformed line is an error (the
    /// caller treats this as fatal to startup).
    pub fn load(&self) -> RegistryResult<Vec<NodeSpec>> {
        let contents = std::fs::read_to_string(&self.path)?;
        let mut specs = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let spec: NodeSpec = serde_json::from_str(line)
                .map_err(|source| RegistryError::Parse { line: idx + 1, source })?;
            specs.push(spec);
        }
        debug!(path = ?self.path, count = specs.len(), "config store loaded");
        Ok(specs)
    }

    /// Append one record as a single newline-terminated JSON line.
    ///
    /// The write is a single open-append-write-close so a record is
    /// either fully present or absent.
    pub fn append(&self, spec: &NodeSpec) -> RegistryResult<()> {
        let mut line = serde_json::to_string(spec).map_err(RegistryError::Serialize)?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        debug!(path = ?self.path, address = %spec.address, "record appended");
        Ok(())
    }
}
