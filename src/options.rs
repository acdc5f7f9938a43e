//! Import configuration.
//!
//! Options can be built in code or loaded from a JSON document:
//!
//! ```
//! use mdf_ods::ImportOptions;
//!
//! let options = ImportOptions::from_json_str(r#"{ "materialize_vlsd": false }"#).unwrap();
//! assert_eq!(options.base_model_version, "asam35");
//! assert!(!options.materialize_vlsd);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What to do with data groups whose records of several channel groups are
/// interleaved (distinguished by a record id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsortedPolicy {
    /// Demultiplex the records into the binary store and address them there.
    #[default]
    Relocate,
    /// Leave the group out of the model with a warning.
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Base vocabulary the application schema is anchored to.
    pub base_model_version: String,
    /// Directory of the binary store. Defaults to the source file's directory.
    pub store_dir: Option<PathBuf>,
    /// Copy variable-length string values into the model as explicit columns.
    /// When false such channels are left out.
    pub materialize_vlsd: bool,
    pub unsorted: UnsortedPolicy,
    /// Name of the Test instance. Defaults to the source file stem.
    pub test_name: Option<String>,
    #[serde(skip)]
    pub abort: AbortHandle,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            base_model_version: "asam35".to_string(),
            store_dir: None,
            materialize_vlsd: true,
            unsorted: UnsortedPolicy::default(),
            test_name: None,
            abort: AbortHandle::default(),
        }
    }
}

impl ImportOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::IOError(e),
        })?;
        Self::from_json_str(&json)
    }

    /// Attach an abort handle shared with another thread.
    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = abort;
        self
    }
}

/// Cooperative cancellation flag, checked by the parser between data groups.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let options = ImportOptions::from_json_str(r#"{ "unsorted": "skip", "test_name": "run 7" }"#)
            .unwrap();
        assert_eq!(options.unsorted, UnsortedPolicy::Skip);
        assert_eq!(options.test_name.as_deref(), Some("run 7"));
        assert!(options.materialize_vlsd);
        assert!(options.store_dir.is_none());
    }

    #[test]
    fn abort_is_shared_between_clones() {
        let handle = AbortHandle::new();
        let options = ImportOptions::default().with_abort(handle.clone());
        assert!(!options.abort.is_aborted());
        handle.abort();
        assert!(options.abort.is_aborted());
    }

    #[test]
    fn missing_options_file() {
        let err = ImportOptions::from_json_file("/nonexistent/options.json").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "store_dir": "/tmp/store" }"#).unwrap();
        let options = ImportOptions::from_json_file(&path).unwrap();
        assert_eq!(options.store_dir, Some(PathBuf::from("/tmp/store")));
    }
}
