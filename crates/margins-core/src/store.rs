//! Local cache slot
//!
//! `ContentStore` persists exactly one `SiteState` per namespace as a JSON
//! file under the data directory. It mirrors a browser storage slot:
//!
//! - `load()` never fails; a missing or unparsable slot reads as `None`
//! - `save()` is best-effort; failures are logged and swallowed
//! - writes are whole-state and atomic (temp file, sync, rename)
//!
//! Storage location: `~/.local/share/margins/<namespace>.json`
//! (configurable via `Config`)

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::SiteState;

/// Default namespace for the cache slot
pub const DEFAULT_NAMESPACE: &str = "logseq_like_site_v1";

/// Single-slot JSON persistence for the site state
#[derive(Debug, Clone)]
pub struct ContentStore {
    path: PathBuf,
}

impl ContentStore {
    /// Create a store for `namespace` inside `data_dir`
    pub fn new(data_dir: impl AsRef<Path>, namespace: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.json", namespace)),
        }
    }

    /// Create a store from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data_dir, &config.namespace)
    }

    /// Path of the slot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a slot exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the cached state
    ///
    /// Returns `None` if nothing was saved yet or the payload does not parse.
    pub fn load(&self) -> Option<SiteState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No cached state at {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Ignoring unparsable cached state at {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Save the state, swallowing any failure
    ///
    /// The caller cannot tell whether the write landed; it is logged instead.
    pub fn save(&self, state: &SiteState) {
        if let Err(e) = self.try_save(state) {
            match e.recovery_suggestion() {
                Some(hint) => warn!("Failed to persist site state: {} ({})", e, hint),
                None => warn!("Failed to persist site state: {}", e),
            }
        }
    }

    /// Save the state, reporting failures
    pub fn try_save(&self, state: &SiteState) -> StoreResult<()> {
        let json = serde_json::to_vec(state)?;
        atomic_write(&self.path, &json)?;
        debug!("Persisted site state to {:?} ({} bytes)", self.path, json.len());
        Ok(())
    }

    /// Remove the slot
    pub fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from_io(e, self.path.clone())),
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Page};
    use tempfile::TempDir;

    fn sample_state() -> SiteState {
        let mut state = SiteState::default();
        state.pages.push(Page::new("notes", "Notes"));
        state.blocks.articles.push(Article::new("hello", "Hello"));
        state.content_version = Some(7);
        state
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = ContentStore::new(temp_dir.path(), DEFAULT_NAMESPACE);

        assert!(!store.exists());
        assert!(store.load().is_none());

        let state = sample_state();
        store.save(&state);
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_corrupt_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = ContentStore::new(temp_dir.path(), "site");

        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_overwrites_whole_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = ContentStore::new(temp_dir.path(), "site");

        store.save(&sample_state());
        store.save(&SiteState::default());

        let loaded = store.load().unwrap();
        assert!(loaded.pages.is_empty());
        assert!(loaded.content_version.is_none());
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_namespaces_are_separate_slots() {
        let temp_dir = TempDir::new().unwrap();
        let a = ContentStore::new(temp_dir.path(), "a");
        let b = ContentStore::new(temp_dir.path(), "b");

        a.save(&sample_state());
        assert!(a.load().is_some());
        assert!(b.load().is_none());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the data directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = ContentStore::new(blocker.join("nested"), "site");

        store.save(&sample_state());
        assert!(store.try_save(&sample_state()).is_err());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = ContentStore::new(temp_dir.path(), "site");

        store.clear().unwrap();
        store.save(&sample_state());
        store.clear().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.json");

        atomic_write(&nested_path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "{}");
    }
}
