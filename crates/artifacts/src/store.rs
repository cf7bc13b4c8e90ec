use crate::error::ArtifactError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

struct CachedArtifact {
    modified: SystemTime,
    value: Arc<Value>,
}

/// Reads artifacts from disk and decodes them as JSON.
///
/// With caching enabled, decoded documents are kept per resolved path together with the
/// file's modification time; any mismatch on the next read replaces the entry. The cache
/// only saves work and never changes what a request observes.
#[derive(Default)]
pub struct ArtifactStore {
    cache: Option<Mutex<HashMap<PathBuf, CachedArtifact>>>,
}

impl ArtifactStore {
    pub fn new(cache_enabled: bool) -> Self {
        Self { cache: cache_enabled.then(|| Mutex::new(HashMap::new())) }
    }

    pub fn load(&self, path: &Path) -> Result<Arc<Value>, ArtifactError> {
        let io_err = |source| ArtifactError::Io { path: path.to_path_buf(), source };

        let Some(cache) = &self.cache else {
            return read_json(path).map(Arc::new);
        };

        // Platforms without modification times simply bypass the cache.
        let Ok(modified) = fs::metadata(path).map_err(io_err)?.modified() else {
            return read_json(path).map(Arc::new);
        };

        if let Some(hit) = cache.lock().get(path) {
            if hit.modified == modified {
                tracing::trace!(path = %path.display(), "Artifact cache hit.");
                return Ok(Arc::clone(&hit.value));
            }
        }

        let value = Arc::new(read_json(path)?);
        cache.lock().insert(
            path.to_path_buf(),
            CachedArtifact { modified, value: Arc::clone(&value) },
        );
        Ok(value)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map(|c| c.lock().len()).unwrap_or(0)
    }
}

/// Reads and decodes one JSON file, keeping I/O failures apart from decode failures.
pub fn read_json(path: &Path) -> Result<Value, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes)
        .map_err(|source| ArtifactError::Malformed { path: path.to_path_buf(), source })
}
