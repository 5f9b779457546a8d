// Content-addressed load cache
//
// A file is re-parsed only when its bytes change. Entries are keyed by a
// blake3 hash of the format tag and the raw bytes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LoadError;
use crate::load::{load_with_format, read_bytes, LoadOptions, Loaded, SourceFormat};

/// Result of a cache lookup.
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub loaded: Arc<Loaded>,
    pub hash: blake3::Hash,
    /// True when the bytes were parsed on this call.
    pub fresh: bool,
}

/// Memoizes loads for one set of [`LoadOptions`].
#[derive(Debug)]
pub struct DatasetCache {
    options: LoadOptions,
    entries: HashMap<blake3::Hash, Arc<Loaded>>,
    by_path: HashMap<PathBuf, blake3::Hash>,
}

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
            by_path: HashMap::new(),
        }
    }

    /// Load `path`, reusing the parsed dataset when its content is unchanged.
    pub fn get_or_load(&mut self, path: &Path) -> Result<CacheLookup, LoadError> {
        let format = SourceFormat::from_path(path)?;
        let bytes = read_bytes(path)?;
        let hash = content_hash(format, &bytes);

        if let Some(loaded) = self.entries.get(&hash) {
            log::debug!("cache hit for {} ({})", path.display(), short(&hash));
            let loaded = Arc::clone(loaded);
            self.repoint(path, hash);
            return Ok(CacheLookup {
                loaded,
                hash,
                fresh: false,
            });
        }

        let loaded = Arc::new(load_with_format(path, format, &bytes, &self.options)?);
        self.entries.insert(hash, Arc::clone(&loaded));
        self.repoint(path, hash);

        Ok(CacheLookup {
            loaded,
            hash,
            fresh: true,
        })
    }

    /// Point `path` at `hash`, dropping its previous entry if nothing else uses it.
    fn repoint(&mut self, path: &Path, hash: blake3::Hash) {
        if let Some(old) = self.by_path.insert(path.to_path_buf(), hash) {
            if old != hash && !self.by_path.values().any(|h| *h == old) {
                self.entries.remove(&old);
                log::debug!("evicted {} for {}", short(&old), path.display());
            }
        }
    }

    /// Forget whatever was cached for `path`.
    pub fn invalidate(&mut self, path: &Path) {
        if let Some(hash) = self.by_path.remove(path) {
            if !self.by_path.values().any(|h| *h == hash) {
                self.entries.remove(&hash);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_path.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn content_hash(format: SourceFormat, bytes: &[u8]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(format.tag());
    hasher.update(&[0]);
    hasher.update(bytes);
    hasher.finalize()
}

fn short(hash: &blake3::Hash) -> String {
    hash.to_hex()[..12].to_string()
}
