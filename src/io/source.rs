use std::{collections::HashMap, path::PathBuf, sync::{Arc, Mutex, MutexGuard}};

use anyhow::{anyhow, Context, Result};

/// Read-only access to reference files by relative path, e.g.
/// "cities/austin/proposed-37.json".
pub trait ReferenceSource: Send + Sync {
    fn get(&self, rel: &str) -> Result<Arc<[u8]>>;
}

/// Files under a root directory.
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    fn full(&self, rel: &str) -> PathBuf { self.root.join(rel) }
}

impl ReferenceSource for DiskSource {
    fn get(&self, rel: &str) -> Result<Arc<[u8]>> {
        let path = self.full(rel);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Arc::from(bytes))
    }
}

/// In-memory files keyed by relative path.
#[derive(Default, Clone)]
pub struct MemSource {
    files: HashMap<String, Arc<[u8]>>,
}

impl MemSource {
    pub fn new(files: HashMap<String, Arc<[u8]>>) -> Self { Self { files } }

    /// Add or replace a file.
    pub fn insert(&mut self, rel: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.files.insert(rel.into(), bytes.into());
    }
}

impl ReferenceSource for MemSource {
    fn get(&self, rel: &str) -> Result<Arc<[u8]>> {
        self.files.get(rel).cloned()
            .ok_or_else(|| anyhow!("missing reference file: {rel}"))
    }
}

/// Memoizes successful fetches from an inner source, so repeated requests
/// for the same file reuse the first response. The lock is not held while
/// the inner source fetches.
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl<S: ReferenceSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, cache: Mutex::new(HashMap::new()) }
    }

    /// Number of cached files.
    pub fn cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Arc<[u8]>>>> {
        self.cache.lock().map_err(|_| anyhow!("reference cache lock poisoned"))
    }
}

impl<S: ReferenceSource> ReferenceSource for CachedSource<S> {
    fn get(&self, rel: &str) -> Result<Arc<[u8]>> {
        let hit = self.lock()?.get(rel).cloned();
        if let Some(bytes) = hit {
            tracing::trace!(rel, "reference cache hit");
            return Ok(bytes);
        }

        let bytes = self.inner.get(rel)?;
        // A concurrent fetch of the same file may have finished first; keep its bytes.
        Ok(self.lock()?.entry(rel.to_string()).or_insert(bytes).clone())
    }
}

/// Files served over HTTP(S) below a base URL.
#[cfg(feature = "download")]
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "download")]
impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::blocking::Client::new() }
    }

    fn url(&self, rel: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), rel.trim_start_matches('/'))
    }
}

#[cfg(feature = "download")]
impl ReferenceSource for HttpSource {
    fn get(&self, rel: &str) -> Result<Arc<[u8]>> {
        let url = self.url(rel);
        tracing::debug!(%url, "fetching reference file");
        let response = self.client.get(&url).send()
            .with_context(|| format!("Failed to request {url}"))?
            .error_for_status()
            .with_context(|| format!("HTTP error fetching {url}"))?;
        let bytes = response.bytes()
            .with_context(|| format!("Failed to read response body from {url}"))?;
        Ok(Arc::from(bytes.to_vec()))
    }
}
