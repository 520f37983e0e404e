//! Payload fetch boundary: the object-store contract, a per-locator tree
//! cache, and the strategy-archive reader.
//!
//! The stores behind these types are external collaborators (cloud object
//! storage in production); the bundled implementation reads from a local
//! directory. Caches are explicit objects owned by the fetching component,
//! unbounded, and cleared only on demand or at drop.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{ViewerError, ViewerResult};
use crate::tree::Tree;

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

/// Fetch raw bytes behind an opaque storage locator. A missing object is
/// `PayloadNotFound`; anything else is a transport failure.
pub trait ObjectStore {
    fn get(&self, locator: &str) -> ViewerResult<Vec<u8>>;
}

/// Object store backed by a local directory; locators are relative paths.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> FsObjectStore {
        FsObjectStore { root: root.into() }
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, locator: &str) -> ViewerResult<Vec<u8>> {
        let path = self.root.join(locator);
        if !path.is_file() {
            return Err(ViewerError::PayloadNotFound(locator.to_string()));
        }
        Ok(fs::read(path)?)
    }
}

// ---------------------------------------------------------------------------
// Tree cache
// ---------------------------------------------------------------------------

/// Caching fetcher for tree payloads. Each locator hits the store at most
/// once; a concurrent first access may race and recompute, which is benign
/// since payloads are immutable per locator.
pub struct TreeCache {
    store: Box<dyn ObjectStore>,
    cache: Mutex<HashMap<String, Arc<Tree>>>,
}

impl TreeCache {
    pub fn new(store: Box<dyn ObjectStore>) -> TreeCache {
        TreeCache {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn fetch(&self, locator: &str) -> ViewerResult<Arc<Tree>> {
        if let Some(hit) = lock(&self.cache).get(locator) {
            return Ok(Arc::clone(hit));
        }
        let bytes = self.store.get(locator)?;
        let tree = Arc::new(Tree::from_json(&bytes)?);
        lock(&self.cache).insert(locator.to_string(), Arc::clone(&tree));
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        lock(&self.cache).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.cache).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.cache).clear();
    }
}

// ---------------------------------------------------------------------------
// Strategy payloads
// ---------------------------------------------------------------------------

/// Hand-level strategy data at one node: overall weight of the hand in the
/// acting player's range, the frequency of each action, and the expected
/// value of each action. Vector positions follow the node's action order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandStrategy {
    pub weight: f64,
    #[serde(default)]
    pub played_frequencies: Vec<f64>,
    #[serde(default)]
    pub expected_values: Vec<f64>,
}

/// Per-node strategy payload: hand label to strategy data.
pub type NodeStrategy = HashMap<String, HandStrategy>;

/// Reader over one spot's strategy archive. Node payloads live at the
/// conventional `nodes/{node_id}` sub-path inside the archive; an absent
/// payload is a normal outcome (`Ok(None)`), not an error.
pub struct StrategyArchive {
    spot_id: String,
    store: Box<dyn ObjectStore>,
    cache: Mutex<HashMap<String, Arc<NodeStrategy>>>,
}

impl StrategyArchive {
    pub fn new(spot_id: impl Into<String>, store: Box<dyn ObjectStore>) -> StrategyArchive {
        StrategyArchive {
            spot_id: spot_id.into(),
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn spot_id(&self) -> &str {
        &self.spot_id
    }

    pub fn node_strategy(&self, node_id: &str) -> ViewerResult<Option<Arc<NodeStrategy>>> {
        let locator = format!("nodes/{}", node_id);
        if let Some(hit) = lock(&self.cache).get(&locator) {
            return Ok(Some(Arc::clone(hit)));
        }
        let bytes = match self.store.get(&locator) {
            Ok(bytes) => bytes,
            Err(ViewerError::PayloadNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let strategy: NodeStrategy = serde_json::from_slice(&bytes)?;
        let strategy = Arc::new(strategy);
        lock(&self.cache).insert(locator, Arc::clone(&strategy));
        Ok(Some(strategy))
    }

    pub fn clear(&self) {
        lock(&self.cache).clear();
    }
}

// Cache maps are coherent even if a holder panicked; recover instead of
// propagating the poison.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
