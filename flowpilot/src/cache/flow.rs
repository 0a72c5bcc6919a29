//! Data-flow cache

use std::sync::{Arc, Mutex};
use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::Instant;

use crate::models::flow::DataFlow;

/// Data-flow cache entry
#[derive(Debug, Clone)]
pub struct FlowCacheEntry {
    pub flow: Arc<DataFlow>,
    pub cached_at: Instant,
}

/// Bounded, short-lived cache of traced flows keyed by target node id.
///
/// Entries expire `ttl` after insertion. When full, the oldest insertion is
/// evicted first.
pub struct FlowCache {
    entries: Mutex<IndexMap<String, FlowCacheEntry>>,
    capacity: usize,
    ttl: Duration,
}

impl FlowCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Get a fresh flow for `node_id`, dropping it if expired
    pub fn get(&self, node_id: &str) -> Option<Arc<DataFlow>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(node_id)?;
        if entry.cached_at.elapsed() < self.ttl {
            return Some(entry.flow.clone());
        }
        entries.shift_remove(node_id);
        None
    }

    /// Insert a flow, evicting the oldest insertions while at capacity
    pub fn insert(&self, node_id: &str, flow: Arc<DataFlow>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        // a refreshed entry counts as a new insertion
        entries.shift_remove(node_id);
        while entries.len() >= self.capacity {
            if entries.shift_remove_index(0).is_none() {
                break;
            }
        }

        entries.insert(
            node_id.to_string(),
            FlowCacheEntry {
                flow,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, node_id: &str) -> Option<FlowCacheEntry> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.shift_remove(node_id)
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Cached node ids, oldest insertion first
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(id: &str) -> Arc<DataFlow> {
        Arc::new(DataFlow::minimal(id, "test"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_flow_cache_expires() {
        let cache = FlowCache::new(10, Duration::from_secs(60));
        let original = flow("a");
        cache.insert("a", original.clone());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(Arc::ptr_eq(&cache.get("a").unwrap(), &original));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_flow_cache_fifo_eviction() {
        let cache = FlowCache::new(2, Duration::from_secs(60));
        cache.insert("a", flow("a"));
        cache.insert("b", flow("b"));
        // reading does not refresh position
        assert!(cache.get("a").is_some());
        cache.insert("c", flow("c"));

        assert_eq!(cache.keys(), vec!["b", "c"]);
    }

    #[test]
    fn test_flow_cache_reinsert_moves_to_back() {
        let cache = FlowCache::new(2, Duration::from_secs(60));
        cache.insert("a", flow("a"));
        cache.insert("b", flow("b"));
        cache.insert("a", flow("a"));
        cache.insert("c", flow("c"));

        assert_eq!(cache.keys(), vec!["a", "c"]);
    }
}
