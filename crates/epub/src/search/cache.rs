use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::SearchMatch;
use crate::DocumentId;

/// How long a computed result list is served before it is recomputed.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct Entry {
    matches: Arc<Vec<SearchMatch>>,
    created_at: Instant,
}

/// Full, unpaginated search results keyed by document and query.
///
/// Entries are checked for freshness when read; a stale entry is evicted by
/// the lookup that finds it. The table lock is only held for the lookup or
/// the write itself.
pub struct SearchCache {
    ttl: Duration,
    entries: Mutex<HashMap<(DocumentId, String), Entry>>,
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// Returns the cached results when younger than the freshness window.
    pub fn get(&self, id: DocumentId, query: &str) -> Option<Arc<Vec<SearchMatch>>> {
        let mut entries = self.lock();
        let key = (id, query.to_string());
        let entry = entries.get(&key)?;
        if entry.created_at.elapsed() < self.ttl {
            return Some(Arc::clone(&entry.matches));
        }
        entries.remove(&key);
        None
    }

    /// Stores results stamped with the current time, replacing any previous entry.
    pub fn insert(&self, id: DocumentId, query: &str, matches: Arc<Vec<SearchMatch>>) {
        let entry = Entry { matches, created_at: Instant::now() };
        self.lock().insert((id, query.to_string()), entry);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(DocumentId, String), Entry>> {
        // The table only holds plain data, so a panic mid-write cannot leave it inconsistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl std::fmt::Debug for SearchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCache").field("ttl", &self.ttl).field("entries", &self.len()).finish()
    }
}
