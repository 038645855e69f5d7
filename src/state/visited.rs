use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Thread-safe set of normalized URLs already admitted to a run
///
/// Cloning shares the underlying set. All insertions go through a single
/// mutex, so of any number of concurrent callers offering the same URL
/// exactly one is told it was first.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` if absent
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not present and is now marked
    /// * `false` - The URL had already been marked
    pub fn try_mark_visited(&self, url: &str) -> bool {
        // A poisoned lock still holds a consistent set: inserts cannot panic midway
        let mut set = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        set.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        let set = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        set.contains(url)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
