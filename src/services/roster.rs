//! Lazily loaded, per-key detail lists behind expandable table rows.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

/// Map from row key to its loaded payload plus the single expanded row.
///
/// Each key is fetched at most once; later toggles only expand or collapse.
#[derive(Clone, Debug)]
pub struct RosterCache<K, V> {
    entries: HashMap<K, V>,
    expanded: Option<K>,
}

impl<K, V> Default for RosterCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            expanded: None,
        }
    }
}

impl<K, V> RosterCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn is_loaded(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn expanded(&self) -> Option<&K> {
        self.expanded.as_ref()
    }

    pub fn is_expanded(&self, key: &K) -> bool {
        self.expanded.as_ref() == Some(key)
    }

    fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Forgets a key, e.g. after its row was deleted.
    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
        if self.is_expanded(key) {
            self.expanded = None;
        }
    }

    /// Expands `key`, loading it first if needed; collapses it if it is
    /// already expanded. A failed load leaves the cache unchanged.
    ///
    /// Returns the payload of the now-expanded row, or `None` after a collapse.
    pub async fn toggle<F, Fut, E>(&mut self, key: K, loader: F) -> Result<Option<&V>, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if self.is_expanded(&key) {
            self.expanded = None;
            return Ok(None);
        }

        if !self.is_loaded(&key) {
            let value = loader(key.clone()).await?;
            self.insert(key.clone(), value);
        }

        self.expanded = Some(key.clone());
        Ok(self.get(&key))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[actix_web::test]
    async fn loads_once_then_toggles() {
        let loads = Cell::new(0);
        let mut cache: RosterCache<&str, Vec<u32>> = RosterCache::new();
        let loader = |_key: &str| {
            loads.set(loads.get() + 1);
            async { Ok::<_, String>(vec![1, 2]) }
        };

        let opened = cache.toggle("ev1", loader).await.unwrap().cloned();
        assert_eq!(opened, Some(vec![1, 2]));
        assert!(cache.is_expanded(&"ev1"));

        let closed = cache.toggle("ev1", loader).await.unwrap().cloned();
        assert_eq!(closed, None);
        assert_eq!(cache.expanded(), None);

        cache.toggle("ev1", loader).await.unwrap();
        assert_eq!(loads.get(), 1);
    }

    #[actix_web::test]
    async fn switching_rows_keeps_one_expanded() {
        let mut cache: RosterCache<u32, &str> = RosterCache::new();

        cache.toggle(1, |_| async { Ok::<_, ()>("a") }).await.unwrap();
        cache.toggle(2, |_| async { Ok::<_, ()>("b") }).await.unwrap();

        assert!(cache.is_expanded(&2));
        assert_eq!(cache.get(&2), Some(&"b"));
        assert!(cache.is_loaded(&1));
    }

    #[actix_web::test]
    async fn failed_load_does_not_expand() {
        let mut cache: RosterCache<u32, &str> = RosterCache::new();

        let result = cache.toggle(1, |_| async { Err("boom") }).await;

        assert_eq!(result, Err("boom"));
        assert!(!cache.is_loaded(&1));
        assert_eq!(cache.expanded(), None);
    }

    #[test]
    fn invalidate_collapses_row() {
        let mut cache = RosterCache::new();
        cache.insert(1, "a");
        cache.expanded = Some(1);

        cache.invalidate(&1);

        assert_eq!(cache.expanded(), None);
        assert!(!cache.is_loaded(&1));
    }
}
