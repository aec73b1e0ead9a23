//! Typed session state over a [`KvStore`].
//!
//! The cache owns the key names and JSON encoding so hosts never touch raw
//! entries: the bearer token, the cached profile, the recent-query list
//! (most recent first, deduplicated, capped) and the saved-search list.

use crate::{KvStore, StoreError};
use specter_types::SavedSearch;
use std::sync::Arc;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";
const RECENT_KEY: &str = "recent_queries";
const SAVED_KEY: &str = "saved_searches";

/// Recent queries kept, most recent first.
pub const RECENT_QUERY_CAP: usize = 5;

/// Saved searches kept, newest first.
pub const SAVED_SEARCH_CAP: usize = 50;

#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KvStore>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>, StoreError> {
        self.store.get(TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(TOKEN_KEY, token)
    }

    /// Drop the token and cached profile. Called on logout and whenever the
    /// backend answers 401.
    pub fn clear_session(&self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }

    pub fn user(&self) -> Result<Option<serde_json::Value>, StoreError> {
        match self.store.get(USER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_user(&self, profile: &serde_json::Value) -> Result<(), StoreError> {
        self.store.set(USER_KEY, &serde_json::to_string(profile)?)
    }

    pub fn recent_queries(&self) -> Result<Vec<String>, StoreError> {
        match self.store.get(RECENT_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Record a query at the head of the recent list. A repeat moves to the
    /// head rather than duplicating; the list never exceeds
    /// [`RECENT_QUERY_CAP`] entries.
    pub fn push_recent_query(&self, query: &str) -> Result<(), StoreError> {
        let mut recent = self.recent_queries()?;
        recent.retain(|q| q != query);
        recent.insert(0, query.to_string());
        recent.truncate(RECENT_QUERY_CAP);
        self.store.set(RECENT_KEY, &serde_json::to_string(&recent)?)
    }

    pub fn saved_searches(&self) -> Result<Vec<SavedSearch>, StoreError> {
        match self.store.get(SAVED_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Save the search if it is not already saved, remove it if it is.
    /// Returns `true` when the search ended up saved. Identity is the
    /// query/kind pair; the timestamp is bookkeeping only. The list holds at
    /// most [`SAVED_SEARCH_CAP`] entries, newest first; the oldest falls off.
    pub fn toggle_saved_search(&self, search: SavedSearch) -> Result<bool, StoreError> {
        let mut saved = self.saved_searches()?;
        let before = saved.len();
        saved.retain(|s| !(s.query == search.query && s.kind == search.kind));

        let now_saved = saved.len() == before;
        if now_saved {
            saved.insert(0, search);
            saved.truncate(SAVED_SEARCH_CAP);
        }
        self.store.set(SAVED_KEY, &serde_json::to_string(&saved)?)?;
        Ok(now_saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn cache() -> SessionCache {
        SessionCache::new(Arc::new(MemoryStore::new()))
    }

    fn search(query: &str) -> SavedSearch {
        SavedSearch {
            query: query.to_string(),
            kind: Some("auto".to_string()),
            ts: 1700000000,
        }
    }

    #[test]
    fn token_round_trip_and_clear() {
        let cache = cache();
        assert_eq!(cache.token().unwrap(), None);
        cache.set_token("tok-9").unwrap();
        assert_eq!(cache.token().unwrap().as_deref(), Some("tok-9"));
        cache.clear_session().unwrap();
        assert_eq!(cache.token().unwrap(), None);
    }

    #[test]
    fn clear_session_also_drops_the_profile() {
        let cache = cache();
        cache.set_token("tok").unwrap();
        cache
            .set_user(&serde_json::json!({"email": "a@b.c", "plan_type": "free"}))
            .unwrap();
        cache.clear_session().unwrap();
        assert_eq!(cache.user().unwrap(), None);
    }

    #[test]
    fn recent_queries_are_mru_with_dedupe() {
        let cache = cache();
        for q in ["alpha", "beta", "gamma", "alpha"] {
            cache.push_recent_query(q).unwrap();
        }
        assert_eq!(
            cache.recent_queries().unwrap(),
            vec!["alpha", "gamma", "beta"]
        );
    }

    #[test]
    fn recent_queries_are_capped() {
        let cache = cache();
        for i in 0..8 {
            cache.push_recent_query(&format!("query {i}")).unwrap();
        }
        let recent = cache.recent_queries().unwrap();
        assert_eq!(recent.len(), RECENT_QUERY_CAP);
        assert_eq!(recent[0], "query 7");
        assert_eq!(recent[4], "query 3");
    }

    #[test]
    fn toggle_saved_search_flips() {
        let cache = cache();
        assert!(cache.toggle_saved_search(search("jdoe")).unwrap());
        assert_eq!(cache.saved_searches().unwrap().len(), 1);

        assert!(!cache.toggle_saved_search(search("jdoe")).unwrap());
        assert!(cache.saved_searches().unwrap().is_empty());
    }

    #[test]
    fn saved_searches_are_capped_newest_first() {
        let cache = cache();
        for i in 0..(SAVED_SEARCH_CAP + 3) {
            cache.toggle_saved_search(search(&format!("query {i}"))).unwrap();
        }
        let saved = cache.saved_searches().unwrap();
        assert_eq!(saved.len(), SAVED_SEARCH_CAP);
        assert_eq!(saved[0].query, format!("query {}", SAVED_SEARCH_CAP + 2));
        // The oldest entries fell off.
        assert!(!saved.iter().any(|s| s.query == "query 0"));
    }

    #[test]
    fn saved_search_identity_ignores_timestamp() {
        let cache = cache();
        cache.toggle_saved_search(search("jdoe")).unwrap();
        let mut later = search("jdoe");
        later.ts = 1800000000;
        assert!(!cache.toggle_saved_search(later).unwrap());
        assert!(cache.saved_searches().unwrap().is_empty());
    }
}
