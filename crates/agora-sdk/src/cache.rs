use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use agora_types::{Post, PostId};

/// Default post cache bound, in entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Process-local cache of fully materialized posts.
///
/// Owned by the facade instance that created it; instances never share
/// cache state. Engagement counters inside a cached post are point-in-time
/// snapshots; whenever the facade confirms an engagement mutation for an
/// id, it removes that entry, and the next read is a guaranteed full
/// refetch. That delete-on-write rule is the sole consistency mechanism:
/// no TTL, no version counters, no subscriptions.
///
/// The cache is LRU-bounded. Eviction only ever costs an extra refetch; it
/// can never serve stale data.
pub struct PostCache {
    inner: Mutex<LruCache<PostId, Post>>,
}

impl PostCache {
    /// Create a cache bounded to `capacity` posts (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Fetch the cached post for `id`, if any. Promotes the entry to
    /// most-recently-used.
    pub fn lookup(&self, id: PostId) -> Option<Post> {
        self.inner.lock().expect("lock poisoned").get(&id).cloned()
    }

    /// Insert or overwrite the entry for `id`.
    pub fn insert(&self, id: PostId, post: Post) {
        self.inner.lock().expect("lock poisoned").put(id, post);
    }

    /// Remove the entry for `id` if present. Returns whether it existed.
    pub fn invalidate(&self, id: PostId) -> bool {
        self.inner.lock().expect("lock poisoned").pop(&id).is_some()
    }

    /// Number of cached posts.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("lock poisoned").is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.lock().expect("lock poisoned").clear();
    }
}

impl std::fmt::Debug for PostCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostCache").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::AccountId;

    fn post(id: u64) -> Post {
        Post {
            id: PostId::new(id),
            author: AccountId::derive(&[1; 32]),
            content: format!("post {id}"),
            attachments: vec![],
            timestamp_ms: id * 1000,
            reply_to: None,
            likes: 0,
            reposts: 0,
        }
    }

    #[test]
    fn lookup_misses_then_hits() {
        let cache = PostCache::new(4);
        assert!(cache.lookup(PostId::new(1)).is_none());

        cache.insert(PostId::new(1), post(1));
        let hit = cache.lookup(PostId::new(1)).unwrap();
        assert_eq!(hit.content, "post 1");
    }

    #[test]
    fn insert_overwrites() {
        let cache = PostCache::new(4);
        cache.insert(PostId::new(1), post(1));
        let mut updated = post(1);
        updated.likes = 9;
        cache.insert(PostId::new(1), updated);
        assert_eq!(cache.lookup(PostId::new(1)).unwrap().likes, 9);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = PostCache::new(4);
        cache.insert(PostId::new(1), post(1));
        assert!(cache.invalidate(PostId::new(1)));
        assert!(cache.lookup(PostId::new(1)).is_none());
    }

    #[test]
    fn invalidate_absent_is_noop() {
        let cache = PostCache::new(4);
        assert!(!cache.invalidate(PostId::new(99)));
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = PostCache::new(2);
        cache.insert(PostId::new(1), post(1));
        cache.insert(PostId::new(2), post(2));
        // Touch 1 so 2 becomes the eviction candidate.
        cache.lookup(PostId::new(1));
        cache.insert(PostId::new(3), post(3));

        assert!(cache.lookup(PostId::new(1)).is_some());
        assert!(cache.lookup(PostId::new(2)).is_none());
        assert!(cache.lookup(PostId::new(3)).is_some());
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let cache = PostCache::new(0);
        cache.insert(PostId::new(1), post(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = PostCache::new(4);
        cache.insert(PostId::new(1), post(1));
        cache.insert(PostId::new(2), post(2));
        cache.clear();
        assert!(cache.is_empty());
    }
}
