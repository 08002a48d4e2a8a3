//! LRU (Least Recently Used) replacement policy.

use lru::LruCache;

use crate::common::FrameId;

/// Evicts the evictable frame that was used least recently.
///
/// Only unpinned frames are tracked. A frame enters the recency list when
/// its pin count drops to zero and leaves it when it is pinned again, so
/// "least recently used" means "released longest ago".
pub struct LruReplacer {
    /// Evictable frames, least recent at the LRU end.
    evictable: LruCache<FrameId, ()>,
}

impl LruReplacer {
    pub fn new() -> Self {
        Self {
            evictable: LruCache::unbounded(),
        }
    }

    /// Track or stop tracking `frame_id` as an eviction candidate.
    pub fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if evictable {
            self.evictable.push(frame_id, ());
        } else {
            self.evictable.pop(&frame_id);
        }
    }

    /// Pick the victim frame, or `None` if every frame is pinned.
    pub fn evict(&mut self) -> Option<FrameId> {
        self.evictable.pop_lru().map(|(frame_id, ())| frame_id)
    }

    /// Forget `frame_id` entirely (its page was deleted).
    pub fn remove(&mut self, frame_id: FrameId) {
        self.evictable.pop(&frame_id);
    }

    /// Number of evictable frames.
    pub fn size(&self) -> usize {
        self.evictable.len()
    }
}

impl Default for LruReplacer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fid(id: usize) -> FrameId {
        FrameId::new(id)
    }

    #[test]
    fn test_lru_evicts_oldest_release() {
        let mut replacer = LruReplacer::new();

        replacer.set_evictable(fid(0), true);
        replacer.set_evictable(fid(1), true);
        replacer.set_evictable(fid(2), true);
        assert_eq!(replacer.size(), 3);

        assert_eq!(replacer.evict(), Some(fid(0)));
        assert_eq!(replacer.evict(), Some(fid(1)));
        assert_eq!(replacer.evict(), Some(fid(2)));
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_lru_skips_pinned() {
        let mut replacer = LruReplacer::new();

        replacer.set_evictable(fid(0), true);
        replacer.set_evictable(fid(1), true);
        replacer.set_evictable(fid(0), false);

        assert_eq!(replacer.evict(), Some(fid(1)));
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_lru_repin_then_release_moves_to_back() {
        let mut replacer = LruReplacer::new();

        replacer.set_evictable(fid(0), true);
        replacer.set_evictable(fid(1), true);

        // Frame 0 pinned and released again: now the most recent
        replacer.set_evictable(fid(0), false);
        replacer.set_evictable(fid(0), true);

        assert_eq!(replacer.evict(), Some(fid(1)));
    }

    #[test]
    fn test_lru_remove() {
        let mut replacer = LruReplacer::new();

        replacer.set_evictable(fid(0), true);
        replacer.set_evictable(fid(1), true);
        replacer.remove(fid(0));

        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.evict(), Some(fid(1)));
    }
}
