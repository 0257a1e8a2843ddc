//! LRU cache for rendered page frames

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::request::RenderParams;
use super::types::PageFrame;

/// Cache key for rendered pages
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number (1-indexed)
    pub page: usize,
    /// Scale factor (stored as millionths for stable hashing)
    pub scale_millionths: u32,
    /// Device pixel ratio (stored as millionths)
    pub ratio_millionths: u32,
}

impl CacheKey {
    /// Create a cache key from render parameters
    #[must_use]
    pub fn from_params(page: usize, params: &RenderParams) -> Self {
        Self {
            page,
            scale_millionths: (params.scale * 1_000_000.0) as u32,
            ratio_millionths: (params.device_pixel_ratio * 1_000_000.0) as u32,
        }
    }
}

/// LRU cache for rendered page frames
pub struct PageCache {
    cache: LruCache<CacheKey, Arc<PageFrame>>,
}

impl PageCache {
    /// Create a new cache with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Get a cached frame, promoting it in the LRU order
    #[must_use]
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<PageFrame>> {
        self.cache.get(key).cloned()
    }

    /// Insert a frame into the cache, returning an Arc to the data
    pub fn insert(&mut self, key: CacheKey, frame: PageFrame) -> Arc<PageFrame> {
        let arc = Arc::new(frame);
        self.cache.put(key, arc.clone());
        arc
    }

    /// Clear all cached frames
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Number of cached frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
