#![cfg(feature = "cache")]

use crate::{MetadataSource, PreviewError, PreviewMetadata};
use async_trait::async_trait;
use dashmap::DashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Cache {
    cache: Arc<DashMap<String, PreviewMetadata>>,
}

impl Cache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).map_or(100, NonZeroUsize::get);
        Self {
            cache: Arc::new(DashMap::with_capacity(capacity)),
        }
    }

    pub async fn get(&self, key: &str) -> Option<PreviewMetadata> {
        self.cache.get(key).map(|entry| entry.clone())
    }

    pub async fn set(&self, key: String, value: PreviewMetadata) {
        self.cache.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Remembers successful lookups so each distinct target is fetched once.
/// Failures are not cached and will be retried.
#[derive(Clone)]
pub struct CachedSource<S> {
    inner: S,
    cache: Cache,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, cache: Cache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

#[async_trait]
impl<S: MetadataSource> MetadataSource for CachedSource<S> {
    async fn lookup(&self, target: &str) -> Result<PreviewMetadata, PreviewError> {
        if let Some(cached) = self.cache.get(target).await {
            debug!(target_url = %target, "Serving metadata from cache");
            return Ok(cached);
        }

        let metadata = self.inner.lookup(target).await?;
        self.cache.set(target.to_string(), metadata.clone()).await;
        Ok(metadata)
    }
}
