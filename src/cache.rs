//! Process-wide caching of compiled record schemas.
//!
//! Schemas and their compiled patterns are immutable once built, so they are
//! compiled once per record type and shared behind an `Arc`. The cache starts
//! empty, takes a read lock for lookups and a write lock only on the first
//! compilation of a type, and never needs teardown.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::DsnResult;
use crate::pattern::Pattern;
use crate::schema::{DsnRecord, RecordSchema};

/// A record schema together with its compiled pattern.
pub(crate) struct CompiledDsn<R> {
    schema: RecordSchema<R>,
    pattern: Pattern,
}

impl<R> CompiledDsn<R> {
    pub(crate) fn schema(&self) -> &RecordSchema<R> {
        &self.schema
    }

    pub(crate) fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

/// Statistics for the schema cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (first compilations).
    pub misses: u64,
    /// Number of record types currently cached.
    pub cached_count: usize,
}

impl CacheStats {
    /// Get the cache hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
pub(crate) struct SchemaCache {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    stats: RwLock<CacheStats>,
}

impl SchemaCache {
    /// Get the compiled schema for `R`, compiling and caching on first use.
    ///
    /// Compilation failures are returned and not cached; compilation is
    /// deterministic, so a later retry fails identically.
    pub(crate) fn get_or_compile<R: DsnRecord>(&self) -> DsnResult<Arc<CompiledDsn<R>>> {
        let key = TypeId::of::<R>();

        let hit = {
            let entries = self.entries.read();
            entries.get(&key).map(Arc::clone)
        };
        if let Some(entry) = hit {
            let compiled = entry
                .downcast::<CompiledDsn<R>>()
                .expect("schema cache entry has mismatched type");
            self.stats.write().hits += 1;
            return Ok(compiled);
        }

        let schema = R::dsn_schema();
        let pattern = Pattern::compile(schema.template())?;
        debug!(template = schema.template(), "compiled DSN schema");
        let compiled = Arc::new(CompiledDsn { schema, pattern });

        let cached_count;
        let result = {
            let mut entries = self.entries.write();
            // Another thread may have compiled the same type concurrently;
            // the first insertion wins.
            let entry = entries
                .entry(key)
                .or_insert_with(|| Arc::clone(&compiled) as Arc<dyn Any + Send + Sync>);
            let result = Arc::clone(entry)
                .downcast::<CompiledDsn<R>>()
                .expect("schema cache entry has mismatched type");
            cached_count = entries.len();
            result
        };

        let mut stats = self.stats.write();
        stats.misses += 1;
        stats.cached_count = cached_count;
        Ok(result)
    }

    pub(crate) fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        stats.cached_count = self.entries.read().len();
        stats
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// The global cache, empty at startup.
static CACHE: LazyLock<SchemaCache> = LazyLock::new(SchemaCache::default);

pub(crate) fn get_or_compile<R: DsnRecord>() -> DsnResult<Arc<CompiledDsn<R>>> {
    CACHE.get_or_compile::<R>()
}

/// Statistics for the process-wide schema cache.
pub fn cache_stats() -> CacheStats {
    CACHE.stats()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CachedRecord;

    impl DsnRecord for CachedRecord {
        fn dsn_schema() -> RecordSchema<Self> {
            RecordSchema::builder("ftp://$Host").string("Host", |_, _| {}).build()
        }
    }

    struct BrokenRecord;

    impl DsnRecord for BrokenRecord {
        fn dsn_schema() -> RecordSchema<Self> {
            RecordSchema::builder("$A$B").build()
        }
    }

    #[test]
    fn test_cache_returns_same_arc() {
        let cache = SchemaCache::default();

        let first = cache.get_or_compile::<CachedRecord>().unwrap();
        let second = cache.get_or_compile::<CachedRecord>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.cached_count, 1);
    }

    #[test]
    fn test_compile_failure_not_cached() {
        let cache = SchemaCache::default();

        assert!(cache.get_or_compile::<BrokenRecord>().is_err());
        assert_eq!(cache.len(), 0);
        // A retry fails the same way, still without caching.
        assert!(cache.get_or_compile::<BrokenRecord>().is_err());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_concurrent_lookups_share_one_entry() {
        let cache = Arc::new(SchemaCache::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.get_or_compile::<CachedRecord>().unwrap().pattern().template().to_string()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "ftp://$Host");
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 8,
            misses: 2,
            cached_count: 1,
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
