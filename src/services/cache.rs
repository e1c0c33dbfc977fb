use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{CacheRecord, Catalog};
use crate::services::metrics::CACHE_LOOKUPS;

/// Fixed key of the single cache slot
pub const CACHE_KEY: &str = "m3u_data";

/// Default serialized size ceiling (5 MB)
pub const DEFAULT_MAX_CACHE_BYTES: usize = 5 * 1024 * 1024;

/// Why a cache read did not produce a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    Absent,
    /// Unreadable or not a valid record
    Corrupt,
    Expired,
    /// Valid record holding an empty catalog
    Empty,
}

impl MissReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissReason::Absent => "absent",
            MissReason::Corrupt => "corrupt",
            MissReason::Expired => "expired",
            MissReason::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Catalog),
    Miss(MissReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    Stored { bytes: usize },
    /// Empty catalogs are never cached
    SkippedEmpty,
    /// Serialized record reached the size ceiling
    SkippedOversize { bytes: usize },
}

/// Single-slot disk cache for the last parsed catalog.
///
/// The slot is `<cache_dir>/m3u_data.json`. Expired or corrupt records are
/// reported as misses and left on disk; the next successful load overwrites them.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    cache_dir: PathBuf,
    ttl: Duration,
    max_bytes: usize,
}

impl CatalogCache {
    /// Create the cache, making sure the directory exists
    pub async fn new(cache_dir: impl Into<PathBuf>, ttl: Duration, max_bytes: usize) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).await?;

        Ok(Self {
            cache_dir,
            ttl,
            max_bytes,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached catalog if it is fresh and non-empty
    pub async fn read(&self) -> CacheLookup {
        self.read_at(chrono::Utc::now().timestamp_millis()).await
    }

    async fn read_at(&self, now_ms: i64) -> CacheLookup {
        let lookup = self.lookup(now_ms).await;
        let result = match &lookup {
            CacheLookup::Hit(_) => "hit",
            CacheLookup::Miss(reason) => reason.as_str(),
        };
        CACHE_LOOKUPS.with_label_values(&[result]).inc();
        lookup
    }

    async fn lookup(&self, now_ms: i64) -> CacheLookup {
        let path = self.record_path();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return CacheLookup::Miss(MissReason::Absent)
            }
            Err(e) => {
                tracing::warn!("Failed to read cache file {}: {}", path.display(), e);
                return CacheLookup::Miss(MissReason::Corrupt);
            }
        };

        let record: CacheRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Failed to parse cache record {}: {}", path.display(), e);
                return CacheLookup::Miss(MissReason::Corrupt);
            }
        };

        let age_ms = now_ms.saturating_sub(record.timestamp);
        if age_ms >= self.ttl.as_millis() as i64 {
            tracing::info!(age_ms = age_ms, ttl_ms = self.ttl.as_millis() as u64, "Cache record expired");
            return CacheLookup::Miss(MissReason::Expired);
        }

        if record.data.is_empty() {
            return CacheLookup::Miss(MissReason::Empty);
        }

        CacheLookup::Hit(record.data)
    }

    /// Overwrite the slot with `catalog` stamped with the current time
    pub async fn write(&self, catalog: &Catalog) -> Result<CacheWrite> {
        self.write_at(catalog, chrono::Utc::now().timestamp_millis()).await
    }

    async fn write_at(&self, catalog: &Catalog, timestamp: i64) -> Result<CacheWrite> {
        if catalog.is_empty() {
            return Ok(CacheWrite::SkippedEmpty);
        }

        let record = CacheRecord {
            timestamp,
            data: catalog.clone(),
        };
        let content = serde_json::to_string(&record)?;
        let bytes = content.len();
        if bytes >= self.max_bytes {
            tracing::warn!(bytes = bytes, max_bytes = self.max_bytes, "Cache not saved: playlist too large");
            return Ok(CacheWrite::SkippedOversize { bytes });
        }

        let path = self.record_path();
        let tmp_path = self.cache_dir.join(format!("{}.json.{}.tmp", CACHE_KEY, uuid::Uuid::new_v4()));

        let mut file = File::create(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        // Atomic replace to avoid readers seeing partial writes
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        Ok(CacheWrite::Stored { bytes })
    }

    /// Remove the slot (no-op when absent)
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(self.record_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn record_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.json", CACHE_KEY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaItem;

    const HOUR: Duration = Duration::from_secs(3600);

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("catalog-cache-{}", uuid::Uuid::new_v4()))
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.movies.push(MediaItem {
            title: "The Matrix".to_string(),
            url: "http://example.com/matrix.mp4".to_string(),
            logo: String::new(),
        });
        catalog.add_episode(
            "Dark".to_string(),
            "http://logo/dark.png",
            "1".to_string(),
            crate::models::Episode {
                title: "Episode 1".to_string(),
                url: "http://example.com/dark/101.mp4".to_string(),
                logo: "http://logo/dark.png".to_string(),
            },
        );
        catalog
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = temp_dir();
        let cache = CatalogCache::new(&dir, HOUR, DEFAULT_MAX_CACHE_BYTES).await.unwrap();
        let catalog = sample_catalog();

        assert!(matches!(cache.write(&catalog).await.unwrap(), CacheWrite::Stored { .. }));
        assert_eq!(cache.read().await, CacheLookup::Hit(catalog));

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_missing_record_is_absent() {
        let dir = temp_dir();
        let cache = CatalogCache::new(&dir, HOUR, DEFAULT_MAX_CACHE_BYTES).await.unwrap();
        assert_eq!(cache.read().await, CacheLookup::Miss(MissReason::Absent));
        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_expired_record_is_miss_and_kept() {
        let dir = temp_dir();
        let cache = CatalogCache::new(&dir, HOUR, DEFAULT_MAX_CACHE_BYTES).await.unwrap();
        let written_at = 1_700_000_000_000i64;
        cache.write_at(&sample_catalog(), written_at).await.unwrap();

        let fresh = written_at + HOUR.as_millis() as i64 - 1;
        assert!(matches!(cache.read_at(fresh).await, CacheLookup::Hit(_)));

        let stale = written_at + HOUR.as_millis() as i64;
        assert_eq!(cache.read_at(stale).await, CacheLookup::Miss(MissReason::Expired));
        assert!(fs::metadata(cache.record_path()).await.is_ok());

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_corrupt_and_empty_records() {
        let dir = temp_dir();
        let cache = CatalogCache::new(&dir, HOUR, DEFAULT_MAX_CACHE_BYTES).await.unwrap();

        fs::write(cache.record_path(), "{not json").await.unwrap();
        assert_eq!(cache.read().await, CacheLookup::Miss(MissReason::Corrupt));

        let empty = CacheRecord {
            timestamp: chrono::Utc::now().timestamp_millis(),
            data: Catalog::default(),
        };
        fs::write(cache.record_path(), serde_json::to_string(&empty).unwrap()).await.unwrap();
        assert_eq!(cache.read().await, CacheLookup::Miss(MissReason::Empty));

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_write_skips_empty_and_oversize() {
        let dir = temp_dir();
        let cache = CatalogCache::new(&dir, HOUR, 64).await.unwrap();

        assert_eq!(cache.write(&Catalog::default()).await.unwrap(), CacheWrite::SkippedEmpty);
        assert!(matches!(
            cache.write(&sample_catalog()).await.unwrap(),
            CacheWrite::SkippedOversize { .. }
        ));
        assert_eq!(cache.read().await, CacheLookup::Miss(MissReason::Absent));

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_write_overwrites_and_clear() {
        let dir = temp_dir();
        let cache = CatalogCache::new(&dir, HOUR, DEFAULT_MAX_CACHE_BYTES).await.unwrap();

        cache.write(&sample_catalog()).await.unwrap();
        let mut newer = sample_catalog();
        newer.movies.clear();
        cache.write(&newer).await.unwrap();
        assert_eq!(cache.read().await, CacheLookup::Hit(newer));

        cache.clear().await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.read().await, CacheLookup::Miss(MissReason::Absent));

        let _ = fs::remove_dir_all(&dir).await;
    }
}
