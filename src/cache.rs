//! Write-through rate cache backed by a JSON file.
//!
//! The persisted file maps `"<date>_<BASE>"` keys to rate sets. It is
//! loaded fully at startup and rewritten in full after every new entry,
//! so the file reflects all fetched rate sets at all times. Entries are
//! never expired or re-fetched within a run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::rates::{RateError, RateProvider, RateSet};

pub struct RateStore {
    path: PathBuf,
    entries: HashMap<String, RateSet>,
}

impl RateStore {
    /// Opens the persisted store, starting empty when no file exists. A
    /// present but unparseable file is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read rate cache: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse rate cache: {}", path.display()))?
        } else {
            HashMap::new()
        };
        debug!(entries = entries.len(), "Opened rate store");
        Ok(RateStore { path, entries })
    }

    pub fn cache_key(date: NaiveDate, base: &str) -> String {
        format!("{}_{}", date.format("%Y-%m-%d"), base)
    }

    pub fn get(&self, key: &str) -> Option<&RateSet> {
        self.entries.get(key)
    }

    /// Inserts an entry and rewrites the whole file before returning.
    pub fn insert(&mut self, key: String, rates: RateSet) -> Result<()> {
        self.entries.insert(key, rates);
        let raw = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write rate cache: {}", self.path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serves rate sets from the store and falls back to the inner provider
/// on a miss, persisting the result before returning it.
pub struct CachingRateProvider<P: RateProvider> {
    inner: P,
    store: Mutex<RateStore>,
}

impl<P: RateProvider> CachingRateProvider<P> {
    pub fn new(inner: P, store: RateStore) -> Self {
        CachingRateProvider {
            inner,
            store: Mutex::new(store),
        }
    }
}

#[async_trait]
impl<P: RateProvider> RateProvider for CachingRateProvider<P> {
    async fn fetch_rates(&self, date: NaiveDate, base: &str) -> Result<RateSet, RateError> {
        let key = RateStore::cache_key(date, base);
        let mut store = self.store.lock().await;
        if let Some(rates) = store.get(&key) {
            debug!("Cache HIT for {}", key);
            return Ok(rates.clone());
        }
        debug!("Cache MISS for {}", key);
        let rates = self.inner.fetch_rates(date, base).await?;
        store
            .insert(key, rates.clone())
            .map_err(|e| RateError::Store(e.to_string()))?;
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingProvider {
        call_count: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Self {
            CountingProvider {
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RateProvider for &CountingProvider {
        async fn fetch_rates(&self, date: NaiveDate, base: &str) -> Result<RateSet, RateError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if base == "USD" {
                Ok(RateSet::from([
                    ("EUR".to_string(), 0.9),
                    ("GBP".to_string(), 0.8),
                ]))
            } else {
                Err(RateError::UnknownCurrency {
                    base: base.to_string(),
                    date,
                })
            }
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(RateStore::cache_key(date(), "USD"), "2024-01-01_USD");
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = RateStore::open(dir.path().join("cache.json")).unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let dir = tempdir().unwrap();
        let store = RateStore::open(dir.path().join("cache.json")).unwrap();
        let inner = CountingProvider::new();
        let provider = CachingRateProvider::new(&inner, store);

        let first = provider.fetch_rates(date(), "USD").await.unwrap();
        assert_eq!(first.get("EUR"), Some(&0.9));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        let second = provider.fetch_rates(date(), "USD").await.unwrap();
        assert_eq!(second.get("GBP"), Some(&0.8));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let inner = CountingProvider::new();

        {
            let store = RateStore::open(&path).unwrap();
            let provider = CachingRateProvider::new(&inner, store);
            provider.fetch_rates(date(), "USD").await.unwrap();
        }

        // A fresh store sees the persisted entry; no second fetch.
        let store = RateStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        let provider = CachingRateProvider::new(&inner, store);
        provider.fetch_rates(date(), "USD").await.unwrap();
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetches_are_not_cached() {
        let dir = tempdir().unwrap();
        let store = RateStore::open(dir.path().join("cache.json")).unwrap();
        let inner = CountingProvider::new();
        let provider = CachingRateProvider::new(&inner, store);

        assert!(provider.fetch_rates(date(), "ZZZ").await.is_err());
        assert!(provider.fetch_rates(date(), "ZZZ").await.is_err());
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }
}
