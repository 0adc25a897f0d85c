use super::{check_capacity, ListStore};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-local list store. Push and trim happen under one lock acquisition.
#[derive(Clone)]
pub struct MemoryListStore {
    lists: Arc<Mutex<HashMap<String, VecDeque<String>>>>,
    available: Arc<AtomicBool>,
    push_count: Arc<AtomicUsize>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self {
            lists: Arc::new(Mutex::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
            push_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every subsequent call fail with `StoreUnavailable` (or recover).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Place a raw entry at the head of `key`, bypassing any cap.
    pub async fn push_raw(&self, key: &str, value: impl Into<String>) {
        self.lists
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .push_front(value.into());
    }

    pub async fn len(&self, key: &str) -> usize {
        self.lists.lock().await.get(key).map_or(0, VecDeque::len)
    }

    pub fn get_push_count(&self) -> usize {
        self.push_count.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::StoreUnavailable(
                "in-memory store marked unavailable".to_string(),
            ))
        }
    }
}

impl Default for MemoryListStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn push_capped(&self, key: &str, value: String, capacity: usize) -> Result<usize> {
        self.ensure_available()?;
        check_capacity(capacity)?;

        let mut lists = self.lists.lock().await;
        let list = lists.entry(key.to_string()).or_default();
        list.push_front(value);
        list.truncate(capacity);
        self.push_count.fetch_add(1, Ordering::SeqCst);
        Ok(list.len())
    }

    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        self.ensure_available()?;

        let lists = self.lists.lock().await;
        Ok(lists
            .get(key)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        self.ensure_available()?;

        let mut lists = self.lists.lock().await;
        for key in keys {
            lists.remove(*key);
        }
        Ok(())
    }
}
