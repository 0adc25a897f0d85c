use super::{check_capacity, ListStore};
use crate::{Error, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use std::future::Future;
use std::time::Duration;

// LPUSH and LTRIM must not interleave with another append, otherwise two
// writers can both see 51 entries and trim twice.
const PUSH_CAPPED_SCRIPT: &str = r"
redis.call('LPUSH', KEYS[1], ARGV[1])
redis.call('LTRIM', KEYS[1], 0, tonumber(ARGV[2]) - 1)
return redis.call('LLEN', KEYS[1])
";

pub struct RedisListStore {
    connection: MultiplexedConnection,
    push_script: Script,
    timeout: Duration,
}

impl RedisListStore {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| {
                Error::StoreUnavailable(format!(
                    "Timed out connecting to Redis after {:?}",
                    timeout
                ))
            })??;

        tracing::info!("Connected to Redis history store");

        Ok(Self {
            connection,
            push_script: Script::new(PUSH_CAPPED_SCRIPT),
            timeout,
        })
    }
}

/// Bound one Redis command by `timeout`; expiry and command errors are both
/// `StoreUnavailable`.
async fn run_with_timeout<T, F>(timeout: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::error!("Redis {} failed: {}", operation, e);
            Err(e.into())
        }
        Err(_) => {
            tracing::error!("Redis {} timed out after {:?}", operation, timeout);
            Err(Error::StoreUnavailable(format!(
                "Redis {} timed out after {:?}",
                operation, timeout
            )))
        }
    }
}

/// LRANGE stop index for the first `limit` entries; `None` when nothing is wanted.
fn range_stop(limit: usize) -> Option<isize> {
    if limit == 0 {
        None
    } else {
        Some(isize::try_from(limit - 1).unwrap_or(isize::MAX))
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn push_capped(&self, key: &str, value: String, capacity: usize) -> Result<usize> {
        check_capacity(capacity)?;

        let mut connection = self.connection.clone();
        let mut invocation = self.push_script.key(key);
        invocation.arg(value).arg(capacity);

        let length: usize = run_with_timeout(
            self.timeout,
            "push",
            invocation.invoke_async(&mut connection),
        )
        .await?;
        Ok(length)
    }

    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        let Some(stop) = range_stop(limit) else {
            return Ok(Vec::new());
        };

        let mut connection = self.connection.clone();
        let entries: Vec<String> =
            run_with_timeout(self.timeout, "range", connection.lrange(key, 0, stop)).await?;
        Ok(entries)
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut connection = self.connection.clone();
        let _: () =
            run_with_timeout(self.timeout, "delete", connection.del(keys.to_vec())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    /// Store against `REDIS_URL`, or `None` so the caller can skip.
    async fn live_store() -> Option<RedisListStore> {
        let url = std::env::var("REDIS_URL").ok()?;
        Some(
            RedisListStore::connect(&url, Duration::from_secs(2))
                .await
                .unwrap(),
        )
    }

    fn test_key(name: &str) -> String {
        format!("ai_webapp_test:{}:{}", std::process::id(), name)
    }

    #[test]
    fn test_range_stop_for_zero_limit_is_none() {
        // LRANGE 0 -1 would return the whole list
        assert_eq!(range_stop(0), None);
    }

    #[test]
    fn test_range_stop_is_inclusive() {
        assert_eq!(range_stop(1), Some(0));
        assert_eq!(range_stop(50), Some(49));
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = RedisListStore::connect("not-a-redis-url", Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_connect_to_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold sockets open without ever replying.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let started = std::time::Instant::now();
        let result =
            RedisListStore::connect(&format!("redis://{}", addr), Duration::from_millis(200)).await;

        assert!(matches!(result, Err(Error::StoreUnavailable(ref msg)) if msg.contains("Timed out")));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[tokio::test]
    async fn test_command_timeout_is_store_unavailable() {
        let result: Result<usize> = run_with_timeout(
            Duration::from_millis(50),
            "push",
            std::future::pending::<redis::RedisResult<usize>>(),
        )
        .await;

        match result {
            Err(Error::StoreUnavailable(msg)) => assert!(msg.contains("push timed out")),
            other => panic!("expected StoreUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_command_error_is_store_unavailable() {
        let failing = async {
            Err::<usize, _>(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "WRONGTYPE",
            )))
        };
        let result = run_with_timeout(Duration::from_secs(1), "range", failing).await;

        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_command_result_passes_through() {
        let result = run_with_timeout(Duration::from_secs(1), "range", async { Ok(7usize) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_live_concurrent_push_capped_keeps_capacity() {
        let Some(store) = live_store().await else {
            eprintln!("REDIS_URL not set; skipping");
            return;
        };
        let store = Arc::new(store);
        let key = test_key("concurrent");
        store.delete(&[key.as_str()]).await.unwrap();

        let handles: Vec<_> = (0..80)
            .map(|n| {
                let store = store.clone();
                let key = key.clone();
                tokio::spawn(async move { store.push_capped(&key, format!("v{}", n), 50).await })
            })
            .collect();
        for handle in handles {
            let length = handle.await.unwrap().unwrap();
            assert!(length <= 50);
        }

        let mut connection = store.connection.clone();
        let length: usize = connection.llen(&key).await.unwrap();
        assert_eq!(length, 50);

        let mut entries = store.range(&key, 100).await.unwrap();
        entries.sort();
        entries.dedup();
        assert_eq!(entries.len(), 50);

        store.delete(&[key.as_str()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_live_range_is_newest_first() {
        let Some(store) = live_store().await else {
            eprintln!("REDIS_URL not set; skipping");
            return;
        };
        let key = test_key("range");
        store.delete(&[key.as_str()]).await.unwrap();

        for value in ["a", "b", "c"] {
            store.push_capped(&key, value.to_string(), 50).await.unwrap();
        }

        assert_eq!(store.range(&key, 50).await.unwrap(), vec!["c", "b", "a"]);
        assert_eq!(store.range(&key, 2).await.unwrap(), vec!["c", "b"]);
        assert!(store.range(&key, 0).await.unwrap().is_empty());
        assert!(store
            .range(&test_key("missing"), 50)
            .await
            .unwrap()
            .is_empty());

        store.delete(&[key.as_str()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_live_delete_removes_several_keys() {
        let Some(store) = live_store().await else {
            eprintln!("REDIS_URL not set; skipping");
            return;
        };
        let first = test_key("delete_first");
        let second = test_key("delete_second");
        let kept = test_key("delete_kept");
        for key in [&first, &second, &kept] {
            store.push_capped(key, "x".to_string(), 50).await.unwrap();
        }

        store
            .delete(&[first.as_str(), second.as_str(), "never_written"])
            .await
            .unwrap();

        assert!(store.range(&first, 50).await.unwrap().is_empty());
        assert!(store.range(&second, 50).await.unwrap().is_empty());
        assert_eq!(store.range(&kept, 50).await.unwrap(), vec!["x"]);

        store.delete(&[kept.as_str()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_live_zero_capacity_is_rejected() {
        let Some(store) = live_store().await else {
            eprintln!("REDIS_URL not set; skipping");
            return;
        };
        let key = test_key("zero_capacity");

        let result = store.push_capped(&key, "x".to_string(), 0).await;

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert!(store.range(&key, 50).await.unwrap().is_empty());
    }
}
