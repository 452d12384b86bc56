//! Cache-aside layer over Redis.
//!
//! Every operation here is best-effort: a Redis failure is logged and treated
//! as a cache miss, never propagated to the caller. The database remains the
//! only source of truth; correctness-critical checks must not read the cache.

use std::sync::Arc;

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

// ────────────────────────────────────────────────────────────────────────────
// TTL tiers
// ────────────────────────────────────────────────────────────────────────────

/// Immutable single entities (a quiz never changes after generation) and
/// append-only attempt results.
pub const TTL_ENTITY: u64 = 86_400;
/// Paginated listings — set membership changes as content is created.
pub const TTL_LIST: u64 = 300;
/// Search results — the indexed corpus can change underneath.
pub const TTL_SEARCH: u64 = 300;
/// Learning paths are mutable after creation, so cache them for less than
/// a full day.
pub const TTL_PATH: u64 = 3_600;

// ────────────────────────────────────────────────────────────────────────────
// Key construction
// ────────────────────────────────────────────────────────────────────────────

pub const QUIZ_LIST_PREFIX: &str = "quizzes:available:";

pub fn quiz_key(quiz_id: i64) -> String {
    format!("quiz:{quiz_id}")
}

pub fn quiz_list_key(skip: i64, limit: i64) -> String {
    format!("{QUIZ_LIST_PREFIX}{skip}:{limit}")
}

pub fn quiz_result_key(quiz_id: i64, user_id: i64, attempt_id: i64) -> String {
    format!("quiz_result:{quiz_id}:{user_id}:{attempt_id}")
}

pub fn learning_path_key(path_id: i64) -> String {
    format!("learning_path:{path_id}")
}

/// Search keys normalize the query (trim + lowercase) so trivially different
/// spellings of the same query share an entry.
pub fn video_search_key(query: &str, page: i64) -> String {
    format!("video_search:{}:{page}", query.trim().to_lowercase())
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Dependency-injected Redis handle, constructed once at bootstrap and passed
/// through AppState. The multiplexed connection is established lazily on
/// first use so the API can start while Redis is still coming up.
#[derive(Clone)]
pub struct CacheClient {
    client: redis::Client,
    conn: Arc<OnceCell<MultiplexedConnection>>,
}

impl CacheClient {
    pub fn new(redis_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
            conn: Arc::new(OnceCell::new()),
        })
    }

    /// Returns a clone of the shared multiplexed connection, connecting on
    /// first use. Returns None (cache unavailable) instead of erroring.
    async fn conn(&self) -> Option<MultiplexedConnection> {
        let result = self
            .conn
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await;
        match result {
            Ok(conn) => Some(conn.clone()),
            Err(e) => {
                warn!("Redis unavailable, treating as cache miss: {e}");
                None
            }
        }
    }

    /// Cache read. Any failure (connection, command, deserialization) is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = match conn.get(key).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Redis GET {key} failed: {e}");
                return None;
            }
        };
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(v) => {
                debug!("Cache hit: {key}");
                Some(v)
            }
            Err(e) => {
                warn!("Cached value at {key} failed to deserialize, discarding: {e}");
                None
            }
        }
    }

    /// Best-effort cache write with an explicit TTL.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let Some(mut conn) = self.conn().await else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize cache value for {key}: {e}");
                return;
            }
        };
        if let Err(e) = conn.set_ex::<_, _, ()>(key, raw, ttl_secs).await {
            warn!("Redis SETEX {key} failed: {e}");
        }
    }

    /// Invalidates a single key. Returns whether a key was actually removed.
    pub async fn delete(&self, key: &str) -> bool {
        let Some(mut conn) = self.conn().await else {
            return false;
        };
        match conn.del::<_, i64>(key).await {
            Ok(n) => n > 0,
            Err(e) => {
                warn!("Redis DEL {key} failed: {e}");
                false
            }
        }
    }

    /// Invalidates every key under a prefix via SCAN — used for paginated
    /// listing keys where the exact page set is unknown at write time.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let Some(mut conn) = self.conn().await else {
            return;
        };
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        loop {
            let scanned: Result<(u64, Vec<String>), _> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await;
            let (next, keys) = match scanned {
                Ok(v) => v,
                Err(e) => {
                    warn!("Redis SCAN {pattern} failed: {e}");
                    return;
                }
            };
            if !keys.is_empty() {
                if let Err(e) = conn.del::<_, ()>(keys).await {
                    warn!("Redis DEL during prefix invalidation of {pattern} failed: {e}");
                }
            }
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_key_format() {
        assert_eq!(quiz_key(42), "quiz:42");
    }

    #[test]
    fn test_quiz_list_key_includes_pagination() {
        assert_eq!(quiz_list_key(10, 25), "quizzes:available:10:25");
        assert!(quiz_list_key(0, 10).starts_with(QUIZ_LIST_PREFIX));
    }

    #[test]
    fn test_quiz_result_key_composite() {
        assert_eq!(quiz_result_key(7, 3, 99), "quiz_result:7:3:99");
    }

    #[test]
    fn test_video_search_key_normalizes_query() {
        assert_eq!(
            video_search_key("  Rust Basics ", 2),
            video_search_key("rust basics", 2)
        );
    }

    #[test]
    fn test_video_search_key_distinguishes_pages() {
        assert_ne!(video_search_key("rust", 1), video_search_key("rust", 2));
    }
}
