use redis::{AsyncCommands, RedisResult};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window counter. The window starts at the first hit for `key` and later hits
    /// do not push the expiry back.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count, ttl): (i64, i64) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .ttl(key)
            .query_async(&mut conn)
            .await?;

        // Also repairs a counter left without expiry by an earlier failed EXPIRE
        if window_unset(ttl) {
            let _: () = conn.expire(key, window_seconds).await?;
        }

        Ok(count <= limit)
    }
}

/// TTL reports -1 for a key that exists but has no expiry.
fn window_unset(ttl: i64) -> bool {
    ttl == -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unexpiring_counters_get_a_window() {
        assert!(window_unset(-1));
        assert!(!window_unset(42));
        assert!(!window_unset(0));
        // -2 means the key is gone
        assert!(!window_unset(-2));
    }
}
