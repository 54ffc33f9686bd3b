use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

use vitrine_core::repository::{RepoError, ViewCounter};
use vitrine_shared::models::events::ProductViewedEvent;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    fn views_key(product_id: Uuid) -> String {
        format!("product:{}:views", product_id)
    }

    fn source_key(product_id: Uuid, source: &str) -> String {
        format!("product:{}:views:{}", product_id, source)
    }
}

#[async_trait]
impl ViewCounter for RedisClient {
    async fn record_view(&self, event: &ProductViewedEvent) -> Result<u64, RepoError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let total: i64 = conn.incr(Self::views_key(event.product_id), 1i64).await?;
        // Per-source counter feeds the admin analytics breakdown.
        let _: i64 = conn
            .incr(
                Self::source_key(event.product_id, event.source.as_str()),
                1i64,
            )
            .await?;

        debug!(product_id = %event.product_id, source = event.source.as_str(), total, "recorded product view");
        Ok(total.max(0) as u64)
    }

    async fn view_count(&self, product_id: Uuid) -> Result<u64, RepoError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let count: Option<i64> = conn.get(Self::views_key(product_id)).await?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }
}
