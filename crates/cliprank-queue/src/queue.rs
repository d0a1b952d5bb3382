//! Render queue implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::{debug, info};

use cliprank_models::MediaId;

use crate::error::QueueResult;
use crate::job::JobId;

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// Stream name for render jobs
    pub stream_name: String,
    /// Key prefix for dedup entries
    pub dedup_prefix: String,
    /// Dedup key TTL in seconds
    pub dedup_ttl_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            stream_name: "cliprank:render".to_string(),
            dedup_prefix: "cliprank:dedup".to_string(),
            dedup_ttl_secs: 86_400, // 24 hours
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            stream_name: std::env::var("QUEUE_STREAM")
                .unwrap_or_else(|_| "cliprank:render".to_string()),
            dedup_prefix: std::env::var("QUEUE_DEDUP_PREFIX")
                .unwrap_or_else(|_| "cliprank:dedup".to_string()),
            dedup_ttl_secs: std::env::var("QUEUE_DEDUP_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(86_400),
        }
    }
}

/// At-least-once render enqueue with dedup on a caller-supplied unique key.
///
/// Re-enqueueing an already-seen key is not an error: the stored job id is
/// returned and nothing new enters the stream. That is what keeps
/// recommendation re-runs from double-rendering a clip.
#[async_trait]
pub trait RenderQueue: Send + Sync {
    /// Enqueue a job unless `unique_key` was already enqueued.
    async fn enqueue_unique(
        &self,
        media_id: &MediaId,
        job_type: &str,
        unique_key: &str,
        payload: serde_json::Value,
    ) -> QueueResult<JobId>;

    /// Number of jobs currently in the stream.
    async fn len(&self) -> QueueResult<u64>;
}

/// Redis Streams queue client.
pub struct RedisQueue {
    client: redis::Client,
    config: QueueConfig,
}

impl RedisQueue {
    /// Create a new queue client.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    fn dedup_key(&self, job_type: &str, unique_key: &str) -> String {
        format!("{}:{}:{}", self.config.dedup_prefix, job_type, unique_key)
    }
}

#[async_trait]
impl RenderQueue for RedisQueue {
    async fn enqueue_unique(
        &self,
        media_id: &MediaId,
        job_type: &str,
        unique_key: &str,
        payload: serde_json::Value,
    ) -> QueueResult<JobId> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let job_id = JobId::new();
        let dedup_key = self.dedup_key(job_type, unique_key);

        // Claim the dedup key; losing the race means someone already
        // enqueued this unique key.
        let acquired: Option<String> = redis::cmd("SET")
            .arg(&dedup_key)
            .arg(job_id.as_str())
            .arg("NX")
            .arg("EX")
            .arg(self.config.dedup_ttl_secs)
            .query_async(&mut conn)
            .await?;

        if acquired.is_none() {
            if let Some(existing) = conn.get::<_, Option<String>>(&dedup_key).await? {
                debug!(
                    job_type,
                    unique_key,
                    job_id = %existing,
                    "Duplicate enqueue absorbed"
                );
                return Ok(JobId::from_string(existing));
            }
            // Dedup key expired between the two commands; enqueue fresh.
        }

        let payload_str = serde_json::to_string(&payload)?;
        let message_id: String = redis::cmd("XADD")
            .arg(&self.config.stream_name)
            .arg("*")
            .arg("job_type")
            .arg(job_type)
            .arg("media_id")
            .arg(media_id.as_str())
            .arg("key")
            .arg(unique_key)
            .arg("job_id")
            .arg(job_id.as_str())
            .arg("payload")
            .arg(&payload_str)
            .query_async(&mut conn)
            .await?;

        info!(
            job_type,
            media_id = %media_id,
            unique_key,
            message_id = %message_id,
            "Enqueued job {}",
            job_id
        );

        Ok(job_id)
    }

    async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.xlen(&self.config.stream_name).await?;
        Ok(len)
    }
}

/// A job captured by the in-process queue.
#[derive(Debug, Clone)]
pub struct EnqueuedJob {
    pub job_id: JobId,
    pub media_id: MediaId,
    pub job_type: String,
    pub unique_key: String,
    pub payload: serde_json::Value,
}

/// In-process queue for tests and local runs.
#[derive(Default)]
pub struct MemoryQueue {
    inner: RwLock<MemoryQueueInner>,
}

#[derive(Default)]
struct MemoryQueueInner {
    dedup: HashMap<String, JobId>,
    jobs: Vec<EnqueuedJob>,
}

impl MemoryQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// All jobs that actually entered the queue (duplicates excluded).
    pub async fn jobs(&self) -> Vec<EnqueuedJob> {
        self.inner.read().await.jobs.clone()
    }
}

#[async_trait]
impl RenderQueue for MemoryQueue {
    async fn enqueue_unique(
        &self,
        media_id: &MediaId,
        job_type: &str,
        unique_key: &str,
        payload: serde_json::Value,
    ) -> QueueResult<JobId> {
        let dedup_key = format!("{}:{}", job_type, unique_key);
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner.dedup.get(&dedup_key) {
            debug!(job_type, unique_key, "Duplicate enqueue absorbed");
            return Ok(existing.clone());
        }

        let job_id = JobId::new();
        inner.dedup.insert(dedup_key, job_id.clone());
        inner.jobs.push(EnqueuedJob {
            job_id: job_id.clone(),
            media_id: media_id.clone(),
            job_type: job_type.to_string(),
            unique_key: unique_key.to_string(),
            payload,
        });

        Ok(job_id)
    }

    async fn len(&self) -> QueueResult<u64> {
        Ok(self.inner.read().await.jobs.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_queue_dedups_on_unique_key() {
        let queue = MemoryQueue::new();
        let media_id = MediaId::new();

        let first = queue
            .enqueue_unique(&media_id, "render_clip", "clip-1", json!({"a": 1}))
            .await
            .unwrap();
        let second = queue
            .enqueue_unique(&media_id, "render_clip", "clip-1", json!({"a": 2}))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(queue.jobs().await.len(), 1);
        assert_eq!(queue.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_queue_distinct_keys_enqueue() {
        let queue = MemoryQueue::new();
        let media_id = MediaId::new();

        queue
            .enqueue_unique(&media_id, "render_clip", "clip-1", json!({}))
            .await
            .unwrap();
        queue
            .enqueue_unique(&media_id, "render_clip", "clip-2", json!({}))
            .await
            .unwrap();

        assert_eq!(queue.jobs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_queue_job_types_namespaced() {
        let queue = MemoryQueue::new();
        let media_id = MediaId::new();

        let a = queue
            .enqueue_unique(&media_id, "render_clip", "k", json!({}))
            .await
            .unwrap();
        let b = queue
            .enqueue_unique(&media_id, "burn_subtitles", "k", json!({}))
            .await
            .unwrap();

        assert_ne!(a, b);
    }
}
