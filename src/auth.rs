use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::error::SessionError;

/// Resolves a bearer token to an owner id. Token issuance lives outside this
/// service; the pipeline trusts whatever identity the session backend holds.
#[async_trait]
pub trait SessionStore: Send + Sync {
  async fn resolve(&self, token: &str) -> Result<Option<Uuid>, SessionError>;
}

// Narrow seam over the raw key operations so the sliding-TTL logic can be
// exercised without a live Redis.
#[async_trait]
trait SessionBackend: Send + Sync {
  async fn fetch(&self, token: &str) -> Result<Option<String>, SessionError>;
  async fn refresh(&self, token: &str, ttl_seconds: i64) -> Result<(), SessionError>;
}

struct RedisBackend {
  connection: ConnectionManager,
}

#[async_trait]
impl SessionBackend for RedisBackend {
  async fn fetch(&self, token: &str) -> Result<Option<String>, SessionError> {
    let mut conn = self.connection.clone();
    conn.get(token).await.map_err(|e| SessionError::Backend(e.to_string()))
  }

  async fn refresh(&self, token: &str, ttl_seconds: i64) -> Result<(), SessionError> {
    let mut conn = self.connection.clone();
    let _: bool = conn
      .expire(token, ttl_seconds)
      .await
      .map_err(|e| SessionError::Backend(e.to_string()))?;
    Ok(())
  }
}

#[derive(Clone)]
pub struct RedisSessionStore {
  backend: Arc<dyn SessionBackend>,
  ttl_seconds: i64,
}

impl RedisSessionStore {
  pub async fn connect(redis_url: &str, ttl_seconds: i64) -> Result<Self, SessionError> {
    let client = redis::Client::open(redis_url).map_err(|e| SessionError::Backend(e.to_string()))?;
    let connection = ConnectionManager::new(client)
      .await
      .map_err(|e| SessionError::Backend(e.to_string()))?;
    Ok(Self { backend: Arc::new(RedisBackend { connection }), ttl_seconds })
  }

  #[cfg(test)]
  fn with_backend(backend: Arc<dyn SessionBackend>, ttl_seconds: i64) -> Self {
    Self { backend, ttl_seconds }
  }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
  async fn resolve(&self, token: &str) -> Result<Option<Uuid>, SessionError> {
    let Some(raw) = self.backend.fetch(token).await? else { return Ok(None) };
    let owner_id = raw
      .parse::<Uuid>()
      .map_err(|e| SessionError::Backend(format!("malformed session value: {}", e)))?;

    // Sliding expiry: each authenticated call keeps the session alive.
    self.backend.refresh(token, self.ttl_seconds).await?;

    Ok(Some(owner_id))
  }
}
