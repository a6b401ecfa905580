use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{StatusLogStore, StoreError};
use crate::models::{RequestStatus, StatusEvent};

#[derive(Clone)]
pub struct PgStatusLogStore {
  pool: PgPool,
}

impl PgStatusLogStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

fn map_event(row: &PgRow) -> Result<StatusEvent, StoreError> {
  let raw_status: String = row.get("status");
  let status = RequestStatus::parse(&raw_status)
    .ok_or_else(|| StoreError::Database(format!("unknown status value: {}", raw_status)))?;
  Ok(StatusEvent {
    id: row.get("id"),
    request_id: row.get("request_id"),
    status,
    timestamp: row.get("timestamp"),
    comment: row.get("comment"),
  })
}

#[async_trait]
impl StatusLogStore for PgStatusLogStore {
  async fn append(
    &self,
    request_id: Uuid,
    status: RequestStatus,
    timestamp: DateTime<Utc>,
    comment: &str,
  ) -> Result<StatusEvent, StoreError> {
    let (id,): (i64,) = sqlx::query_as(
      "INSERT INTO request_status_log (request_id, status, timestamp, comment)
       VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(request_id)
    .bind(status.as_str())
    .bind(timestamp)
    .bind(comment)
    .fetch_one(&self.pool)
    .await?;
    Ok(StatusEvent {
      id,
      request_id,
      status,
      timestamp,
      comment: comment.to_string(),
    })
  }

  async fn latest(&self, request_id: Uuid) -> Result<StatusEvent, StoreError> {
    let row = sqlx::query(
      "SELECT id, request_id, status, timestamp, comment FROM request_status_log
       WHERE request_id = $1 ORDER BY timestamp DESC, id DESC LIMIT 1",
    )
    .bind(request_id)
    .fetch_one(&self.pool)
    .await?;
    map_event(&row)
  }

  async fn as_of(&self, request_id: Uuid, instant: DateTime<Utc>) -> Result<StatusEvent, StoreError> {
    let row = sqlx::query(
      "SELECT id, request_id, status, timestamp, comment FROM request_status_log
       WHERE request_id = $1 AND timestamp <= $2 ORDER BY timestamp DESC, id DESC LIMIT 1",
    )
    .bind(request_id)
    .bind(instant)
    .fetch_one(&self.pool)
    .await?;
    map_event(&row)
  }
}
