use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{RentalRequestStore, StoreError};
use crate::models::{RentalRequest, RequestStatus};

#[derive(Clone)]
pub struct PgRentalRequestStore {
  pool: PgPool,
}

impl PgRentalRequestStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

fn map_request(row: &PgRow) -> Result<RentalRequest, StoreError> {
  let raw_status: String = row.get("status");
  let status = RequestStatus::parse(&raw_status)
    .ok_or_else(|| StoreError::Database(format!("unknown status value: {}", raw_status)))?;
  Ok(RentalRequest {
    id: row.get("id"),
    owner_id: row.get("owner_id"),
    equipment_id: row.get("equipment_id"),
    window_start: row.get("window_start"),
    window_end: row.get("window_end"),
    status,
    created_at: row.get("created_at"),
    updated_at: row.get("updated_at"),
  })
}

#[async_trait]
impl RentalRequestStore for PgRentalRequestStore {
  async fn create(&self, request: &RentalRequest) -> Result<(), StoreError> {
    sqlx::query(
      "INSERT INTO rental_requests (id, owner_id, equipment_id, window_start, window_end, status, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(request.id)
    .bind(request.owner_id)
    .bind(request.equipment_id)
    .bind(request.window_start)
    .bind(request.window_end)
    .bind(request.status.as_str())
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn get(&self, id: Uuid) -> Result<RentalRequest, StoreError> {
    let row = sqlx::query(
      "SELECT id, owner_id, equipment_id, window_start, window_end, status, created_at, updated_at
       FROM rental_requests WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&self.pool)
    .await?;
    map_request(&row)
  }

  async fn set_status(
    &self,
    id: Uuid,
    status: RequestStatus,
    updated_at: DateTime<Utc>,
  ) -> Result<(), StoreError> {
    let result = sqlx::query("UPDATE rental_requests SET status = $1, updated_at = $2 WHERE id = $3")
      .bind(status.as_str())
      .bind(updated_at)
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(StoreError::NotFound);
    }
    Ok(())
  }
}
