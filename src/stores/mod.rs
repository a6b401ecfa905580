use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::{Equipment, RentalRequest, RequestStatus, StatusEvent};

pub mod equipment;
pub mod rental_requests;
pub mod status_log;

pub use equipment::PgEquipmentStore;
pub use rental_requests::PgRentalRequestStore;
pub use status_log::PgStatusLogStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("row not found")]
  NotFound,
  #[error("database error: {0}")]
  Database(String),
}

impl From<sqlx::Error> for StoreError {
  fn from(e: sqlx::Error) -> Self {
    match e {
      sqlx::Error::RowNotFound => StoreError::NotFound,
      other => StoreError::Database(other.to_string()),
    }
  }
}

#[async_trait]
pub trait RentalRequestStore: Send + Sync {
  async fn create(&self, request: &RentalRequest) -> Result<(), StoreError>;
  async fn get(&self, id: Uuid) -> Result<RentalRequest, StoreError>;
  async fn set_status(&self, id: Uuid, status: RequestStatus, updated_at: DateTime<Utc>) -> Result<(), StoreError>;
}

// Append-only; rows are never updated or deleted. Latest/as-of order by
// (timestamp, id) so same-timestamp events resolve to the later insertion.
#[async_trait]
pub trait StatusLogStore: Send + Sync {
  async fn append(
    &self,
    request_id: Uuid,
    status: RequestStatus,
    timestamp: DateTime<Utc>,
    comment: &str,
  ) -> Result<StatusEvent, StoreError>;
  async fn latest(&self, request_id: Uuid) -> Result<StatusEvent, StoreError>;
  async fn as_of(&self, request_id: Uuid, instant: DateTime<Utc>) -> Result<StatusEvent, StoreError>;
}

#[async_trait]
pub trait EquipmentStore: Send + Sync {
  async fn create(&self, equipment: &Equipment) -> Result<(), StoreError>;
  async fn get(&self, id: Uuid) -> Result<Equipment, StoreError>;
}
