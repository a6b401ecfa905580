use crate::stores::StoreError;

// Validation and not-found variants map to 4xx on the HTTP surface;
// everything else is transient infrastructure and maps to 500.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  #[error("invalid date range")]
  InvalidDateRange,
  #[error("equipment not found")]
  EquipmentNotFound,
  #[error("rental request not found")]
  RentalRequestNotFound,
  #[error("no status recorded at the requested time")]
  NoStatusAtTime,
  #[error(transparent)]
  Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error(transparent)]
  Rabbit(#[from] lapin::Error),
  #[error("received nack on publish")]
  PublishNack,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  #[error("session backend error: {0}")]
  Backend(String),
}
