use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::messaging::RequestPublisher;
use crate::models::{RentalRequest, RentalRequestMessage, RequestStatus, StatusEvent};
use crate::stores::{EquipmentStore, RentalRequestStore, StatusLogStore, StoreError};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateRentalRequest {
  pub equipment_id: Uuid,
  pub window_start: DateTime<Utc>,
  pub window_end: DateTime<Utc>,
}

/// Validates and persists rental requests, hands them to the broker, and
/// answers status queries from the append-only log.
#[derive(Clone)]
pub struct RentalService {
  requests: Arc<dyn RentalRequestStore>,
  status_log: Arc<dyn StatusLogStore>,
  equipment: Arc<dyn EquipmentStore>,
  publisher: Arc<dyn RequestPublisher>,
}

impl RentalService {
  pub fn new(
    requests: Arc<dyn RentalRequestStore>,
    status_log: Arc<dyn StatusLogStore>,
    equipment: Arc<dyn EquipmentStore>,
    publisher: Arc<dyn RequestPublisher>,
  ) -> Self {
    Self { requests, status_log, equipment, publisher }
  }

  pub async fn create_request(
    &self,
    owner_id: Uuid,
    req: CreateRentalRequest,
  ) -> Result<RentalRequest, ServiceError> {
    let equipment = match self.equipment.get(req.equipment_id).await {
      Ok(equipment) => equipment,
      Err(StoreError::NotFound) => return Err(ServiceError::EquipmentNotFound),
      Err(e) => return Err(ServiceError::Store(e)),
    };

    let now = Utc::now();
    if req.window_start >= req.window_end || req.window_start < now {
      return Err(ServiceError::InvalidDateRange);
    }

    let request = RentalRequest {
      id: Uuid::new_v4(),
      owner_id,
      equipment_id: equipment.id,
      window_start: req.window_start,
      window_end: req.window_end,
      status: RequestStatus::Pending,
      created_at: now,
      updated_at: now,
    };

    self.requests.create(&request).await?;
    self
      .status_log
      .append(request.id, RequestStatus::Pending, now, "Request created")
      .await?;

    let message = RentalRequestMessage {
      request_id: request.id,
      owner_id,
      equipment_id: equipment.id,
      window_start: req.window_start,
      window_end: req.window_end,
    };

    // Best-effort enqueue: the request and its creation event are already
    // durable, so a publish failure leaves the request pending with no
    // queued processing rather than failing the call.
    match self.publisher.publish(&message).await {
      Ok(()) => info!(request_id = %request.id, "rental request queued for processing"),
      Err(e) => warn!(
        request_id = %request.id,
        error = %e,
        "failed to publish rental request; request stays pending until re-published"
      ),
    }

    Ok(request)
  }

  pub async fn get_status(&self, request_id: Uuid) -> Result<StatusEvent, ServiceError> {
    self.ensure_request_exists(request_id).await?;
    self.status_log.latest(request_id).await.map_err(|e| match e {
      // Every request gets a creation event, so an empty log means the
      // stores disagree rather than the request being unknown.
      StoreError::NotFound => StoreError::Database(format!("no status events for request {}", request_id)).into(),
      other => other.into(),
    })
  }

  pub async fn get_status_at(
    &self,
    request_id: Uuid,
    instant: DateTime<Utc>,
  ) -> Result<StatusEvent, ServiceError> {
    self.ensure_request_exists(request_id).await?;
    self.status_log.as_of(request_id, instant).await.map_err(|e| match e {
      StoreError::NotFound => ServiceError::NoStatusAtTime,
      other => other.into(),
    })
  }

  async fn ensure_request_exists(&self, request_id: Uuid) -> Result<(), ServiceError> {
    match self.requests.get(request_id).await {
      Ok(_) => Ok(()),
      Err(StoreError::NotFound) => Err(ServiceError::RentalRequestNotFound),
      Err(e) => Err(ServiceError::Store(e)),
    }
  }
}
