use serde::{Serialize, Deserialize};
use std::fmt;
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
  Pending,
  Approved,
}

impl RequestStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      RequestStatus::Pending => "pending",
      RequestStatus::Approved => "approved",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "pending" => Some(RequestStatus::Pending),
      "approved" => Some(RequestStatus::Approved),
      _ => None,
    }
  }
}

impl fmt::Display for RequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRequest {
  pub id: Uuid,
  pub owner_id: Uuid,
  pub equipment_id: Uuid,
  pub window_start: DateTime<Utc>,
  pub window_end: DateTime<Utc>,
  pub status: RequestStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// One row of the append-only status history. `status` on RentalRequest is a
// projection of the latest of these, ordered by (timestamp, id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
  pub id: i64,
  pub request_id: Uuid,
  pub status: RequestStatus,
  pub timestamp: DateTime<Utc>,
  pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
  pub id: Uuid,
  pub name: String,
  pub available_quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRequestMessage {
  pub request_id: Uuid,
  pub owner_id: Uuid,
  pub equipment_id: Uuid,
  pub window_start: DateTime<Utc>,
  pub window_end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn status_round_trips_through_storage_strings() {
    for status in [RequestStatus::Pending, RequestStatus::Approved] {
      assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(RequestStatus::parse("rejected"), None);
    assert_eq!(RequestStatus::parse(""), None);
  }

  #[test]
  fn status_serializes_lowercase() {
    assert_eq!(serde_json::to_value(RequestStatus::Pending).unwrap(), "pending");
    assert_eq!(serde_json::to_value(RequestStatus::Approved).unwrap(), "approved");
  }

  #[test]
  fn queue_message_uses_the_wire_field_names() {
    let message = RentalRequestMessage {
      request_id: Uuid::new_v4(),
      owner_id: Uuid::new_v4(),
      equipment_id: Uuid::new_v4(),
      window_start: Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap(),
      window_end: Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap(),
    };

    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(value["request_id"], message.request_id.to_string());
    assert_eq!(value["owner_id"], message.owner_id.to_string());
    assert_eq!(value["equipment_id"], message.equipment_id.to_string());
    // Timestamps travel as RFC3339 strings.
    assert_eq!(value["window_start"], "2026-09-01T10:00:00Z");
    assert_eq!(value["window_end"], "2026-09-01T12:00:00Z");
  }
}
