// In-memory fakes for the store, publisher, and session traits. Failure and
// panic toggles let tests drive the worker's nack/drop paths without a broker.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use rentq::auth::SessionStore;
use rentq::error::{PublishError, SessionError};
use rentq::models::{Equipment, RentalRequest, RentalRequestMessage, RequestStatus, StatusEvent};
use rentq::stores::{EquipmentStore, RentalRequestStore, StatusLogStore, StoreError};

#[derive(Default)]
pub struct InMemoryRequestStore {
  rows: Mutex<HashMap<Uuid, RentalRequest>>,
  pub fail_reads: AtomicBool,
  pub panic_on_read: AtomicBool,
}

impl InMemoryRequestStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get_sync(&self, id: Uuid) -> Option<RentalRequest> {
    self.rows.lock().unwrap().get(&id).cloned()
  }

  pub fn len(&self) -> usize {
    self.rows.lock().unwrap().len()
  }
}

#[async_trait]
impl RentalRequestStore for InMemoryRequestStore {
  async fn create(&self, request: &RentalRequest) -> Result<(), StoreError> {
    self.rows.lock().unwrap().insert(request.id, request.clone());
    Ok(())
  }

  async fn get(&self, id: Uuid) -> Result<RentalRequest, StoreError> {
    if self.panic_on_read.load(Ordering::SeqCst) {
      panic!("injected panic in request store");
    }
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(StoreError::Database("injected read failure".into()));
    }
    self.rows.lock().unwrap().get(&id).cloned().ok_or(StoreError::NotFound)
  }

  async fn set_status(
    &self,
    id: Uuid,
    status: RequestStatus,
    updated_at: DateTime<Utc>,
  ) -> Result<(), StoreError> {
    let mut rows = self.rows.lock().unwrap();
    let request = rows.get_mut(&id).ok_or(StoreError::NotFound)?;
    request.status = status;
    request.updated_at = updated_at;
    Ok(())
  }
}

#[derive(Default)]
pub struct InMemoryStatusLog {
  events: Mutex<Vec<StatusEvent>>,
  next_id: AtomicI64,
  pub fail_appends: AtomicBool,
}

impl InMemoryStatusLog {
  pub fn new() -> Self {
    Self { next_id: AtomicI64::new(1), ..Default::default() }
  }

  pub fn events_for(&self, request_id: Uuid) -> Vec<StatusEvent> {
    self
      .events
      .lock()
      .unwrap()
      .iter()
      .filter(|e| e.request_id == request_id)
      .cloned()
      .collect()
  }

  pub fn len(&self) -> usize {
    self.events.lock().unwrap().len()
  }
}

#[async_trait]
impl StatusLogStore for InMemoryStatusLog {
  async fn append(
    &self,
    request_id: Uuid,
    status: RequestStatus,
    timestamp: DateTime<Utc>,
    comment: &str,
  ) -> Result<StatusEvent, StoreError> {
    if self.fail_appends.load(Ordering::SeqCst) {
      return Err(StoreError::Database("injected append failure".into()));
    }
    let event = StatusEvent {
      id: self.next_id.fetch_add(1, Ordering::SeqCst),
      request_id,
      status,
      timestamp,
      comment: comment.to_string(),
    };
    self.events.lock().unwrap().push(event.clone());
    Ok(event)
  }

  async fn latest(&self, request_id: Uuid) -> Result<StatusEvent, StoreError> {
    self
      .events
      .lock()
      .unwrap()
      .iter()
      .filter(|e| e.request_id == request_id)
      .max_by_key(|e| (e.timestamp, e.id))
      .cloned()
      .ok_or(StoreError::NotFound)
  }

  async fn as_of(&self, request_id: Uuid, instant: DateTime<Utc>) -> Result<StatusEvent, StoreError> {
    self
      .events
      .lock()
      .unwrap()
      .iter()
      .filter(|e| e.request_id == request_id && e.timestamp <= instant)
      .max_by_key(|e| (e.timestamp, e.id))
      .cloned()
      .ok_or(StoreError::NotFound)
  }
}

#[derive(Default)]
pub struct InMemoryEquipmentStore {
  rows: Mutex<HashMap<Uuid, Equipment>>,
}

impl InMemoryEquipmentStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn seed(&self, name: &str) -> Uuid {
    let equipment = Equipment { id: Uuid::new_v4(), name: name.to_string(), available_quantity: 1 };
    let id = equipment.id;
    self.rows.lock().unwrap().insert(id, equipment);
    id
  }
}

#[async_trait]
impl EquipmentStore for InMemoryEquipmentStore {
  async fn create(&self, equipment: &Equipment) -> Result<(), StoreError> {
    self.rows.lock().unwrap().insert(equipment.id, equipment.clone());
    Ok(())
  }

  async fn get(&self, id: Uuid) -> Result<Equipment, StoreError> {
    self.rows.lock().unwrap().get(&id).cloned().ok_or(StoreError::NotFound)
  }
}

#[derive(Default)]
pub struct RecordingPublisher {
  published: Mutex<Vec<RentalRequestMessage>>,
  pub fail_publishes: AtomicBool,
}

impl RecordingPublisher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn published(&self) -> Vec<RentalRequestMessage> {
    self.published.lock().unwrap().clone()
  }
}

#[async_trait]
impl rentq::messaging::RequestPublisher for RecordingPublisher {
  async fn publish(&self, message: &RentalRequestMessage) -> Result<(), PublishError> {
    if self.fail_publishes.load(Ordering::SeqCst) {
      return Err(PublishError::PublishNack);
    }
    self.published.lock().unwrap().push(message.clone());
    Ok(())
  }
}

#[derive(Default)]
pub struct FakeSessionStore {
  sessions: Mutex<HashMap<String, Uuid>>,
  pub fail_resolves: AtomicBool,
}

impl FakeSessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn issue(&self, token: &str) -> Uuid {
    let owner_id = Uuid::new_v4();
    self.sessions.lock().unwrap().insert(token.to_string(), owner_id);
    owner_id
  }
}

#[async_trait]
impl SessionStore for FakeSessionStore {
  async fn resolve(&self, token: &str) -> Result<Option<Uuid>, SessionError> {
    if self.fail_resolves.load(Ordering::SeqCst) {
      return Err(SessionError::Backend("injected session backend failure".into()));
    }
    Ok(self.sessions.lock().unwrap().get(token).copied())
  }
}
