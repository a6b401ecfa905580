use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::{FutureExt, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::models::{RentalRequestMessage, RequestStatus};
use crate::stores::{RentalRequestStore, StatusLogStore};

/// What the consume loop should tell the broker about a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
  Ack,
  /// Transient failure, redeliver later.
  NackRequeue,
  /// Poison message, drop without redelivery.
  NackDrop,
}

/// Drives one worker lane: each delivery is fully settled before the next is
/// taken. The shutdown future is pinned once across iterations, so a signal
/// that fires while a message is in flight is still observed on the next
/// pass instead of being lost with a dropped listener.
pub async fn run_lane<T, D, Sh, F, Fut>(
  deliveries: D,
  shutdown: Sh,
  requests: Arc<dyn RentalRequestStore>,
  status_log: Arc<dyn StatusLogStore>,
  payload_of: impl Fn(&T) -> &[u8],
  mut settle: F,
) where
  D: Stream<Item = T>,
  Sh: Future<Output = ()>,
  F: FnMut(T, MessageOutcome) -> Fut,
  Fut: Future<Output = ()>,
{
  tokio::pin!(deliveries);
  tokio::pin!(shutdown);
  loop {
    tokio::select! {
      // Checked first, so a latched shutdown wins over pending deliveries.
      biased;
      _ = &mut shutdown => break,
      delivery = deliveries.next() => {
        let Some(delivery) = delivery else { break };
        let outcome = dispatch_message(payload_of(&delivery), &requests, &status_log).await;
        settle(delivery, outcome).await;
      }
    }
  }
}

/// Runs the handler with a panic boundary so a single corrupt message can
/// never take down the consume loop; a panic degrades to a dropped message.
pub async fn dispatch_message(
  payload: &[u8],
  requests: &Arc<dyn RentalRequestStore>,
  status_log: &Arc<dyn StatusLogStore>,
) -> MessageOutcome {
  match AssertUnwindSafe(handle_message(payload, requests, status_log)).catch_unwind().await {
    Ok(outcome) => outcome,
    Err(_) => {
      error!("panic recovered while processing message; dropping it");
      MessageOutcome::NackDrop
    }
  }
}

async fn handle_message(
  payload: &[u8],
  requests: &Arc<dyn RentalRequestStore>,
  status_log: &Arc<dyn StatusLogStore>,
) -> MessageOutcome {
  let message: RentalRequestMessage = match serde_json::from_slice(payload) {
    Ok(message) => message,
    Err(e) => {
      error!(error = %e, body = %String::from_utf8_lossy(payload), "failed to parse message");
      return MessageOutcome::NackDrop;
    }
  };

  info!(
    request_id = %message.request_id,
    owner_id = %message.owner_id,
    equipment_id = %message.equipment_id,
    "processing rental request"
  );

  let request = match requests.get(message.request_id).await {
    Ok(request) => request,
    Err(e) => {
      // The producer persists the row before publishing, so a missing row
      // means the read raced a commit or storage is unhealthy; retry later.
      error!(request_id = %message.request_id, error = %e, "failed to load rental request");
      return MessageOutcome::NackRequeue;
    }
  };

  // Redelivery guard: only a pending request may advance, so a second
  // delivery of the same creation event is a no-op.
  if request.status != RequestStatus::Pending {
    info!(
      request_id = %request.id,
      status = %request.status,
      "request already processed"
    );
    return MessageOutcome::Ack;
  }

  let now = Utc::now();
  if let Err(e) = requests.set_status(request.id, RequestStatus::Approved, now).await {
    error!(request_id = %request.id, error = %e, "failed to update rental request");
    return MessageOutcome::NackRequeue;
  }

  // The transition above is the authoritative side effect; the log entry is
  // best-effort auditing and its failure must not hold the message.
  if let Err(e) = status_log
    .append(request.id, RequestStatus::Approved, now, "Request approved by worker")
    .await
  {
    warn!(request_id = %request.id, error = %e, "failed to append status event");
  }

  info!(request_id = %request.id, new_status = %RequestStatus::Approved, "rental request processed");
  MessageOutcome::Ack
}
