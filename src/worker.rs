use std::env;
use std::sync::Arc;

use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions};
use lapin::types::FieldTable;
use tracing::{error, info};

use rentq::database::setup_database;
use rentq::messaging::{create_rabbit_channel, declare_request_queue};
use rentq::stores::{PgRentalRequestStore, PgStatusLogStore, RentalRequestStore, StatusLogStore};
use rentq::worker_processing::{MessageOutcome, run_lane};

fn delivery_payload(delivery: &Delivery) -> &[u8] {
  &delivery.data
}

async fn settle_delivery(delivery: Delivery, outcome: MessageOutcome) {
  let broker_result = match outcome {
    MessageOutcome::Ack => delivery.ack(BasicAckOptions::default()).await,
    MessageOutcome::NackRequeue => {
      delivery.nack(BasicNackOptions { requeue: true, ..Default::default() }).await
    }
    MessageOutcome::NackDrop => delivery.nack(BasicNackOptions::default()).await,
  };
  if let Err(e) = broker_result {
    error!("Failed to settle delivery: {:?}", e);
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt::init();
  let database_url = env::var("DATABASE_URL").unwrap();
  let rabbitmq_url = env::var("RABBITMQ_URL").unwrap();
  let queue = env::var("RABBITMQ_QUEUE").unwrap_or_else(|_| "rental_requests".into());

  let db_pool = setup_database(&database_url).await;
  let channel = create_rabbit_channel(&rabbitmq_url)
    .await
    .expect("Failed to create RabbitMQ channel");
  declare_request_queue(&channel, &queue)
    .await
    .expect("Queue declaration failed");

  // Prefetch 1: one unacknowledged message per lane, so handling on this
  // worker is strictly sequential.
  channel
    .basic_qos(1, BasicQosOptions::default())
    .await
    .expect("Failed to set QoS");

  let consumer = channel
    .basic_consume(&queue, "rentq_worker", BasicConsumeOptions::default(), FieldTable::default())
    .await
    .expect("Failed to start consumer");

  let deliveries = consumer.filter_map(|delivery| async move {
    match delivery {
      Ok(delivery) => Some(delivery),
      Err(e) => {
        error!("Consumer error: {:?}", e);
        None
      }
    }
  });

  let shutdown = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      error!("Failed to listen for shutdown signal: {:?}", e);
    }
    info!("Shutting down worker");
  };

  let requests: Arc<dyn RentalRequestStore> = Arc::new(PgRentalRequestStore::new(db_pool.clone()));
  let status_log: Arc<dyn StatusLogStore> = Arc::new(PgStatusLogStore::new(db_pool));

  info!("Worker started, waiting for messages");
  run_lane(deliveries, shutdown, requests, status_log, delivery_payload, settle_delivery).await;
  info!("Worker stopped");
}
