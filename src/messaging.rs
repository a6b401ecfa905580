use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::info;
use anyhow::Result;

use crate::error::PublishError;
use crate::models::RentalRequestMessage;

static MAX_RETRIES: usize = 5;
static DELAY: u64 = 100;

pub async fn create_rabbit_channel(rabbitmq_url: &str) -> Result<Channel> {
  let conn = Retry::spawn(ExponentialBackoff::from_millis(DELAY).take(MAX_RETRIES), || {
    Connection::connect(rabbitmq_url, ConnectionProperties::default())
  })
    .await?;
  let channel = conn.create_channel().await?;
  info!("RabbitMQ channel created");
  Ok(channel)
}

// The queue must survive a broker restart; both the producer and the worker
// declare it so either side can start first.
pub async fn declare_request_queue(channel: &Channel, queue: &str) -> Result<(), lapin::Error> {
  channel
    .queue_declare(
      queue,
      QueueDeclareOptions { durable: true, ..Default::default() },
      FieldTable::default(),
    )
    .await?;
  Ok(())
}

#[async_trait]
pub trait RequestPublisher: Send + Sync {
  async fn publish(&self, message: &RentalRequestMessage) -> Result<(), PublishError>;
}

pub struct RabbitRequestPublisher {
  channel: Channel,
  queue: String,
}

impl RabbitRequestPublisher {
  pub async fn new(channel: Channel, queue: String) -> Result<Self, PublishError> {
    declare_request_queue(&channel, &queue).await?;
    channel.confirm_select(ConfirmSelectOptions::default()).await?;
    Ok(Self { channel, queue })
  }
}

#[async_trait]
impl RequestPublisher for RabbitRequestPublisher {
  async fn publish(&self, message: &RentalRequestMessage) -> Result<(), PublishError> {
    let payload = serde_json::to_vec(message)?;
    let confirm = Retry::spawn(ExponentialBackoff::from_millis(DELAY).take(MAX_RETRIES), || async {
      self
        .channel
        .basic_publish(
          "",
          &self.queue,
          BasicPublishOptions::default(),
          &payload,
          // delivery_mode 2 marks the message persistent
          BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(2),
        )
        .await?
        .await
    })
      .await?;

    match confirm {
      Confirmation::Nack(_) => Err(PublishError::PublishNack),
      _ => Ok(()),
    }
  }
}
