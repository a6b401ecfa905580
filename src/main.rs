use std::sync::Arc;

use rentq::auth::RedisSessionStore;
use rentq::config::Config;
use rentq::database::setup_database;
use rentq::messaging::{RabbitRequestPublisher, create_rabbit_channel};
use rentq::routes::routes;
use rentq::service::RentalService;
use rentq::stores::{PgEquipmentStore, PgRentalRequestStore, PgStatusLogStore};

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt::init();
  let config = Config::from_env();
  let db_pool = setup_database(&config.database_url).await;
  let rabbit_channel = create_rabbit_channel(&config.rabbitmq_url)
    .await
    .expect("Failed to create RabbitMQ channel");
  let publisher = RabbitRequestPublisher::new(rabbit_channel, config.rabbitmq_queue.clone())
    .await
    .expect("Failed to set up publisher");
  let sessions = RedisSessionStore::connect(&config.redis_url, config.session_ttl_minutes * 60)
    .await
    .expect("Failed to connect to Redis");

  let service = RentalService::new(
    Arc::new(PgRentalRequestStore::new(db_pool.clone())),
    Arc::new(PgStatusLogStore::new(db_pool.clone())),
    Arc::new(PgEquipmentStore::new(db_pool)),
    Arc::new(publisher),
  );

  warp::serve(routes(service, Arc::new(sessions)))
    .run(([0, 0, 0, 0], config.server_port))
    .await;
}
