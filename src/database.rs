use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn setup_database(database_url: &str) -> Pool<Postgres> {
  let pool = PgPoolOptions::new()
    .max_connections(5)
    .connect(database_url)
    .await
    .expect("Failed to connect to database.");

  MIGRATOR.run(&pool)
    .await
    .expect("Failed to run database migrations.");
  info!("Database migrations complete");
  pool
}
