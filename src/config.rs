use std::env;

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub rabbitmq_url: String,
  pub rabbitmq_queue: String,
  pub redis_url: String,
  pub session_ttl_minutes: i64,
  pub server_port: u16,
}

impl Config {
  pub fn from_env() -> Self {
    Self {
      database_url: env::var("DATABASE_URL").unwrap(),
      rabbitmq_url: env::var("RABBITMQ_URL").unwrap(),
      rabbitmq_queue: env::var("RABBITMQ_QUEUE").unwrap_or_else(|_| "rental_requests".into()),
      redis_url: env::var("REDIS_URL").unwrap(),
      session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
        .unwrap_or_else(|_| "60".into())
        .parse()
        .unwrap_or(60),
      server_port: env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .unwrap_or(8080),
    }
  }
}
