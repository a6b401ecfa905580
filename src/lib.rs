pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod stores;
pub mod messaging;
pub mod auth;
pub mod service;
pub mod routes;
pub mod worker_processing;
