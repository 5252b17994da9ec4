// src/lib.rs

pub mod client;
pub mod config;
pub mod docs;
pub mod error;
pub mod grading;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod utils;

pub use routes::create_router;
