//! HTTP inference service.
//!
//! Keeps one classifier loaded for the lifetime of the process and serves
//! `GET /`, `GET /health` and the key-gated `POST /predict`.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{router, AppState};
pub use server::{run, serve};
