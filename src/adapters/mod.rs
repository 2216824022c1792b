//! Adapter implementations of the ports.
//!
//! Each submodule adapts one external system to a port trait:
//! - `postgres`: record store (sqlx)
//! - `stripe`: payment provider API and webhook surface
//! - `clerk`: session verification and identity directory
//! - `jobs`: background job dispatch (Inngest)
//! - `http`: axum routes, middleware, and application state

pub mod clerk;
pub mod http;
pub mod jobs;
pub mod postgres;
pub mod stripe;
