//! HTTP adapter: axum routes, middleware, and application state.

pub mod middleware;
mod routes;
mod state;
mod webhook;

pub use routes::build_router;
pub use state::AppState;
