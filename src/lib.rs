//! Profile Market - Social Profile Marketplace Backend
//!
//! Implements the payment-confirmation webhook and the authentication /
//! user-sync gates for the marketplace, following a hexagonal architecture
//! (domain / ports / adapters / application).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
