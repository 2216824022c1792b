//! Domain layer - pure types and logic, no I/O.

pub mod marketplace;
pub mod webhook;
