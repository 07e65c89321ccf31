//! OEMS Test Harness - Network validation under real and hostile transports
//!
//! This crate provides:
//! - A chaos communicator (jittered sends, severed links)
//! - The concrete sorting scenarios and a runner for them
//! - Seeded soak runs over generated networks
//! - End-to-end integration tests

pub mod chaos;
pub mod integration;
pub mod scenarios;

pub use chaos::*;
pub use scenarios::*;
