//! OEMS Transport Layer - Point-to-point message passing
//!
//! This crate provides:
//! - The `Communicator` trait every participant talks through
//! - An in-memory world with one bounded FIFO link per ordered pair
//! - Per-link traffic accounting

pub mod comm;
pub mod local;
pub mod stats;

pub use comm::*;
pub use local::*;
pub use stats::*;
