//! OEMS Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every participant of a sorting
//! network run:
//! - Identifiers (Rank, Source, Destination)
//! - The element type and the ascending compare-exchange
//! - Network configuration and protocol constants
//! - Error categories and exit codes

pub mod compare;
pub mod config;
pub mod error;
pub mod id;

pub use compare::*;
pub use config::*;
pub use error::*;
pub use id::*;
