//! OEMS Topology - The shape of the sorting network
//!
//! This crate provides:
//! - Wiring entries and their message shapes (collapsed vs split)
//! - The canonical hand-flattened table for 8 elements
//! - A Batcher odd-even merge generator for any power-of-two width
//! - Structural validation of a network plan
//! - An offline evaluator that replays the message protocol sequentially

pub mod batcher;
pub mod entry;
pub mod eval;
pub mod plan;
pub mod table;

pub use batcher::*;
pub use entry::*;
pub use eval::*;
pub use plan::*;
pub use table::*;
