//! OEMS Wire Protocol - Binary message format
//!
//! Every point-to-point message is one frame:
//! - Fixed header (12 bytes): version, element count, tag, source, destination
//! - Payload of one or two elements

pub mod frame;

pub use frame::*;
