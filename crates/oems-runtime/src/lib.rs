//! OEMS Runtime - Participant logic and run orchestration
//!
//! Every participant runs the same code, parameterized only by its rank:
//! 1. Rank 0 (root) checks the participant count and loads the input
//! 2. Root scatters input pairs to the first-layer comparators
//! 3. Root runs its own first comparator
//! 4. Every other rank receives, compare-exchanges and forwards once
//! 5. Root gathers the sorted vector
//!
//! The launcher starts all participants as tasks over an in-memory world
//! and aborts the whole run on the first error.

pub mod bootstrap;
pub mod comparator;
pub mod input;
pub mod launcher;
pub mod logging;
pub mod output;
pub mod root;

pub use bootstrap::*;
pub use comparator::*;
pub use input::*;
pub use launcher::*;
pub use logging::*;
pub use output::*;
pub use root::*;
