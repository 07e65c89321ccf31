//! Communicator abstraction

use async_trait::async_trait;

use oems_core::{Element, OemsResult, Rank};

/// A participant's view of the transport.
///
/// Messages between one ordered pair of ranks arrive in send order, at
/// most once. Nothing is promised about ordering across different senders.
#[async_trait]
pub trait Communicator: Send + Sync {
    /// This participant's rank
    fn rank(&self) -> Rank;

    /// Number of participants launched
    fn size(&self) -> usize;

    /// Send one message of `elements` to `dest`.
    ///
    /// Completes once the transport has accepted the message.
    async fn send(&self, dest: Rank, elements: &[Element]) -> OemsResult<()>;

    /// Receive the next message from `source`, which must carry exactly
    /// `count` elements
    async fn recv(&self, source: Rank, count: usize) -> OemsResult<Vec<Element>>;
}
