//! Comparator node - one compare-exchange driven by a wiring entry

use tracing::debug;

use oems_core::{compare_exchange, Element, OemsError, OemsResult, Rank};
use oems_topology::{Inbound, Outbound, WiringEntry};
use oems_transport::Communicator;

/// Lifecycle of a comparator node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Idle,
    ReceivingInputs,
    Comparing,
    SendingOutputs,
    Done,
}

/// A single comparator participant
pub struct ComparatorNode<'a, C: Communicator + ?Sized> {
    comm: &'a C,
    entry: WiringEntry,
    state: NodeState,
}

impl<'a, C: Communicator + ?Sized> ComparatorNode<'a, C> {
    pub fn new(comm: &'a C, entry: WiringEntry) -> Self {
        ComparatorNode {
            comm,
            entry,
            state: NodeState::Idle,
        }
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn entry(&self) -> &WiringEntry {
        &self.entry
    }

    fn transition(&mut self, next: NodeState) {
        debug!(rank = %self.comm.rank(), from = ?self.state, to = ?next, "comparator state");
        self.state = next;
    }

    /// Receive both operands, compare-exchange them and forward the results.
    ///
    /// Returns the `[low, high]` pair that was sent on.
    pub async fn run(&mut self) -> OemsResult<[Element; 2]> {
        self.transition(NodeState::ReceivingInputs);
        let operands = receive_pair(self.comm, self.entry.inbound()).await?;

        self.transition(NodeState::Comparing);
        let results = compare_exchange(operands);

        self.transition(NodeState::SendingOutputs);
        send_pair(self.comm, self.entry.outbound(), results).await?;

        self.transition(NodeState::Done);
        Ok(results)
    }
}

/// Receive a comparator's two operands.
///
/// With two distinct sources both receives are posted at once; the low slot
/// is always filled from the low source, whichever message lands first.
pub async fn receive_pair<C: Communicator + ?Sized>(comm: &C, inbound: Inbound) -> OemsResult<[Element; 2]> {
    let at = comm.rank();
    match inbound {
        Inbound::Pair(source) => {
            let payload = comm.recv(source.rank(), 2).await?;
            <[Element; 2]>::try_from(payload.as_slice()).map_err(|_| short(at, source.rank(), payload.len(), 2))
        }
        Inbound::Split { low, high } => {
            let (low_payload, high_payload) = tokio::try_join!(comm.recv(low.rank(), 1), comm.recv(high.rank(), 1))?;
            Ok([
                single(at, low.rank(), &low_payload)?,
                single(at, high.rank(), &high_payload)?,
            ])
        }
    }
}

/// Send a `[low, high]` result pair according to its outbound shape
pub async fn send_pair<C: Communicator + ?Sized>(
    comm: &C,
    outbound: Outbound,
    [low, high]: [Element; 2],
) -> OemsResult<()> {
    match outbound {
        Outbound::Pair(dest) => comm.send(dest.rank(), &[low, high]).await,
        Outbound::Split { low: to_low, high: to_high } => {
            let low_payload = [low];
            let high_payload = [high];
            tokio::try_join!(
                comm.send(to_low.rank(), &low_payload),
                comm.send(to_high.rank(), &high_payload)
            )?;
            Ok(())
        }
    }
}

fn single(at: Rank, from: Rank, payload: &[Element]) -> OemsResult<Element> {
    match payload {
        [value] => Ok(*value),
        _ => Err(short(at, from, payload.len(), 1)),
    }
}

fn short(at: Rank, from: Rank, actual: usize, expected: usize) -> OemsError {
    OemsError::UnexpectedMessage {
        at,
        reason: format!("{} element(s) from {} (expected {})", actual, from, expected),
    }
}
