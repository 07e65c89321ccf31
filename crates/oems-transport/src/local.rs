//! In-memory world: one bounded FIFO channel per directed link
//!
//! Every message travels as an encoded frame, so the receiving side checks
//! tag, sender, addressee and element count exactly as it would for bytes
//! off a socket. Dropping an endpoint closes all of its outgoing links,
//! which peers blocked on a receive observe as a communication error.
//! Links are only built where asked for; a rank with none costs an empty
//! endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use oems_core::{Element, NetworkConfig, OemsError, OemsResult, Rank};
use oems_wire::Frame;

use crate::{Communicator, TrafficStats};

/// Link senders, keyed by destination rank
type Outbound = HashMap<Rank, mpsc::Sender<Bytes>>;

/// Link receivers, keyed by source rank
type Inbound = HashMap<Rank, Mutex<mpsc::Receiver<Bytes>>>;

/// A set of in-memory endpoints joined by point-to-point links
pub struct LocalWorld {
    endpoints: Vec<LocalEndpoint>,
    stats: Arc<TrafficStats>,
    links: usize,
}

impl LocalWorld {
    /// Wire up `size` participants, every ordered pair linked
    pub fn new(size: usize, config: &NetworkConfig) -> Self {
        let links = (0..size).flat_map(|from| {
            (0..size)
                .filter(move |to| *to != from)
                .map(move |to| (Rank::from(from), Rank::from(to)))
        });
        Self::with_links(size, config, links)
    }

    /// Wire up `size` participants with only the given directed links.
    ///
    /// Self links, duplicates and links naming a rank outside `size` are
    /// skipped.
    pub fn with_links<I>(size: usize, config: &NetworkConfig, links: I) -> Self
    where
        I: IntoIterator<Item = (Rank, Rank)>,
    {
        let stats = Arc::new(TrafficStats::new());
        let capacity = config.link_capacity.max(1);

        let mut outbound: Vec<Outbound> = (0..size).map(|_| HashMap::new()).collect();
        let mut inbound: Vec<Inbound> = (0..size).map(|_| HashMap::new()).collect();
        let mut count = 0;

        for (from, to) in links {
            if from == to || from.index() >= size || to.index() >= size {
                continue;
            }
            if outbound[from.index()].contains_key(&to) {
                continue;
            }
            let (tx, rx) = mpsc::channel(capacity);
            outbound[from.index()].insert(to, tx);
            inbound[to.index()].insert(from, Mutex::new(rx));
            count += 1;
        }

        let endpoints = outbound
            .into_iter()
            .zip(inbound)
            .enumerate()
            .map(|(rank, (outbound, inbound))| LocalEndpoint {
                rank: Rank::from(rank),
                size,
                tag: config.tag,
                outbound,
                inbound,
                stats: Arc::clone(&stats),
            })
            .collect();

        LocalWorld {
            endpoints,
            stats,
            links: count,
        }
    }

    pub fn size(&self) -> usize {
        self.endpoints.len()
    }

    /// Directed links built
    pub fn link_count(&self) -> usize {
        self.links
    }

    /// Shared traffic counters
    pub fn stats(&self) -> Arc<TrafficStats> {
        Arc::clone(&self.stats)
    }

    /// Hand out the endpoints, ordered by rank
    pub fn into_endpoints(self) -> Vec<LocalEndpoint> {
        self.endpoints
    }
}

/// One participant's side of a [`LocalWorld`]
pub struct LocalEndpoint {
    rank: Rank,
    size: usize,
    tag: u16,
    outbound: Outbound,
    inbound: Inbound,
    stats: Arc<TrafficStats>,
}

#[async_trait]
impl Communicator for LocalEndpoint {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn send(&self, dest: Rank, elements: &[Element]) -> OemsResult<()> {
        let fail = |reason: &str| OemsError::SendFailed {
            from: self.rank,
            to: dest,
            count: elements.len(),
            reason: reason.to_string(),
        };

        let link = self
            .outbound
            .get(&dest)
            .ok_or_else(|| fail("no link to participant"))?;

        let frame = Frame::new(self.tag, self.rank, dest, elements)?.encode();
        link.send(frame).await.map_err(|_| fail("link closed"))?;

        self.stats.record(self.rank, dest, elements.len());
        debug!(from = %self.rank, to = %dest, count = elements.len(), "message sent");
        Ok(())
    }

    async fn recv(&self, source: Rank, count: usize) -> OemsResult<Vec<Element>> {
        let fail = |reason: &str| OemsError::RecvFailed {
            at: self.rank,
            from: source,
            count,
            reason: reason.to_string(),
        };

        let link = self
            .inbound
            .get(&source)
            .ok_or_else(|| fail("no link from participant"))?;

        let bytes = link.lock().await.recv().await.ok_or_else(|| fail("link closed"))?;
        let frame = Frame::decode(&bytes)?;
        frame.verify(self.rank, self.tag, source, count)?;

        debug!(at = %self.rank, from = %source, count, "message received");
        Ok(frame.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(size: usize) -> Vec<LocalEndpoint> {
        LocalWorld::new(size, &NetworkConfig::default()).into_endpoints()
    }

    #[tokio::test]
    async fn test_send_recv_pair() {
        let endpoints = world(2);
        endpoints[0].send(Rank(1), &[7, 3]).await.unwrap();

        let payload = endpoints[1].recv(Rank(0), 2).await.unwrap();
        assert_eq!(payload, vec![7, 3]);
        assert_eq!(endpoints[1].size(), 2);
    }

    #[tokio::test]
    async fn test_fifo_per_link() {
        let endpoints = world(2);
        endpoints[0].send(Rank(1), &[1]).await.unwrap();
        endpoints[0].send(Rank(1), &[2]).await.unwrap();

        assert_eq!(endpoints[1].recv(Rank(0), 1).await.unwrap(), vec![1]);
        assert_eq!(endpoints[1].recv(Rank(0), 1).await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_links_are_demultiplexed_by_source() {
        let endpoints = world(3);
        endpoints[2].send(Rank(0), &[20]).await.unwrap();
        endpoints[1].send(Rank(0), &[10]).await.unwrap();

        // Slot order follows the source named in the receive, not arrival order
        let (low, high) = tokio::join!(endpoints[0].recv(Rank(1), 1), endpoints[0].recv(Rank(2), 1));
        assert_eq!(low.unwrap(), vec![10]);
        assert_eq!(high.unwrap(), vec![20]);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_detected() {
        let endpoints = world(2);
        endpoints[0].send(Rank(1), &[9]).await.unwrap();

        let err = endpoints[1].recv(Rank(0), 2).await.unwrap_err();
        assert!(matches!(err, OemsError::UnexpectedMessage { at, .. } if at == Rank(1)));
    }

    #[tokio::test]
    async fn test_closed_link_fails_receive() {
        let mut endpoints = world(2);
        let sender = endpoints.remove(0);
        drop(sender);

        let err = endpoints[0].recv(Rank(0), 1).await.unwrap_err();
        assert!(matches!(err, OemsError::RecvFailed { .. }));
    }

    #[tokio::test]
    async fn test_unknown_destination() {
        let endpoints = world(2);
        let err = endpoints[0].send(Rank(5), &[1]).await.unwrap_err();
        assert!(matches!(err, OemsError::SendFailed { .. }));

        // No self links
        assert!(endpoints[0].send(Rank(0), &[1]).await.is_err());
    }

    #[tokio::test]
    async fn test_traffic_recorded() {
        let world = LocalWorld::new(3, &NetworkConfig::default());
        let stats = world.stats();
        let endpoints = world.into_endpoints();

        endpoints[0].send(Rank(1), &[1, 2]).await.unwrap();
        endpoints[1].send(Rank(2), &[1]).await.unwrap();

        assert_eq!(stats.total_messages(), 2);
        assert_eq!(stats.total_elements(), 3);
    }

    #[tokio::test]
    async fn test_only_requested_links_exist() {
        let links = [(Rank(0), Rank(1)), (Rank(1), Rank(2)), (Rank(0), Rank(1)), (Rank(2), Rank(2)), (Rank(0), Rank(9))];
        let world = LocalWorld::with_links(1000, &NetworkConfig::default(), links);
        assert_eq!(world.size(), 1000);
        assert_eq!(world.link_count(), 2);

        let endpoints = world.into_endpoints();
        endpoints[0].send(Rank(1), &[4]).await.unwrap();
        assert_eq!(endpoints[1].recv(Rank(0), 1).await.unwrap(), vec![4]);

        assert!(matches!(
            endpoints[1].send(Rank(0), &[4]).await,
            Err(OemsError::SendFailed { .. })
        ));
        assert!(matches!(
            endpoints[999].recv(Rank(0), 1).await,
            Err(OemsError::RecvFailed { .. })
        ));
    }

    #[test]
    fn test_full_mesh_link_count() {
        assert_eq!(LocalWorld::new(4, &NetworkConfig::default()).link_count(), 12);
    }
}
