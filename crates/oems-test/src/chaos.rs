//! Chaos transport for OEMS
//!
//! Wraps any communicator with hostile behavior:
//! - Random send delay, so messages from different senders race
//! - Severed links, where every send fails

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use oems_core::{Element, NetworkConfig, OemsError, OemsResult, Rank};
use oems_transport::{Communicator, LocalEndpoint, LocalWorld, TrafficStats};

/// Chaos configuration
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    /// Upper bound of the random delay before each send
    pub max_jitter: Duration,
    /// Directed links whose sends always fail
    pub severed: HashSet<(Rank, Rank)>,
    /// Base seed; each rank derives its own stream from it
    pub seed: u64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            max_jitter: Duration::from_micros(500),
            severed: HashSet::new(),
            seed: 0x0E35,
        }
    }
}

impl ChaosConfig {
    /// No jitter, no faults
    pub fn calm() -> Self {
        ChaosConfig {
            max_jitter: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cut the directed link `from -> to`
    pub fn sever(mut self, from: Rank, to: Rank) -> Self {
        self.severed.insert((from, to));
        self
    }

    pub fn is_severed(&self, from: Rank, to: Rank) -> bool {
        self.severed.contains(&(from, to))
    }
}

/// A communicator with chaos applied to its sends
pub struct ChaosCommunicator<C> {
    inner: C,
    config: Arc<ChaosConfig>,
    rng: Mutex<StdRng>,
}

impl<C: Communicator> ChaosCommunicator<C> {
    pub fn new(inner: C, config: Arc<ChaosConfig>) -> Self {
        let seed = config.seed.wrapping_add(u64::from(inner.rank().0));
        ChaosCommunicator {
            inner,
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn jitter(&self) -> Duration {
        let max = self.config.max_jitter.as_micros() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.rng.lock().gen_range(0..=max))
    }
}

#[async_trait]
impl<C: Communicator> Communicator for ChaosCommunicator<C> {
    fn rank(&self) -> Rank {
        self.inner.rank()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    async fn send(&self, dest: Rank, elements: &[Element]) -> OemsResult<()> {
        if self.config.is_severed(self.rank(), dest) {
            debug!(from = %self.rank(), to = %dest, "send on severed link");
            return Err(OemsError::SendFailed {
                from: self.rank(),
                to: dest,
                count: elements.len(),
                reason: "link severed".to_string(),
            });
        }

        let delay = self.jitter();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.send(dest, elements).await
    }

    async fn recv(&self, source: Rank, count: usize) -> OemsResult<Vec<Element>> {
        self.inner.recv(source, count).await
    }
}

/// An in-memory world with chaos applied to every endpoint
pub fn chaos_world(
    size: usize,
    network: &NetworkConfig,
    chaos: ChaosConfig,
) -> (Vec<ChaosCommunicator<LocalEndpoint>>, Arc<TrafficStats>) {
    let world = LocalWorld::new(size, network);
    let stats = world.stats();
    let chaos = Arc::new(chaos);

    let endpoints = world
        .into_endpoints()
        .into_iter()
        .map(|endpoint| ChaosCommunicator::new(endpoint, Arc::clone(&chaos)))
        .collect();
    (endpoints, stats)
}
