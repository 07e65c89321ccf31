//! Traffic accounting shared by all endpoints of a world

use std::collections::HashMap;

use parking_lot::Mutex;

use oems_core::Rank;

/// Counters for one directed link
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub messages: u64,
    pub elements: u64,
}

/// Per-link counters, recorded when a send is accepted
#[derive(Debug, Default)]
pub struct TrafficStats {
    links: Mutex<HashMap<(Rank, Rank), LinkStats>>,
}

impl TrafficStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, from: Rank, to: Rank, elements: usize) {
        let mut links = self.links.lock();
        let link = links.entry((from, to)).or_default();
        link.messages += 1;
        link.elements += elements as u64;
    }

    /// Counters for one link (zero if never used)
    pub fn link(&self, from: Rank, to: Rank) -> LinkStats {
        self.links.lock().get(&(from, to)).copied().unwrap_or_default()
    }

    pub fn total_messages(&self) -> u64 {
        self.links.lock().values().map(|l| l.messages).sum()
    }

    pub fn total_elements(&self) -> u64 {
        self.links.lock().values().map(|l| l.elements).sum()
    }

    /// Elements sent by a rank over all its links
    pub fn elements_sent_by(&self, rank: Rank) -> u64 {
        self.links
            .lock()
            .iter()
            .filter(|((from, _), _)| *from == rank)
            .map(|(_, l)| l.elements)
            .sum()
    }

    /// Elements addressed to a rank over all its links
    pub fn elements_received_by(&self, rank: Rank) -> u64 {
        self.links
            .lock()
            .iter()
            .filter(|((_, to), _)| *to == rank)
            .map(|(_, l)| l.elements)
            .sum()
    }

    /// All used links
    pub fn snapshot(&self) -> Vec<((Rank, Rank), LinkStats)> {
        let mut links: Vec<_> = self.links.lock().iter().map(|(k, v)| (*k, *v)).collect();
        links.sort_by_key(|(k, _)| *k);
        links
    }
}
