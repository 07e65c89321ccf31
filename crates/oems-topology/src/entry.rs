//! Wiring entries and the message shapes they imply
//!
//! A pair of endpoints naming the same participant twice collapses into a
//! single two-element message; two distinct participants get one
//! single-element message each. Both ends of an edge derive the shape from
//! their own entry, so the table alone keeps them in agreement.

use oems_core::{Destination, Rank, Source};

/// Message slot within a compare-exchange pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Low,
    High,
}

/// The four roles of one comparator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WiringEntry {
    pub in_low: Source,
    pub in_high: Source,
    pub out_low: Destination,
    pub out_high: Destination,
}

/// How a comparator's two operands arrive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// One message of two elements, [first-sent, second-sent]
    Pair(Source),
    /// One element from each source; low slot filled from the first
    Split { low: Source, high: Source },
}

/// How a comparator's two results leave
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outbound {
    /// One message of two elements, low then high
    Pair(Destination),
    /// One element to each destination
    Split { low: Destination, high: Destination },
}

impl WiringEntry {
    pub const fn new(in_low: Source, in_high: Source, out_low: Destination, out_high: Destination) -> Self {
        WiringEntry {
            in_low,
            in_high,
            out_low,
            out_high,
        }
    }

    /// Build an entry from raw table values, 0 being the root on either side
    pub const fn from_raw(in_low: u32, in_high: u32, out_low: u32, out_high: u32) -> Self {
        WiringEntry {
            in_low: Source::from_raw(in_low),
            in_high: Source::from_raw(in_high),
            out_low: Destination::from_raw(out_low),
            out_high: Destination::from_raw(out_high),
        }
    }

    pub fn inbound(&self) -> Inbound {
        if self.in_low == self.in_high {
            Inbound::Pair(self.in_low)
        } else {
            Inbound::Split {
                low: self.in_low,
                high: self.in_high,
            }
        }
    }

    pub fn outbound(&self) -> Outbound {
        outbound(self.out_low, self.out_high)
    }

    /// Destination of one result slot
    pub fn destination(&self, slot: Slot) -> Destination {
        match slot {
            Slot::Low => self.out_low,
            Slot::High => self.out_high,
        }
    }

    /// Number of elements this comparator expects from `sender`
    pub fn expected_from(&self, sender: Rank) -> usize {
        [self.in_low, self.in_high]
            .iter()
            .filter(|s| s.rank() == sender)
            .count()
    }

    /// Number of results this comparator forwards to `receiver`
    pub fn sent_to(&self, receiver: Rank) -> usize {
        [self.out_low, self.out_high]
            .iter()
            .filter(|d| d.rank() == receiver)
            .count()
    }

    /// Number of results terminating at the gather
    pub fn gathered(&self) -> usize {
        [self.out_low, self.out_high]
            .iter()
            .filter(|d| d.is_gather())
            .count()
    }
}

/// Shape of a pair of outputs
pub fn outbound(low: Destination, high: Destination) -> Outbound {
    if low == high {
        Outbound::Pair(low)
    } else {
        Outbound::Split { low, high }
    }
}

impl Outbound {
    /// Messages this shape puts on the wire
    pub fn message_count(&self) -> usize {
        match self {
            Outbound::Pair(_) => 1,
            Outbound::Split { .. } => 2,
        }
    }
}

impl Inbound {
    /// Receives this shape posts
    pub fn message_count(&self) -> usize {
        match self {
            Inbound::Pair(_) => 1,
            Inbound::Split { .. } => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_shapes() {
        // Rank 16: 14/12 in, both results to the gather
        let entry = WiringEntry::from_raw(14, 12, 0, 0);
        assert_eq!(
            entry.inbound(),
            Inbound::Split {
                low: Source::Comparator(Rank(14)),
                high: Source::Comparator(Rank(12)),
            }
        );
        assert_eq!(entry.outbound(), Outbound::Pair(Destination::Gather));
        assert_eq!(entry.outbound().message_count(), 1);
        assert_eq!(entry.gathered(), 2);
    }

    #[test]
    fn test_scatter_receiver() {
        let entry = WiringEntry::from_raw(0, 0, 6, 7);
        assert_eq!(entry.inbound(), Inbound::Pair(Source::Root));
        assert_eq!(entry.expected_from(Rank::ROOT), 2);
        assert_eq!(entry.sent_to(Rank(6)), 1);
        assert_eq!(entry.gathered(), 0);
    }

    #[test]
    fn test_mixed_root_and_gather() {
        // Rank 13: one result continues, the other is gathered
        let entry = WiringEntry::from_raw(5, 7, 15, 0);
        assert_eq!(entry.destination(Slot::Low), Destination::Comparator(Rank(15)));
        assert_eq!(entry.destination(Slot::High), Destination::Gather);
        assert_eq!(entry.sent_to(Rank::ROOT), 1);
        assert_eq!(entry.expected_from(Rank::ROOT), 0);
    }
}
