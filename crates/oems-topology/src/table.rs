//! Canonical wiring for 8 elements
//!
//! Batcher's odd-even merge network for n = 8, flattened by hand: 18
//! comparators plus the root, which performs the first comparator of the
//! first layer itself. Columns are `(in-low, in-high, out-low, out-high)`;
//! a 0 reads as the root on the input side and as the gather on the
//! output side.

use oems_core::{Destination, Rank, CANONICAL_WIDTH};

use crate::{GatherSource, NetworkPlan, RootPlan, WiringEntry};

/// Wiring of ranks 1..=18, indexed by `rank - 1`
pub const CANONICAL_TABLE: [WiringEntry; 18] = [
    WiringEntry::from_raw(0, 0, 4, 5),
    WiringEntry::from_raw(0, 0, 6, 7),
    WiringEntry::from_raw(0, 0, 6, 7),
    WiringEntry::from_raw(0, 1, 10, 8),
    WiringEntry::from_raw(0, 1, 8, 13),
    WiringEntry::from_raw(2, 3, 10, 9),
    WiringEntry::from_raw(2, 3, 9, 13),
    WiringEntry::from_raw(4, 5, 12, 11),
    WiringEntry::from_raw(6, 7, 12, 11),
    WiringEntry::from_raw(4, 6, 0, 14),
    WiringEntry::from_raw(8, 9, 14, 18),
    WiringEntry::from_raw(8, 9, 16, 15),
    WiringEntry::from_raw(5, 7, 15, 0),
    WiringEntry::from_raw(10, 11, 16, 17),
    WiringEntry::from_raw(12, 13, 17, 18),
    WiringEntry::from_raw(14, 12, 0, 0),
    WiringEntry::from_raw(14, 15, 0, 0),
    WiringEntry::from_raw(11, 15, 0, 0),
];

/// Gather order: (source, output positions)
const CANONICAL_GATHER: [(u32, &[usize]); 5] = [
    (10, &[0]),
    (16, &[1, 2]),
    (17, &[3, 4]),
    (18, &[5, 6]),
    (13, &[7]),
];

/// Wiring for a comparator identity.
///
/// Returns `None` for the root and for identities outside the table; the
/// participant count is guarded elsewhere.
pub fn lookup(identity: Rank) -> Option<WiringEntry> {
    if identity.is_root() {
        return None;
    }
    CANONICAL_TABLE.get(identity.index() - 1).copied()
}

/// The canonical table packaged with the root's duties
pub fn canonical_plan() -> NetworkPlan {
    let root = RootPlan {
        scatter: vec![Rank(1), Rank(2), Rank(3)],
        out_low: Destination::Comparator(Rank(4)),
        out_high: Destination::Comparator(Rank(5)),
        gather: CANONICAL_GATHER
            .iter()
            .map(|(source, positions)| GatherSource::new(Rank(*source), positions.to_vec()))
            .collect(),
    };

    NetworkPlan::new(CANONICAL_WIDTH, CANONICAL_TABLE.to_vec(), root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oems_core::Source;

    #[test]
    fn test_lookup_range() {
        assert!(lookup(Rank(0)).is_none());
        assert!(lookup(Rank(19)).is_none());
        assert!(lookup(Rank(1000)).is_none());
        for id in 1..=18 {
            assert!(lookup(Rank(id)).is_some(), "rank {} missing", id);
        }
    }

    #[test]
    fn test_literal_rows() {
        let e = lookup(Rank(4)).unwrap();
        assert_eq!(e.in_low, Source::Root);
        assert_eq!(e.in_high, Source::Comparator(Rank(1)));
        assert_eq!(e.out_low, Destination::Comparator(Rank(10)));
        assert_eq!(e.out_high, Destination::Comparator(Rank(8)));

        let e = lookup(Rank(13)).unwrap();
        assert_eq!(e, WiringEntry::from_raw(5, 7, 15, 0));
        assert_eq!(e.out_high, Destination::Gather);

        let e = lookup(Rank(16)).unwrap();
        assert_eq!(e.in_low, Source::Comparator(Rank(14)));
        assert_eq!(e.in_high, Source::Comparator(Rank(12)));
    }

    #[test]
    fn test_scatter_receivers_read_from_root() {
        for id in 1..=3 {
            let e = lookup(Rank(id)).unwrap();
            assert_eq!(e.in_low, Source::Root);
            assert_eq!(e.in_high, Source::Root);
        }
    }

    #[test]
    fn test_gather_totals_width() {
        let plan = canonical_plan();
        let total: usize = plan.root().gather.iter().map(|g| g.count()).sum();
        assert_eq!(total, CANONICAL_WIDTH);
        assert_eq!(plan.root().gather.len(), 5);
    }
}
