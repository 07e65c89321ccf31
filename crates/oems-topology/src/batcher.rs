//! Batcher odd-even merge network generator
//!
//! Produces a [`NetworkPlan`] for any power-of-two width of at least 4,
//! numbered the same way as the canonical table: the root takes the first
//! comparator of the first layer, ranks `1..width/2` take the remaining
//! first-layer pairs, and later layers follow in order.

use oems_core::{Destination, OemsError, OemsResult, Rank, Source};
use tracing::debug;

use crate::{GatherSource, NetworkPlan, RootPlan, Slot, WiringEntry};

/// Compare-exchange between two wires, `low < high`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comparator {
    pub low: usize,
    pub high: usize,
}

/// Comparator sequence of Batcher's odd-even merge sort, in execution order
pub fn comparator_network(width: usize) -> OemsResult<Vec<Comparator>> {
    check_width(width)?;
    let mut network = Vec::new();
    sort(0, width, &mut network);
    Ok(network)
}

/// Participants (comparators, one of them the root) for a width
pub fn required_participants(width: usize) -> OemsResult<usize> {
    Ok(comparator_network(width)?.len())
}

fn check_width(width: usize) -> OemsResult<()> {
    if width < 4 || !width.is_power_of_two() {
        return Err(OemsError::InvalidWidth(width));
    }
    Ok(())
}

fn sort(lo: usize, n: usize, out: &mut Vec<Comparator>) {
    if n > 1 {
        let half = n / 2;
        sort(lo, half, out);
        sort(lo + half, half, out);
        merge(lo, n, 1, out);
    }
}

fn merge(lo: usize, n: usize, r: usize, out: &mut Vec<Comparator>) {
    let step = r * 2;
    if step < n {
        merge(lo, n, step, out);
        merge(lo + r, n, step, out);
        let mut i = lo + r;
        while i + r < lo + n {
            out.push(Comparator { low: i, high: i + r });
            i += step;
        }
    } else {
        out.push(Comparator { low: lo, high: lo + r });
    }
}

/// Group comparators into layers and order them by (layer, low wire)
fn layered(network: &[Comparator], width: usize) -> Vec<Comparator> {
    let mut depth = vec![0usize; width];
    let mut tagged: Vec<(usize, Comparator)> = network
        .iter()
        .map(|c| {
            let layer = depth[c.low].max(depth[c.high]) + 1;
            depth[c.low] = layer;
            depth[c.high] = layer;
            (layer, *c)
        })
        .collect();

    tagged.sort_by_key(|(layer, c)| (*layer, c.low));
    tagged.into_iter().map(|(_, c)| c).collect()
}

/// Derive the wiring plan for a power-of-two width
pub fn generate(width: usize) -> OemsResult<NetworkPlan> {
    let ordered = layered(&comparator_network(width)?, width);
    let participants = ordered.len();

    // Current holder of each wire: None while the value is still at the root's scatter
    let mut holder: Vec<Option<(Rank, Slot)>> = vec![None; width];
    let mut inputs: Vec<Option<(Source, Source)>> = vec![None; participants];
    let mut outputs: Vec<[Option<Destination>; 2]> = vec![[None, None]; participants];

    let source_of = |held: Option<(Rank, Slot)>| match held {
        None => Source::Root,
        Some((rank, _)) if rank.is_root() => Source::Root,
        Some((rank, _)) => Source::Comparator(rank),
    };

    for (index, comparator) in ordered.iter().enumerate() {
        let rank = Rank::from(index);
        inputs[index] = Some((source_of(holder[comparator.low]), source_of(holder[comparator.high])));

        for wire in [comparator.low, comparator.high] {
            if let Some((prev, slot)) = holder[wire] {
                outputs[prev.index()][slot_index(slot)] = Some(Destination::Comparator(rank));
            }
        }

        holder[comparator.low] = Some((rank, Slot::Low));
        holder[comparator.high] = Some((rank, Slot::High));
    }

    let mut gather: Vec<GatherSource> = Vec::new();
    for (position, held) in holder.iter().copied().enumerate() {
        let (rank, slot) = held.ok_or_else(|| topology(format!("wire {} never compared", position)))?;
        outputs[rank.index()][slot_index(slot)] = Some(Destination::Gather);

        match gather.iter_mut().find(|g| g.source == rank) {
            Some(existing) => existing.positions.push(position),
            None => gather.push(GatherSource::new(rank, vec![position])),
        }
    }

    let resolve = |index: usize, slot: Slot| {
        outputs[index][slot_index(slot)]
            .ok_or_else(|| topology(format!("rank {} has no {:?} destination", index, slot)))
    };

    let first_layer = width / 2;
    let root = RootPlan {
        scatter: (1..first_layer).map(Rank::from).collect(),
        out_low: resolve(0, Slot::Low)?,
        out_high: resolve(0, Slot::High)?,
        gather,
    };

    let mut entries = Vec::with_capacity(participants - 1);
    for index in 1..participants {
        let (in_low, in_high) = inputs[index].ok_or_else(|| topology(format!("rank {} has no inputs", index)))?;
        entries.push(WiringEntry::new(
            in_low,
            in_high,
            resolve(index, Slot::Low)?,
            resolve(index, Slot::High)?,
        ));
    }

    let plan = NetworkPlan::new(width, entries, root);
    plan.validate()?;

    debug!(
        width,
        participants = plan.required_participants(),
        gathers = plan.root().gather.len(),
        "generated odd-even merge network"
    );
    Ok(plan)
}

fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::Low => 0,
        Slot::High => 1,
    }
}

fn topology(reason: String) -> OemsError {
    OemsError::InvalidTopology(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oems_core::CANONICAL_PARTICIPANTS;

    #[test]
    fn test_comparator_counts() {
        // (k^2 - k + 4) * 2^(k-2) - 1 comparators for n = 2^k
        assert_eq!(comparator_network(4).unwrap().len(), 5);
        assert_eq!(comparator_network(8).unwrap().len(), 19);
        assert_eq!(comparator_network(16).unwrap().len(), 63);
        assert_eq!(comparator_network(32).unwrap().len(), 191);
        assert_eq!(required_participants(8).unwrap(), CANONICAL_PARTICIPANTS);
    }

    #[test]
    fn test_rejects_invalid_widths() {
        for width in [0, 1, 2, 3, 6, 12] {
            assert!(matches!(generate(width), Err(OemsError::InvalidWidth(w)) if w == width));
        }
    }

    #[test]
    fn test_first_layer_assignment() {
        let plan = generate(8).unwrap();
        assert_eq!(plan.root().scatter, vec![Rank(1), Rank(2), Rank(3)]);
        for rank in 1..4 {
            let entry = plan.entry(Rank(rank)).unwrap();
            assert_eq!(entry.in_low, Source::Root);
            assert_eq!(entry.in_high, Source::Root);
        }
    }

    #[test]
    fn test_generated_eight_matches_canonical_shape() {
        let plan = generate(8).unwrap();
        assert_eq!(plan.required_participants(), CANONICAL_PARTICIPANTS);
        assert_eq!(plan.root().out_low, Destination::Comparator(Rank(4)));
        assert_eq!(plan.root().out_high, Destination::Comparator(Rank(5)));

        let counts: Vec<usize> = plan.root().gather.iter().map(|g| g.count()).collect();
        assert_eq!(counts, vec![1, 2, 2, 2, 1]);
    }

    #[test]
    fn test_generated_plans_validate() {
        for width in [4, 8, 16, 32, 64] {
            let plan = generate(width).unwrap();
            plan.validate().unwrap();
            assert_eq!(plan.width(), width);
        }
    }
}
