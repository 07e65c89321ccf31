//! Network plan - everything a participant needs to play its part
//!
//! A plan bundles the comparator wiring with the root's own duties:
//! which ranks receive scattered pairs, where the root's first-layer
//! results go, and which comparators feed which output positions.

use std::collections::{BTreeSet, HashSet, VecDeque};

use oems_core::{Destination, OemsError, OemsResult, Rank, Source};

use crate::{outbound, Outbound, WiringEntry};

/// One receive posted by the root during the gather
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatherSource {
    /// Comparator sending the results
    pub source: Rank,
    /// Output positions filled, ascending; low result lands first
    pub positions: Vec<usize>,
}

impl GatherSource {
    pub fn new(source: Rank, positions: Vec<usize>) -> Self {
        GatherSource { source, positions }
    }

    /// Elements carried by this receive
    pub fn count(&self) -> usize {
        self.positions.len()
    }
}

/// Duties of the root participant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootPlan {
    /// `scatter[k - 1]` receives input positions `2k` and `2k + 1`
    pub scatter: Vec<Rank>,
    /// Destination of the low result of the root's own comparator
    pub out_low: Destination,
    /// Destination of the high result of the root's own comparator
    pub out_high: Destination,
    /// Gather receives in increasing order of output position
    pub gather: Vec<GatherSource>,
}

impl RootPlan {
    pub fn outbound(&self) -> Outbound {
        outbound(self.out_low, self.out_high)
    }

    /// Input positions scattered to `scatter[index]`
    pub fn scatter_positions(index: usize) -> [usize; 2] {
        let first = 2 * (index + 1);
        [first, first + 1]
    }

    /// Elements the root sends to `receiver`
    pub fn sent_to(&self, receiver: Rank) -> usize {
        let scattered = if self.scatter.contains(&receiver) { 2 } else { 0 };
        let local = [self.out_low, self.out_high]
            .iter()
            .filter(|d| **d == Destination::Comparator(receiver))
            .count();
        scattered + local
    }
}

/// A complete sorting network for one width
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkPlan {
    width: usize,
    /// `entries[r - 1]` belongs to rank `r`
    entries: Vec<WiringEntry>,
    root: RootPlan,
}

impl NetworkPlan {
    pub fn new(width: usize, entries: Vec<WiringEntry>, root: RootPlan) -> Self {
        NetworkPlan {
            width,
            entries,
            root,
        }
    }

    /// Number of elements sorted
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn root(&self) -> &RootPlan {
        &self.root
    }

    /// Wiring for a comparator rank; `None` for the root or an unused rank
    pub fn entry(&self, rank: Rank) -> Option<&WiringEntry> {
        if rank.is_root() {
            return None;
        }
        self.entries.get(rank.index() - 1)
    }

    /// Comparator participants, root excluded
    pub fn comparator_count(&self) -> usize {
        self.entries.len()
    }

    /// Participants the run must be launched with
    pub fn required_participants(&self) -> usize {
        self.entries.len() + 1
    }

    /// Iterate comparator ranks with their wiring
    pub fn entries(&self) -> impl Iterator<Item = (Rank, &WiringEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (Rank::from(i + 1), entry))
    }

    /// Elements `sender` forwards to `receiver`
    pub fn sent(&self, sender: Rank, receiver: Rank) -> usize {
        if sender.is_root() {
            self.root.sent_to(receiver)
        } else {
            self.entry(sender).map_or(0, |e| e.sent_to(receiver))
        }
    }

    /// Directed links the network sends over, each listed once
    pub fn links(&self) -> Vec<(Rank, Rank)> {
        let mut links = BTreeSet::new();
        for rank in &self.root.scatter {
            links.insert((Rank::ROOT, *rank));
        }
        for dest in [self.root.out_low, self.root.out_high] {
            links.insert((Rank::ROOT, dest.rank()));
        }
        for (rank, entry) in self.entries() {
            for dest in [entry.out_low, entry.out_high] {
                links.insert((rank, dest.rank()));
            }
        }
        links.into_iter().collect()
    }

    /// Check the structural invariants of the network.
    ///
    /// Every edge must be described identically by both of its ends, the
    /// comparator graph must be acyclic, and every output position must be
    /// gathered exactly once.
    pub fn validate(&self) -> OemsResult<()> {
        let width = self.width;
        if width < 4 || !width.is_power_of_two() {
            return Err(OemsError::InvalidWidth(width));
        }

        self.validate_ranks()?;
        self.validate_scatter()?;
        self.validate_edges()?;
        self.validate_gather()?;
        self.validate_acyclic()
    }

    fn validate_ranks(&self) -> OemsResult<()> {
        let participants = self.required_participants();
        let in_range = |rank: Rank| rank.index() < participants;

        for out in [self.root.out_low, self.root.out_high] {
            match out {
                Destination::Comparator(r) if in_range(r) && !r.is_root() => {}
                other => return invalid(format!("root result routed to {}", other)),
            }
        }

        for (rank, entry) in self.entries() {
            for source in [entry.in_low, entry.in_high] {
                if let Source::Comparator(r) = source {
                    if r.is_root() || r == rank || !in_range(r) {
                        return invalid(format!("rank {} reads from invalid rank {}", rank, r));
                    }
                }
            }
            for dest in [entry.out_low, entry.out_high] {
                if let Destination::Comparator(r) = dest {
                    if r.is_root() || r == rank || !in_range(r) {
                        return invalid(format!("rank {} writes to invalid rank {}", rank, r));
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_scatter(&self) -> OemsResult<()> {
        let expected = self.width / 2 - 1;
        if self.root.scatter.len() != expected {
            return invalid(format!(
                "scatter reaches {} ranks (expected {})",
                self.root.scatter.len(),
                expected
            ));
        }

        for (index, rank) in self.root.scatter.iter().enumerate() {
            let [first, _] = RootPlan::scatter_positions(index);
            if rank.index() != first / 2 {
                return invalid(format!(
                    "positions {} and {} scattered to rank {}",
                    first,
                    first + 1,
                    rank
                ));
            }
        }
        Ok(())
    }

    fn validate_edges(&self) -> OemsResult<()> {
        let participants = self.required_participants();
        for (receiver, entry) in self.entries() {
            for sender in (0..participants).map(Rank::from) {
                if sender == receiver {
                    continue;
                }
                let expected = entry.expected_from(sender);
                let sent = self.sent(sender, receiver);
                if expected != sent {
                    return invalid(format!(
                        "rank {} expects {} element(s) from {}, which sends {}",
                        receiver, expected, sender, sent
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_gather(&self) -> OemsResult<()> {
        let mut covered = vec![false; self.width];
        let mut sources = HashSet::new();

        for gather in &self.root.gather {
            let entry = self
                .entry(gather.source)
                .ok_or_else(|| topology(format!("gather from unknown rank {}", gather.source)))?;

            if !sources.insert(gather.source) {
                return invalid(format!("rank {} gathered twice", gather.source));
            }
            if gather.count() == 0 || gather.count() != entry.gathered() {
                return invalid(format!(
                    "gather expects {} element(s) from {}, which sends {}",
                    gather.count(),
                    gather.source,
                    entry.gathered()
                ));
            }
            if gather.positions.windows(2).any(|w| w[0] >= w[1]) {
                return invalid(format!("gather positions of {} not ascending", gather.source));
            }
            for &position in &gather.positions {
                match covered.get_mut(position) {
                    Some(slot) if !*slot => *slot = true,
                    _ => return invalid(format!("output position {} gathered twice or out of range", position)),
                }
            }
        }

        if let Some(missing) = covered.iter().position(|c| !c) {
            return invalid(format!("output position {} never gathered", missing));
        }

        if let Some((rank, _)) = self
            .entries()
            .find(|(rank, entry)| entry.gathered() > 0 && !sources.contains(rank))
        {
            return invalid(format!("results of rank {} routed to gather but never received", rank));
        }
        Ok(())
    }

    fn validate_acyclic(&self) -> OemsResult<()> {
        let count = self.comparator_count();
        let mut indegree = vec![0usize; count + 1];
        for (rank, entry) in self.entries() {
            indegree[rank.index()] = [entry.in_low, entry.in_high]
                .iter()
                .filter(|s| matches!(s, Source::Comparator(_)))
                .count();
        }

        let mut ready: VecDeque<Rank> = self
            .entries()
            .filter(|(rank, _)| indegree[rank.index()] == 0)
            .map(|(rank, _)| rank)
            .collect();
        let mut visited = 0;

        while let Some(rank) = ready.pop_front() {
            visited += 1;
            let Some(entry) = self.entry(rank) else {
                continue;
            };
            for dest in [entry.out_low, entry.out_high] {
                if let Destination::Comparator(next) = dest {
                    indegree[next.index()] -= 1;
                    if indegree[next.index()] == 0 {
                        ready.push_back(next);
                    }
                }
            }
        }

        if visited != count {
            return invalid(format!("{} comparator(s) sit on a cycle", count - visited));
        }
        Ok(())
    }
}

fn topology(reason: String) -> OemsError {
    OemsError::InvalidTopology(reason)
}

fn invalid<T>(reason: String) -> OemsResult<T> {
    Err(topology(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical_plan;

    fn rewired(rank: usize, entry: WiringEntry) -> NetworkPlan {
        let plan = canonical_plan();
        let mut entries: Vec<WiringEntry> = plan.entries().map(|(_, e)| *e).collect();
        entries[rank - 1] = entry;
        NetworkPlan::new(plan.width(), entries, plan.root().clone())
    }

    #[test]
    fn test_canonical_plan_is_valid() {
        let plan = canonical_plan();
        plan.validate().unwrap();
        assert_eq!(plan.comparator_count(), 18);
        assert_eq!(plan.required_participants(), 19);
    }

    #[test]
    fn test_entry_lookup_bounds() {
        let plan = canonical_plan();
        assert!(plan.entry(Rank::ROOT).is_none());
        assert!(plan.entry(Rank(19)).is_none());
        assert!(plan.entry(Rank(18)).is_some());
    }

    #[test]
    fn test_sent_counts() {
        let plan = canonical_plan();
        assert_eq!(plan.sent(Rank::ROOT, Rank(1)), 2);
        assert_eq!(plan.sent(Rank::ROOT, Rank(4)), 1);
        assert_eq!(plan.sent(Rank(16), Rank::ROOT), 2);
        assert_eq!(plan.sent(Rank(10), Rank::ROOT), 1);
        assert_eq!(plan.sent(Rank(3), Rank(9)), 0);
    }

    #[test]
    fn test_links_match_sent_counts() {
        let plan = canonical_plan();
        let links = plan.links();

        // One link per message of a run: 3 scatter, 2 root results, 33 from comparators
        assert_eq!(links.len(), 38);
        for (from, to) in &links {
            assert!(plan.sent(*from, *to) > 0, "{} -> {}", from, to);
        }
        for from in (0..19).map(Rank::from) {
            for to in (0..19).map(Rank::from) {
                if plan.sent(from, to) > 0 {
                    assert!(links.contains(&(from, to)), "{} -> {} missing", from, to);
                }
            }
        }
    }

    #[test]
    fn test_rejects_one_sided_edge() {
        // Rank 8 claims rank 6 as a source, but 6 never sends to 8
        let plan = rewired(8, WiringEntry::from_raw(4, 6, 12, 11));
        assert!(matches!(plan.validate(), Err(OemsError::InvalidTopology(_))));
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        // Rank 1 forwards both results to 4, which expects one from 0 and one from 1
        let plan = rewired(1, WiringEntry::from_raw(0, 0, 4, 4));
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_gather() {
        let plan = canonical_plan();
        let mut root = plan.root().clone();
        root.gather.pop();
        let entries = plan.entries().map(|(_, e)| *e).collect();
        let plan = NetworkPlan::new(8, entries, root);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_width() {
        let plan = canonical_plan();
        let entries = plan.entries().map(|(_, e)| *e).collect();
        let plan = NetworkPlan::new(6, entries, plan.root().clone());
        assert!(matches!(plan.validate(), Err(OemsError::InvalidWidth(6))));
    }

    #[test]
    fn test_rejects_self_loop() {
        let plan = rewired(9, WiringEntry::from_raw(6, 7, 9, 11));
        assert!(plan.validate().is_err());
    }
}
