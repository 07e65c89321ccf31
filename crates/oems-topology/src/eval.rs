//! Offline evaluator
//!
//! Replays the message protocol of a plan on a single thread: the root's
//! scatter and first comparator, every comparator in whatever order its
//! inputs become available, then the gather. Message shapes are enforced
//! exactly as the live runtime does, so a plan that evaluates here cannot
//! deadlock or miscount on the wire.

use std::collections::{HashMap, VecDeque};

use oems_core::{compare_exchange, Element, OemsError, OemsResult, Rank};

use crate::{Inbound, NetworkPlan, Outbound, RootPlan};

/// Result of replaying one input through a plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub output: Vec<Element>,
    /// Messages put on the wire, root included
    pub messages: usize,
    /// Elements carried by those messages
    pub elements: usize,
}

#[derive(Default)]
struct Mailboxes {
    queues: HashMap<(Rank, Rank), VecDeque<Vec<Element>>>,
    messages: usize,
    elements: usize,
}

impl Mailboxes {
    fn post(&mut self, from: Rank, to: Rank, payload: Vec<Element>) {
        self.messages += 1;
        self.elements += payload.len();
        self.queues.entry((from, to)).or_default().push_back(payload);
    }

    fn ready(&self, from: Rank, to: Rank) -> bool {
        self.queues.get(&(from, to)).is_some_and(|q| !q.is_empty())
    }

    fn take(&mut self, from: Rank, to: Rank, count: usize) -> OemsResult<Option<Vec<Element>>> {
        let Some(payload) = self.queues.get_mut(&(from, to)).and_then(|q| q.pop_front()) else {
            return Ok(None);
        };
        if payload.len() != count {
            return Err(OemsError::UnexpectedMessage {
                at: to,
                reason: format!("{} element(s) from {} (expected {})", payload.len(), from, count),
            });
        }
        Ok(Some(payload))
    }

    fn send_pair(&mut self, from: Rank, outbound: Outbound, [low, high]: [Element; 2]) {
        match outbound {
            Outbound::Pair(dest) => self.post(from, dest.rank(), vec![low, high]),
            Outbound::Split { low: to_low, high: to_high } => {
                self.post(from, to_low.rank(), vec![low]);
                self.post(from, to_high.rank(), vec![high]);
            }
        }
    }

    fn try_receive(&mut self, at: Rank, inbound: Inbound) -> OemsResult<Option<[Element; 2]>> {
        match inbound {
            Inbound::Pair(source) => Ok(self
                .take(source.rank(), at, 2)?
                .map(|payload| [payload[0], payload[1]])),
            Inbound::Split { low, high } => {
                if !self.ready(low.rank(), at) || !self.ready(high.rank(), at) {
                    return Ok(None);
                }
                let low = self.take(low.rank(), at, 1)?;
                let high = self.take(high.rank(), at, 1)?;
                Ok(low.zip(high).map(|(l, h)| [l[0], h[0]]))
            }
        }
    }

    fn undelivered(&self) -> usize {
        self.queues.values().map(|q| q.len()).sum()
    }
}

/// Replay the network for one input vector
pub fn evaluate(plan: &NetworkPlan, input: &[Element]) -> OemsResult<Evaluation> {
    if input.len() != plan.width() {
        return Err(OemsError::InputLength {
            expected: plan.width(),
            actual: input.len(),
        });
    }

    let root = plan.root();
    let mut mail = Mailboxes::default();

    for (index, rank) in root.scatter.iter().enumerate() {
        let [first, second] = RootPlan::scatter_positions(index);
        mail.post(Rank::ROOT, *rank, vec![input[first], input[second]]);
    }
    mail.send_pair(Rank::ROOT, root.outbound(), compare_exchange([input[0], input[1]]));

    let mut pending: Vec<Rank> = plan.entries().map(|(rank, _)| rank).collect();
    loop {
        let before = pending.len();
        let mut waiting = Vec::with_capacity(before);

        for rank in pending {
            let Some(entry) = plan.entry(rank) else {
                continue;
            };
            match mail.try_receive(rank, entry.inbound())? {
                Some(pair) => mail.send_pair(rank, entry.outbound(), compare_exchange(pair)),
                None => waiting.push(rank),
            }
        }

        pending = waiting;
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    if let Some(stuck) = pending.first() {
        return Err(OemsError::InvalidTopology(format!(
            "{} comparator(s) starved, first at rank {}",
            pending.len(),
            stuck
        )));
    }

    let mut output = vec![0; plan.width()];
    for gather in &root.gather {
        let payload = mail
            .take(gather.source, Rank::ROOT, gather.count())?
            .ok_or_else(|| OemsError::InvalidTopology(format!("nothing to gather from {}", gather.source)))?;
        for (position, value) in gather.positions.iter().zip(payload) {
            output[*position] = value;
        }
    }

    if mail.undelivered() > 0 {
        return Err(OemsError::InvalidTopology(format!(
            "{} message(s) never received",
            mail.undelivered()
        )));
    }

    Ok(Evaluation {
        output,
        messages: mail.messages,
        elements: mail.elements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{canonical_plan, generate};
    use proptest::prelude::*;

    fn sorted(input: &[Element]) -> Vec<Element> {
        let mut v = input.to_vec();
        v.sort_unstable();
        v
    }

    /// Every 0-1 input of the width; a network sorting these sorts everything
    fn zero_one_inputs(width: usize) -> impl Iterator<Item = Vec<Element>> {
        (0u32..(1 << width)).map(move |bits| (0..width).map(|i| ((bits >> i) & 1) as Element).collect())
    }

    #[test]
    fn test_canonical_scenarios() {
        let plan = canonical_plan();
        let cases: [([u8; 8], [u8; 8]); 4] = [
            ([5, 2, 8, 1, 9, 3, 7, 4], [1, 2, 3, 4, 5, 7, 8, 9]),
            ([1, 2, 3, 4, 5, 6, 7, 8], [1, 2, 3, 4, 5, 6, 7, 8]),
            ([8, 7, 6, 5, 4, 3, 2, 1], [1, 2, 3, 4, 5, 6, 7, 8]),
            ([4; 8], [4; 8]),
        ];
        for (input, expected) in cases {
            assert_eq!(evaluate(&plan, &input).unwrap().output, expected.to_vec());
        }
    }

    #[test]
    fn test_canonical_zero_one_principle() {
        let plan = canonical_plan();
        for input in zero_one_inputs(8) {
            assert_eq!(evaluate(&plan, &input).unwrap().output, sorted(&input));
        }
    }

    #[test]
    fn test_generated_zero_one_principle() {
        for width in [4, 8, 16] {
            let plan = generate(width).unwrap();
            for input in zero_one_inputs(width) {
                assert_eq!(evaluate(&plan, &input).unwrap().output, sorted(&input), "width {}", width);
            }
        }
    }

    #[test]
    fn test_canonical_message_totals() {
        let eval = evaluate(&canonical_plan(), &[5, 2, 8, 1, 9, 3, 7, 4]).unwrap();
        // 3 scatter + 2 root results + 33 comparator messages (3 of them collapsed)
        assert_eq!(eval.messages, 38);
        // Every participant forwards exactly the two elements it compared
        assert_eq!(eval.elements, 6 + 2 + 18 * 2);
    }

    #[test]
    fn test_rejects_wrong_input_length() {
        let result = evaluate(&canonical_plan(), &[1, 2, 3, 4, 5, 6, 7]);
        assert!(matches!(result, Err(OemsError::InputLength { expected: 8, actual: 7 })));
    }

    proptest! {
        #[test]
        fn prop_canonical_sorts_any_input(input in proptest::array::uniform8(any::<u8>())) {
            let eval = evaluate(&canonical_plan(), &input).unwrap();
            prop_assert_eq!(eval.output, sorted(&input));
        }

        #[test]
        fn prop_generated_thirty_two_sorts(input in proptest::collection::vec(any::<u8>(), 32)) {
            let plan = generate(32).unwrap();
            let eval = evaluate(&plan, &input).unwrap();
            prop_assert_eq!(eval.output, sorted(&input));
        }
    }
}
