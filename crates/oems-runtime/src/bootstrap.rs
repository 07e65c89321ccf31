//! Participant bootstrap - pick a role from the rank and play it once

use std::path::PathBuf;

use tracing::{info, warn};

use oems_core::{Element, OemsError, OemsResult};
use oems_topology::NetworkPlan;
use oems_transport::Communicator;

use crate::{load_elements, ComparatorNode, RootOrchestrator};

/// Where the root takes its elements from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootInput {
    /// First line of a file, raw bytes
    File(PathBuf),
    /// Elements already in memory
    Elements(Vec<Element>),
}

/// What a participant did during the run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Root: the loaded input and the gathered result
    Sorted { input: Vec<Element>, output: Vec<Element> },
    /// Comparator: the `[low, high]` pair it forwarded
    Compared([Element; 2]),
    /// Rank beyond the network, nothing to do
    Idle,
}

/// Run one participant to completion.
///
/// The root checks the participant count before anything else, then loads
/// its input; neither check puts a message on the wire when it fails.
pub async fn run_participant<C: Communicator + ?Sized>(
    comm: &C,
    plan: &NetworkPlan,
    input: Option<&RootInput>,
) -> OemsResult<Outcome> {
    let rank = comm.rank();

    if rank.is_root() {
        let required = plan.required_participants();
        if comm.size() < required {
            return Err(OemsError::ParticipantCount {
                required,
                actual: comm.size(),
            });
        }

        let elements = match input.ok_or(OemsError::MissingArgument("input file"))? {
            RootInput::File(path) => load_elements(path, plan.width())?,
            RootInput::Elements(elements) if elements.len() == plan.width() => elements.clone(),
            RootInput::Elements(elements) => {
                return Err(OemsError::InputLength {
                    expected: plan.width(),
                    actual: elements.len(),
                })
            }
        };

        info!(width = plan.width(), participants = comm.size(), "sorting");
        let output = RootOrchestrator::new(comm, plan).run(&elements).await?;
        info!("sort complete");

        return Ok(Outcome::Sorted {
            input: elements,
            output,
        });
    }

    match plan.entry(rank) {
        Some(entry) => {
            let mut node = ComparatorNode::new(comm, *entry);
            Ok(Outcome::Compared(node.run().await?))
        }
        None => {
            warn!(%rank, required = plan.required_participants(), "rank not part of the network, idle");
            Ok(Outcome::Idle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oems_core::{NetworkConfig, Rank};
    use oems_topology::canonical_plan;
    use oems_transport::LocalWorld;

    #[tokio::test]
    async fn test_root_checks_count_first() {
        let world = LocalWorld::new(18, &NetworkConfig::default());
        let stats = world.stats();
        let endpoints = world.into_endpoints();

        // Even a missing input is reported after the count
        let err = run_participant(&endpoints[0], &canonical_plan(), None).await.unwrap_err();
        assert!(matches!(err, OemsError::ParticipantCount { required: 19, actual: 18 }));
        assert_eq!(stats.total_messages(), 0);
    }

    #[tokio::test]
    async fn test_root_requires_input() {
        let endpoints = LocalWorld::new(19, &NetworkConfig::default()).into_endpoints();
        let err = run_participant(&endpoints[0], &canonical_plan(), None).await.unwrap_err();
        assert!(matches!(err, OemsError::MissingArgument(_)));
    }

    #[tokio::test]
    async fn test_extra_rank_is_idle() {
        let endpoints = LocalWorld::new(21, &NetworkConfig::default()).into_endpoints();
        let outcome = run_participant(&endpoints[20], &canonical_plan(), None).await.unwrap();
        assert_eq!(outcome, Outcome::Idle);
        assert_eq!(endpoints[20].rank(), Rank(20));
    }
}
