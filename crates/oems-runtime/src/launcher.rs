//! Launcher - start every participant at once and wait for the run to end
//!
//! Participants are tokio tasks in a `JoinSet`. The first error aborts all
//! remaining tasks. A configuration error outranks the communication errors
//! it causes in peers whose links it closed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{error, info};

use oems_core::{Element, NetworkConfig, OemsError, OemsResult};
use oems_topology::{canonical_plan, generate, NetworkPlan};
use oems_transport::{Communicator, LocalWorld, TrafficStats};

use crate::{run_participant, Outcome, RootInput};

/// Run configuration
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    /// Participants to launch (default: exactly as many as the plan needs)
    pub participants: Option<usize>,
    /// Give up on the whole run after this long (default: wait forever)
    pub deadline: Option<Duration>,
    pub network: NetworkConfig,
    /// Use the generator even when the canonical table covers the width
    pub generated: bool,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participants(mut self, participants: usize) -> Self {
        self.participants = Some(participants);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn with_generated(mut self, generated: bool) -> Self {
        self.generated = generated;
        self
    }

    /// The network this configuration runs
    pub fn plan(&self) -> OemsResult<NetworkPlan> {
        if self.network.is_canonical() && !self.generated {
            Ok(canonical_plan())
        } else {
            generate(self.network.width)
        }
    }
}

/// Result of a successful run
#[derive(Debug)]
pub struct RunReport {
    pub input: Vec<Element>,
    pub sorted: Vec<Element>,
    pub participants: usize,
    pub stats: Arc<TrafficStats>,
}

/// Starts and supervises the participants of a run
pub struct Launcher {
    config: RunConfig,
    plan: Arc<NetworkPlan>,
}

impl Launcher {
    pub fn new(config: RunConfig) -> OemsResult<Self> {
        let plan = config.plan()?;
        Self::with_plan(config, plan)
    }

    /// Launch a caller-supplied plan instead of the configured one.
    ///
    /// The plan must pass [`NetworkPlan::validate`].
    pub fn with_plan(config: RunConfig, plan: NetworkPlan) -> OemsResult<Self> {
        plan.validate()?;
        Ok(Launcher {
            config,
            plan: Arc::new(plan),
        })
    }

    pub fn plan(&self) -> &NetworkPlan {
        &self.plan
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Participants the run is launched with
    pub fn participants(&self) -> usize {
        self.config
            .participants
            .unwrap_or_else(|| self.plan.required_participants())
    }

    /// In-memory world with a link for each edge of the plan only.
    ///
    /// Ranks beyond the network get endpoints without links.
    pub fn world(&self) -> LocalWorld {
        LocalWorld::with_links(self.participants(), &self.config.network, self.plan.links())
    }

    /// Run over a fresh in-memory world
    pub async fn run(&self, input: Option<RootInput>) -> OemsResult<RunReport> {
        let world = self.world();
        let stats = world.stats();

        let (input, sorted) = self.run_with(world.into_endpoints(), input).await?;
        info!(
            participants = self.participants(),
            messages = stats.total_messages(),
            elements = stats.total_elements(),
            "run finished"
        );

        Ok(RunReport {
            input,
            sorted,
            participants: self.participants(),
            stats,
        })
    }

    /// Run over caller-supplied communicators, one per rank.
    ///
    /// Returns the root's input and sorted output.
    pub async fn run_with<C>(&self, endpoints: Vec<C>, input: Option<RootInput>) -> OemsResult<(Vec<Element>, Vec<Element>)>
    where
        C: Communicator + 'static,
    {
        if !endpoints.iter().any(|comm| comm.rank().is_root()) {
            return Err(OemsError::ParticipantCount {
                required: self.plan.required_participants(),
                actual: endpoints.len(),
            });
        }

        let mut set = JoinSet::new();
        let mut input = input;

        for comm in endpoints {
            let plan = Arc::clone(&self.plan);
            let root_input = if comm.rank().is_root() { input.take() } else { None };
            set.spawn(async move { run_participant(&comm, &plan, root_input.as_ref()).await });
        }

        let finished = match self.config.deadline {
            Some(limit) => tokio::time::timeout(limit, supervise(&mut set)).await.ok(),
            None => Some(supervise(&mut set).await),
        };

        match finished {
            Some(result) => result,
            None => {
                set.abort_all();
                error!(category = OemsError::DeadlineExceeded.category().name(), "run exceeded its deadline");
                Err(OemsError::DeadlineExceeded)
            }
        }
    }
}

/// Drain the set, aborting everything on the first failure
async fn supervise(set: &mut JoinSet<OemsResult<Outcome>>) -> OemsResult<(Vec<Element>, Vec<Element>)> {
    let mut sorted = None;
    let mut failure: Option<OemsError> = None;

    while let Some(joined) = set.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => continue,
            Err(e) => Err(OemsError::Aborted(format!("participant panicked: {}", e))),
        };

        match result {
            Ok(Outcome::Sorted { input, output }) => sorted = Some((input, output)),
            Ok(_) => {}
            Err(err) => {
                if failure.is_none() {
                    error!(category = err.category().name(), %err, "aborting run");
                    set.abort_all();
                }
                failure = Some(match failure.take() {
                    Some(first) if first.is_config() || !err.is_config() => first,
                    _ => err,
                });
            }
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }
    sorted.ok_or_else(|| OemsError::Aborted("no root participant".to_string()))
}
