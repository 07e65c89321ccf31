//! End-to-end Integration Test Suite
//!
//! Full runs of the launcher over plain and chaotic transports:
//! - The concrete scenarios and both configuration gates
//! - Conservation of elements through every participant
//! - Generated networks of other widths
//! - Abort on a severed link

use oems_core::{Element, OemsResult};
use oems_runtime::{Launcher, RootInput, RunConfig, RunReport};

use crate::chaos::{chaos_world, ChaosConfig};

/// Run one input with chaos applied to every participant
pub async fn run_with_chaos(config: RunConfig, chaos: ChaosConfig, input: Vec<Element>) -> OemsResult<RunReport> {
    let launcher = Launcher::new(config)?;
    let (endpoints, stats) = chaos_world(launcher.participants(), &launcher.config().network, chaos);

    let (input, sorted) = launcher
        .run_with(endpoints, Some(RootInput::Elements(input)))
        .await?;

    Ok(RunReport {
        input,
        sorted,
        participants: launcher.participants(),
        stats,
    })
}
