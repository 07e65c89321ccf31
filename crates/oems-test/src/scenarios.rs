//! Sorting scenarios and seeded soak runs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use oems_core::{Element, OemsResult};
use oems_runtime::{Launcher, RootInput, RunConfig};

/// One input with its known sorted output
#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: &'static str,
    pub input: Vec<Element>,
    pub expected: Vec<Element>,
}

impl Scenario {
    pub fn new(name: &'static str, input: &[Element], expected: &[Element]) -> Self {
        Scenario {
            name,
            input: input.to_vec(),
            expected: expected.to_vec(),
        }
    }
}

/// The concrete 8-element scenarios
pub fn canonical_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("mixed", &[5, 2, 8, 1, 9, 3, 7, 4], &[1, 2, 3, 4, 5, 7, 8, 9]),
        Scenario::new("already sorted", &[1, 2, 3, 4, 5, 6, 7, 8], &[1, 2, 3, 4, 5, 6, 7, 8]),
        Scenario::new("reverse sorted", &[8, 7, 6, 5, 4, 3, 2, 1], &[1, 2, 3, 4, 5, 6, 7, 8]),
        Scenario::new("all equal", &[4; 8], &[4; 8]),
    ]
}

/// Outcome of one scenario run
#[derive(Clone, Debug)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub output: Vec<Element>,
    pub messages: u64,
    pub passed: bool,
}

/// Run a scenario through a fresh in-memory world
pub async fn run_scenario(launcher: &Launcher, scenario: &Scenario) -> OemsResult<ScenarioResult> {
    let report = launcher
        .run(Some(RootInput::Elements(scenario.input.clone())))
        .await?;

    Ok(ScenarioResult {
        name: scenario.name,
        passed: report.sorted == scenario.expected,
        messages: report.stats.total_messages(),
        output: report.sorted,
    })
}

/// Non-decreasing order
pub fn is_sorted(values: &[Element]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Same values with the same multiplicities
pub fn same_multiset(a: &[Element], b: &[Element]) -> bool {
    let mut counts = [0i32; 256];
    for &v in a {
        counts[v as usize] += 1;
    }
    for &v in b {
        counts[v as usize] -= 1;
    }
    a.len() == b.len() && counts.iter().all(|&c| c == 0)
}

/// Uniformly random elements
pub fn random_input(rng: &mut StdRng, width: usize) -> Vec<Element> {
    (0..width).map(|_| rng.gen()).collect()
}

/// Summary of a soak run
#[derive(Clone, Debug, Default)]
pub struct SoakReport {
    pub runs: usize,
    pub messages: u64,
    /// Inputs that came back unsorted or with different values
    pub failures: Vec<(Vec<Element>, Vec<Element>)>,
}

impl SoakReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sort `runs` random inputs, each through its own world
pub async fn soak(config: RunConfig, seed: u64, runs: usize) -> OemsResult<SoakReport> {
    let launcher = Launcher::new(config)?;
    let width = launcher.plan().width();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut report = SoakReport::default();

    for _ in 0..runs {
        let input = random_input(&mut rng, width);
        let run = launcher.run(Some(RootInput::Elements(input.clone()))).await?;

        report.runs += 1;
        report.messages += run.stats.total_messages();
        if !is_sorted(&run.sorted) || !same_multiset(&input, &run.sorted) {
            report.failures.push((input, run.sorted));
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers() {
        assert!(is_sorted(&[1, 1, 2, 255]));
        assert!(!is_sorted(&[2, 1]));
        assert!(same_multiset(&[3, 1, 3], &[1, 3, 3]));
        assert!(!same_multiset(&[3, 1, 3], &[1, 1, 3]));
        assert!(!same_multiset(&[1], &[1, 1]));
    }

    #[test]
    fn test_scenario_table() {
        for scenario in canonical_scenarios() {
            assert_eq!(scenario.input.len(), 8);
            assert!(is_sorted(&scenario.expected), "{}", scenario.name);
            assert!(same_multiset(&scenario.input, &scenario.expected), "{}", scenario.name);
        }
    }

    #[test]
    fn test_random_input_is_seeded() {
        let a = random_input(&mut StdRng::seed_from_u64(7), 16);
        let b = random_input(&mut StdRng::seed_from_u64(7), 16);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }
}
