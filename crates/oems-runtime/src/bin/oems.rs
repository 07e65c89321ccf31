//! OEMS CLI
//!
//! Sort the first line of a file through a message-passing odd-even merge
//! sorting network.
//!
//! # Example
//!
//! ```bash
//! # Canonical 8-wide network, one sorted value per line
//! printf 'hgfedcba\n' > numbers
//! oems numbers
//!
//! # Generated 16-wide network, everything on one line
//! oems --width 16 --separator space numbers16
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use oems_core::{NetworkConfig, OemsResult, CANONICAL_WIDTH};
use oems_runtime::{init_logging, Launcher, OutputFormat, RootInput, RunConfig, RunReport, Separator};

/// Odd-even merge sorting network
///
/// Launches one participant per comparator (plus the root) and sorts the
/// input through point-to-point messages only.
#[derive(Parser, Debug)]
#[command(name = "oems")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file; its first line holds the values as raw bytes
    input: Option<PathBuf>,

    /// Number of values to sort (a power of two, at least 4)
    #[arg(short = 'n', long, default_value_t = CANONICAL_WIDTH)]
    width: usize,

    /// Derive the network programmatically even for the canonical width
    #[arg(long)]
    generated: bool,

    /// Participants to launch. Defaults to exactly as many as the network needs
    #[arg(short = 'p', long)]
    participants: Option<usize>,

    /// Separator for the sorted values
    #[arg(long, value_enum, default_value_t = Separator::Newline)]
    separator: Separator,

    /// Do not print the unsorted input first
    #[arg(long)]
    no_echo: bool,

    /// Abort the run after this many milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Buffered messages per link
    #[arg(long, default_value_t = 4)]
    link_capacity: usize,

    /// Debug logging for the oems crates (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn run_config(&self) -> RunConfig {
        let network = NetworkConfig::new()
            .with_width(self.width)
            .with_link_capacity(self.link_capacity);

        let mut config = RunConfig::new().with_network(network).with_generated(self.generated);
        if let Some(participants) = self.participants {
            config = config.with_participants(participants);
        }
        if let Some(ms) = self.deadline_ms {
            config = config.with_deadline(Duration::from_millis(ms));
        }
        config
    }

    fn output_format(&self) -> OutputFormat {
        OutputFormat::new()
            .with_separator(self.separator)
            .with_echo(!self.no_echo)
    }
}

async fn run(args: &Args) -> OemsResult<RunReport> {
    let launcher = Launcher::new(args.run_config())?;
    info!(
        width = launcher.plan().width(),
        participants = launcher.participants(),
        "starting run"
    );
    launcher.run(args.input.clone().map(RootInput::File)).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args).await {
        Ok(report) => {
            let text = args.output_format().render(&report.input, &report.sorted);
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
                eprintln!("Failed to write output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(err.category().exit_code())
        }
    }
}
