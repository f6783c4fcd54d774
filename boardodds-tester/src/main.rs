mod common;
mod logic;

use anyhow::{Context, Result};
use boardodds_game::{
    DEFAULT_TOP_K, DEFAULT_TURNS, DeparturePolicy, OddsEngine, SquareRule,
    StandardBoard, Stopping,
};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::parse_sides;
use logic::{FileBoard, SimulationConfig, SweepConfig, SweepResult, run_sweep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Departure {
    /// Every turn starts with a dice roll
    Roll,
    /// Turns starting on a card square draw a card instead of rolling
    Deck,
}

impl From<Departure> for DeparturePolicy {
    fn from(value: Departure) -> Self {
        match value {
            Departure::Roll => Self::RollDice,
            Departure::Deck => Self::ResolveDeck,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "boardodds-tester", version = "0.1.0")]
#[command(about = "Long-run square occupancy for cyclic dice boards, with Monte-Carlo cross-checks")]
struct Args {
    /// Die face counts to analyse (comma-separated, ranges like 4-8 allowed)
    #[arg(long, default_value = "6")]
    sides: String,

    /// Number of top squares to report
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top: usize,

    /// Turns of power iteration (the cap when --tolerance is given)
    #[arg(long, default_value_t = DEFAULT_TURNS)]
    turns: u32,

    /// Iterate until the L1 change per turn drops below this value
    #[arg(long)]
    tolerance: Option<f64>,

    /// How turns starting on card squares are modelled
    #[arg(long, value_enum, default_value_t = Departure::Roll)]
    departure: Departure,

    /// JSON board description to use instead of the reference board
    #[arg(long)]
    board: Option<PathBuf>,

    /// Print the resolved rule of every square and exit
    #[arg(long)]
    list_board: bool,

    /// Monte-Carlo rounds per die size for cross-checking (0 disables)
    #[arg(long, default_value_t = 0)]
    simulate: u64,

    /// Seed for the Monte-Carlo simulator
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Largest per-square difference tolerated between simulation and analysis
    #[arg(long, default_value_t = 0.005)]
    sim_tolerance: f64,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let engine = load_engine(&args)?;
    if maybe_list_board(&args, &engine)? {
        return Ok(());
    }

    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let config = sweep_config(&args)?;
    let results = run_sweep(&engine, &config)?;
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn load_engine(args: &Args) -> Result<OddsEngine> {
    match &args.board {
        Some(path) => OddsEngine::from_source(&FileBoard::new(path))
            .with_context(|| format!("loading board from {}", path.display())),
        None => OddsEngine::from_source(&StandardBoard),
    }
}

fn maybe_list_board(args: &Args, engine: &OddsEngine) -> Result<bool> {
    if !args.list_board {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let layout = engine.rules().layout();
    writeln!(output_target.writer(), "Board squares:")?;
    for (square, rule) in engine.rules().iter() {
        let description = match rule {
            SquareRule::Plain => String::from("plain"),
            SquareRule::DirectJump { target } => format!("jump to {target:02}"),
            SquareRule::Deck { deck, outcomes } => {
                let targets: Vec<_> = outcomes
                    .iter()
                    .map(|o| {
                        let to = o.destination.resolve(square);
                        format!("{}/{}→{to:02}", o.cards, o.deck_size)
                    })
                    .collect();
                format!("{deck} [{}]", targets.join(", "))
            }
        };
        writeln!(
            output_target.writer(),
            "  {square:02} {:5} - {description}",
            layout.label(square)
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎲 Boardodds Occupancy Tester".bright_cyan().bold());
    println!("{}", "==============================".cyan());
}

fn sweep_config(args: &Args) -> Result<SweepConfig> {
    let stopping = match args.tolerance {
        Some(tolerance) => Stopping::Converged {
            tolerance,
            max_turns: args.turns,
        },
        None => Stopping::Fixed { turns: args.turns },
    };
    let simulation = (args.simulate > 0).then_some(SimulationConfig {
        rounds: args.simulate,
        seed: args.seed,
        tolerance: args.sim_tolerance,
    });
    Ok(SweepConfig {
        sides: parse_sides(&args.sides)?,
        top_k: args.top,
        stopping,
        departure: args.departure.into(),
        simulation,
    })
}

fn write_reports(args: &Args, results: &[SweepResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, results)?,
        _ => {
            let duration = start_time.elapsed();
            logic::reports::generate_console_report(&mut output_target, results, duration)?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
