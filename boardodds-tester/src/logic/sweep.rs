use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use boardodds_game::{DeparturePolicy, OddsEngine, Query, Stopping};
use serde::Serialize;

use super::simulation::{CrossCheck, SquareOdds, cross_check};

/// Monte-Carlo settings for cross-checking each sweep entry.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub rounds: u64,
    pub seed: u64,
    pub tolerance: f64,
}

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub sides: Vec<u32>,
    pub top_k: usize,
    pub stopping: Stopping,
    pub departure: DeparturePolicy,
    pub simulation: Option<SimulationConfig>,
}

/// Outcome of analysing one die size.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub sides: u32,
    pub encoded: String,
    pub top: Vec<SquareOdds>,
    pub turns_run: u32,
    pub converged: bool,
    pub last_delta: f64,
    pub fingerprint: String,
    pub duration: Duration,
    pub cross_check: Option<CrossCheck>,
}

impl SweepResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.cross_check.as_ref().is_none_or(|check| check.passed)
    }
}

/// Analyse every requested die size independently.
pub fn run_sweep(engine: &OddsEngine, config: &SweepConfig) -> Result<Vec<SweepResult>> {
    let layout = engine.rules().layout();
    config
        .sides
        .iter()
        .map(|&sides| -> Result<SweepResult> {
            let started = Instant::now();
            let query = Query::new(sides)
                .with_top_k(config.top_k)
                .with_stopping(config.stopping)
                .with_departure(config.departure);
            let analysis = engine
                .analyze(&query)
                .with_context(|| format!("analysis failed for {sides}-sided dice"))?;
            let cross_check = config
                .simulation
                .map(|sim| {
                    cross_check(
                        engine.rules(),
                        &analysis,
                        sim.rounds,
                        sim.seed,
                        sim.tolerance,
                    )
                })
                .transpose()
                .with_context(|| format!("simulation failed for {sides}-sided dice"))?;
            let top = analysis
                .ranked
                .iter()
                .map(|square| SquareOdds {
                    index: square.index,
                    label: layout.label(square.index).to_string(),
                    probability: square.probability,
                })
                .collect();
            Ok(SweepResult {
                sides,
                encoded: analysis.encoded,
                top,
                turns_run: analysis.turns_run,
                converged: analysis.converged,
                last_delta: analysis.last_delta,
                fingerprint: format!("{:016x}", analysis.matrix_fingerprint),
                duration: started.elapsed(),
                cross_check,
            })
        })
        .collect()
}
