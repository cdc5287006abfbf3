pub mod analysis;
pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod render;
pub mod rng;
pub mod rule;
pub mod sim;

use std::time::Instant;

pub use config::{AntConfig, Fill};
pub use error::{Error, Result};
pub use grid::{Color, Grid, Snapshot};
pub use history::{History, Record};
pub use rule::{Ant, Heading, Rule};
pub use sim::{Run, Simulation, StepOutcome, Termination};

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Build the plate and walk the ant to the end of its run.
pub fn simulate(config: &AntConfig) -> Result<(Run, Vec<Timing>)> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Fill plate, place ant, record the starting state
    let t = Instant::now();
    let sim = Simulation::new(config.clone())?;
    timings.push(Timing {
        name: "init",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Step loop
    let t = Instant::now();
    let run = sim.run();
    timings.push(Timing {
        name: "walk",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    Ok((run, timings))
}
