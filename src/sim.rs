use serde::Serialize;
use tracing::{debug, info};

use crate::config::{AntConfig, Fill};
use crate::error::Result;
use crate::grid::{Census, Color, Grid, in_bounds, wrap};
use crate::history::{History, Record};
use crate::rng::seed_u32;
use crate::rule::Ant;

const SALT_FILL: u64 = 0x1A27_0F11_CAFE_0001;

/// Cap on up-front history allocation; longer runs grow the vec as usual.
const MAX_PREALLOC: usize = 1 << 20;

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// All requested steps were taken.
    Completed,
    /// Hard-edge mode only: step `step` (1-based) carried the ant to
    /// `(row, col)`, off the plate. That step flipped its cell but was not recorded.
    OutOfBounds { step: usize, row: i64, col: i64 },
}

/// Result of a single `Simulation::step` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The ant moved and a record was appended.
    Moved,
    /// The ant left the plate. Nothing was recorded and the run is over.
    Escaped,
    /// The run had already ended; nothing happened.
    Finished,
}

/// A finished run: trajectory plus final plate.
#[derive(Clone, Debug)]
pub struct Run {
    pub history: History,
    pub plate: Grid<Color>,
    /// Last recorded ant state. After an escape, this is the state before the escaping step.
    pub ant: Ant,
    pub steps_taken: usize,
    pub termination: Termination,
}

impl Run {
    pub fn escaped(&self) -> bool {
        matches!(self.termination, Termination::OutOfBounds { .. })
    }
}

/// Single-ant driver. Owns the plate for the lifetime of the run.
pub struct Simulation {
    config: AntConfig,
    plate: Grid<Color>,
    census: Census,
    ant: Ant,
    history: History,
    steps_taken: usize,
    termination: Option<Termination>,
}

impl Simulation {
    pub fn new(config: AntConfig) -> Result<Self> {
        config.validate()?;
        let edge = config.edge;

        let mut plate = match config.fill {
            Fill::White => Grid::filled(edge, Color::White),
            Fill::Black => Grid::filled(edge, Color::Black),
            Fill::Random => Grid::random(edge, seed_u32(config.seed, SALT_FILL)),
        };

        let (row, col) = config.start();
        plate.set(row, col, config.start_color);
        let census = plate.census();

        debug!(
            edge,
            rule = %config.rule,
            fill = %config.fill,
            row,
            col,
            look = %config.look,
            trap = config.trap,
            "plate initialised"
        );

        let ant = Ant {
            row: row as i64,
            col: col as i64,
            heading: config.look,
        };
        let mut history = History::with_capacity(config.steps.saturating_add(1).min(MAX_PREALLOC));
        history.push(record(ant, census));

        Ok(Self {
            config,
            plate,
            census,
            ant,
            history,
            steps_taken: 0,
            termination: None,
        })
    }

    /// Take one step: transition, boundary policy, then record.
    pub fn step(&mut self) -> StepOutcome {
        if self.termination.is_some() {
            return StepOutcome::Finished;
        }
        if self.steps_taken >= self.config.steps {
            self.termination = Some(Termination::Completed);
            return StepOutcome::Finished;
        }

        let edge = self.config.edge;
        let prior = self.plate.get(self.ant.row as usize, self.ant.col as usize);
        let mut next = self.config.rule.apply(&mut self.plate, self.ant);
        self.census.flip(prior);
        self.steps_taken += 1;

        if self.config.trap {
            next.row = wrap(next.row, edge);
            next.col = wrap(next.col, edge);
        } else if !in_bounds(next.row, next.col, edge) {
            info!(
                step = self.steps_taken,
                row = next.row,
                col = next.col,
                "ant left the plate"
            );
            self.termination = Some(Termination::OutOfBounds {
                step: self.steps_taken,
                row: next.row,
                col: next.col,
            });
            return StepOutcome::Escaped;
        }

        self.ant = next;
        self.history.push(record(next, self.census));
        if self.steps_taken == self.config.steps {
            self.termination = Some(Termination::Completed);
        }
        StepOutcome::Moved
    }

    /// Step until the budget is spent or the ant escapes.
    pub fn run(mut self) -> Run {
        while self.step() == StepOutcome::Moved {}
        let termination = self.termination.unwrap_or(Termination::Completed);

        debug!(
            steps = self.steps_taken,
            records = self.history.len(),
            ?termination,
            "run finished"
        );

        Run {
            history: self.history,
            plate: self.plate,
            ant: self.ant,
            steps_taken: self.steps_taken,
            termination,
        }
    }

    pub fn config(&self) -> &AntConfig {
        &self.config
    }

    pub fn plate(&self) -> &Grid<Color> {
        &self.plate
    }

    pub fn ant(&self) -> Ant {
        self.ant
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn census(&self) -> Census {
        self.census
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// `None` while steps remain.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }
}

fn record(ant: Ant, census: Census) -> Record {
    let (white, black) = census.fractions();
    Record {
        row: ant.row as usize,
        col: ant.col as usize,
        heading: ant.heading,
        white,
        black,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rule::{Heading, Rule};

    #[test]
    fn invalid_config_is_rejected() {
        let err = Simulation::new(AntConfig::new(Rule::WhiteRight, 0, 5)).err();
        assert_eq!(err, Some(Error::EmptyPlate));
    }

    #[test]
    fn start_color_overrides_fill() {
        let cfg = AntConfig {
            start_color: Color::Black,
            ..AntConfig::new(Rule::WhiteRight, 4, 0)
        };
        let sim = Simulation::new(cfg).unwrap();
        assert_eq!(sim.plate().get(2, 2), Color::Black);
        assert_eq!(sim.history()[0].black, 1.0 / 16.0);

        let cfg = AntConfig {
            fill: Fill::Black,
            ..AntConfig::new(Rule::WhiteRight, 4, 0)
        };
        let sim = Simulation::new(cfg).unwrap();
        assert_eq!(sim.plate().get(2, 2), Color::White);
        assert_eq!(sim.census(), Census { white: 1, black: 15 });
    }

    #[test]
    fn zero_steps_records_only_the_start() {
        let run = Simulation::new(AntConfig::new(Rule::WhiteRight, 6, 0))
            .unwrap()
            .run();
        assert_eq!(run.history.len(), 1);
        assert_eq!(run.steps_taken, 0);
        assert_eq!(run.termination, Termination::Completed);
    }

    #[test]
    fn census_matches_full_rescan() {
        let cfg = AntConfig {
            fill: Fill::Random,
            trap: true,
            seed: 3,
            ..AntConfig::new(Rule::WhiteRight, 16, 500)
        };
        let mut sim = Simulation::new(cfg).unwrap();
        while sim.step() == StepOutcome::Moved {
            assert_eq!(sim.census(), sim.plate().census());
        }
    }

    #[test]
    fn escape_is_reported_once() {
        // 1x1 plate: the first step always leaves it
        let mut sim = Simulation::new(AntConfig::new(Rule::WhiteRight, 1, 10)).unwrap();
        assert_eq!(sim.step(), StepOutcome::Escaped);
        assert_eq!(sim.step(), StepOutcome::Finished);
        assert_eq!(
            sim.termination(),
            Some(Termination::OutOfBounds { step: 1, row: 0, col: 1 })
        );
        let run = sim.run();
        assert_eq!(run.history.len(), 1);
        assert!(run.escaped());
        // the escaping step still flipped its cell
        assert_eq!(run.plate.get(0, 0), Color::Black);
        assert_eq!(run.ant.heading, Heading::North);
    }

    #[test]
    fn trap_wraps_at_every_edge() {
        let cfg = AntConfig {
            trap: true,
            ..AntConfig::new(Rule::WhiteRight, 1, 8)
        };
        let run = Simulation::new(cfg).unwrap().run();
        assert_eq!(run.history.len(), 9);
        assert!(run.history.iter().all(|r| r.row == 0 && r.col == 0));
        assert_eq!(run.termination, Termination::Completed);
    }

    #[test]
    fn termination_is_set_when_budget_is_spent() {
        let mut sim = Simulation::new(AntConfig::new(Rule::WhiteRight, 10, 2)).unwrap();
        assert_eq!(sim.step(), StepOutcome::Moved);
        assert_eq!(sim.termination(), None);
        assert_eq!(sim.step(), StepOutcome::Moved);
        assert_eq!(sim.termination(), Some(Termination::Completed));
        assert_eq!(sim.step(), StepOutcome::Finished);
        assert_eq!(sim.steps_taken(), 2);
    }
}
