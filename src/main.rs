use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use langton::analysis::{heading_counts, visit_histogram};
use langton::{AntConfig, Color, Fill, Heading, Rule, Simulation, StepOutcome, Termination, render};

/// Run one Langton's ant and save PNG diagnostics.
#[derive(Parser)]
#[command(name = "langton")]
struct Cli {
    /// white_right or white_left
    #[arg(long, default_value = "white_right")]
    rule: Rule,
    /// Plate side length
    #[arg(long, default_value_t = 400)]
    edge: usize,
    #[arg(long, default_value_t = 15_000)]
    steps: usize,
    /// Color forced onto the starting cell (white or black)
    #[arg(long, default_value = "white")]
    start_color: Color,
    /// Starting heading: N, E, S or O
    #[arg(long, default_value = "N")]
    look: Heading,
    /// Starting row (defaults to the center)
    #[arg(long, requires = "origin_col", allow_hyphen_values = true)]
    origin_row: Option<i64>,
    /// Starting column (defaults to the center)
    #[arg(long, requires = "origin_row", allow_hyphen_values = true)]
    origin_col: Option<i64>,
    /// Initial plate: 0, 1 or rand
    #[arg(long, default_value = "0")]
    fill: Fill,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Wrap around the edges instead of stopping
    #[arg(long)]
    trap: bool,
    #[arg(long, default_value = "artifacts")]
    out_dir: PathBuf,
    /// Pixels per cell in plate images, reduced until the image fits
    #[arg(long, default_value_t = 2)]
    scale: usize,
    /// Also save a plate frame every N steps
    #[arg(long)]
    every: Option<usize>,
}

impl Cli {
    fn config(&self) -> AntConfig {
        AntConfig {
            rule: self.rule,
            edge: self.edge,
            steps: self.steps,
            start_color: self.start_color,
            look: self.look,
            origin: self.origin_row.zip(self.origin_col),
            fill: self.fill,
            trap: self.trap,
            seed: self.seed,
        }
    }
}

fn save(dir: &Path, name: &str, rgba: &[u8], w: usize, h: usize) -> Result<()> {
    let path = dir.join(name);
    image::save_buffer(&path, rgba, w as u32, h as u32, image::ColorType::Rgba8)
        .with_context(|| format!("failed to save {}", path.display()))?;
    info!("saved {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    let config = cli.config();
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    info!(
        edge = config.edge,
        steps = config.steps,
        rule = %config.rule,
        fill = %config.fill,
        trap = config.trap,
        "running ant"
    );

    config.validate()?;
    let edge = config.edge;
    let scale = render::fit_scale(edge, cli.scale);
    if scale != cli.scale {
        warn!(requested = cli.scale, scale, "plate image scale reduced to fit");
    }
    let px = render::scaled_edge(edge, scale)?;

    let run = match cli.every.filter(|&n| n > 0) {
        // Frame capture needs single stepping, so drive the loop from here.
        Some(every) => {
            let mut sim = Simulation::new(config)?;
            while sim.step() == StepOutcome::Moved {
                if sim.steps_taken() % every == 0 {
                    let ant = sim.ant();
                    let rgba = render::render_plate(
                        sim.plate(),
                        Some((ant.row as usize, ant.col as usize, ant.heading)),
                        scale,
                    );
                    let name = format!("frame_{:08}.png", sim.steps_taken());
                    save(&cli.out_dir, &name, &rgba, px, px)?;
                }
            }
            sim.run()
        }
        None => {
            let (run, timings) = langton::simulate(&config)?;
            info!("timings:");
            for t in &timings {
                info!("  {:20} {:8.1} ms", t.name, t.ms);
            }
            run
        }
    };

    match run.termination {
        Termination::Completed => info!(steps = run.steps_taken, "completed"),
        Termination::OutOfBounds { step, row, col } => {
            info!(step, row, col, "stopped early: the ant is out of frame")
        }
    }

    // 1. Final plate with the ant
    let ant = (run.ant.row as usize, run.ant.col as usize, run.ant.heading);
    let plate_rgba = render::render_plate(&run.plate, Some(ant), scale);
    save(&cli.out_dir, "plate.png", &plate_rgba, px, px)?;

    // 2. Visit frequency
    let visits = visit_histogram(&run.history, edge);
    let visits_rgba = render::upscale(&render::render_visits(&visits), edge, edge, scale);
    save(&cli.out_dir, "visits.png", &visits_rgba, px, px)?;

    // 3. White/black balance over time
    let (cw, ch) = (1200, 600);
    save(
        &cli.out_dir,
        "fractions.png",
        &render::render_fractions(&run.history, cw, ch),
        cw,
        ch,
    )?;

    // 4. Heading distribution
    let counts = heading_counts(&run.history);
    info!(
        n = counts.north,
        e = counts.east,
        s = counts.south,
        o = counts.west,
        "heading counts"
    );
    save(
        &cli.out_dir,
        "headings.png",
        &render::render_headings(&counts, 400, 300),
        400,
        300,
    )?;

    info!("done");
    Ok(())
}
