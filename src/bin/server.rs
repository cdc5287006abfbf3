use std::net::SocketAddr;

use anyhow::Context;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use langton::analysis::{HeadingCounts, heading_counts, visit_histogram};
use langton::{AntConfig, Color, Fill, Heading, Record, Rule, Termination, render};

#[derive(Deserialize)]
struct SimulateRequest {
    rule: Option<Rule>,
    edge: Option<usize>,
    steps: Option<usize>,
    start_color: Option<Color>,
    look: Option<Heading>,
    origin: Option<(i64, i64)>,
    fill: Option<Fill>,
    trap: Option<bool>,
    seed: Option<u64>,
    // Presentation
    scale: Option<usize>,
    include_history: Option<bool>,
}

#[derive(Serialize)]
struct SimulateResponse {
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
    edge: usize,
    steps_taken: usize,
    termination: Termination,
    headings: HeadingCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<Vec<Record>>,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

type ApiError = (StatusCode, String);

fn internal(err: anyhow::Error) -> ApiError {
    warn!(error = %err, "simulate failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder
        .write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)
        .context("PNG encode failed")?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn build_response(
    config: AntConfig,
    scale: usize,
    include_history: bool,
) -> anyhow::Result<SimulateResponse> {
    let (run, timings) = langton::simulate(&config)?;
    let edge = config.edge;
    let px = render::scaled_edge(edge, scale)?;

    let ant = (run.ant.row as usize, run.ant.col as usize, run.ant.heading);
    let plate = render::render_plate(&run.plate, Some(ant), scale);
    let visits = visit_histogram(&run.history, edge);
    let visits = render::upscale(&render::render_visits(&visits), edge, edge, scale);
    let headings = heading_counts(&run.history);

    let layers = vec![
        Layer {
            name: "plate".into(),
            data_url: encode_png(&plate, px, px)?,
        },
        Layer {
            name: "visits".into(),
            data_url: encode_png(&visits, px, px)?,
        },
        Layer {
            name: "fractions".into(),
            data_url: encode_png(&render::render_fractions(&run.history, 800, 400), 800, 400)?,
        },
        Layer {
            name: "headings".into(),
            data_url: encode_png(&render::render_headings(&headings, 400, 300), 400, 300)?,
        },
    ];

    let timing_entries = timings
        .iter()
        .map(|t| TimingEntry {
            name: t.name.to_string(),
            ms: t.ms,
        })
        .collect();

    Ok(SimulateResponse {
        layers,
        timings: timing_entries,
        edge,
        steps_taken: run.steps_taken,
        termination: run.termination,
        headings,
        history: include_history.then(|| run.history.records().to_vec()),
    })
}

fn bad_request(err: langton::Error) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

/// Config, plate scale and history flag for a request, or a 400.
fn parse_request(req: SimulateRequest) -> Result<(AntConfig, usize, bool), ApiError> {
    let defaults = AntConfig::default();
    let config = AntConfig {
        rule: req.rule.unwrap_or(defaults.rule),
        edge: req.edge.unwrap_or(200),
        steps: req.steps.unwrap_or(11_000),
        start_color: req.start_color.unwrap_or(defaults.start_color),
        look: req.look.unwrap_or(defaults.look),
        origin: req.origin.or(defaults.origin),
        fill: req.fill.unwrap_or(defaults.fill),
        trap: req.trap.unwrap_or(defaults.trap),
        seed: req.seed.unwrap_or(defaults.seed),
    };
    config.validate().map_err(bad_request)?;

    // An explicit scale must fit; the default shrinks to fit large plates.
    let scale = match req.scale {
        Some(scale) => {
            render::scaled_edge(config.edge, scale).map_err(bad_request)?;
            scale
        }
        None => render::fit_scale(config.edge, 2),
    };
    Ok((config, scale, req.include_history.unwrap_or(false)))
}

async fn simulate_handler(
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    // Reject bad configs before handing work to the blocking pool.
    let (config, scale, include_history) = parse_request(req)?;

    info!(edge = config.edge, steps = config.steps, rule = %config.rule, scale, "simulate");

    let response =
        tokio::task::spawn_blocking(move || build_response(config, scale, include_history))
            .await
            .map_err(|e| internal(e.into()))?
            .map_err(internal)?;

    Ok(Json(response))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/simulate", post(simulate_handler))
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("langton server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
