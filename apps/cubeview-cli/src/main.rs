use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use cubeview_common::{Extent, ViewerConfig};
use cubeview_frame::{
    BackingBuffer, Clock, Frame, FrameOutcome, FrameScheduler, FrameStats, ManualClock,
    ProjectionCamera,
};
use cubeview_render::{HeadlessTarget, OrbitControls, PerspectiveCamera, Scene};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubeview-cli", about = "CLI tool for cubeview operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Drive the frame loop headlessly with a simulated clock
    Simulate {
        /// Simulated time span
        #[arg(long, default_value = "1000")]
        duration_ms: f64,
        /// Base spacing of animation opportunities
        #[arg(long, default_value = "7")]
        step_ms: f64,
        /// Extra random spacing added to each step, up to this amount
        #[arg(long, default_value = "0")]
        jitter_ms: f64,
        /// Seed for the jitter sequence
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Minimum time between rendered frames
        #[arg(long, default_value = "16")]
        interval_ms: f64,
        /// Initial viewport size, WxH
        #[arg(long, default_value = "800x600", value_parser = parse_extent)]
        size: Extent,
        /// Drawable-size change picked up by the next tick, T:WxH (repeatable)
        #[arg(long = "drawable", value_parser = parse_timed_extent)]
        drawable: Vec<TimedExtent>,
        /// Resize notification applied immediately, T:WxH (repeatable)
        #[arg(long = "notify", value_parser = parse_timed_extent)]
        notify: Vec<TimedExtent>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Print the last rendered frame
        #[arg(long)]
        show_frame: bool,
    },
    /// Validate a YAML config and print it with defaults filled in
    Config {
        /// Config file; defaults are printed when omitted
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TimedExtent {
    at_ms: f64,
    size: Extent,
}

fn parse_extent(s: &str) -> Result<Extent, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let width = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
    Ok(Extent::new(width, height))
}

fn parse_timed_extent(s: &str) -> Result<TimedExtent, String> {
    let (t, size) = s
        .split_once(':')
        .ok_or_else(|| format!("expected T:WxH, got {s:?}"))?;
    let at_ms: f64 = t.trim().parse().map_err(|e| format!("bad time {t:?}: {e}"))?;
    if !at_ms.is_finite() || at_ms < 0.0 {
        return Err(format!("time must be a non-negative number, got {t:?}"));
    }
    Ok(TimedExtent {
        at_ms,
        size: parse_extent(size)?,
    })
}

/// Inputs to a headless run.
#[derive(Debug, Clone)]
struct SimulationPlan {
    duration_ms: f64,
    step_ms: f64,
    jitter_ms: f64,
    seed: u64,
    interval_ms: f64,
    size: Extent,
    drawable: Vec<TimedExtent>,
    notify: Vec<TimedExtent>,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    stats: FrameStats,
    opportunities: u64,
    requests: u64,
    rendered_at_ms: Vec<f64>,
    final_backing: Extent,
    final_aspect: f32,
    #[serde(skip)]
    last_frame: Option<String>,
}

enum Event {
    Drawable(Extent),
    Notify(Extent),
}

/// splitmix64, mapped to [0, 1).
fn next_unit(state: &mut u64) -> f64 {
    *state = state.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

fn simulate(plan: &SimulationPlan) -> Result<SimulationReport> {
    if !(plan.step_ms > 0.0 && plan.step_ms.is_finite()) {
        bail!("step must be finite and positive, got {} ms", plan.step_ms);
    }
    if !(plan.jitter_ms >= 0.0 && plan.jitter_ms.is_finite()) {
        bail!("jitter must be finite and non-negative, got {} ms", plan.jitter_ms);
    }
    if !(plan.interval_ms > 0.0 && plan.interval_ms.is_finite()) {
        bail!("interval must be finite and positive, got {} ms", plan.interval_ms);
    }

    let mut events: Vec<(f64, Event)> = plan
        .drawable
        .iter()
        .map(|e| (e.at_ms, Event::Drawable(e.size)))
        .chain(plan.notify.iter().map(|e| (e.at_ms, Event::Notify(e.size))))
        .collect();
    events.sort_by(|a, b| a.0.total_cmp(&b.0));

    let config = ViewerConfig::default();
    let mut scheduler = FrameScheduler::with_interval(plan.interval_ms);
    let mut scene = Scene::new();
    scene.populate_default(|_| {});
    let mut camera = PerspectiveCamera::from_config(&config.camera, plan.size.aspect_ratio());
    let mut controls = OrbitControls::from_config(&config.controls);
    let mut target = HeadlessTarget::new(plan.size);

    tracing::debug!(
        duration_ms = plan.duration_ms,
        step_ms = plan.step_ms,
        interval_ms = plan.interval_ms,
        events = events.len(),
        "starting simulation"
    );

    let clock = ManualClock::new(0.0);
    let mut rng = plan.seed;
    let mut opportunities = 0u64;
    let mut requests = 0u64;
    let mut rendered_at_ms = Vec::new();
    let mut events = events.into_iter().peekable();

    loop {
        clock.advance(plan.step_ms + next_unit(&mut rng) * plan.jitter_ms);
        let now = clock.now_ms();
        if now > plan.duration_ms {
            break;
        }

        while let Some((_, event)) = events.next_if(|(at, _)| *at <= now) {
            match event {
                Event::Drawable(size) => target.set_drawable_size(size),
                Event::Notify(size) => {
                    target.set_drawable_size(size);
                    scheduler.on_viewport_resize(size, &mut camera, &mut target);
                }
            }
        }

        opportunities += 1;
        let report = scheduler.tick(
            now,
            Frame {
                scene: &scene,
                camera: &mut camera,
                target: &mut target,
                controls: &mut controls,
            },
            &mut || requests += 1,
        );
        if let FrameOutcome::Rendered { .. } = report.outcome {
            rendered_at_ms.push(now);
        }
    }

    Ok(SimulationReport {
        stats: *scheduler.stats(),
        opportunities,
        requests,
        rendered_at_ms,
        final_backing: target.backing_size(),
        final_aspect: camera.aspect(),
        last_frame: target.last_frame().map(str::to_owned),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cubeview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", cubeview_common::crate_info());
            println!("frame: {}", cubeview_frame::crate_info());
            println!("input: {}", cubeview_input::crate_info());
            println!("render: {}", cubeview_render::crate_info());
            println!(
                "default frame interval: {} ms",
                cubeview_frame::TARGET_FRAME_INTERVAL_MS
            );
        }
        Commands::Simulate {
            duration_ms,
            step_ms,
            jitter_ms,
            seed,
            interval_ms,
            size,
            drawable,
            notify,
            json,
            show_frame,
        } => {
            let plan = SimulationPlan {
                duration_ms,
                step_ms,
                jitter_ms,
                seed,
                interval_ms,
                size,
                drawable,
                notify,
            };
            let report = simulate(&plan)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let s = &report.stats;
                println!(
                    "Simulated {duration_ms} ms: {} opportunities, {} rendered ({} dropped), {} skipped",
                    report.opportunities, s.frames_rendered, s.frames_dropped, s.frames_skipped
                );
                println!(
                    "Resizes: {} by tick, {} by notification",
                    s.tick_resizes, s.viewport_resizes
                );
                println!(
                    "Final backing buffer: {} (aspect {:.4})",
                    report.final_backing, report.final_aspect
                );
            }
            if show_frame {
                if let Some(frame) = &report.last_frame {
                    print!("{frame}");
                }
            }
        }
        Commands::Config { path } => {
            let config = match &path {
                Some(path) => ViewerConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ViewerConfig::default(),
            };
            print!("{}", config.to_yaml_string()?);
        }
    }

    Ok(())
}
