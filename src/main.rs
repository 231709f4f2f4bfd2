//! sonify - Hear your charts

use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use sonify::config::{self, DurationConfig, SonifyConfig};
use sonify::data::{self, DataPoint};
use sonify::describe::DescriptionGenerator;
use sonify::engine::{self, SynthRenderer};
use sonify::mapping::{Marker, ValueMapper};
use sonify::playback::{
    ConsoleAnnouncer, NoFocus, PlaybackController, PlaybackEvent, PlaybackMode, Services,
};
use sonify::viz::{self, ChartAnnouncer, ChartFocus, ChartState};

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log lines would scribble over the interactive chart
    let default_level = match &cli.command {
        Commands::Play { headless: false, .. } => "warn",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    match cli.command {
        Commands::Play {
            data,
            config,
            field,
            mode,
            speed,
            headless,
        } => {
            let cfg = load_settings(config.as_deref(), field, mode)?;
            let points = load_points(&data)?;
            let title = data
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "data".to_string());

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                if headless {
                    play_headless(points, cfg, speed).await
                } else {
                    play_interactive(points, cfg, speed, title).await
                }
            })?;
        }

        Commands::Render {
            data,
            config,
            field,
            mode,
            output,
        } => {
            let cfg = load_settings(config.as_deref(), field, mode)?;
            let points = load_points(&data)?;

            println!("Rendering {} points to {:?}...", points.len(), output);
            let summary = engine::render_to_wav(&points, &cfg, &output)?;
            println!(
                "Wrote {:.2}s of {} audio ({} Hz stereo, peak {:.2})",
                summary.duration_secs(),
                summary.mode,
                summary.sample_rate,
                summary.peak
            );
        }

        Commands::Describe {
            data,
            config,
            field,
        } => {
            let cfg = load_settings(config.as_deref(), field, None)?;
            let points = load_points(&data)?;
            let describer = DescriptionGenerator::new(&cfg);

            println!("{}", describer.summarize(&points));
            for (i, point) in points.iter().enumerate() {
                println!("  {}", describer.describe(point, i, points.len()));
            }
        }

        Commands::Devices => {
            println!("Available audio output devices:\n");

            if let Some(name) = engine::default_device_name() {
                println!("Default output: {}\n", name);
            }

            let devices = engine::list_output_devices();
            if devices.is_empty() {
                println!("  (none found)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    print_config(&cfg);
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../sonify.example.yaml");

            let path = "sonify.yaml";
            if Path::new(path).exists() {
                println!("sonify.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created sonify.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

/// Configuration file (or defaults) with command-line overrides applied
fn load_settings(
    path: Option<&Path>,
    field: Option<String>,
    mode: Option<String>,
) -> Result<SonifyConfig> {
    let mut cfg = match path {
        Some(path) => config::load_config(path)?,
        None => SonifyConfig::default(),
    };
    if field.is_some() {
        cfg.pitch.field = field;
    }
    if let Some(mode) = mode {
        cfg.mode = PlaybackMode::from(mode.as_str());
    }
    Ok(cfg)
}

fn load_points(path: &Path) -> Result<Vec<DataPoint>> {
    let points = data::load_dataset(path)?;
    if points.is_empty() {
        bail!("Dataset {:?} is empty", path);
    }
    Ok(points)
}

fn print_config(cfg: &SonifyConfig) {
    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
    println!("  Master volume: {:.0}%", cfg.audio.master_volume * 100.0);
    println!(
        "  Pitch: {} -> {:.0}-{:.0} Hz ({})",
        cfg.pitch.field.as_deref().unwrap_or("auto"),
        cfg.pitch.range[0],
        cfg.pitch.range[1],
        cfg.pitch.scale
    );
    match &cfg.duration {
        DurationConfig::Fixed(ms) => println!("  Duration: {} ms, gap {} ms", ms, cfg.gap),
        DurationConfig::Mapped { field, range } => println!(
            "  Duration: {} -> {}-{} ms, gap {} ms",
            field, range[0], range[1], cfg.gap
        ),
    }
    println!("  Mode: {}", cfg.mode);
    println!(
        "  Markers: start {}, end {}",
        if cfg.markers.start { "on" } else { "off" },
        if cfg.markers.end { "on" } else { "off" }
    );
}

async fn play_headless(points: Vec<DataPoint>, cfg: SonifyConfig, speed: f64) -> Result<()> {
    let services = Services::new(SynthRenderer::new(&cfg.audio), ConsoleAnnouncer, NoFocus);
    let controller = PlaybackController::new(points, cfg, services);
    controller.set_speed(speed);

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let mut events = controller.subscribe();
    info!(
        "Playing {} points, about {:.1}s",
        controller.len(),
        controller.total_duration().as_secs_f64()
    );
    controller.play().await?;

    loop {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted");
            controller.stop();
            break;
        }
        match tokio::time::timeout(Duration::from_millis(50), events.recv()).await {
            Ok(Ok(PlaybackEvent::Completed)) | Ok(Err(RecvError::Closed)) => break,
            _ => {}
        }
    }

    // Let the end marker ring out
    tokio::time::sleep(Duration::from_secs_f64(Marker::End.tone().duration + 0.1)).await;
    controller.destroy();
    Ok(())
}

async fn play_interactive(
    points: Vec<DataPoint>,
    cfg: SonifyConfig,
    speed: f64,
    title: String,
) -> Result<()> {
    let mut mapper = ValueMapper::new(&cfg);
    mapper.analyze(&points);
    let values = points.iter().map(|p| mapper.pitch_value(p)).collect();

    let chart = Arc::new(Mutex::new(ChartState::new(title, values)));
    let services = Services::new(
        SynthRenderer::new(&cfg.audio),
        ChartAnnouncer(Arc::clone(&chart)),
        ChartFocus(Arc::clone(&chart)),
    );

    let controller = sonify::sonify(points, cfg, services);
    controller.set_speed(speed);
    viz::run_chart(controller, chart).await
}
