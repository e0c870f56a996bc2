//! `declutter` CLI: batch feature extraction, inference, evaluation and the
//! live CTC listen/transmit loops.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use declutter_core::{
    batch::extract_features,
    classifier::{Classifier, Label},
    metrics::ClassificationMetrics,
    StumpEnsemble,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use track_io::{
    csv_loader::{load_many, track_labels, updates_only},
    live::{Listener, ListenerConfig, ReportTrigger},
    output::{with_output, write_feature_matrix, write_predictions},
    transmit::{TransmitConfig, Transmitter},
};

#[derive(Parser)]
#[command(name = "declutter", about = "Bird/drone radar track declutter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one feature vector per track from CSV files.
    Features {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Write CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extract features and classify every track.
    Inference {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Stump-ensemble model (JSON)
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare predictions against the labels in the CSV files.
    Evaluate {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        model: PathBuf,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Classify live tracks from CTC datagrams.
    Listen {
        /// JSON listener config; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Seconds without an update before a track is evicted
        #[arg(long)]
        staleness: Option<f64>,
        /// Seconds between eviction sweeps
        #[arg(long)]
        sweep_interval: Option<f64>,
    },
    /// Replay a CSV file as CTC datagrams.
    Transmit {
        input: PathBuf,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 10001)]
        port: u16,
        /// Delay between frames
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Features { inputs, output } => run_features(&inputs, output.as_deref())?,
        Commands::Inference {
            inputs,
            model,
            output,
        } => run_inference(&inputs, &model, output.as_deref())?,
        Commands::Evaluate {
            inputs,
            model,
            output,
        } => run_evaluate(&inputs, &model, output.as_deref())?,
        Commands::Listen {
            config,
            model,
            host,
            port,
            staleness,
            sweep_interval,
        } => {
            let mut cfg = match config {
                Some(path) => load_listener_config(&path)?,
                None => ListenerConfig::default(),
            };
            if let Some(h) = host {
                cfg.host = h;
            }
            if let Some(p) = port {
                cfg.port = p;
            }
            if let Some(s) = staleness {
                cfg.registry.staleness_threshold = s;
            }
            if let Some(s) = sweep_interval {
                cfg.sweep_interval = s;
            }
            run_listen(cfg, &model)?;
        }
        Commands::Transmit {
            input,
            host,
            port,
            delay_ms,
        } => {
            let cfg = TransmitConfig {
                host,
                port,
                frame_delay: delay_ms as f64 / 1000.0,
            };
            run_transmit(&input, cfg)?;
        }
    }

    Ok(())
}

fn load_listener_config(path: &Path) -> Result<ListenerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn load_model(path: &Path) -> Result<StumpEnsemble> {
    let model = StumpEnsemble::load(path)
        .with_context(|| format!("cannot load model {}", path.display()))?;
    tracing::debug!(path = %path.display(), stumps = model.len(), "model loaded");
    Ok(model)
}

fn run_features(inputs: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let start = std::time::Instant::now();
    let rows = load_many(inputs)?;
    let matrix = extract_features(&updates_only(&rows));
    with_output(output, |w| write_feature_matrix(w, &matrix))?;

    if let Some(path) = output {
        println!(
            "{} updates → {} tracks, elapsed={:.2}s, written to {}",
            rows.len(),
            matrix.len(),
            start.elapsed().as_secs_f64(),
            path.display()
        );
    }
    Ok(())
}

fn run_inference(inputs: &[PathBuf], model: &Path, output: Option<&Path>) -> Result<()> {
    let model = load_model(model)?;
    let rows = load_many(inputs)?;
    let matrix = extract_features(&updates_only(&rows));
    let predictions: Vec<_> = model
        .classify_matrix(&matrix)
        .into_iter()
        .map(|(_, c)| c)
        .collect();
    with_output(output, |w| write_predictions(w, &matrix, &predictions))?;

    if let Some(path) = output {
        let drones = predictions.iter().filter(|c| c.label == Label::Drone).count();
        println!(
            "Classified {} tracks: {} Drone, {} Bird, written to {}",
            predictions.len(),
            drones,
            predictions.len() - drones,
            path.display()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct EvaluationReport {
    tracks: u64,
    unlabelled_tracks: usize,
    accuracy: f64,
    precision: f64,
    recall: f64,
    f1: f64,
    confusion: ClassificationMetrics,
}

fn run_evaluate(inputs: &[PathBuf], model: &Path, output: Option<&Path>) -> Result<()> {
    let model = load_model(model)?;
    let rows = load_many(inputs)?;
    let truth = track_labels(&rows);
    anyhow::ensure!(!truth.is_empty(), "no Class/Label column values in the inputs");

    let matrix = extract_features(&updates_only(&rows));
    let mut metrics = ClassificationMetrics::default();
    let mut unlabelled = 0;
    for (id, prediction) in model.classify_matrix(&matrix) {
        match truth.get(&id) {
            Some(&actual) => metrics.accumulate(prediction.label, actual),
            None => unlabelled += 1,
        }
    }

    println!(
        "Evaluated {} tracks ({} unlabelled): accuracy={:.3} precision={:.3} recall={:.3} f1={:.3}",
        metrics.total(),
        unlabelled,
        metrics.accuracy(),
        metrics.precision(),
        metrics.recall(),
        metrics.f1(),
    );

    if let Some(opath) = output {
        let report = EvaluationReport {
            tracks: metrics.total(),
            unlabelled_tracks: unlabelled,
            accuracy: metrics.accuracy(),
            precision: metrics.precision(),
            recall: metrics.recall(),
            f1: metrics.f1(),
            confusion: metrics,
        };
        std::fs::write(opath, serde_json::to_string_pretty(&report)?)?;
        println!("Metrics saved to {}", opath.display());
    }
    Ok(())
}

fn run_listen(config: ListenerConfig, model: &Path) -> Result<()> {
    let model = load_model(model)?;
    println!(
        "Listening on {}:{} (staleness={:.0}s, sweep={:.1}s, {} stumps)",
        config.host,
        config.port,
        config.registry.staleness_threshold,
        config.sweep_interval,
        model.len()
    );

    let mut listener = Listener::new(config, model);
    listener.run(|report| {
        if report.trigger == ReportTrigger::Sweep && report.evicted == 0 {
            return;
        }
        let drones = report
            .classifications
            .iter()
            .filter(|(_, c)| c.label == Label::Drone)
            .count();
        println!(
            "[{:>8.1}s] {:?}: {} tracks, {} Drone, {} evicted",
            report.time,
            report.trigger,
            report.classifications.len(),
            drones,
            report.evicted
        );
        for (id, c) in &report.classifications {
            println!("  {:<12} {:<5} {:.2}", id.as_str(), c.label, c.confidence);
        }
    })
}

fn run_transmit(input: &Path, config: TransmitConfig) -> Result<()> {
    let rows = track_io::csv_loader::load_updates(input)?;
    let tx = Transmitter::new(config, &rows)?;
    println!(
        "Replaying {} rows from {} as {} tracks over {} frames...",
        rows.len(),
        input.display(),
        tx.track_numbers().len(),
        tx.frames().len()
    );
    let sent = tx.send()?;
    println!("Done: {sent} datagrams sent");
    Ok(())
}
