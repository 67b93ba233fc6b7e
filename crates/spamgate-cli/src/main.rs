mod display;
mod session;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use spamgate_ai::{Assets, SparseVector, TfidfVectorizer};
use spamgate_core::config::{DEFAULT_MODEL_PATH, DEFAULT_THRESHOLD, DEFAULT_VECTORIZER_PATH};
use spamgate_core::{DecisionModel, Pipeline, Settings};
use tracing::Level;

type SpamPipeline = Pipeline<TfidfVectorizer, Box<dyn DecisionModel<SparseVector>>>;

#[derive(Parser)]
#[command(name = "spamgate", author, version, about = "Email spam classifier", long_about = None)]
struct Cli {
    /// Fitted linear model (JSON)
    #[arg(long, env = "SPAMGATE_MODEL", default_value = DEFAULT_MODEL_PATH, global = true)]
    model: PathBuf,

    /// Fitted TF-IDF vectorizer (JSON)
    #[arg(long, env = "SPAMGATE_VECTORIZER", default_value = DEFAULT_VECTORIZER_PATH, global = true)]
    vectorizer: PathBuf,

    /// Confidence at or above which a message is spam, in [0, 1]
    #[arg(long, env = "SPAMGATE_THRESHOLD", default_value_t = DEFAULT_THRESHOLD, global = true)]
    threshold: f64,

    /// Score with an ONNX export of the model instead of the JSON weights
    #[cfg(feature = "onnx")]
    #[arg(long, env = "SPAMGATE_ONNX", global = true)]
    onnx: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one message from an argument, a file, or stdin
    Classify {
        /// Message text; read from stdin when neither this nor --file is given
        text: Option<String>,
        /// Read the message from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Emit JSON instead of the human-readable verdict
        #[arg(long)]
        json: bool,
    },
    /// Classify messages one after another until ':quit' or end of input (default)
    Interactive {
        #[arg(long)]
        json: bool,
    },
    /// Load the assets and print what they contain
    Info,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();
    tracing::info!("spamgate v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::new(&cli.model, &cli.vectorizer, cli.threshold)
        .context("invalid configuration")?;

    // Assets are loaded exactly once; without them nothing can be classified.
    let assets = match Assets::from_settings(&settings) {
        Ok(assets) => assets,
        Err(e) => {
            eprintln!("{}", display::asset_error_message(&e, &settings));
            return Ok(ExitCode::FAILURE);
        }
    };

    let onnx = cli_onnx(&cli);
    match cli.command.unwrap_or(Commands::Interactive { json: false }) {
        Commands::Info => {
            display::print_summary(&assets.summary(), &settings);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Classify { text, file, json } => {
            let pipeline = build_pipeline(assets, &settings, onnx.as_deref())?;
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading message from stdin")?;
                    buf
                }
            };

            let mut out = io::stdout().lock();
            match pipeline.classify(&text) {
                Ok(outcome) => {
                    display::write_outcome(&mut out, &outcome, json)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    display::write_classify_error(&mut io::stderr(), &e)?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Interactive { json } => {
            let pipeline = build_pipeline(assets, &settings, onnx.as_deref())?;
            let stats =
                session::run(&pipeline, io::stdin().lock(), &mut io::stdout().lock(), json)?;
            tracing::info!(
                spam = stats.spam,
                ham = stats.ham,
                empty = stats.empty,
                errors = stats.errors,
                "session finished"
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(feature = "onnx")]
fn cli_onnx(cli: &Cli) -> Option<PathBuf> {
    cli.onnx.clone()
}

#[cfg(not(feature = "onnx"))]
fn cli_onnx(_cli: &Cli) -> Option<PathBuf> {
    None
}

fn build_pipeline(
    assets: Assets,
    settings: &Settings,
    onnx: Option<&Path>,
) -> anyhow::Result<SpamPipeline> {
    let Assets { vectorizer, model } = assets;
    let model: Box<dyn DecisionModel<SparseVector>> = match onnx {
        None => Box::new(model),
        #[cfg(feature = "onnx")]
        Some(path) => Box::new(
            spamgate_ai::OnnxModel::load(path, vectorizer.dim(), None)
                .context("loading ONNX model")?,
        ),
        #[cfg(not(feature = "onnx"))]
        Some(_) => anyhow::bail!("built without ONNX support"),
    };
    Ok(Pipeline::new(vectorizer, model, settings.threshold))
}
