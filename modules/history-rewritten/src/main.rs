use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ai_client::{ImageRequest, OpenAi};
use history_rewritten::file_config::LoggingConfig;
use history_rewritten::providers::{OpenAiEventGenerator, OpenAiIllustrator, XPublisher};
use history_rewritten::{
    load_config, AppConfig, CycleDeps, CycleSettings, FileConfig, IllustrationStore,
    JsonHistoryStore, Orchestrator,
};
use x_client::XClient;

#[derive(Parser)]
#[command(name = "history-rewritten", about = "Post one alternate-history event to X")]
struct Cli {
    /// TOML config file. Built-in defaults apply when omitted.
    #[arg(long, env = "HISTORY_REWRITTEN_CONFIG")]
    config: Option<PathBuf>,

    /// Override bot.similarity_threshold.
    #[arg(long)]
    threshold: Option<f64>,

    /// Override bot.history_log.
    #[arg(long)]
    history_log: Option<PathBuf>,

    /// Override bot.images_dir.
    #[arg(long)]
    images_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one generate, gate, illustrate, publish, record cycle
    Run,
    /// Recompute every stored fingerprint and report mismatches
    Verify,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut file_config = match cli.config.as_deref() {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e:#}");
                return ExitCode::FAILURE;
            }
        },
        None => FileConfig::default(),
    };
    apply_overrides(&cli, &mut file_config);

    let _guard = match init_tracing(&file_config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&file_config).await,
        Command::Verify => verify(&file_config),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "History Rewritten aborted");
            ExitCode::FAILURE
        }
    }
}

fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(threshold) = cli.threshold {
        config.bot.similarity_threshold = threshold;
    }
    if let Some(ref path) = cli.history_log {
        config.bot.history_log = path.clone();
    }
    if let Some(ref dir) = cli.images_dir {
        config.bot.images_dir = dir.clone();
    }
}

/// Stdout plus an optional log file. The returned guard flushes the file
/// writer on drop and must outlive every log call.
fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.filter)?,
    };
    let stdout = tracing_subscriber::fmt::layer().with_target(false);

    if logging.file.as_os_str().is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout)
            .try_init()?;
        return Ok(None);
    }

    let dir = match logging.file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = logging
        .file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "history_rewritten.log".into());
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .try_init()?;
    Ok(Some(guard))
}

async fn run(file_config: &FileConfig) -> Result<bool> {
    file_config.validate()?;
    info!("History Rewritten starting...");

    let config = AppConfig::from_env()?;
    let models = &file_config.models;

    let mut ai = OpenAi::new(&config.openai_api_key, &models.text)
        .with_temperature(models.temperature)
        .with_max_tokens(models.max_tokens);
    if let Some(ref url) = config.openai_base_url {
        ai = ai.with_base_url(url);
    }
    let image_template = ImageRequest::new("")
        .model(&models.image)
        .size(&models.image_size)
        .quality(&models.image_quality);

    let deps = CycleDeps::builder()
        .generator(Arc::new(OpenAiEventGenerator::new(ai.clone())))
        .illustrator(Arc::new(OpenAiIllustrator::new(ai, image_template)))
        .publisher(Arc::new(XPublisher::new(XClient::new(config.x_credentials()))))
        .history(Arc::new(JsonHistoryStore::new(&file_config.bot.history_log)))
        .illustrations(IllustrationStore::new(&file_config.bot.images_dir)?)
        .build();

    let settings = CycleSettings {
        similarity_threshold: file_config.bot.similarity_threshold,
    };

    Ok(Orchestrator::new(deps, settings).run().await)
}

fn verify(file_config: &FileConfig) -> Result<bool> {
    let store = JsonHistoryStore::new(&file_config.bot.history_log);
    let mismatches = store.verify()?;

    if mismatches.is_empty() {
        info!(path = %store.path().display(), "All fingerprints reproduce");
        return Ok(true);
    }

    for m in &mismatches {
        warn!(
            index = m.index,
            title = %m.title,
            stored = %m.stored,
            recomputed = %m.recomputed,
            "Fingerprint mismatch"
        );
    }
    warn!(count = mismatches.len(), "History log has fingerprint mismatches");
    Ok(false)
}
