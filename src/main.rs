//! lead-pilot - handles one inbound lead message.
//!
//! Reads an inbound message command as JSON on stdin and prints the turn
//! outcome as JSON on stdout. Without a generator API key the binary runs
//! dry: it prints the turn plan, including the assembled prompt, instead of
//! calling the generator. Logs go to stderr.

use std::io::Read;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lead_pilot::adapters::{Catalogue, CatalogueError, OpenAICompatibleGenerator};
use lead_pilot::application::{
    InboundMessageCommand, InboundMessageConfig, InboundMessageHandler, TurnError,
};
use lead_pilot::config::{AppConfig, ConfigError, ConfigValidationError, LoggingConfig};
use lead_pilot::domain::pipeline::TurnPlanner;
use lead_pilot::domain::prompt::PromptAssembler;
use lead_pilot::domain::safety::OutputSafetyFilter;
use lead_pilot::ports::GenerationError;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ConfigValidationError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error("Generator setup failed: {0}")]
    Generator(#[from] GenerationError),

    #[error("Failed to read stdin: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Turn(#[from] TurnError),
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));
    let json_layer = logging
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!logging.json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn build_planner(config: &AppConfig) -> Result<TurnPlanner, CliError> {
    let catalogue = match &config.catalogue.path {
        Some(path) => Catalogue::load(path)?,
        None => Catalogue::builtin(),
    };

    let filter = OutputSafetyFilter::new(
        catalogue
            .sanitizer
            .with_ceiling(config.channel.sanitizer_ceiling),
        config.channel.formatter()?,
        catalogue.leak_detector,
        config.pipeline.filter_settings(),
    );

    Ok(TurnPlanner::new(
        Arc::new(catalogue.regions),
        PromptAssembler::new(config.pipeline.persona_script()),
        Arc::new(filter),
        config.pipeline.planner_settings(),
    ))
}

async fn run(config: AppConfig) -> Result<String, CliError> {
    let planner = Arc::new(build_planner(&config)?);

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let mut cmd: InboundMessageCommand = serde_json::from_str(&input)?;
    if cmd.now.is_none() {
        cmd.now = config.pipeline.local_now();
    }

    match config.generator.adapter_config() {
        Some(adapter_config) => {
            let generator = OpenAICompatibleGenerator::new(adapter_config)?;
            let handler = InboundMessageHandler::new(
                planner,
                Arc::new(generator),
                InboundMessageConfig {
                    temperature: config.generator.temperature,
                    max_tokens: config.generator.max_tokens,
                    timeout: config.generator.timeout(),
                },
            );
            let outcome = handler.handle(cmd).await?;
            Ok(serde_json::to_string_pretty(&outcome)?)
        }
        None => {
            tracing::info!("no generator API key configured, printing dry-run plan");
            let stage = cmd.validate()?;
            let plan = planner.plan(&cmd.turn_input(stage));
            Ok(serde_json::to_string_pretty(&plan)?)
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return std::process::ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "invalid configuration");
        return std::process::ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(output) => {
            println!("{output}");
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "turn failed");
            std::process::ExitCode::FAILURE
        }
    }
}
