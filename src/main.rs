use bodygraph::core::strategies::build_chain;
use bodygraph::utils::{logger, validation::Validate};
use bodygraph::{ChartError, ChartResponse, CliConfig, FallbackOrchestrator, Settings};
use clap::Parser;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting bodygraph CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match Settings::load_or_default(config.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(3);
        }
    };

    let birth = config.to_birth_data();
    if let Err(e) = birth.validate() {
        tracing::error!("Birth data validation failed: {}", e);
        eprintln!("{}", e.user_friendly_message());
        eprintln!("Suggestion: {}", e.recovery_suggestion());
        std::process::exit(3);
    }

    let chain = build_chain(&settings)?;
    let mut orchestrator = FallbackOrchestrator::new(chain);

    // The overall deadline aborts the in-flight strategy instead of
    // leaking a background submission.
    let deadline = Duration::from_secs(config.deadline_secs);
    let outcome = tokio::time::timeout(deadline, orchestrator.run(&birth)).await;

    match outcome {
        Ok(Ok(chart)) => {
            let response = ChartResponse {
                birth_data: birth,
                chart,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!("Chart acquisition failed: {}", e);
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            let exit_code = match e {
                ChartError::AllStrategiesExhausted { .. } => 1,
                _ => 2,
            };
            std::process::exit(exit_code);
        }
        Err(_) => {
            tracing::error!("Overall deadline of {}s exceeded", config.deadline_secs);
            eprintln!(
                "Chart acquisition did not finish within {}s",
                config.deadline_secs
            );
            std::process::exit(2);
        }
    }
}
