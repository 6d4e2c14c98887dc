use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use waste_classifier::cli::{Args, ClassifyArgs, Command};
use waste_classifier::config::{ModelsConfig, ServerConfig};
use waste_classifier::helpers::init_tracing;
use waste_classifier::response::ClassifyResponse;
use waste_classifier::state::load_analyzer;
use waste_classifier::{AppState, run_server};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    match args.into_command() {
        Command::Serve(serve) => {
            let config = ServerConfig::from(serve);
            let state = AppState::load(&config.models)?;
            info!("Starting server on {}:{}", config.host, config.port);
            run_server(config, state).await
        }
        Command::Classify(classify) => classify_file(classify),
    }
}

fn classify_file(args: ClassifyArgs) -> Result<()> {
    let models = ModelsConfig::from(args.models);
    let analyzer = load_analyzer(args.variant, &models)?;

    let bytes = std::fs::read(&args.source)
        .with_context(|| format!("failed to read {}", args.source.display()))?;
    let t = std::time::Instant::now();
    let result = analyzer.analyze_bytes(&bytes)?;
    info!(variant = %args.variant, elapsed_ms = t.elapsed().as_secs_f64() * 1000.0, "classified");

    let response = ClassifyResponse::for_variant(args.variant, result);
    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{json}");
    Ok(())
}
