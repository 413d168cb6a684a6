// VibeBot
// Main entry point for the vibebot binary

use clap::Parser;
use sdk::ErrorExt;
use vibebot_engine::chat::ChatApp;
use vibebot_engine::cli::{Cli, Command};
use vibebot_engine::config::Config;
use vibebot_engine::handlers::{handle_ask, handle_chat, handle_stages, OutputFormat};
use vibebot_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let command = cli.command();
    if command == Command::Stages {
        return handle_stages(&mut std::io::stdout(), format);
    }

    // Load configuration (or use custom path if provided)
    let config = match &cli.config {
        Some(config_path) => Config::load_from_path(config_path)?,
        None => Config::load_or_create()?,
    };

    // --log wins over config; RUST_LOG wins over both
    init_telemetry_with_level(cli.log.as_deref().unwrap_or(&config.core.log_level));
    tracing::info!("VibeBot v{}", env!("CARGO_PKG_VERSION"));

    let app = match ChatApp::from_config(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("✗ {}", e);
            eprintln!("  {}", e.user_hint());
            return Err(e.into());
        }
    };

    let mut stdout = std::io::stdout();
    match command {
        Command::Chat { verbose } => {
            handle_chat(
                &app,
                tokio::io::stdin(),
                &mut stdout,
                &config.core.data_dir,
                verbose,
                format,
            )
            .await
        }
        Command::Ask { message, export } => {
            handle_ask(&app, &message, export.as_deref(), &mut stdout, format).await
        }
        Command::Stages => handle_stages(&mut stdout, format),
    }
}
