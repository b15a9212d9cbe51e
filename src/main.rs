use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use supadata_loader::cli::{resolve_text, Cli, Commands, OutputFormat};
use supadata_loader::{output, Config, LoadRequest, Operation, Platform, SupadataLoader};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "supadata_loader=debug"
    } else {
        "supadata_loader=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            cli.log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!cli.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    // Writing a fresh config must not depend on an existing one
    if let Commands::Config { init: true, .. } = cli.command {
        let path = Config::default().save(cli.config.as_deref()).await?;
        println!("Configuration written to: {}", path.display());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Transcript {
            url,
            lang,
            mode,
            text,
            no_text,
            params,
            output,
            format,
        } => {
            let mut request = LoadRequest::new(url).with_operation(Operation::Transcript);
            request.lang = lang.or_else(|| config.defaults.lang.clone());
            request.mode = mode.or(config.defaults.mode);
            request.text = Some(resolve_text(text, no_text, config.defaults.text));
            request.params = params.into_iter().collect::<Map<String, Value>>();

            run_load(&cli_loader(&config, cli.api_key), &request, cli.quiet, output, &format).await?;
        }
        Commands::Metadata {
            url,
            params,
            output,
            format,
        } => {
            let mut request = LoadRequest::new(url).with_operation(Operation::Metadata);
            request.params = params.into_iter().collect::<Map<String, Value>>();

            run_load(&cli_loader(&config, cli.api_key), &request, cli.quiet, output, &format).await?;
        }
        Commands::Config { show, .. } => {
            if !show {
                match &cli.config {
                    Some(path) => println!("Config file: {}", path.display()),
                    None => println!("Config file: {}", Config::config_path()?.display()),
                }
            }
            config.display();
        }
        Commands::Platforms => {
            println!("Supported platforms:");
            for platform in Platform::all() {
                println!("  • {} ({})", platform.display_name(), platform.domains().join(", "));
            }
        }
    }

    Ok(())
}

fn cli_loader(config: &Config, api_key: Option<String>) -> SupadataLoader {
    SupadataLoader::new(config.loader_config(api_key))
        .with_client_factory(Arc::new(config.client_factory()))
}

async fn run_load(
    loader: &SupadataLoader,
    request: &LoadRequest,
    quiet: bool,
    output: Option<PathBuf>,
    format: &OutputFormat,
) -> Result<()> {
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    progress.set_message(format!("Fetching {}...", request.operation.unwrap_or_default()));
    progress.enable_steady_tick(Duration::from_millis(100));

    let result = loader.load(request).await;
    progress.finish_and_clear();
    let docs = result?;

    match output {
        Some(path) => {
            output::save_to_file(&docs, &path, format).await?;
            println!("Documents saved to: {}", path.display());
        }
        None => output::print_to_console(&docs, format)?,
    }

    Ok(())
}
