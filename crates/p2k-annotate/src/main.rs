//! prokka2kegg - batch KO assignment

use anyhow::{Context, Result};
use clap::Parser;
use p2k_annotate::{BatchDriver, Cli};
use p2k_common::logging::{init_logging, LogConfig, LogLevel};
use std::io::IsTerminal;
use std::process;
use tracing::{error, info};

const VERBOSE_DIRECTIVES: &str = "p2k_annotate=debug,p2k_common=debug,prokka2kegg=debug";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut builder = LogConfig::builder()
        .level(LogLevel::Info)
        .log_file_prefix("prokka2kegg");
    if cli.verbose {
        // Debug for our own crates only; dependencies stay at info
        builder = builder
            .filter_directives(VERBOSE_DIRECTIVES)
            .include_location(true);
    }
    let log_config = builder.build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);
    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        },
    };

    match run(&cli).await {
        Ok(true) => {},
        Ok(false) => process::exit(1),
        Err(e) => {
            error!(error = %e, "prokka2kegg failed");
            eprintln!("Error: {e:#}");
            process::exit(1);
        },
    }
}

/// Returns whether every file succeeded
async fn run(cli: &Cli) -> Result<bool> {
    let config = cli
        .batch_config()
        .with_progress(std::io::stderr().is_terminal() && !cli.verbose);

    let summary = BatchDriver::new(config)
        .run()
        .await
        .context("Batch run failed")?;

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "Summary written");
    }

    for failure in &summary.failures {
        eprintln!("Failed: {}: {}", failure.input.display(), failure.error);
    }

    Ok(summary.is_success())
}
