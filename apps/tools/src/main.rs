use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings,
    evaluate::{evaluate, parse_dataset, EVALUATION_REQUEST_TIMEOUT},
    HttpPredictionClient,
};

#[derive(Parser, Debug)]
#[command(name = "anomaly-tools")]
struct Cli {
    /// Base URL of the prediction service; overrides settings and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send every row of a labelled dataset and compare predictions to labels.
    Evaluate {
        #[arg(long, default_value = "networkanomalydataset.csv")]
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let base_url = settings.api_base_url(cli.api_url.as_deref())?;

    match cli.command {
        Command::Evaluate { csv } => {
            let text = fs::read_to_string(&csv)
                .with_context(|| format!("failed to read dataset '{}'", csv.display()))?;
            let rows = parse_dataset(&text)
                .with_context(|| format!("failed to parse dataset '{}'", csv.display()))?;
            tracing::info!(rows = rows.len(), %base_url, "evaluating dataset");

            let client =
                HttpPredictionClient::with_request_timeout(&base_url, EVALUATION_REQUEST_TIMEOUT)
                    .context("failed to build prediction client")?;
            let report = evaluate(&client, &rows).await;
            println!("{report}");
        }
    }

    Ok(())
}
