use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use client_core::{
    config::load_settings, FormController, FormInput, FormState, FormView, HttpPredictionClient,
    UiState,
};

/// Submit one set of traffic measurements to the anomaly prediction service.
#[derive(Parser, Debug)]
#[command(name = "anomaly-form")]
struct Args {
    #[arg(long, allow_hyphen_values = true)]
    inbound_rate: String,
    #[arg(long, allow_hyphen_values = true)]
    outbound_rate: String,
    #[arg(long, allow_hyphen_values = true)]
    inbound_util: String,
    #[arg(long, allow_hyphen_values = true)]
    outbound_util: String,
    /// Base URL of the prediction service; overrides settings and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Print the visible panel as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Prints the visible panel once the submit control is released.
struct TerminalView {
    json: bool,
}

impl FormView for TerminalView {
    fn render(&mut self, state: &FormState) {
        if state.submit.busy {
            if state.ui.is_loading() {
                eprintln!("Submitting...");
            }
            return;
        }
        match &state.ui {
            UiState::ShowingResult { label, verdict } => {
                if self.json {
                    println!(
                        "{}",
                        serde_json::json!({
                            "panel": "result",
                            "label": label,
                            "style": verdict.style_class(),
                            "detail": verdict.detail(),
                        })
                    );
                } else {
                    println!("{label} [{}]", verdict.style_class());
                    println!("{}", verdict.detail());
                }
            }
            UiState::ShowingError { message } => {
                if self.json {
                    println!(
                        "{}",
                        serde_json::json!({ "panel": "error", "message": message })
                    );
                } else {
                    eprintln!("{message}");
                }
            }
            UiState::Idle | UiState::Loading => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let base_url = settings.api_base_url(args.api_url.as_deref())?;
    tracing::debug!(%base_url, "using prediction service");

    let mut controller = FormController::new(
        HttpPredictionClient::new(&base_url),
        TerminalView { json: args.json },
    );
    let input = FormInput::new(
        args.inbound_rate,
        args.outbound_rate,
        args.inbound_util,
        args.outbound_util,
    );

    match controller.submit(&input).await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}
