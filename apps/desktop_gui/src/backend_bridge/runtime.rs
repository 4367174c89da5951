//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{FormController, FormState, FormView, HttpPredictionClient};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use url::Url;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Forwards every controller transition to the UI thread.
pub struct ChannelView {
    ui_tx: Sender<UiEvent>,
}

impl ChannelView {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }
}

impl FormView for ChannelView {
    fn render(&mut self, state: &FormState) {
        match self.ui_tx.try_send(UiEvent::Form(state.clone())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::warn!("ui event queue is full; dropped form update"),
            Err(TrySendError::Disconnected(_)) => tracing::debug!("ui closed; dropped form update"),
        }
    }
}

pub fn launch(base_url: Url, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::WorkerFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = HttpPredictionClient::new(&base_url);
            tracing::info!(endpoint = %client.endpoint(), "backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Connected to {}",
                client.endpoint()
            )));

            let mut controller = FormController::new(client, ChannelView::new(ui_tx));
            // Commands run one at a time; a submit queued behind another waits
            // for the first to finish.
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Submit { input } => {
                        let _ = controller.submit(&input).await;
                    }
                    BackendCommand::Reset => controller.reset(),
                }
            }
            tracing::debug!("command queue closed; backend worker exiting");
        });
    });
}
