use std::time::Duration;

use client_core::{FormInput, FormState, SubmitControl, UiState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{Feature, Verdict};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, orchestration::dispatch_backend_command};

const ANOMALY_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 76, 70);
const NORMAL_COLOR: egui::Color32 = egui::Color32::from_rgb(67, 181, 129);
const ERROR_FILL: egui::Color32 = egui::Color32::from_rgb(96, 32, 32);

pub struct AnomalyFormApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    input: FormInput,
    form: FormState,
    status: String,
}

impl AnomalyFormApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            input: FormInput::default(),
            form: FormState::default(),
            status: "Starting backend worker...".to_string(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Form(state) => self.form = state,
                UiEvent::Info(message) => self.status = message,
                UiEvent::WorkerFailed(message) => {
                    tracing::error!("{message}");
                    self.status = message;
                }
            }
        }
    }

    fn try_submit(&mut self) {
        if !self.form.submit.enabled {
            tracing::debug!("submit ignored while a request is in flight");
            return;
        }
        let cmd = BackendCommand::Submit {
            input: self.input.clone(),
        };
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            // Disable right away; the worker's loading frame follows.
            self.form.submit = SubmitControl::in_flight();
        }
    }

    fn clear(&mut self) {
        self.input = FormInput::default();
        dispatch_backend_command(&self.cmd_tx, BackendCommand::Reset, &mut self.status);
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let mut submit_requested = false;
        let mut clear_requested = false;

        egui::Grid::new("prediction-fields")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                for feature in Feature::ALL {
                    ui.label(egui::RichText::new(feature.display_name()).strong());
                    let response = ui.add(
                        egui::TextEdit::singleline(self.input.field_mut(feature))
                            .hint_text("0.0")
                            .desired_width(220.0),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit_requested = true;
                    }
                    ui.end_row();
                }
            });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let submit = self.form.submit;
            let caption = if submit.busy { "Checking..." } else { "Check traffic" };
            let button = egui::Button::new(egui::RichText::new(caption).strong().size(16.0))
                .min_size(egui::vec2(160.0, 34.0));
            if ui.add_enabled(submit.enabled, button).clicked() {
                submit_requested = true;
            }
            if submit.busy {
                ui.spinner();
            }
            if ui
                .add_enabled(submit.enabled, egui::Button::new("Clear"))
                .clicked()
            {
                clear_requested = true;
            }
        });

        if submit_requested {
            self.try_submit();
        }
        if clear_requested {
            self.clear();
        }
    }

    fn show_feedback(&self, ui: &mut egui::Ui) {
        match &self.form.ui {
            UiState::ShowingResult { label, verdict } => {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(
                        egui::RichText::new(label)
                            .color(verdict_color(*verdict))
                            .strong()
                            .size(22.0),
                    );
                    ui.label(verdict.detail());
                });
            }
            UiState::ShowingError { message } => {
                egui::Frame::group(ui.style())
                    .fill(ERROR_FILL)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                    });
            }
            UiState::Idle | UiState::Loading => {}
        }
    }
}

pub fn verdict_color(verdict: Verdict) -> egui::Color32 {
    match verdict {
        Verdict::Anomaly => ANOMALY_COLOR,
        Verdict::Normal => NORMAL_COLOR,
    }
}

impl eframe::App for AnomalyFormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Network anomaly check");
            ui.label(
                egui::RichText::new("Enter current link measurements to classify the traffic.")
                    .weak(),
            );
            ui.add_space(12.0);

            self.show_form(ui);
            ui.add_space(12.0);
            self.show_feedback(ui);

            ui.add_space(10.0);
            ui.separator();
            ui.horizontal_wrapped(|ui| {
                ui.small("Status:");
                ui.small(egui::RichText::new(&self.status).weak());
            });
        });

        let repaint_after = if self.form.submit.busy {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };
        ctx.request_repaint_after(repaint_after);
    }
}
