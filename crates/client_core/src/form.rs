//! Form submission controller: validation, the single in-flight request, and
//! the panel state it leaves behind.

use shared::{
    domain::{Feature, Verdict},
    protocol::{Prediction, PredictionRequest},
};
use tracing::{debug, info, warn};

use crate::{PredictionService, SubmitError};

/// Raw text of the four form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub inbound_rate: String,
    pub outbound_rate: String,
    pub inbound_util: String,
    pub outbound_util: String,
}

impl FormInput {
    pub fn new(
        inbound_rate: impl Into<String>,
        outbound_rate: impl Into<String>,
        inbound_util: impl Into<String>,
        outbound_util: impl Into<String>,
    ) -> Self {
        Self {
            inbound_rate: inbound_rate.into(),
            outbound_rate: outbound_rate.into(),
            inbound_util: inbound_util.into(),
            outbound_util: outbound_util.into(),
        }
    }

    pub fn field(&self, feature: Feature) -> &str {
        match feature {
            Feature::InboundRate => &self.inbound_rate,
            Feature::OutboundRate => &self.outbound_rate,
            Feature::InboundUtil => &self.inbound_util,
            Feature::OutboundUtil => &self.outbound_util,
        }
    }

    pub fn field_mut(&mut self, feature: Feature) -> &mut String {
        match feature {
            Feature::InboundRate => &mut self.inbound_rate,
            Feature::OutboundRate => &mut self.outbound_rate,
            Feature::InboundUtil => &mut self.inbound_util,
            Feature::OutboundUtil => &mut self.outbound_util,
        }
    }

    /// Parses all four fields. The error lists every field that failed.
    pub fn parse(&self) -> Result<PredictionRequest, SubmitError> {
        let mut values = [0.0; 4];
        let mut invalid = Vec::new();
        for (slot, feature) in values.iter_mut().zip(Feature::ALL) {
            match parse_number(self.field(feature)) {
                Some(value) => *slot = value,
                None => invalid.push(feature),
            }
        }

        if invalid.is_empty() {
            Ok(PredictionRequest::from_values(values))
        } else {
            Err(SubmitError::Validation { fields: invalid })
        }
    }
}

impl From<PredictionRequest> for FormInput {
    fn from(request: PredictionRequest) -> Self {
        Self::new(
            request.inbound_rate.to_string(),
            request.outbound_rate.to_string(),
            request.inbound_util.to_string(),
            request.outbound_util.to_string(),
        )
    }
}

/// Reads the longest decimal prefix after leading whitespace, so `"0.8%"` is
/// 0.8 and `"abc"` is nothing. Non-finite values have no JSON encoding and are
/// rejected too.
fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let end = numeric_prefix_len(text.as_bytes());
    if end == 0 {
        return None;
    }
    let value: f64 = text[..end].parse().ok()?;
    value.is_finite().then_some(value)
}

/// Length of `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`, or 0.
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut pos = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(pos);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = digits_from(pos + 1);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }
    pos
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    ShowingResult {
        label: String,
        verdict: Verdict,
    },
    ShowingError {
        message: String,
    },
}

impl UiState {
    pub fn result_panel_visible(&self) -> bool {
        matches!(self, UiState::ShowingResult { .. })
    }

    pub fn error_panel_visible(&self) -> bool {
        matches!(self, UiState::ShowingError { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub busy: bool,
}

impl SubmitControl {
    pub fn ready() -> Self {
        Self {
            enabled: true,
            busy: false,
        }
    }

    pub fn in_flight() -> Self {
        Self {
            enabled: false,
            busy: true,
        }
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::ready()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub ui: UiState,
    pub submit: SubmitControl,
}

/// Receives every state transition, in order.
pub trait FormView {
    fn render(&mut self, state: &FormState);
}

impl<F: FnMut(&FormState)> FormView for F {
    fn render(&mut self, state: &FormState) {
        self(state)
    }
}

pub struct FormController<S, V> {
    service: S,
    view: V,
    state: FormState,
}

impl<S: PredictionService, V: FormView> FormController<S, V> {
    pub fn new(service: S, view: V) -> Self {
        Self {
            service,
            view,
            state: FormState::default(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn reset(&mut self) {
        self.state = FormState::default();
        self.view.render(&self.state);
    }

    /// Runs one submission: validate, post, show the outcome, release the
    /// submit control. Validation failures never reach the service.
    pub async fn submit(&mut self, input: &FormInput) -> Result<Prediction, SubmitError> {
        let request = match input.parse() {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "form input rejected before submission");
                self.state.ui = UiState::ShowingError {
                    message: err.to_string(),
                };
                self.view.render(&self.state);
                return Err(err);
            }
        };

        let Self {
            service,
            view,
            state,
        } = self;
        let mut pending = PendingSubmit::begin(state, view);

        info!(
            inbound_rate = request.inbound_rate,
            outbound_rate = request.outbound_rate,
            inbound_util = request.inbound_util,
            outbound_util = request.outbound_util,
            "submitting prediction request"
        );
        let outcome = service.predict(&request).await;

        match &outcome {
            Ok(prediction) => pending.show(UiState::ShowingResult {
                label: prediction.label.clone(),
                verdict: prediction.verdict,
            }),
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "prediction request failed");
                pending.show(UiState::ShowingError {
                    message: err.to_string(),
                });
            }
        }

        outcome
    }
}

/// Holds the submit control disabled for as long as it lives. Dropping it
/// releases the control, including when the submit future itself is dropped
/// mid-request.
struct PendingSubmit<'a, V: FormView> {
    state: &'a mut FormState,
    view: &'a mut V,
}

impl<'a, V: FormView> PendingSubmit<'a, V> {
    fn begin(state: &'a mut FormState, view: &'a mut V) -> Self {
        state.submit = SubmitControl::in_flight();
        state.ui = UiState::Loading;
        view.render(state);
        Self { state, view }
    }

    fn show(&mut self, ui: UiState) {
        self.state.ui = ui;
        self.view.render(self.state);
    }
}

impl<V: FormView> Drop for PendingSubmit<'_, V> {
    fn drop(&mut self) {
        if self.state.ui.is_loading() {
            debug!("submission abandoned while in flight");
            self.state.ui = UiState::Idle;
        }
        self.state.submit = SubmitControl::ready();
        self.view.render(self.state);
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
