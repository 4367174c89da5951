//! Events sent from the backend worker to the UI thread.

use client_core::FormState;

pub enum UiEvent {
    Form(FormState),
    Info(String),
    WorkerFailed(String),
}
