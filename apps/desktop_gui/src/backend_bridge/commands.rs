//! Backend commands queued from UI to backend worker.

use client_core::FormInput;

pub enum BackendCommand {
    Submit { input: FormInput },
    Reset,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Submit { .. } => "submit",
            BackendCommand::Reset => "reset",
        }
    }
}
