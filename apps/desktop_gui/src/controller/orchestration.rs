//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command; on failure the reason lands in `status` and `false` is
/// returned.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend worker disconnected (possible startup/runtime failure); restart the app"
                .to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::FormInput;
    use crossbeam_channel::bounded;

    #[test]
    fn queues_submit_commands() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let mut status = String::new();

        let queued = dispatch_backend_command(
            &cmd_tx,
            BackendCommand::Submit {
                input: FormInput::new("1", "2", "3", "4"),
            },
            &mut status,
        );

        assert!(queued);
        assert!(status.is_empty());
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(BackendCommand::Submit { .. })
        ));
    }

    #[test]
    fn reports_full_and_disconnected_queues() {
        let (cmd_tx, cmd_rx) = bounded(1);
        let mut status = String::new();

        assert!(dispatch_backend_command(&cmd_tx, BackendCommand::Reset, &mut status));
        assert!(!dispatch_backend_command(&cmd_tx, BackendCommand::Reset, &mut status));
        assert!(status.contains("queue is full"));

        drop(cmd_rx);
        assert!(!dispatch_backend_command(&cmd_tx, BackendCommand::Reset, &mut status));
        assert!(status.contains("disconnected"));
    }
}
