//! Data bridge: connects a [`DashboardController`] to TUI actions.
//!
//! Runs as a background task for as long as the dashboard view is active,
//! forwarding every controller state change as an
//! [`Action::DashboardUpdated`] through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gatehouse_core::{DashboardController, Navigator, SessionProvider};

use crate::action::Action;

/// Forward controller state to the TUI until cancelled.
///
/// Sends the current snapshot first so the screen never renders stale data
/// from a previous activation.
pub async fn spawn_data_bridge<S, N>(
    controller: DashboardController<S, N>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) where
    S: SessionProvider,
    N: Navigator,
{
    let mut stream = controller.subscribe();
    let _ = action_tx.send(Action::DashboardUpdated(controller.view()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = stream.changed() => {
                if changed.is_none() {
                    break;
                }
                debug!("dispatching DashboardUpdated");
                if action_tx.send(Action::DashboardUpdated(controller.view())).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge shut down");
}
