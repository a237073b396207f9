//! Navigator implementation that turns redirects into app actions.

use std::str::FromStr;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use gatehouse_core::{Navigator, Route};

use crate::action::Action;

/// Routes `redirect` calls into the action loop as [`Action::Navigate`].
pub struct TuiNavigator {
    action_tx: UnboundedSender<Action>,
}

impl TuiNavigator {
    pub fn new(action_tx: UnboundedSender<Action>) -> Self {
        Self { action_tx }
    }
}

impl Navigator for TuiNavigator {
    fn redirect(&self, path: &str) {
        let Ok(route) = Route::from_str(path) else {
            warn!(path, "redirect to unknown route ignored");
            return;
        };
        debug!(%route, "redirect");
        // A closed channel means the app is shutting down.
        let _ = self.action_tx.send(Action::Navigate(route));
    }
}
