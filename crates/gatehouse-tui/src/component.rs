//! Component trait: the building block for every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// Every screen implements Component.
///
/// Lifecycle: `init` → (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Called once at startup.
    /// Receives the action sender for dispatching actions to the app loop.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Handle a keyboard event. Return an Action to dispatch, or None.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Render into the provided frame area.
    fn render(&self, frame: &mut Frame, area: Rect);

    /// Short name for logs.
    fn id(&self) -> &'static str;
}
