//! Terminal input plus the two clocks that drive the UI.
//!
//! A background task merges crossterm input with a tick clock (throbber
//! animation) and a render clock, and hands the result to the app loop.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// New size as (cols, rows).
    Resize(u16, u16),
    Tick,
    Render,
}

/// How often the tick and render clocks fire.
#[derive(Debug, Clone, Copy)]
pub struct EventRates {
    pub tick: Duration,
    pub render: Duration,
}

impl Default for EventRates {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            render: Duration::from_millis(33),
        }
    }
}

/// Keep key presses and resizes; everything else is noise for this app.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        _ => None,
    }
}

fn clock(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Handle to the background reader. Dropping it stops the task.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn spawn(rates: EventRates) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(pump(tx, cancel.clone(), rates));
        Self { rx, cancel }
    }

    /// `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn pump(tx: mpsc::UnboundedSender<Event>, cancel: CancellationToken, rates: EventRates) {
    let mut input = EventStream::new();
    let mut tick = clock(rates.tick);
    let mut render = clock(rates.render);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => Event::Tick,
            _ = render.tick() => Event::Render,
            Some(Ok(raw)) = input.next() => match translate(raw) {
                Some(event) => event,
                None => continue,
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseEvent, MouseEventKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(kind: KeyEventKind) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code: KeyCode::Char('r'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn only_key_presses_pass_through() {
        assert!(matches!(translate(key(KeyEventKind::Press)), Some(Event::Key(_))));
        assert_eq!(translate(key(KeyEventKind::Release)), None);
        assert_eq!(translate(key(KeyEventKind::Repeat)), None);
    }

    #[test]
    fn resize_keeps_dimensions() {
        assert_eq!(
            translate(CrosstermEvent::Resize(120, 40)),
            Some(Event::Resize(120, 40))
        );
    }

    #[test]
    fn mouse_and_focus_are_dropped() {
        let mouse = CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(translate(mouse), None);
        assert_eq!(translate(CrosstermEvent::FocusGained), None);
    }

    #[tokio::test(start_paused = true)]
    async fn clocks_skip_missed_ticks() {
        let mut interval = clock(Duration::from_millis(10));
        interval.tick().await;
        tokio::time::advance(Duration::from_millis(55)).await;

        let before = tokio::time::Instant::now();
        interval.tick().await;
        interval.tick().await;
        assert!(before.elapsed() >= Duration::from_millis(5));
    }
}
