//! Application core: event loop, route management, action dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gatehouse_core::{ApiSession, DashboardController, Route, SessionProvider};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventRates, EventReader};
use crate::navigator::TuiNavigator;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

type Controller = DashboardController<ApiSession, TuiNavigator>;

/// Startup settings resolved from CLI and config.
pub struct AppContext {
    /// Profile whose keyring entry holds the session token.
    pub profile_name: String,
    /// Username to pre-fill on the login screen.
    pub username: Option<String>,
    /// Password resolved from env, keyring or profile.
    pub password: Option<SecretString>,
}

/// The controller backing the active dashboard view plus its bridge task.
struct ActiveDashboard {
    controller: Controller,
    bridge_cancel: CancellationToken,
}

/// Top-level application state and event loop.
pub struct App {
    /// Current route; `None` until the first navigation.
    active_route: Option<Route>,
    /// All screen components, keyed by route.
    screens: HashMap<Route, Box<dyn Component>>,
    session: Arc<ApiSession>,
    navigator: Arc<TuiNavigator>,
    /// Present only while `/dashboard` is active.
    dashboard: Option<ActiveDashboard>,
    profile_name: String,
    /// Whether the app should keep running.
    running: bool,
    /// Action sender: components can dispatch actions through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver: main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(session: Arc<ApiSession>, ctx: AppContext) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let screens: HashMap<Route, Box<dyn Component>> =
            create_screens(Arc::clone(&session), ctx.username, ctx.password)
                .into_iter()
                .collect();
        let navigator = Arc::new(TuiNavigator::new(action_tx.clone()));

        Self {
            active_route: None,
            screens,
            session,
            navigator,
            dashboard: None,
            profile_name: ctx.profile_name,
            running: true,
            action_tx,
            action_rx,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::start()?;
        self.init_screens()?;

        let mut events = EventReader::spawn(EventRates::default());

        // Start at the dashboard; its auth gate sends us to login if needed.
        self.action_tx.send(Action::Navigate(Route::Dashboard))?;

        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event → action
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.leave_dashboard();
        drop(events);
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys first, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if (key.modifiers, key.code) == (KeyModifiers::CONTROL, KeyCode::Char('c')) {
            return Ok(Some(Action::Quit));
        }

        if let Some(screen) = self.active_screen_mut() {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    fn active_screen_mut(&mut self) -> Option<&mut Box<dyn Component>> {
        let route = self.active_route?;
        self.screens.get_mut(&route)
    }

    /// Process a single action: update app state and propagate to screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Navigate(route) => self.navigate(*route)?,

            Action::LoginSucceeded => {
                self.persist_session();
                self.forward(action)?;
                self.action_tx.send(Action::Navigate(Route::Dashboard))?;
            }

            Action::Reload => {
                if let Some(active) = &self.dashboard {
                    let controller = active.controller.clone();
                    tokio::spawn(async move { controller.reload().await });
                }
            }

            Action::Logout => {
                if let Some(active) = &self.dashboard {
                    let controller = active.controller.clone();
                    let profile_name = self.profile_name.clone();
                    tokio::spawn(async move {
                        if let Err(e) = gatehouse_config::clear_session_token(&profile_name) {
                            warn!(error = %e, "failed to clear saved session token");
                        }
                        controller.logout().await;
                    });
                }
            }

            Action::DismissError => {
                if let Some(active) = &self.dashboard {
                    active.controller.dismiss_error();
                }
            }

            // Render is handled in the main loop, not here
            Action::Render | Action::Resize(..) => {}

            other => self.forward(other)?,
        }

        Ok(())
    }

    /// Hand an action to the active screen and queue any follow-up.
    fn forward(&mut self, action: &Action) -> Result<()> {
        let follow_up = match self.active_screen_mut() {
            Some(screen) => screen.update(action)?,
            None => None,
        };
        if let Some(follow_up) = follow_up {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn navigate(&mut self, route: Route) -> Result<()> {
        if self.active_route == Some(route) {
            return Ok(());
        }
        debug!(from = ?self.active_route, to = %route, "navigating");

        if self.active_route == Some(Route::Dashboard) {
            self.leave_dashboard();
        }
        self.active_route = Some(route);

        if let Some(screen) = self.active_screen_mut() {
            debug!(screen = screen.id(), "screen activated");
            screen.update(&Action::Navigate(route))?;
        }

        if route == Route::Dashboard {
            self.enter_dashboard();
        }
        Ok(())
    }

    /// Create, bridge and mount a fresh controller for this activation.
    fn enter_dashboard(&mut self) {
        let controller = DashboardController::new(
            Arc::clone(&self.session),
            Arc::clone(&self.navigator),
        );
        let bridge_cancel = CancellationToken::new();
        tokio::spawn(spawn_data_bridge(
            controller.clone(),
            self.action_tx.clone(),
            bridge_cancel.clone(),
        ));
        controller.mount();
        self.dashboard = Some(ActiveDashboard {
            controller,
            bridge_cancel,
        });
    }

    fn leave_dashboard(&mut self) {
        if let Some(active) = self.dashboard.take() {
            active.controller.unmount();
            active.bridge_cancel.cancel();
        }
    }

    fn persist_session(&self) {
        let Some(token) = self.session.token() else {
            return;
        };
        if let Err(e) = gatehouse_config::store_session_token(&self.profile_name, &token) {
            warn!(error = %e, "failed to save session token");
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

        if let Some(screen) = self.active_route.and_then(|r| self.screens.get(&r)) {
            screen.render(frame, layout[0]);
        }

        self.render_status_bar(frame, layout[1]);
    }

    /// Bottom status bar: session indicator and current route.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let session = self.session.session();
        let indicator = match session.user {
            Some(user) if session.is_authenticated => Span::styled(
                format!("● {}", user.username),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            _ => Span::styled("○ signed out", Style::default().fg(theme::ERROR_RED)),
        };
        let route = self.active_route.map_or("", Route::path);

        let line = Line::from(vec![
            Span::raw(" "),
            indicator,
            Span::styled(format!(" │ {route}  │ Ctrl+C quit"), theme::key_hint()),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
