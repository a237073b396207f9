//! Login screen: username/password form against the backend.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use gatehouse_core::ApiSession;

use crate::action::Action;
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Username,
    Password,
}

pub struct LoginScreen {
    action_tx: Option<UnboundedSender<Action>>,
    session: Arc<ApiSession>,
    active_field: LoginField,
    username_input: String,
    password_input: String,
    submitting: bool,
    error: Option<String>,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl LoginScreen {
    /// Credentials resolved from the profile pre-fill the form, so a fully
    /// configured profile signs in with a single Enter.
    pub fn new(
        session: Arc<ApiSession>,
        username: Option<String>,
        password: Option<SecretString>,
    ) -> Self {
        let active_field = if username.is_some() {
            LoginField::Password
        } else {
            LoginField::Username
        };
        Self {
            action_tx: None,
            session,
            active_field,
            username_input: username.unwrap_or_default(),
            password_input: password
                .map(|p| p.expose_secret().to_owned())
                .unwrap_or_default(),
            submitting: false,
            error: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn toggle_field(&mut self) {
        self.active_field = match self.active_field {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.active_field {
            LoginField::Username => &mut self.username_input,
            LoginField::Password => &mut self.password_input,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.username_input.trim().is_empty() {
            return Err("Username is required".into());
        }
        if self.password_input.is_empty() {
            return Err("Password is required".into());
        }
        Ok(())
    }

    fn submit(&mut self) {
        if let Err(msg) = self.validate() {
            self.error = Some(msg);
            return;
        }
        let Some(tx) = self.action_tx.clone() else {
            return;
        };

        self.submitting = true;
        self.error = None;

        let session = Arc::clone(&self.session);
        let username = self.username_input.trim().to_owned();
        let password = SecretString::from(self.password_input.clone());
        debug!(%username, "submitting login");

        tokio::spawn(async move {
            let action = match session.login(&username, &password).await {
                Ok(_) => Action::LoginSucceeded,
                Err(e) => Action::LoginFailed(e.to_string()),
            };
            let _ = tx.send(action);
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_panel(frame: &mut Frame, area: Rect) -> Rect {
        let panel_w = 50u16.min(area.width.saturating_sub(4));
        let panel_h = 14u16.min(area.height.saturating_sub(2));
        let x = (area.width.saturating_sub(panel_w)) / 2;
        let y = (area.height.saturating_sub(panel_h)) / 2;
        let panel = Rect::new(area.x + x, area.y + y, panel_w, panel_h);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("Sign in", theme::title_style()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(panel);
        frame.render_widget(block, panel);
        inner
    }

    fn render_input_field(
        frame: &mut Frame,
        area: Rect,
        label: &str,
        value: &str,
        active: bool,
        masked: bool,
    ) {
        if area.height < 3 {
            return;
        }

        let label_area = Rect::new(area.x, area.y, area.width, 1);
        let label_style = if active {
            Style::default().fg(theme::NEON_CYAN)
        } else {
            theme::body()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, label_style)),
            label_area,
        );

        let display = if masked {
            "\u{25CF}".repeat(value.chars().count())
        } else {
            value.to_owned()
        };

        let border_style = if active {
            theme::border_focused()
        } else {
            theme::border_default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        let block_area = Rect::new(area.x, area.y + 1, area.width, 3.min(area.height - 1));
        let inner = block.inner(block_area);
        frame.render_widget(block, block_area);

        let text = if active {
            format!("{display}\u{2588}")
        } else {
            display
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::NEON_CYAN))),
            inner,
        );
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([Constraint::Length(4), Constraint::Length(4)]).split(area);

        Self::render_input_field(
            frame,
            layout[0],
            "Username",
            &self.username_input,
            self.active_field == LoginField::Username,
            false,
        );
        Self::render_input_field(
            frame,
            layout[1],
            "Password",
            &self.password_input,
            self.active_field == LoginField::Password,
            true,
        );
    }

    fn render_submitting(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        let throbber = throbber_widgets_tui::Throbber::default()
            .label(" Signing in...")
            .style(Style::default().fg(theme::NEON_CYAN))
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));

        frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
    }
}

// ── Component impl ───────────────────────────────────────────────────

impl Component for LoginScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.submitting {
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => return Ok(Some(Action::Quit)),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_field(),
            KeyCode::Enter => {
                if self.active_field == LoginField::Username && self.password_input.is_empty() {
                    self.active_field = LoginField::Password;
                } else {
                    self.submit();
                }
            }
            KeyCode::Backspace => {
                self.active_input_mut().pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.error = None;
                self.active_input_mut().push(c);
            }
            _ => {}
        }

        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoginSucceeded => {
                self.submitting = false;
                self.error = None;
                self.password_input.clear();
            }
            Action::LoginFailed(msg) => {
                self.submitting = false;
                self.error = Some(msg.clone());
                self.password_input.clear();
                self.active_field = LoginField::Password;
            }
            Action::Tick if self.submitting => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            area,
        );

        let inner = Self::render_panel(frame, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // spacer
            Constraint::Min(1),    // form
            Constraint::Length(1), // error
            Constraint::Length(1), // hints
        ])
        .split(inner);

        if self.submitting {
            self.render_submitting(frame, layout[1]);
        } else {
            self.render_form(frame, layout[1]);
        }

        if let Some(ref err) = self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(err.as_str(), theme::error()))
                    .alignment(Alignment::Center),
                layout[2],
            );
        }

        let hints = if self.submitting {
            ""
        } else {
            "Tab switch field  Enter sign in  Esc quit"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                hints,
                theme::key_hint().add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center),
            layout[3],
        );
    }

    fn id(&self) -> &'static str {
        "login"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    use gatehouse_core::BackendConfig;

    use super::*;

    fn screen_with(username: Option<&str>, password: Option<&str>) -> LoginScreen {
        let config = BackendConfig::new("http://127.0.0.1:9".parse().unwrap());
        let session = Arc::new(ApiSession::new(&config).unwrap());
        LoginScreen::new(
            session,
            username.map(String::from),
            password.map(SecretString::from),
        )
    }

    fn screen(username: Option<&str>) -> LoginScreen {
        screen_with(username, None)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn rendered(screen: &LoginScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn password_is_masked() {
        let mut s = screen(Some("ana"));
        type_text(&mut s, "hunter2");

        let out = rendered(&s);
        assert!(out.contains("ana"));
        assert!(!out.contains("hunter2"));
        assert!(out.contains(&"\u{25CF}".repeat(7)));
    }

    #[test]
    fn empty_submit_shows_validation_error() {
        let mut s = screen(None);
        let (tx, _rx) = mpsc::unbounded_channel();
        s.init(tx).unwrap();

        s.handle_key_event(key(KeyCode::Tab)).unwrap();
        s.handle_key_event(key(KeyCode::Enter)).unwrap();

        assert_eq!(s.error.as_deref(), Some("Username is required"));
        assert!(!s.submitting);
        assert!(rendered(&s).contains("Username is required"));
    }

    #[test]
    fn failed_login_clears_password_and_shows_message() {
        let mut s = screen(Some("ana"));
        type_text(&mut s, "wrong");
        s.submitting = true;

        s.update(&Action::LoginFailed("Authentication failed: Credenciales inválidas".into()))
            .unwrap();

        assert!(!s.submitting);
        assert!(s.password_input.is_empty());
        assert!(rendered(&s).contains("Credenciales inválidas"));
    }

    #[tokio::test]
    async fn profile_credentials_sign_in_with_one_enter() {
        let mut s = screen_with(Some("ana"), Some("hunter2"));
        let (tx, mut rx) = mpsc::unbounded_channel();
        s.init(tx).unwrap();

        let out = rendered(&s);
        assert!(!out.contains("hunter2"));
        assert!(out.contains(&"\u{25CF}".repeat(7)));

        s.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(s.submitting);
        assert_eq!(s.error, None);

        // Nothing listens on the discard port, so the attempt fails.
        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome, Action::LoginFailed(_)));
    }

    #[test]
    fn escape_quits() {
        let mut s = screen(None);
        assert_eq!(
            s.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::Quit)
        );
    }
}
