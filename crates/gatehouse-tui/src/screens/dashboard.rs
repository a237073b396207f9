//! Dashboard screen: renders the controller's view projection.
//!
//! Layout (content mode):
//! ┌─ Header: avatar initial, welcome line, email, role chips ────────────┐
//! ├─ Error banner (only when an error is set) ───────────────────────────┤
//! ├─ Protected endpoint panel with reload hint ──────────────────────────┤
//! │ ┌─ Users ─┐ ┌─ Projects ─┐ ┌─ Completed ─┐ ┌─ Pending ─┐            │
//! ├─ Recent activity ─────────────────────┬─ Permissions ────────────────┤
//! └───────────────────────────────────────┴──────────────────────────────┘
//!
//! While the first load is in flight the whole area is a throbber.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use gatehouse_core::{DashboardView, ProtectedPayload, User, ViewMode};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

#[derive(Default)]
pub struct DashboardScreen {
    view: Option<DashboardView>,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn view_mode(&self) -> ViewMode {
        self.view.as_ref().map_or(ViewMode::Loading, |v| v.view_mode)
    }

    fn reload_enabled(&self) -> bool {
        matches!(
            self.view_mode(),
            ViewMode::Content {
                reload_enabled: true
            }
        )
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_loading(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
        let centered = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(30),
            Constraint::Min(0),
        ])
        .split(layout[1]);

        let throbber = throbber_widgets_tui::Throbber::default()
            .label(" Loading protected data...")
            .style(Style::default().fg(theme::NEON_CYAN))
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));

        frame.render_stateful_widget(throbber, centered[1], &mut self.throbber_state.clone());
    }

    fn render_header(
        frame: &mut Frame,
        area: Rect,
        user: Option<&User>,
        data: Option<&ProtectedPayload>,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let display_name = data
            .and_then(|d| d.user_profile.full_name.as_deref())
            .or(user.map(|u| u.username.as_str()))
            .unwrap_or("");
        let initial = user.and_then(User::initial).unwrap_or('?');

        let mut title = vec![
            Span::styled(
                format!(" {initial} "),
                Style::default()
                    .fg(theme::BG_DARK)
                    .bg(theme::ELECTRIC_PURPLE)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("Welcome, {display_name}"), theme::title_style()),
        ];
        if let Some(email) = user.map(|u| u.email.as_str()).filter(|e| !e.is_empty()) {
            title.push(Span::styled(format!("  {email}"), theme::body()));
        }

        let mut roles = vec![Span::raw("     ")];
        for role in user.iter().flat_map(|u| u.roles.iter()) {
            roles.push(Span::styled(format!(" {role} "), theme::role_chip(role)));
            roles.push(Span::raw(" "));
        }

        frame.render_widget(
            Paragraph::new(vec![Line::from(title), Line::from(roles)]),
            inner,
        );
    }

    fn render_error_banner(frame: &mut Frame, area: Rect, error: &str) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ERROR_RED));
        let line = Line::from(vec![
            Span::styled(format!(" {error}"), theme::error()),
            Span::styled("   x", theme::key_hint_key()),
            Span::styled(" dismiss", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_endpoint_panel(frame: &mut Frame, area: Rect, reload_enabled: bool) {
        let block = Block::default()
            .title(" Protected endpoint ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let hint = if reload_enabled {
            vec![
                Span::styled("r", theme::key_hint_key()),
                Span::styled(" reload data", theme::key_hint()),
            ]
        } else {
            vec![Span::styled(
                "reloading...",
                theme::key_hint().add_modifier(Modifier::DIM),
            )]
        };

        let mut spans = vec![
            Span::styled(" GET ", Style::default().fg(theme::SUCCESS_GREEN)),
            Span::styled("/api/protected/dashboard", theme::body()),
            Span::raw("   "),
        ];
        spans.extend(hint);
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_stats(frame: &mut Frame, area: Rect, data: &ProtectedPayload) {
        let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
        let stats = data.stats;
        let values = [
            ("Total users", stats.total_users),
            ("Active projects", stats.active_projects),
            ("Completed tasks", stats.completed_tasks),
            ("Pending reviews", stats.pending_reviews),
        ];

        for (((label, value), accent), card) in values
            .into_iter()
            .zip(theme::STAT_ACCENTS)
            .zip(cards.iter())
        {
            let block = Block::default()
                .title(format!(" {label} "))
                .title_style(Style::default().fg(accent))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme::border_default());
            frame.render_widget(
                Paragraph::new(Span::styled(
                    value.to_string(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center)
                .block(block),
                *card,
            );
        }
    }

    fn render_activity(frame: &mut Frame, area: Rect, data: &ProtectedPayload) {
        let block = Block::default()
            .title(" Recent activity ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let lines: Vec<Line> = if data.recent_activity.is_empty() {
            vec![Line::from(Span::styled(" No recent activity", theme::key_hint()))]
        } else {
            data.recent_activity
                .iter()
                .map(|entry| {
                    Line::from(vec![
                        Span::styled(" \u{25B8} ", Style::default().fg(theme::ELECTRIC_PURPLE)),
                        Span::styled(entry.action.clone(), theme::body()),
                        Span::styled(format!("  {}", entry.timestamp), theme::key_hint()),
                        Span::styled(
                            format!("  IP: {}", entry.ip),
                            Style::default().fg(theme::NEON_CYAN),
                        ),
                    ])
                })
                .collect()
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_permissions(frame: &mut Frame, area: Rect, data: &ProtectedPayload) {
        let block = Block::default()
            .title(" Permissions ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let mut spans = vec![Span::raw(" ")];
        for permission in &data.user_profile.permissions {
            spans.push(Span::styled(
                format!("[{}]", permission.to_uppercase()),
                theme::permission_chip(),
            ));
            spans.push(Span::raw(" "));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans))
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
    }

    fn render_content(&self, frame: &mut Frame, area: Rect, view: &DashboardView) {
        let error_height = if view.error.is_some() { 3 } else { 0 };
        let layout = Layout::vertical([
            Constraint::Length(4),            // header
            Constraint::Length(error_height), // error banner
            Constraint::Length(3),            // endpoint panel
            Constraint::Length(3),            // stat cards
            Constraint::Min(3),               // activity + permissions
            Constraint::Length(1),            // key hints
        ])
        .split(area);

        let data = view.data.as_deref();
        Self::render_header(frame, layout[0], view.user.as_ref(), data);

        if let Some(ref error) = view.error {
            Self::render_error_banner(frame, layout[1], error);
        }

        Self::render_endpoint_panel(frame, layout[2], self.reload_enabled());

        if let Some(data) = data {
            Self::render_stats(frame, layout[3], data);
            let bottom =
                Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                    .split(layout[4]);
            Self::render_activity(frame, bottom[0], data);
            Self::render_permissions(frame, bottom[1], data);
        } else {
            frame.render_widget(
                Paragraph::new(Span::styled("No data loaded", theme::key_hint()))
                    .alignment(Alignment::Center),
                layout[4],
            );
        }

        let hints = Line::from(vec![
            Span::styled("r", theme::key_hint_key()),
            Span::styled(" reload  ", theme::key_hint()),
            Span::styled("L", theme::key_hint_key()),
            Span::styled(" logout  ", theme::key_hint()),
            Span::styled("x", theme::key_hint_key()),
            Span::styled(" dismiss error  ", theme::key_hint()),
            Span::styled("q", theme::key_hint_key()),
            Span::styled(" quit", theme::key_hint()),
        ]);
        frame.render_widget(
            Paragraph::new(hints).alignment(Alignment::Center),
            layout[5],
        );
    }
}

// ── Component impl ───────────────────────────────────────────────────

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => Some(Action::Quit),
            (KeyModifiers::NONE, KeyCode::Char('r')) if self.reload_enabled() => {
                Some(Action::Reload)
            }
            (KeyModifiers::SHIFT | KeyModifiers::NONE, KeyCode::Char('L')) => Some(Action::Logout),
            (KeyModifiers::NONE, KeyCode::Char('x'))
                if self.view.as_ref().is_some_and(|v| v.error.is_some()) =>
            {
                Some(Action::DismissError)
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DashboardUpdated(view) => self.view = Some(view.clone()),
            Action::Navigate(_) => self.view = None,
            Action::Tick if self.view_mode() == ViewMode::Loading => {
                self.throbber_state.calc_next();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        match self.view.as_ref() {
            Some(view) if view.view_mode != ViewMode::Loading => {
                self.render_content(frame, area, view);
            }
            _ => self.render_loading(frame, area),
        }
    }

    fn id(&self) -> &'static str {
        "dashboard"
    }
}
