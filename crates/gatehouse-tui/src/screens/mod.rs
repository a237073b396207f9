//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod login;

use std::sync::Arc;

use secrecy::SecretString;

use gatehouse_core::{ApiSession, Route};

use crate::component::Component;

/// Create one screen component per route.
pub fn create_screens(
    session: Arc<ApiSession>,
    username: Option<String>,
    password: Option<SecretString>,
) -> Vec<(Route, Box<dyn Component>)> {
    vec![
        (
            Route::Login,
            Box::new(login::LoginScreen::new(session, username, password)),
        ),
        (Route::Dashboard, Box::new(dashboard::DashboardScreen::new())),
    ]
}
