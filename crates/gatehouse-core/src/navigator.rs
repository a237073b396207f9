// ── Navigation seam ──
//
// The controller leaves its view by asking a `Navigator` to go somewhere
// else. Implementations are fire-and-forget: `redirect` never blocks and
// never reports failure.

use strum::{Display, EnumString, IntoStaticStr};

/// Path of the login view.
pub const LOGIN_ROUTE: &str = "/login";
/// Path of the dashboard view.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Route change side effect, implemented by the UI layer.
pub trait Navigator: Send + Sync + 'static {
    fn redirect(&self, path: &str);
}

/// Known routes, parseable from and displayable as their paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Route {
    #[strum(serialize = "/login")]
    Login,
    #[strum(serialize = "/dashboard")]
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        self.into()
    }
}
