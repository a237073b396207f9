// ── Dashboard controller ──
//
// Owns the dashboard's `data` / `loading` / `error` state and decides when
// the protected payload is fetched. State is published through a `watch`
// channel; every transition is a single `send_modify` so observers never
// see a half-applied load.
//
// Each load is tagged with a sequence number taken inside the publication
// that sets `loading`. That publication happens on the caller's stack, before
// any await, so `mount()` returns with the loading state already visible.
// A result is applied only if its number is still the latest issued and the
// controller has not been torn down. Auth loss and logout bump the counter,
// so anything in flight at that point is dropped.
//
// Loads are only issued while the auth gate is open: `mount()` found a
// session and it has not been lost since.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::model::{ProtectedPayload, Session, User};
use crate::navigator::{LOGIN_ROUTE, Navigator};
use crate::session::SessionProvider;

// ── State ───────────────────────────────────────────────────────────

/// Controller state as seen by the renderer.
///
/// `data` survives failed reloads, so `data` and `error` may both be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub data: Option<Arc<ProtectedPayload>>,
    pub loading: bool,
    pub error: Option<String>,
}

/// What the renderer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Nothing to show yet: full-page loading indicator only.
    Loading,
    /// Data (if any) plus error banner. Reload is disabled while loading.
    Content { reload_enabled: bool },
}

impl DashboardState {
    pub fn view_mode(&self) -> ViewMode {
        if self.loading && self.data.is_none() {
            ViewMode::Loading
        } else {
            ViewMode::Content {
                reload_enabled: !self.loading,
            }
        }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<Arc<ProtectedPayload>>,
    pub user: Option<User>,
    pub view_mode: ViewMode,
}

impl DashboardView {
    pub fn new(state: &DashboardState, user: Option<User>) -> Self {
        Self {
            loading: state.loading,
            error: state.error.clone(),
            data: state.data.clone(),
            user,
            view_mode: state.view_mode(),
        }
    }
}

// ── Stream ──────────────────────────────────────────────────────────

/// A subscription to controller state transitions.
pub struct DashboardStream {
    receiver: watch::Receiver<DashboardState>,
}

impl DashboardStream {
    fn new(mut receiver: watch::Receiver<DashboardState>) -> Self {
        receiver.mark_unchanged();
        Self { receiver }
    }

    /// Whether a transition has been published since the last `changed()`.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next transition, returning the new snapshot.
    /// Returns `None` once the controller is gone.
    pub async fn changed(&mut self) -> Option<DashboardState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

// ── Controller ──────────────────────────────────────────────────────

/// Session-gated loader for the dashboard view.
///
/// Cheaply cloneable: all clones share the same state. Create one per
/// activation of the view, [`mount`](Self::mount) it, and
/// [`unmount`](Self::unmount) it when the view goes away.
pub struct DashboardController<S, N> {
    inner: Arc<Inner<S, N>>,
}

impl<S, N> Clone for DashboardController<S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S, N> {
    session: Arc<S>,
    navigator: Arc<N>,
    state: watch::Sender<DashboardState>,
    /// Latest issued load sequence number.
    seq: AtomicU64,
    cancel: CancellationToken,
    mounted: AtomicBool,
    /// Open while mounted with an authenticated session.
    gate_open: AtomicBool,
    /// Set while `logout()` owns the redirect.
    logging_out: AtomicBool,
}

impl<S: SessionProvider, N: Navigator> DashboardController<S, N> {
    pub fn new(session: Arc<S>, navigator: Arc<N>) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            inner: Arc::new(Inner {
                session,
                navigator,
                state,
                seq: AtomicU64::new(0),
                cancel: CancellationToken::new(),
                mounted: AtomicBool::new(false),
                gate_open: AtomicBool::new(false),
                logging_out: AtomicBool::new(false),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Activate the view.
    ///
    /// Without an authenticated session this redirects to [`LOGIN_ROUTE`]
    /// and does nothing else. Otherwise it starts watching the session and
    /// issues the initial load in the background. Only the first call has
    /// any effect. Must be called within a Tokio runtime.
    pub fn mount(&self) {
        if self.inner.mounted.swap(true, Ordering::SeqCst) {
            warn!("dashboard controller mounted twice, ignoring");
            return;
        }

        let mut auth = self.inner.session.subscribe();
        let authenticated = auth.borrow_and_update().is_authenticated;
        if !authenticated {
            info!("no session, redirecting to login");
            self.inner.navigator.redirect(LOGIN_ROUTE);
            return;
        }

        info!("dashboard mounted");
        self.inner.gate_open.store(true, Ordering::SeqCst);
        self.spawn_auth_watcher(auth);
        self.spawn_load();
    }

    /// Tear the view down. Outstanding loads finish without touching state.
    pub fn unmount(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();
        info!("dashboard unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst) && !self.inner.cancel.is_cancelled()
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Fetch the protected payload again. Failures land in `error`.
    ///
    /// Does nothing unless the view is mounted with a live session.
    pub async fn reload(&self) {
        self.load().await;
    }

    /// End the session, then leave for [`LOGIN_ROUTE`].
    ///
    /// Provider logout and the redirect each happen exactly once, in that
    /// order, whatever loads are in flight.
    pub async fn logout(&self) {
        self.inner.logging_out.store(true, Ordering::SeqCst);
        self.inner.gate_open.store(false, Ordering::SeqCst);
        self.discard_in_flight();
        self.inner.session.logout().await;
        info!("logged out, redirecting to login");
        self.inner.navigator.redirect(LOGIN_ROUTE);
    }

    /// Clear the error banner. `data` and `loading` are left alone.
    pub fn dismiss_error(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn state(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> DashboardStream {
        DashboardStream::new(self.inner.state.subscribe())
    }

    /// Current state joined with the session user.
    pub fn view(&self) -> DashboardView {
        let user = self.inner.session.session().user;
        DashboardView::new(&self.inner.state.borrow(), user)
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn load(&self) {
        if let Some(seq) = self.begin_load() {
            self.finish_load(seq).await;
        }
    }

    /// Start the load on the caller's stack so the loading state is
    /// published before any await.
    fn spawn_load(&self) {
        let Some(seq) = self.begin_load() else {
            return;
        };
        let this = self.clone();
        tokio::spawn(async move { this.finish_load(seq).await });
    }

    /// Publish `loading` and take the next sequence number. `None` when the
    /// gate is closed and no fetch may be issued.
    fn begin_load(&self) -> Option<u64> {
        let inner = &self.inner;
        if inner.cancel.is_cancelled()
            || !inner.gate_open.load(Ordering::SeqCst)
            || !inner.session.session().is_authenticated
        {
            debug!("load skipped, auth gate closed");
            return None;
        }

        let mut seq = 0;
        inner.state.send_modify(|s| {
            seq = inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
            s.loading = true;
            s.error = None;
        });
        debug!(seq, "load issued");
        Some(seq)
    }

    async fn finish_load(&self, seq: u64) {
        let inner = &self.inner;
        let result = tokio::select! {
            () = inner.cancel.cancelled() => {
                debug!(seq, "load abandoned on unmount");
                return;
            }
            result = inner.session.fetch_protected_data() => result,
        };

        let applied = inner.state.send_if_modified(|s| {
            if inner.cancel.is_cancelled() || inner.seq.load(Ordering::SeqCst) != seq {
                return false;
            }
            match result {
                Ok(data) => {
                    s.data = Some(data);
                    s.error = None;
                }
                Err(failure) => s.error = Some(failure.message),
            }
            s.loading = false;
            true
        });

        if applied {
            debug!(seq, "load applied");
        } else {
            debug!(seq, "stale load result dropped");
        }
    }

    /// Drop whatever is in flight. `loading` falls back to false since no
    /// result will arrive for it.
    fn discard_in_flight(&self) {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            inner.seq.fetch_add(1, Ordering::SeqCst);
            return;
        }
        inner.state.send_if_modified(|s| {
            inner.seq.fetch_add(1, Ordering::SeqCst);
            std::mem::replace(&mut s.loading, false)
        });
    }

    fn on_auth_change(&self, authenticated: bool) {
        if authenticated {
            info!("session regained, reloading");
            self.inner.logging_out.store(false, Ordering::SeqCst);
            self.inner.gate_open.store(true, Ordering::SeqCst);
            self.spawn_load();
            return;
        }

        self.inner.gate_open.store(false, Ordering::SeqCst);
        self.discard_in_flight();
        if self.inner.logging_out.load(Ordering::SeqCst) {
            debug!("session ended by logout");
        } else {
            info!("session lost, redirecting to login");
            self.inner.navigator.redirect(LOGIN_ROUTE);
        }
    }

    fn spawn_auth_watcher(&self, mut auth: watch::Receiver<Session>) {
        let weak: Weak<Inner<S, N>> = Arc::downgrade(&self.inner);
        let cancel = self.inner.cancel.clone();
        let mut was_authenticated = true;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    changed = auth.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let authenticated = auth.borrow_and_update().is_authenticated;
                        if authenticated == was_authenticated {
                            continue;
                        }
                        was_authenticated = authenticated;

                        let Some(inner) = weak.upgrade() else { break };
                        DashboardController { inner }.on_auth_change(authenticated);
                    }
                }
            }
            debug!("auth watcher stopped");
        });
    }
}
