//! App shell dispatcher: feeds the gate from a single event loop.
//!
//! ARCHITECTURE
//! ============
//! Three event sources drive the gate: the splash-delay timer, session
//! transitions from the `SessionStore`, and route changes from the navigation
//! collaborator. Each event updates one input, the gate is re-evaluated, and
//! the resulting `GateState` is published on a watch channel for the
//! presentation layer.
//!
//! The user-email preference follows session transitions here as well, so the
//! gate itself stays free of preference concerns.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::gate::{Gate, GateInputs, GateState, Navigator, RouteLocation};
use crate::prefs::PreferenceStore;
use crate::prefs::profile::sync_user_email;
use crate::session::{SessionStatus, SessionStore, SessionTransition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// The splash delay has elapsed.
    SplashElapsed,
    Session(SessionTransition),
    RouteChanged(RouteLocation),
}

/// Navigator that reports every command back as a route change, for hosts
/// whose router applies navigation immediately.
///
/// It holds a sender of the shell's own route channel, so a shell built on it
/// never sees that channel close and runs until its task is aborted.
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<RouteLocation>,
}

impl ChannelNavigator {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<RouteLocation>) -> Self {
        Self { tx }
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&mut self, href: &str) {
        if self.tx.send(RouteLocation::from_path(href)).is_err() {
            debug!(%href, "route channel closed; navigation dropped");
        }
    }
}

pub struct AppShell<N> {
    gate: Gate<N>,
    prefs: PreferenceStore,
    transitions: mpsc::UnboundedReceiver<SessionTransition>,
    ready: bool,
    status: SessionStatus,
    route: RouteLocation,
    published: watch::Sender<GateState>,
}

impl<N: Navigator> AppShell<N> {
    /// Subscribe to `session` and start in `Booting` on `route`.
    #[must_use]
    pub fn new(navigator: N, session: &SessionStore, prefs: PreferenceStore, route: RouteLocation) -> Self {
        let transitions = session.subscribe();
        let (published, _) = watch::channel(GateState::Booting);
        Self {
            gate: Gate::new(navigator),
            prefs,
            transitions,
            ready: false,
            status: session.status(),
            route,
            published,
        }
    }

    /// Latest gate state, for the presentation layer.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<GateState> {
        self.published.subscribe()
    }

    #[must_use]
    pub fn inputs(&self) -> GateInputs {
        GateInputs { ready: self.ready, status: self.status, area: self.route.area() }
    }

    #[must_use]
    pub fn gate(&self) -> &Gate<N> {
        &self.gate
    }

    #[must_use]
    pub fn route(&self) -> &RouteLocation {
        &self.route
    }

    /// Apply one event and re-evaluate the gate.
    pub fn handle(&mut self, event: ShellEvent) -> GateState {
        match event {
            ShellEvent::SplashElapsed => {
                self.ready = true;
            }
            ShellEvent::Session(transition) => {
                self.status = transition.to.status();
                sync_user_email(&self.prefs, &transition.to);
            }
            ShellEvent::RouteChanged(route) => {
                self.route = route;
            }
        }
        self.evaluate()
    }

    fn evaluate(&mut self) -> GateState {
        let state = self.gate.evaluate(self.inputs());
        self.published.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
        state
    }

    /// Drive the shell until the session store and the route channel have
    /// both closed. Returns the final gate state.
    ///
    /// With a [`ChannelNavigator`] looping into `routes`, the route channel
    /// stays open for as long as the shell does; hosts stop such a shell by
    /// aborting its task.
    pub async fn run(mut self, splash_delay: Duration, mut routes: mpsc::UnboundedReceiver<RouteLocation>) -> GateState {
        info!(?splash_delay, "app shell starting");
        self.evaluate();

        let splash = tokio::time::sleep(splash_delay);
        tokio::pin!(splash);
        let mut sessions_open = true;
        let mut routes_open = true;

        while sessions_open || routes_open {
            let event = tokio::select! {
                () = &mut splash, if !self.ready => ShellEvent::SplashElapsed,
                maybe = self.transitions.recv(), if sessions_open => match maybe {
                    Some(transition) => ShellEvent::Session(transition),
                    None => {
                        sessions_open = false;
                        continue;
                    }
                },
                maybe = routes.recv(), if routes_open => match maybe {
                    Some(route) => ShellEvent::RouteChanged(route),
                    None => {
                        routes_open = false;
                        continue;
                    }
                },
            };
            self.handle(event);
        }

        let state = self.gate.state().unwrap_or(GateState::Booting);
        info!(?state, "app shell stopped");
        state
    }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
