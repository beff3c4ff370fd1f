//! Navigation gate state machine.
//!
//! DESIGN
//! ======
//! `decide` is the whole policy: a pure, total function of
//! `(ready, session status, route area)`. `Gate` wraps it with the one piece
//! of memory the policy cannot do without, the redirect currently in flight,
//! so re-evaluating unchanged inputs never navigates twice.
//!
//! | ready | status          | area | state          |
//! |-------|-----------------|------|----------------|
//! | false | any             | any  | Booting        |
//! | true  | unknown         | any  | Blocked        |
//! | true  | unauthenticated | auth | ShowRoute      |
//! | true  | unauthenticated | app  | RedirectToAuth |
//! | true  | authenticated   | auth | RedirectToApp  |
//! | true  | authenticated   | app  | ShowRoute      |

use tracing::{debug, info};

use super::route::RouteArea;
use crate::session::SessionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateState {
    /// Splash delay still running. Renders nothing.
    Booting,
    /// Waiting for the identity provider. Renders nothing.
    Blocked,
    RedirectToAuth,
    RedirectToApp,
    /// Render the active route.
    ShowRoute,
}

impl GateState {
    /// Only `ShowRoute` may put route content on screen.
    #[must_use]
    pub fn renders_route(self) -> bool {
        matches!(self, Self::ShowRoute)
    }

    /// Area this state navigates to, if it is a redirect.
    #[must_use]
    pub fn redirect_target(self) -> Option<RouteArea> {
        match self {
            Self::RedirectToAuth => Some(RouteArea::Auth),
            Self::RedirectToApp => Some(RouteArea::App),
            Self::Booting | Self::Blocked | Self::ShowRoute => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GateInputs {
    /// Splash delay has elapsed.
    pub ready: bool,
    pub status: SessionStatus,
    pub area: RouteArea,
}

/// Map the current inputs to a gate state.
#[must_use]
pub fn decide(inputs: GateInputs) -> GateState {
    if !inputs.ready {
        return GateState::Booting;
    }
    match (inputs.status, inputs.area) {
        (SessionStatus::Unknown, _) => GateState::Blocked,
        (SessionStatus::Unauthenticated, RouteArea::Auth) | (SessionStatus::Authenticated, RouteArea::App) => {
            GateState::ShowRoute
        }
        (SessionStatus::Unauthenticated, RouteArea::App) => GateState::RedirectToAuth,
        (SessionStatus::Authenticated, RouteArea::Auth) => GateState::RedirectToApp,
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Navigation collaborator: accepts one-shot "go to href" commands.
pub trait Navigator {
    fn navigate(&mut self, href: &str);
}

/// Stateful wrapper around [`decide`] that issues redirect commands.
pub struct Gate<N> {
    navigator: N,
    in_flight: Option<RouteArea>,
    last: Option<GateState>,
}

impl<N: Navigator> Gate<N> {
    #[must_use]
    pub fn new(navigator: N) -> Self {
        Self { navigator, in_flight: None, last: None }
    }

    /// Re-derive the state for `inputs`, navigating if a redirect is due and
    /// not already under way.
    pub fn evaluate(&mut self, inputs: GateInputs) -> GateState {
        let state = decide(inputs);

        match state.redirect_target() {
            Some(target) if self.in_flight == Some(target) => {
                debug!(?target, "redirect already in flight");
            }
            Some(target) => {
                let href = target.entry_route();
                info!(?state, %href, "gate redirect");
                self.navigator.navigate(href);
                self.in_flight = Some(target);
            }
            None => {
                // EDGE: landing on any renderable route completes the redirect.
                if state == GateState::ShowRoute {
                    self.in_flight = None;
                }
            }
        }

        if self.last != Some(state) {
            debug!(?state, ready = inputs.ready, status = ?inputs.status, area = ?inputs.area, "gate state");
            self.last = Some(state);
        }
        state
    }

    /// State from the most recent evaluation.
    #[must_use]
    pub fn state(&self) -> Option<GateState> {
        self.last
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<RouteArea> {
        self.in_flight
    }

    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }
}

#[cfg(test)]
#[path = "machine_test.rs"]
mod tests;
