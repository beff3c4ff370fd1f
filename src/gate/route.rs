//! Route locations as seen by the gate.

/// First path segment of every screen in the auth area.
pub const AUTH_SEGMENT: &str = "auth";
/// Redirect target when a signed-out user leaves the auth area.
pub const AUTH_ROUTE: &str = "/auth";
/// Redirect target when a signed-in user lands in the auth area.
pub const HOME_ROUTE: &str = "/(tab)/home";

/// Top-level screen area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteArea {
    Auth,
    App,
}

impl RouteArea {
    /// Where a redirect into this area navigates.
    #[must_use]
    pub fn entry_route(self) -> &'static str {
        match self {
            Self::Auth => AUTH_ROUTE,
            Self::App => HOME_ROUTE,
        }
    }
}

/// Active route, owned by the navigation collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteLocation {
    segments: Vec<String>,
}

impl RouteLocation {
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Split an href such as `/(tab)/home` into segments. Empty components
    /// and any query or fragment are dropped.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Only the first segment matters: `auth` is the auth area, everything
    /// else (including the root) is the app.
    #[must_use]
    pub fn area(&self) -> RouteArea {
        match self.segments.first() {
            Some(first) if first == AUTH_SEGMENT => RouteArea::Auth,
            _ => RouteArea::App,
        }
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
