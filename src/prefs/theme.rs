//! Theme preference and color palettes.
//!
//! Reads the user's explicit choice from the preference store and falls back
//! to the system color scheme when none is stored. Toggle writes the choice
//! back through the store.

use serde::{Deserialize, Serialize};

use super::store::PreferenceStore;

pub const THEME_KEY: &str = "@app_theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse `"light"` / `"dark"`; anything else is not a theme.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Light => &LIGHT_PALETTE,
            Self::Dark => &DARK_PALETTE,
        }
    }
}

// =============================================================================
// PALETTES
// =============================================================================

/// Named colors consumed by presentation components (hex strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub primary: &'static str,
    pub primary_dark: &'static str,
    pub secondary: &'static str,
    pub secondary_dark: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub error: &'static str,
}

pub const LIGHT_PALETTE: Palette = Palette {
    background: "#ffffff",
    surface: "#f5f5f5",
    primary: "#2563eb",
    primary_dark: "#1d4ed8",
    secondary: "#dc2626",
    secondary_dark: "#b91c1c",
    text: "#1f2937",
    text_secondary: "#6b7280",
    border: "#e5e7eb",
    error: "#ef4444",
};

pub const DARK_PALETTE: Palette = Palette {
    background: "#0f172a",
    surface: "#1e293b",
    primary: "#3b82f6",
    primary_dark: "#2563eb",
    secondary: "#f87171",
    secondary_dark: "#dc2626",
    text: "#f1f5f9",
    text_secondary: "#cbd5e1",
    border: "#334155",
    error: "#fca5a5",
};

// =============================================================================
// CONTROLLER
// =============================================================================

/// Effective theme over a preference store plus the host's system scheme.
pub struct ThemeController {
    prefs: PreferenceStore,
    system: Option<Theme>,
}

impl ThemeController {
    #[must_use]
    pub fn new(prefs: PreferenceStore, system: Option<Theme>) -> Self {
        Self { prefs, system }
    }

    /// Stored choice if valid, else the system scheme, else light.
    #[must_use]
    pub fn current(&self) -> Theme {
        self.explicit().or(self.system).unwrap_or_default()
    }

    /// The user's stored choice, if any.
    #[must_use]
    pub fn explicit(&self) -> Option<Theme> {
        self.prefs
            .get_str(THEME_KEY)
            .as_deref()
            .and_then(Theme::parse)
    }

    /// True until the preference store has hydrated.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.prefs.is_hydrated()
    }

    #[must_use]
    pub fn palette(&self) -> &'static Palette {
        self.current().palette()
    }

    pub fn set(&self, theme: Theme) {
        self.prefs.set(THEME_KEY, theme.as_str());
    }

    /// Flip the effective theme and store it as the explicit choice.
    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        next
    }

    /// Record a system scheme change. Only visible while no explicit choice
    /// is stored.
    pub fn system_changed(&mut self, scheme: Option<Theme>) -> Theme {
        self.system = scheme;
        self.current()
    }
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;
