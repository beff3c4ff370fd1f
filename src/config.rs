//! Host configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` builds one `AppConfig` at startup and hands the relevant pieces to
//! the preference store and the shell dispatcher. Library code never reads
//! the environment directly.

use std::path::PathBuf;
use std::time::Duration;

use crate::prefs::theme::Theme;

pub const DEFAULT_SPLASH_DELAY_MS: u64 = 500;
pub const DEFAULT_PREFS_DIR: &str = ".sessiongate";
pub const DEFAULT_PREFS_NAMESPACE: &str = "akane-app-storage";
pub const DEFAULT_PREF_WRITE_RETRIES: usize = 2;
pub const DEFAULT_PREF_WRITE_RETRY_BASE_MS: u64 = 20;

/// Tuning knobs for the preference write-behind worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefWriteConfig {
    /// Attempts per durable write before it is logged and dropped.
    pub retries: usize,
    /// Base delay in milliseconds; the n-th retry waits n times this.
    pub retry_base_ms: u64,
}

impl Default for PrefWriteConfig {
    fn default() -> Self {
        Self { retries: DEFAULT_PREF_WRITE_RETRIES, retry_base_ms: DEFAULT_PREF_WRITE_RETRY_BASE_MS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Minimum time the splash screen stays up before the gate may render.
    pub splash_delay: Duration,
    /// Directory backing the file preference storage.
    pub prefs_dir: PathBuf,
    /// Item prefix for every persisted preference.
    pub prefs_namespace: String,
    pub pref_write: PrefWriteConfig,
    /// System color scheme reported by the host, if any.
    pub system_theme: Option<Theme>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SPLASH_DELAY_MS`: default 500
    /// - `PREFS_DIR`: default `.sessiongate`
    /// - `PREFS_NAMESPACE`: default `akane-app-storage`
    /// - `PREF_WRITE_RETRIES`: default 2
    /// - `PREF_WRITE_RETRY_BASE_MS`: default 20
    /// - `SYSTEM_THEME`: `light` or `dark`; anything else is ignored
    #[must_use]
    pub fn from_env() -> Self {
        let prefs_dir = match std::env::var("PREFS_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(DEFAULT_PREFS_DIR),
        };
        let prefs_namespace = match std::env::var("PREFS_NAMESPACE") {
            Ok(ns) if !ns.trim().is_empty() => ns,
            _ => DEFAULT_PREFS_NAMESPACE.to_string(),
        };
        let system_theme = match std::env::var("SYSTEM_THEME") {
            Ok(raw) => Theme::parse(raw.trim()),
            Err(_) => None,
        };

        Self {
            splash_delay: Duration::from_millis(env_parse("SPLASH_DELAY_MS", DEFAULT_SPLASH_DELAY_MS)),
            prefs_dir,
            prefs_namespace,
            pref_write: PrefWriteConfig {
                retries: env_parse("PREF_WRITE_RETRIES", DEFAULT_PREF_WRITE_RETRIES).max(1),
                retry_base_ms: env_parse("PREF_WRITE_RETRY_BASE_MS", DEFAULT_PREF_WRITE_RETRY_BASE_MS),
            },
            system_theme,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
