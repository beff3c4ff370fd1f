//! Session-gated app shell: authentication session tracking, persisted
//! preferences, and the navigation gate that ties them to routes.

pub mod config;
pub mod error;
pub mod gate;
pub mod prefs;
pub mod session;
pub mod shell;

mod util;
