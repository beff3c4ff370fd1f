//! Persisted user preferences.
//!
//! ARCHITECTURE
//! ============
//! `PreferenceStore` is the generic write-behind slice over a
//! `KeyValueStorage` backend. `theme` and `profile` are typed views over
//! specific keys. Nothing here feeds the navigation gate.

pub mod profile;
pub mod storage;
pub mod store;
pub mod theme;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{PrefChange, PreferenceStore};
pub use theme::{Theme, ThemeController};
