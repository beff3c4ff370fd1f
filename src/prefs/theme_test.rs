use std::sync::Arc;

use super::*;
use crate::config::PrefWriteConfig;
use crate::prefs::storage::MemoryStorage;

fn prefs(storage: &MemoryStorage) -> PreferenceStore {
    PreferenceStore::start(Arc::new(storage.clone()), "theme-test", PrefWriteConfig::default()).0
}

// =============================================================================
// Theme
// =============================================================================

#[test]
fn parse_accepts_known_names_only() {
    assert_eq!(Theme::parse("light"), Some(Theme::Light));
    assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
    assert_eq!(Theme::parse("Dark"), None);
    assert_eq!(Theme::parse(""), None);
}

#[test]
fn toggled_flips() {
    assert_eq!(Theme::Light.toggled(), Theme::Dark);
    assert_eq!(Theme::Dark.toggled(), Theme::Light);
}

#[test]
fn palettes_differ_by_theme() {
    assert_eq!(Theme::Light.palette().background, "#ffffff");
    assert_eq!(Theme::Dark.palette().background, "#0f172a");
}

#[test]
fn theme_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
}

// =============================================================================
// ThemeController
// =============================================================================

#[tokio::test]
async fn defaults_to_light_without_system_or_choice() {
    let controller = ThemeController::new(prefs(&MemoryStorage::new()), None);
    assert_eq!(controller.current(), Theme::Light);
    assert_eq!(controller.explicit(), None);
}

#[tokio::test]
async fn follows_system_until_explicit_choice() {
    let mut controller = ThemeController::new(prefs(&MemoryStorage::new()), Some(Theme::Dark));
    assert_eq!(controller.current(), Theme::Dark);

    assert_eq!(controller.system_changed(Some(Theme::Light)), Theme::Light);

    controller.set(Theme::Dark);
    assert_eq!(controller.system_changed(Some(Theme::Light)), Theme::Dark);
    assert_eq!(controller.explicit(), Some(Theme::Dark));
}

#[tokio::test]
async fn toggle_stores_explicit_choice() {
    let controller = ThemeController::new(prefs(&MemoryStorage::new()), Some(Theme::Dark));
    assert_eq!(controller.toggle(), Theme::Light);
    assert_eq!(controller.explicit(), Some(Theme::Light));
    assert_eq!(controller.palette().background, "#ffffff");
}

#[tokio::test]
async fn invalid_stored_value_falls_back_to_system() {
    let store = prefs(&MemoryStorage::new());
    store.set(THEME_KEY, "sepia");
    let controller = ThemeController::new(store, Some(Theme::Dark));
    assert_eq!(controller.current(), Theme::Dark);
}

#[tokio::test]
async fn choice_persists_across_restart() {
    let storage = MemoryStorage::new();
    let store = prefs(&storage);
    ThemeController::new(store.clone(), None).set(Theme::Dark);
    store.flush().await;
    drop(store);

    let reopened = prefs(&storage);
    let controller = ThemeController::new(reopened.clone(), Some(Theme::Light));
    assert!(controller.is_loading());
    assert_eq!(controller.current(), Theme::Light);

    reopened.load_all().await.unwrap();
    assert!(!controller.is_loading());
    assert_eq!(controller.current(), Theme::Dark);
}
