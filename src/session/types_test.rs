use super::*;

fn sample_session() -> AuthSession {
    AuthSession {
        identity: Identity {
            id: Uuid::nil(),
            email: "alice@example.com".into(),
            name: Some("Alice".into()),
            avatar_url: None,
        },
        token: Token::new("secret-token"),
    }
}

// =============================================================================
// Token
// =============================================================================

#[test]
fn token_debug_is_redacted() {
    let token = Token::new("secret-token");
    let rendered = format!("{token:?}");
    assert!(!rendered.contains("secret"));
    assert_eq!(token.expose(), "secret-token");
}

#[test]
fn authenticated_session_debug_hides_token() {
    let session = Session::Authenticated(sample_session());
    assert!(!format!("{session:?}").contains("secret-token"));
}

// =============================================================================
// Session accessors
// =============================================================================

#[test]
fn default_session_is_unknown() {
    let session = Session::default();
    assert_eq!(session.status(), SessionStatus::Unknown);
    assert!(session.identity().is_none());
    assert!(session.token().is_none());
}

#[test]
fn authenticated_session_exposes_identity_and_token() {
    let session = Session::Authenticated(sample_session());
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.identity().map(|i| i.email.as_str()), Some("alice@example.com"));
    assert!(session.token().is_some());
}

#[test]
fn unauthenticated_session_has_no_identity() {
    let session = Session::Unauthenticated;
    assert_eq!(session.status(), SessionStatus::Unauthenticated);
    assert!(session.identity().is_none());
}

#[test]
fn from_provider_maps_absence_to_unauthenticated() {
    assert_eq!(Session::from_provider(None), Session::Unauthenticated);
    assert_eq!(Session::from_provider(Some(sample_session())).status(), SessionStatus::Authenticated);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn identity_serialization_skips_missing_fields() {
    let identity = sample_session().identity;
    let json = serde_json::to_value(&identity).unwrap();
    assert_eq!(json["email"], "alice@example.com");
    assert_eq!(json["name"], "Alice");
    assert!(json.get("avatar_url").is_none());
}

#[test]
fn session_status_serializes_snake_case() {
    let json = serde_json::to_string(&SessionStatus::Unauthenticated).unwrap();
    assert_eq!(json, "\"unauthenticated\"");
}
