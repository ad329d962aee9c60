//! Integration tests for the session lifecycle: create, look up, issue a code.

use authflow_session::config::SessionConfig;
use authflow_session::environment::{Clock, StaticConfigProvider};
use authflow_session::mocks::{FixedClock, MockSessionTable, test_clock};
use authflow_session::providers::ConfigurationProvider;
use authflow_session::{SessionError, SessionId, SessionRequestSummary, SessionStore};
use chrono::Duration;

type TestStore = SessionStore<MockSessionTable, StaticConfigProvider<FixedClock>>;

/// Create a test store with mock collaborators.
fn create_test_store() -> (TestStore, MockSessionTable, FixedClock) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let table = MockSessionTable::new();
    let clock = test_clock();
    let store = SessionStore::new(
        table.clone(),
        StaticConfigProvider::new(
            SessionConfig::new("auth-sessions")
                .with_session_ttl(Duration::minutes(60))
                .with_authorization_code_ttl(Duration::seconds(300)),
            clock.clone(),
        ),
    );
    (store, table, clock)
}

fn full_request() -> SessionRequestSummary {
    SessionRequestSummary::new()
        .with_state("xyz")
        .with_client_id("c1")
        .with_redirect_uri("https://rp.example/cb")
        .with_subject("urn:subject:1234")
        .with_persistent_session_id("psid-1")
        .with_client_session_id("csid-1")
        .with_client_ip_address("192.0.2.10")
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_create_then_get_returns_fresh_record() {
    let (store, _, _) = create_test_store();

    let session_id = store.create_session(full_request()).await.unwrap();
    let session = store.get_session(Some(session_id.as_str())).await.unwrap();

    assert_eq!(session.session_id, session_id);
    assert_eq!(session.attempt_count, 0);
    assert!(session.authorization_code.is_none());

    assert_eq!(session.state.as_deref(), Some("xyz"));
    assert_eq!(session.client_id.as_deref(), Some("c1"));
    assert_eq!(session.redirect_uri.as_deref(), Some("https://rp.example/cb"));
    assert_eq!(session.subject.as_deref(), Some("urn:subject:1234"));
    assert_eq!(session.persistent_session_id.as_deref(), Some("psid-1"));
    assert_eq!(session.client_session_id.as_deref(), Some("csid-1"));
    assert_eq!(session.client_ip_address.as_deref(), Some("192.0.2.10"));
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_minimal_request_scenario() {
    let (store, _, _) = create_test_store();

    let session_id = store
        .create_session(
            SessionRequestSummary::new()
                .with_state("xyz")
                .with_client_id("c1")
                .with_redirect_uri("https://rp.example/cb"),
        )
        .await
        .unwrap();
    assert!(!session_id.as_str().is_empty());

    let session = store.get_session(Some(session_id.as_str())).await.unwrap();
    assert_eq!(session.state.as_deref(), Some("xyz"));
    assert_eq!(session.client_id.as_deref(), Some("c1"));
    assert_eq!(session.attempt_count, 0);
    assert!(session.authorization_code.is_none());

    // Fields the caller left out stay absent
    assert!(session.subject.is_none());
    assert!(session.client_ip_address.is_none());
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_expiry_matches_provider_at_creation() {
    let (store, _, clock) = create_test_store();
    let expected = store.config().session_expiration().unwrap();

    let session_id = store.create_session(full_request()).await.unwrap();
    let session = store.get_session(Some(session_id.as_str())).await.unwrap();

    assert_eq!(session.expiry_date, expected);
    assert_eq!(session.created_date, clock.now());
    assert!(session.expiry_date > session.created_date);
}

#[tokio::test]
async fn test_get_unknown_session_is_not_found() {
    let (store, _, _) = create_test_store();
    let never_created = SessionId::new();

    let result = store.get_session(Some(never_created.as_str())).await;

    assert_eq!(result, Err(SessionError::SessionNotFound));
}

#[tokio::test]
async fn test_get_without_identifier_is_not_found() {
    let (store, _, _) = create_test_store();

    assert_eq!(store.get_session(None).await, Err(SessionError::SessionNotFound));
    assert_eq!(store.get_session(Some("")).await, Err(SessionError::SessionNotFound));
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_issue_authorization_code() {
    let (store, _, _) = create_test_store();
    let session_id = store.create_session(full_request()).await.unwrap();
    let mut session = store.get_session(Some(session_id.as_str())).await.unwrap();

    store.issue_authorization_code(&mut session).await.unwrap();

    let stored = store.get_session(Some(session_id.as_str())).await.unwrap();
    let issued = stored.authorization_code.clone().unwrap();
    assert!(!issued.code.as_str().is_empty());
    assert!(issued.expires_at > stored.created_date);

    // The caller's copy mirrors the stored record
    assert_eq!(session, stored);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_reissue_overwrites_previous_code() {
    let (store, _, clock) = create_test_store();
    let session_id = store.create_session(full_request()).await.unwrap();
    let mut session = store.get_session(Some(session_id.as_str())).await.unwrap();

    store.issue_authorization_code(&mut session).await.unwrap();
    let first = session.authorization_code.clone().unwrap();

    clock.advance(Duration::seconds(10));
    store.issue_authorization_code(&mut session).await.unwrap();
    let second = session.authorization_code.clone().unwrap();

    assert_ne!(first.code, second.code);
    assert!(second.expires_at > first.expires_at);

    let stored = store.get_session(Some(session_id.as_str())).await.unwrap();
    assert_eq!(stored.authorization_code, Some(second));
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_identical_requests_create_independent_sessions() {
    let (store, table, _) = create_test_store();

    let first_id = store.create_session(full_request()).await.unwrap();
    let second_id = store.create_session(full_request()).await.unwrap();

    assert_ne!(first_id, second_id);
    assert_eq!(table.item_count().unwrap(), 2);

    // Issuing on one leaves the other alone
    let mut first = store.get_session(Some(first_id.as_str())).await.unwrap();
    store.issue_authorization_code(&mut first).await.unwrap();

    let second = store.get_session(Some(second_id.as_str())).await.unwrap();
    assert!(second.authorization_code.is_none());
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_store_outage_propagates_from_every_operation() {
    let (store, table, _) = create_test_store();
    let session_id = store.create_session(full_request()).await.unwrap();
    let mut session = store.get_session(Some(session_id.as_str())).await.unwrap();

    table.set_unavailable("service unavailable");
    let outage = SessionError::StoreUnavailable("service unavailable".to_string());

    assert_eq!(store.create_session(full_request()).await, Err(outage.clone()));
    assert_eq!(
        store.get_session(Some(session_id.as_str())).await,
        Err(outage.clone())
    );
    assert_eq!(store.issue_authorization_code(&mut session).await, Err(outage));

    // Nothing was retried behind the caller's back
    table.set_available();
    assert_eq!(table.item_count().unwrap(), 1);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_concurrent_issuance_is_last_write_wins() {
    let (store, _, _) = create_test_store();
    let session_id = store.create_session(full_request()).await.unwrap();
    let base = store.get_session(Some(session_id.as_str())).await.unwrap();

    let mut a = base.clone();
    let mut b = base;
    let (ra, rb) = tokio::join!(
        store.issue_authorization_code(&mut a),
        store.issue_authorization_code(&mut b)
    );
    ra.unwrap();
    rb.unwrap();

    let stored = store.get_session(Some(session_id.as_str())).await.unwrap();
    let stored_code = stored.authorization_code.unwrap();
    let a_code = a.authorization_code.unwrap();
    let b_code = b.authorization_code.unwrap();

    assert_ne!(a_code.code, b_code.code);
    assert!(stored_code == a_code || stored_code == b_code);
}
