//! Session record types.
//!
//! [`Session`] is the persisted item. Its serde representation is the wire
//! shape of the session table: camelCase attribute names, epoch-second
//! timestamps (see [`epoch`]), and absent optional attributes omitted rather
//! than null.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Primary key of a session record.
///
/// Opaque to callers. Generated identifiers are random (version 4) UUIDs
/// rendered in hyphenated form, giving 122 bits of entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-use authorization code attached to a session.
///
/// Same generation scheme as [`SessionId`]. `Debug` output is redacted so
/// codes never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    /// Generate a new random authorization code.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AuthorizationCode {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for AuthorizationCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationCode(<redacted>)")
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Epoch Timestamps
// ═══════════════════════════════════════════════════════════════════════

/// Serde adapter for epoch attributes.
///
/// Writes whole epoch seconds. Reads seconds or milliseconds: items written
/// by earlier producers carry `createdDate` in milliseconds, so any value
/// at or above [`MILLIS_THRESHOLD`](epoch::MILLIS_THRESHOLD) is taken as
/// milliseconds.
pub mod epoch {
    use chrono::{DateTime, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Smallest value read as milliseconds (1e11 seconds is in the year 5138).
    pub const MILLIS_THRESHOLD: i64 = 100_000_000_000;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EpochValue {
        Integer(i64),
        Float(f64),
    }

    /// Serialize as whole epoch seconds.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(
        instant: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(instant.timestamp())
    }

    /// Deserialize epoch seconds or epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a number or is out of range.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        #[allow(clippy::cast_possible_truncation)]
        let value = match EpochValue::deserialize(deserializer)? {
            EpochValue::Integer(value) => value,
            // cjson may hand back integral floats
            EpochValue::Float(value) if value.is_finite() => value.trunc() as i64,
            EpochValue::Float(value) => {
                return Err(de::Error::custom(format!("invalid epoch timestamp {value}")));
            }
        };

        let instant = if value.abs() >= MILLIS_THRESHOLD {
            DateTime::from_timestamp_millis(value).map(|instant| instant.trunc_subsecs(0))
        } else {
            DateTime::from_timestamp(value, 0)
        };

        instant.ok_or_else(|| de::Error::custom(format!("epoch timestamp {value} out of range")))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session Record
// ═══════════════════════════════════════════════════════════════════════

/// An authorization code together with the end of its validity window.
///
/// The two wire attributes (`authorizationCode`,
/// `authorizationCodeExpiryDate`) only ever travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedAuthorizationCode {
    /// The code itself.
    #[serde(rename = "authorizationCode")]
    pub code: AuthorizationCode,

    /// Instant after which the code is no longer valid.
    #[serde(
        rename = "authorizationCodeExpiryDate",
        with = "epoch"
    )]
    pub expires_at: DateTime<Utc>,
}

impl IssuedAuthorizationCode {
    /// Whether the code is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A per-authorization-attempt session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Primary key. Assigned at creation, never changes.
    pub session_id: SessionId,

    /// Creation timestamp.
    #[serde(with = "epoch")]
    pub created_date: DateTime<Utc>,

    /// Instant after which the session is invalid for any operation.
    #[serde(with = "epoch")]
    pub expiry_date: DateTime<Utc>,

    /// Caller correlation value for the flow (the `state` parameter).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Client that started the flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Where the client expects to be sent back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Subject the session is for, when already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Long-lived browser session this record belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_session_id: Option<String>,

    /// Client-side session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_session_id: Option<String>,

    /// Address the request came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,

    /// Authentication attempts made within this session.
    ///
    /// Starts at zero. Nothing in this crate increments it.
    #[serde(default)]
    pub attempt_count: u32,

    /// Code issued once the user completed the flow.
    #[serde(flatten)]
    pub authorization_code: Option<IssuedAuthorizationCode>,
}

impl Session {
    /// Build a fresh record from a request summary.
    ///
    /// Timestamps are truncated to whole seconds, the precision of the
    /// persisted item, so the in-memory record equals what a read returns.
    #[must_use]
    pub fn from_request(
        session_id: SessionId,
        request: SessionRequestSummary,
        created_date: DateTime<Utc>,
        expiry_date: DateTime<Utc>,
    ) -> Self {
        let SessionRequestSummary {
            state,
            client_id,
            redirect_uri,
            subject,
            persistent_session_id,
            client_session_id,
            client_ip_address,
        } = request;

        Self {
            session_id,
            created_date: created_date.trunc_subsecs(0),
            expiry_date: expiry_date.trunc_subsecs(0),
            state,
            client_id,
            redirect_uri,
            subject,
            persistent_session_id,
            client_session_id,
            client_ip_address,
            attempt_count: 0,
            authorization_code: None,
        }
    }

    /// Whether the session is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }

    /// Whether the session carries an authorization code still valid at `now`.
    #[must_use]
    pub fn has_active_authorization_code(&self, now: DateTime<Utc>) -> bool {
        self.authorization_code
            .as_ref()
            .is_some_and(|issued| !issued.is_expired_at(now))
    }
}

/// Caller-supplied context captured when a flow begins.
///
/// No field is validated here; absent fields are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequestSummary {
    /// The flow's `state` parameter.
    pub state: Option<String>,
    /// Requesting client.
    pub client_id: Option<String>,
    /// Redirect URI presented by the client.
    pub redirect_uri: Option<String>,
    /// Subject, when known up front.
    pub subject: Option<String>,
    /// Persistent browser session identifier.
    pub persistent_session_id: Option<String>,
    /// Client session identifier.
    pub client_session_id: Option<String>,
    /// Caller IP address.
    pub client_ip_address: Option<String>,
}

impl SessionRequestSummary {
    /// Create an empty request summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `state` parameter.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Set the client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Set the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the persistent session id.
    #[must_use]
    pub fn with_persistent_session_id(mut self, id: impl Into<String>) -> Self {
        self.persistent_session_id = Some(id.into());
        self
    }

    /// Set the client session id.
    #[must_use]
    pub fn with_client_session_id(mut self, id: impl Into<String>) -> Self {
        self.client_session_id = Some(id.into());
        self
    }

    /// Set the caller IP address.
    #[must_use]
    pub fn with_client_ip_address(mut self, address: impl Into<String>) -> Self {
        self.client_ip_address = Some(address.into());
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Partial Updates
// ═══════════════════════════════════════════════════════════════════════

/// Attribute set applied to an existing record by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Set `authorizationCode` and `authorizationCodeExpiryDate` together.
    AuthorizationCode(IssuedAuthorizationCode),
}

impl SessionUpdate {
    /// The attributes this update sets, keyed by wire name.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Serialization`](crate::SessionError) if the
    /// attributes cannot be encoded.
    pub fn to_attributes(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let value = match self {
            Self::AuthorizationCode(issued) => serde_json::to_value(issued)?,
        };

        match value {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(crate::SessionError::Serialization(format!(
                "update attributes must encode as an object, got {other}"
            ))),
        }
    }

    /// Apply the update to an in-memory record.
    pub fn apply(&self, session: &mut Session) {
        match self {
            Self::AuthorizationCode(issued) => {
                session.authorization_code = Some(issued.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[allow(clippy::unwrap_used)]
    fn sample_session() -> Session {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Session::from_request(
            SessionId::from("5f1c2a44-0d7e-4b7e-9a55-1f1b8a1e2c3d"),
            SessionRequestSummary::new()
                .with_state("xyz")
                .with_client_id("c1")
                .with_redirect_uri("https://rp.example/cb"),
            created,
            created + chrono::Duration::hours(1),
        )
    }

    #[test]
    fn test_generated_ids_are_unique_uuids() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(a.as_str()).is_ok());
        assert_ne!(AuthorizationCode::new(), AuthorizationCode::new());
    }

    #[test]
    fn test_from_request_defaults() {
        let session = sample_session();
        assert_eq!(session.attempt_count, 0);
        assert!(session.authorization_code.is_none());
        assert_eq!(session.state.as_deref(), Some("xyz"));
        assert!(session.subject.is_none());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_from_request_truncates_to_seconds() {
        let created = Utc.timestamp_opt(1_735_689_600, 999_000_000).unwrap();
        let session = Session::from_request(
            SessionId::new(),
            SessionRequestSummary::new(),
            created,
            created + chrono::Duration::seconds(30),
        );
        assert_eq!(session.created_date.timestamp_subsec_nanos(), 0);
        assert_eq!(session.created_date.timestamp(), 1_735_689_600);
        assert_eq!(session.expiry_date.timestamp(), 1_735_689_630);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_wire_shape() {
        let session = sample_session();
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["sessionId"], "5f1c2a44-0d7e-4b7e-9a55-1f1b8a1e2c3d");
        assert_eq!(value["createdDate"], 1_735_689_600);
        assert_eq!(value["expiryDate"], 1_735_693_200);
        assert_eq!(value["state"], "xyz");
        assert_eq!(value["clientId"], "c1");
        assert_eq!(value["redirectUri"], "https://rp.example/cb");
        assert_eq!(value["attemptCount"], 0);

        // Absent attributes are omitted, not null
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("subject"));
        assert!(!object.contains_key("authorizationCode"));
        assert!(!object.contains_key("authorizationCodeExpiryDate"));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_wire_shape_with_authorization_code() {
        let mut session = sample_session();
        let issued = IssuedAuthorizationCode {
            code: AuthorizationCode::from("code-1".to_string()),
            expires_at: session.created_date + chrono::Duration::minutes(5),
        };
        SessionUpdate::AuthorizationCode(issued.clone()).apply(&mut session);

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["authorizationCode"], "code-1");
        assert_eq!(value["authorizationCodeExpiryDate"], 1_735_689_900);

        let decoded: Session = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.authorization_code, Some(issued));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_decode_item_written_by_other_producers() {
        // Items written before this crate may carry explicit nulls and no attemptCount
        let item = serde_json::json!({
            "sessionId": "abc",
            "createdDate": 1_735_689_600,
            "expiryDate": 1_735_693_200,
            "state": null,
            "clientId": "c1"
        });

        let session: Session = serde_json::from_value(item).unwrap();
        assert_eq!(session.session_id.as_str(), "abc");
        assert!(session.state.is_none());
        assert_eq!(session.attempt_count, 0);
        assert!(session.authorization_code.is_none());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_decode_millisecond_created_date() {
        let item = serde_json::json!({
            "sessionId": "abc",
            "createdDate": 1_735_689_600_123_i64,
            "expiryDate": 1_735_693_200,
            "attemptCount": 0
        });

        let session: Session = serde_json::from_value(item).unwrap();
        assert_eq!(session.created_date.timestamp(), 1_735_689_600);
        assert_eq!(session.expiry_date.timestamp(), 1_735_693_200);
        assert!(session.expiry_date > session.created_date);

        // Re-encoded in seconds
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["createdDate"], 1_735_689_600);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_decode_float_epoch() {
        let item = r#"{"sessionId":"abc","createdDate":1735689600.0,"expiryDate":1.7356932e9}"#;

        let session: Session = serde_json::from_str(item).unwrap();
        assert_eq!(session.created_date.timestamp(), 1_735_689_600);
        assert_eq!(session.expiry_date.timestamp(), 1_735_693_200);
    }

    #[test]
    fn test_decode_rejects_non_numeric_epoch() {
        let item = r#"{"sessionId":"abc","createdDate":"yesterday","expiryDate":1735693200}"#;
        assert!(serde_json::from_str::<Session>(item).is_err());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_update_attributes_use_wire_names() {
        let expires_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 5, 0).unwrap();
        let update = SessionUpdate::AuthorizationCode(IssuedAuthorizationCode {
            code: AuthorizationCode::from("code-2".to_string()),
            expires_at,
        });

        let attributes = update.to_attributes().unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes["authorizationCode"], "code-2");
        assert_eq!(attributes["authorizationCodeExpiryDate"], 1_735_689_900);
    }

    #[test]
    fn test_authorization_code_debug_is_redacted() {
        let code = AuthorizationCode::from("super-secret".to_string());
        assert!(!format!("{code:?}").contains("super-secret"));
    }

    #[test]
    fn test_active_authorization_code() {
        let mut session = sample_session();
        let now = session.created_date;
        assert!(!session.has_active_authorization_code(now));

        session.authorization_code = Some(IssuedAuthorizationCode {
            code: AuthorizationCode::new(),
            expires_at: now + chrono::Duration::minutes(5),
        });
        assert!(session.has_active_authorization_code(now));
        assert!(!session.has_active_authorization_code(now + chrono::Duration::minutes(5)));
    }
}
