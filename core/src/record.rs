//! The stored login-attempt record.

use serde::{Deserialize, Serialize};

/// One row of the `Data` table: a single observed login attempt.
///
/// `number` is assigned by the store on insert; every other column is
/// optional at the storage layer (mandatory-field enforcement belongs to
/// the [validator](crate::RecordValidator), not the schema).
///
/// # Examples
///
/// ```
/// use ssh_alert_core::AttemptRecord;
///
/// let record = AttemptRecord {
///     number: 1,
///     ip: Some("10.0.0.1".to_string()),
///     count: Some(3),
///     ..Default::default()
/// };
/// assert_eq!(record.ip.as_deref(), Some("10.0.0.1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Store-assigned primary key, monotonically increasing.
    pub number: i64,
    /// Attempt count reported by the caller.
    pub count: Option<i64>,
    /// Date of the attempt (`YYYY-MM-DD`).
    pub date: Option<String>,
    /// Time of the attempt (`HH:MM[:SS]`).
    pub time: Option<String>,
    /// Source address.
    pub ip: Option<String>,
    /// Attempted username.
    pub username: Option<String>,
    /// Attempted password.
    pub password: Option<String>,
    /// Client/protocol version string.
    pub version: Option<String>,
    /// Opaque session token.
    pub session_id: Option<String>,
    /// Geolocation label.
    pub location: Option<String>,
}
