//! Logical field catalog for login-attempt records.
//!
//! Callers address record fields by case-insensitive logical names
//! (`ip`, `session_id`, …) while the storage layer uses canonical column
//! names (`IP`, `SessionID`, …). [`LogicalField`] is the closed set of
//! known fields and the single translation point between the two.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A logical field of a login-attempt record.
///
/// The variants form a closed catalog: every column of the `Data` table
/// has exactly one logical field, and parsing is case-insensitive over
/// both the logical spelling and the canonical column spelling.
///
/// # Examples
///
/// ```
/// use ssh_alert_core::LogicalField;
///
/// assert_eq!(LogicalField::parse("ip"), Some(LogicalField::Ip));
/// assert_eq!(LogicalField::parse("SessionID"), Some(LogicalField::SessionId));
/// assert_eq!(LogicalField::Ip.column(), "IP");
/// assert_eq!(LogicalField::parse("hostname"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalField {
    /// Source address of the attempt.
    Ip,
    /// Password the client tried.
    Password,
    /// Client/protocol version string.
    Version,
    /// Opaque session token.
    SessionId,
    /// Geolocation label.
    Location,
    /// Calendar date of the attempt (`YYYY-MM-DD`).
    Date,
    /// Wall-clock time of the attempt (`HH:MM[:SS]`).
    Time,
    /// Username the client tried.
    UserName,
    /// Attempt count.
    Count,
    /// Store-assigned primary key.
    Number,
}

impl LogicalField {
    /// The complete catalog, in column order.
    pub const ALL: [LogicalField; 10] = [
        LogicalField::Number,
        LogicalField::Count,
        LogicalField::Date,
        LogicalField::Time,
        LogicalField::Ip,
        LogicalField::UserName,
        LogicalField::Password,
        LogicalField::Version,
        LogicalField::SessionId,
        LogicalField::Location,
    ];

    /// Resolves a caller-facing field name, case-insensitively.
    ///
    /// Accepts both logical spellings (`session_id`) and canonical column
    /// spellings (`SessionID`). Returns `None` for names outside the
    /// catalog.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ip" => Some(LogicalField::Ip),
            "password" => Some(LogicalField::Password),
            "version" => Some(LogicalField::Version),
            "session_id" | "sessionid" => Some(LogicalField::SessionId),
            "location" => Some(LogicalField::Location),
            "date" => Some(LogicalField::Date),
            "time" => Some(LogicalField::Time),
            "username" | "user_name" => Some(LogicalField::UserName),
            "count" => Some(LogicalField::Count),
            "number" => Some(LogicalField::Number),
            _ => None,
        }
    }

    /// The canonical column name in the `Data` table.
    pub fn column(&self) -> &'static str {
        match self {
            LogicalField::Ip => "IP",
            LogicalField::Password => "Password",
            LogicalField::Version => "Version",
            LogicalField::SessionId => "SessionID",
            LogicalField::Location => "Location",
            LogicalField::Date => "Date",
            LogicalField::Time => "Time",
            LogicalField::UserName => "UserName",
            LogicalField::Count => "Count",
            LogicalField::Number => "Number",
        }
    }
}

/// A caller-supplied field value.
///
/// The store only distinguishes integers (`Count`, `Number`) from text;
/// everything else is stored as text.
///
/// # Examples
///
/// ```
/// use ssh_alert_core::FieldValue;
///
/// let ip: FieldValue = "10.0.0.1".into();
/// let count: FieldValue = 3.into();
/// assert_eq!(ip, FieldValue::Text("10.0.0.1".to_string()));
/// assert_eq!(count, FieldValue::Integer(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// An integer value.
    Integer(i64),
    /// A text value.
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

/// An ordered mapping of caller-facing field names to values.
///
/// Used both for insert fields and for query/delete conditions. The
/// ordered map keeps generated SQL deterministic for a given set of keys.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Builds a [`FieldMap`] from name/value pairs.
///
/// Convenience for call sites that assemble fields programmatically.
///
/// # Examples
///
/// ```
/// use ssh_alert_core::fields_from;
///
/// let fields = fields_from([("ip", "10.0.0.1".into()), ("count", 3.into())]);
/// assert_eq!(fields.len(), 2);
/// ```
pub fn fields_from<const N: usize>(pairs: [(&str, FieldValue); N]) -> FieldMap {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(LogicalField::parse("IP"), Some(LogicalField::Ip));
        assert_eq!(LogicalField::parse("Ip"), Some(LogicalField::Ip));
        assert_eq!(LogicalField::parse("USERNAME"), Some(LogicalField::UserName));
        assert_eq!(LogicalField::parse("Session_Id"), Some(LogicalField::SessionId));
    }

    #[test]
    fn test_parse_accepts_canonical_spellings() {
        for field in LogicalField::ALL {
            assert_eq!(LogicalField::parse(field.column()), Some(field));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!(LogicalField::parse("hostname"), None);
        assert_eq!(LogicalField::parse(""), None);
        assert_eq!(LogicalField::parse("ip address"), None);
    }

    #[test]
    fn test_catalog_covers_all_columns() {
        let columns: Vec<&str> = LogicalField::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(
            columns,
            [
                "Number", "Count", "Date", "Time", "IP", "UserName", "Password", "Version",
                "SessionID", "Location"
            ]
        );
    }

    #[test]
    fn test_field_value_conversions() {
        assert_eq!(FieldValue::from("a"), FieldValue::Text("a".to_string()));
        assert_eq!(FieldValue::from(7i64), FieldValue::Integer(7));
        assert_eq!(FieldValue::from(7u32), FieldValue::Integer(7));
    }

    #[test]
    fn test_fields_from_builds_ordered_map() {
        let fields = fields_from([("ip", "1.2.3.4".into()), ("count", 1.into())]);
        let keys: Vec<&String> = fields.keys().collect();
        assert_eq!(keys, ["count", "ip"]);
    }
}
