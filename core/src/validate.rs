//! Record validation.
//!
//! The store consults a [`RecordValidator`] before every insert. The
//! storage schema keeps all data columns optional; which fields a
//! recording call site must supply is business policy, expressed here as
//! [`RequiredFields`].
//!
//! # Examples
//!
//! ```
//! use ssh_alert_core::{RecordValidator, RequiredFields, fields_from};
//!
//! let validator = RequiredFields::standard();
//! let incomplete = fields_from([("ip", "10.0.0.1".into())]);
//! assert!(!validator.validate(&incomplete).is_empty());
//! ```

use thiserror::Error;

use crate::fields::{FieldMap, LogicalField};

/// Record validation errors.
///
/// Each variant names a specific problem with a caller-supplied record.
/// The `Display` impl provides the message handed back through the
/// store's `Validation` failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A mandatory field was not supplied.
    #[error("missing mandatory field: {0}")]
    MissingField(&'static str),
}

/// Validates a record before insertion.
///
/// Returns an empty vector when the record is acceptable. The store
/// reports only the first error's message, but implementations should
/// collect everything they find.
pub trait RecordValidator: Send + Sync {
    /// Checks the raw logical-field mapping as supplied by the caller,
    /// before any field-name normalization.
    fn validate(&self, fields: &FieldMap) -> Vec<ValidationError>;
}

/// Requires a configurable set of fields to be present.
///
/// A field counts as present when any supplied key resolves to it through
/// the catalog, so `ip`, `Ip`, and `IP` all satisfy an `Ip` requirement.
///
/// # Examples
///
/// ```
/// use ssh_alert_core::{LogicalField, RecordValidator, RequiredFields, fields_from};
///
/// let validator = RequiredFields::new(vec![LogicalField::Ip]);
/// assert!(validator.validate(&fields_from([("IP", "1.2.3.4".into())])).is_empty());
/// assert!(!validator.validate(&fields_from([("count", 1.into())])).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RequiredFields {
    required: Vec<LogicalField>,
}

impl RequiredFields {
    /// Creates a validator requiring exactly the given fields.
    pub fn new(required: Vec<LogicalField>) -> Self {
        Self { required }
    }

    /// The standard mandatory set for recorded attempts: IP, Password,
    /// Version, SessionID, Location, Date, Time, and Count. UserName and
    /// the store-assigned Number are never required.
    pub fn standard() -> Self {
        Self::new(vec![
            LogicalField::Ip,
            LogicalField::Password,
            LogicalField::Version,
            LogicalField::SessionId,
            LogicalField::Location,
            LogicalField::Date,
            LogicalField::Time,
            LogicalField::Count,
        ])
    }
}

impl RecordValidator for RequiredFields {
    fn validate(&self, fields: &FieldMap) -> Vec<ValidationError> {
        let supplied: Vec<LogicalField> =
            fields.keys().filter_map(|key| LogicalField::parse(key)).collect();

        self.required
            .iter()
            .filter(|field| !supplied.contains(field))
            .map(|field| ValidationError::MissingField(field.column()))
            .collect()
    }
}
