//! Core types for recording SSH login attempts.
//!
//! This crate defines the storage-independent vocabulary shared by the
//! store and the CLI:
//!
//! - [`LogicalField`] — the closed catalog of caller-facing field names
//!   and their canonical column names.
//! - [`FieldValue`] / [`FieldMap`] — caller-supplied fields and
//!   query/delete conditions.
//! - [`AttemptRecord`] — one stored login attempt.
//! - [`RecordValidator`] / [`RequiredFields`] — mandatory-field
//!   enforcement consulted before insertion.
//!
//! # Example
//!
//! ```
//! use ssh_alert_core::{LogicalField, RecordValidator, RequiredFields, fields_from};
//!
//! let fields = fields_from([("IP", "192.0.2.7".into()), ("count", 2.into())]);
//! assert_eq!(LogicalField::parse("IP"), Some(LogicalField::Ip));
//!
//! let validator = RequiredFields::new(vec![LogicalField::Ip, LogicalField::Count]);
//! assert!(validator.validate(&fields).is_empty());
//! ```

mod fields;
mod record;
mod validate;

pub use fields::{FieldMap, FieldValue, LogicalField, fields_from};
pub use record::AttemptRecord;
pub use validate::{RecordValidator, RequiredFields, ValidationError};
