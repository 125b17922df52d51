//! The PIM store seen through its handle-based field API.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::catalog;
use crate::field::{Attribute, Field};
use crate::value::{FieldValue, StoredValue, ValueKind};

/// Opaque identifier of one contact record owned by a [`PimProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactHandle(u32);

impl ContactHandle {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ContactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failures reported by the store for a single call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("no contact with handle {0}")]
    UnknownHandle(ContactHandle),

    #[error("{field} has no value at index {index} ({count} values)")]
    IndexOutOfRange {
        field: Field,
        index: usize,
        count: usize,
    },

    #[error("{field} expects a {expected} value, got {actual}")]
    ValueKindMismatch {
        field: Field,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("attribute {attribute} is not valid for {field}")]
    InvalidAttribute { field: Field, attribute: Attribute },

    #[error("{field}: only the custom attribute may carry a label")]
    LabelNotAllowed { field: Field },

    #[error("{field}: the custom attribute requires a label")]
    LabelRequired { field: Field },

    #[error("{field} holds a single value and already has one")]
    FieldFull { field: Field },

    #[error("{field} is maintained by the contact store and cannot be changed")]
    ReadOnlyField { field: Field },

    #[error("{field} takes at most {max} components, got {actual}")]
    TooManyComponents {
        field: Field,
        max: usize,
        actual: usize,
    },

    #[error("a contact with UID {0} already exists")]
    DuplicateUid(Uuid),
}

/// Handle-based access to a contact list.
///
/// Every call is independently atomic; there are no multi-field transactions.
pub trait PimProvider {
    /// Create an empty contact. A fresh UID is assigned when `uid` is `None`.
    fn create_item(&mut self, uid: Option<Uuid>) -> Result<ContactHandle, ProviderError>;

    /// Handles of all contacts in list order.
    fn items(&self) -> Vec<ContactHandle>;

    fn remove_item(&mut self, handle: ContactHandle) -> Result<(), ProviderError>;

    fn field_value_count(&self, handle: ContactHandle, field: Field)
        -> Result<usize, ProviderError>;

    fn get_field_value(
        &self,
        handle: ContactHandle,
        field: Field,
        index: usize,
    ) -> Result<StoredValue, ProviderError>;

    /// Overwrite the value at an existing index.
    fn set_field_value(
        &mut self,
        handle: ContactHandle,
        field: Field,
        index: usize,
        value: FieldValue,
        attribute: Attribute,
        label: Option<&str>,
    ) -> Result<(), ProviderError>;

    /// Append a value and return its index.
    fn add_field_value(
        &mut self,
        handle: ContactHandle,
        field: Field,
        value: FieldValue,
        attribute: Attribute,
        label: Option<&str>,
    ) -> Result<usize, ProviderError>;

    /// Delete the value at `index`; later values move down by one.
    fn remove_value(
        &mut self,
        handle: ContactHandle,
        field: Field,
        index: usize,
    ) -> Result<(), ProviderError>;

    fn attribute_display_name(&self, field: Field, attribute: Attribute) -> String {
        catalog::attribute_name(field, attribute)
    }
}
