use std::fmt;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::field::Attribute;

/// Shape of the data a field stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Date,
    DateTime,
    Blob,
    Structured,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Date => "date",
            ValueKind::DateTime => "timestamp",
            ValueKind::Blob => "binary",
            ValueKind::Structured => "structured",
        };
        f.write_str(name)
    }
}

/// A single value stored in a contact field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(Date),
    DateTime(OffsetDateTime),
    Blob(Vec<u8>),
    /// Ordered components, e.g. the parts of a postal address.
    Structured(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn structured<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Structured(parts.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Date(_) => ValueKind::Date,
            FieldValue::DateTime(_) => ValueKind::DateTime,
            FieldValue::Blob(_) => ValueKind::Blob,
            FieldValue::Structured(_) => ValueKind::Structured,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Date(date) => {
                let formatted = date
                    .format(format_description!("[year]-[month]-[day]"))
                    .map_err(|_| fmt::Error)?;
                f.write_str(&formatted)
            }
            FieldValue::DateTime(stamp) => {
                let formatted = stamp.format(&Rfc3339).map_err(|_| fmt::Error)?;
                f.write_str(&formatted)
            }
            FieldValue::Blob(bytes) => write!(f, "{} bytes", bytes.len()),
            FieldValue::Structured(parts) => f.write_str(&parts.join(";")),
        }
    }
}

/// A value as held by the store, together with its attribute and label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub value: FieldValue,
    pub attribute: Attribute,
    pub label: Option<String>,
}

impl StoredValue {
    pub fn new(value: FieldValue, attribute: Attribute) -> Self {
        Self {
            value,
            attribute,
            label: None,
        }
    }
}
