//! Typed facade over the field API for a single contact.

use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{self, RenderContext};
use crate::field::{Attribute, Field};
use crate::output::OutputSink;
use crate::provider::{ContactHandle, PimProvider, ProviderError};
use crate::value::{FieldValue, StoredValue};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InspectError {
    #[error("{field} has no value at index {index} ({count} values)")]
    InvalidIndex {
        field: Field,
        index: usize,
        count: usize,
    },

    #[error("{field} already holds {count} value(s); every field must be empty before populating")]
    FieldNotEmpty { field: Field, count: usize },

    #[error("{field} has no value to modify")]
    FieldValueMissing { field: Field },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Inspects and edits the fields of one contact.
///
/// The inspector borrows the store exclusively; the contact itself is owned by
/// the store and outlives the inspector.
pub struct ContactInspector<'a, P: PimProvider + ?Sized> {
    provider: &'a mut P,
    handle: ContactHandle,
    render: RenderContext,
}

impl<'a, P: PimProvider + ?Sized> ContactInspector<'a, P> {
    pub fn new(provider: &'a mut P, handle: ContactHandle) -> Self {
        Self {
            provider,
            handle,
            render: RenderContext::default(),
        }
    }

    pub fn with_render_context(mut self, render: RenderContext) -> Self {
        self.render = render;
        self
    }

    pub fn handle(&self) -> ContactHandle {
        self.handle
    }

    /// Print every value of every field, one line per value.
    pub fn print_all(&self, out: &mut dyn OutputSink) -> Result<(), InspectError> {
        let result = self.print_fields(out);
        self.report(out, result)
    }

    /// Insert one representative value into every field that has a sample.
    ///
    /// Nothing is written unless all of those fields are empty.
    pub fn populate_empty_fields(&mut self, out: &mut dyn OutputSink) -> Result<usize, InspectError> {
        let result = self.populate();
        if let Ok(added) = &result {
            out.line(&format!("Added {} values to contact {}", added, self.handle));
        }
        self.report(out, result)
    }

    /// Replace the first address with `address` under a custom label.
    pub fn modify_primary_address(
        &mut self,
        out: &mut dyn OutputSink,
        address: FieldValue,
        label: &str,
    ) -> Result<(), InspectError> {
        let result = self.modify_address(address, label);
        if result.is_ok() {
            out.line(&format!("Modified {} value 0 ({})", Field::Address, label));
        }
        self.report(out, result)
    }

    /// Delete the value at `index` of `field`.
    pub fn remove_field_value(
        &mut self,
        out: &mut dyn OutputSink,
        field: Field,
        index: usize,
    ) -> Result<(), InspectError> {
        let result = self.remove(field, index);
        if result.is_ok() {
            out.line(&format!("Removed {} value {}", field, index));
        }
        self.report(out, result)
    }

    fn print_fields(&self, out: &mut dyn OutputSink) -> Result<(), InspectError> {
        for field in Field::ALL {
            let spec = catalog::spec(field);
            let count = self.provider.field_value_count(self.handle, field)?;
            for index in 0..count {
                let stored = self.provider.get_field_value(self.handle, field, index)?;
                let mut line = format!("{}: {}", spec.title, spec.render(&stored.value, &self.render));
                if spec.has_attributes() {
                    line.push_str(&format!(" ({})", self.describe_attribute(field, &stored)));
                }
                out.line(&line);
            }
        }
        Ok(())
    }

    fn populate(&mut self) -> Result<usize, InspectError> {
        let targets: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|field| catalog::spec(*field).sample.is_some())
            .collect();

        for &field in &targets {
            let count = self.provider.field_value_count(self.handle, field)?;
            if count > 0 {
                return Err(InspectError::FieldNotEmpty { field, count });
            }
        }

        let mut added = 0;
        for field in targets {
            let Some(sample) = catalog::spec(field).sample else {
                continue;
            };
            let sample = sample();
            self.provider.add_field_value(
                self.handle,
                field,
                sample.value,
                sample.attribute,
                sample.label,
            )?;
            added += 1;
        }
        debug!(handle = %self.handle, added, "populated contact");
        Ok(added)
    }

    fn modify_address(&mut self, address: FieldValue, label: &str) -> Result<(), InspectError> {
        let field = Field::Address;
        if self.provider.field_value_count(self.handle, field)? == 0 {
            return Err(InspectError::FieldValueMissing { field });
        }
        let previous = self.provider.get_field_value(self.handle, field, 0)?;
        self.provider
            .set_field_value(self.handle, field, 0, address, Attribute::CUSTOM, Some(label))?;
        debug!(handle = %self.handle, previous = %previous.value, label, "modified primary address");
        Ok(())
    }

    fn remove(&mut self, field: Field, index: usize) -> Result<(), InspectError> {
        let count = self.provider.field_value_count(self.handle, field)?;
        if index >= count {
            return Err(InspectError::InvalidIndex {
                field,
                index,
                count,
            });
        }
        self.provider.remove_value(self.handle, field, index)?;
        debug!(handle = %self.handle, %field, index, "removed field value");
        Ok(())
    }

    fn describe_attribute(&self, field: Field, stored: &StoredValue) -> String {
        attribute_name(
            field,
            stored.attribute,
            stored.label.as_deref(),
            |field, attribute| self.provider.attribute_display_name(field, attribute),
        )
    }

    fn report<T>(
        &self,
        out: &mut dyn OutputSink,
        result: Result<T, InspectError>,
    ) -> Result<T, InspectError> {
        if let Err(err) = &result {
            warn!(handle = %self.handle, error = %err, "contact operation failed");
            out.line(&format!("error: {}", err));
        }
        result
    }
}

/// Display name of an attribute; the custom tag is named by its label.
pub fn attribute_name<F>(field: Field, attribute: Attribute, label: Option<&str>, lookup: F) -> String
where
    F: Fn(Field, Attribute) -> String,
{
    if attribute.is_custom() {
        return label
            .filter(|label| !label.is_empty())
            .unwrap_or("custom")
            .to_string();
    }
    lookup(field, attribute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProvider;

    const TITLES: [(Field, &str); 20] = [
        (Field::Name, "Name"),
        (Field::Address, "Address"),
        (Field::Birthday, "Birthday"),
        (Field::Email, "Email"),
        (Field::FormattedAddress, "Formatted address"),
        (Field::Nickname, "Nickname"),
        (Field::Note, "Note"),
        (Field::Org, "Organization"),
        (Field::Photo, "Photo"),
        (Field::PhotoUrl, "Photo URL"),
        (Field::PublicKey, "Public key"),
        (Field::PublicKeyString, "Public key string"),
        (Field::Revision, "Revision"),
        (Field::Phone, "Phone"),
        (Field::Title, "Title"),
        (Field::Uid, "UID"),
        (Field::Url, "URL"),
        (Field::Im, "Instant message"),
        (Field::Relation, "Relation"),
        (Field::OrgInfo, "Organization info"),
    ];

    fn lines_for(lines: &[String], title: &str) -> usize {
        let prefix = format!("{}: ", title);
        lines.iter().filter(|line| line.starts_with(&prefix)).count()
    }

    fn new_contact() -> (MemoryProvider, ContactHandle) {
        let mut store = MemoryProvider::new();
        let handle = store.create_item(None).unwrap();
        (store, handle)
    }

    fn add(store: &mut MemoryProvider, handle: ContactHandle, field: Field, value: &str, attribute: Attribute) {
        store
            .add_field_value(handle, field, FieldValue::text(value), attribute, None)
            .unwrap();
    }

    #[test]
    fn test_print_all_emits_one_line_per_value() {
        let (mut store, handle) = new_contact();
        add(&mut store, handle, Field::Phone, "+1 202 555 0143", Attribute::PHONE_WORK);
        add(&mut store, handle, Field::Phone, "+1 202 555 0199", Attribute::PHONE_HOME);
        add(&mut store, handle, Field::Email, "a@example.com", Attribute::EMAIL_HOME);

        let mut out: Vec<String> = Vec::new();
        ContactInspector::new(&mut store, handle).print_all(&mut out).unwrap();

        for (field, title) in TITLES {
            let expected = store.field_value_count(handle, field).unwrap();
            assert_eq!(lines_for(&out, title), expected, "lines for {}", title);
        }
        assert!(out.contains(&"Phone: +12025550143 (work)".to_string()));
        assert!(out.contains(&"Email: a@example.com (home)".to_string()));
    }

    #[test]
    fn test_print_all_shows_label_of_custom_attribute() {
        let (mut store, handle) = new_contact();
        store
            .add_field_value(
                handle,
                Field::Relation,
                FieldValue::text("Ada"),
                Attribute::CUSTOM,
                Some("Mentor"),
            )
            .unwrap();

        let mut out: Vec<String> = Vec::new();
        ContactInspector::new(&mut store, handle).print_all(&mut out).unwrap();
        assert!(out.contains(&"Relation: Ada (Mentor)".to_string()));
    }

    #[test]
    fn test_remove_out_of_range_fails_and_keeps_values() {
        let (mut store, handle) = new_contact();
        add(&mut store, handle, Field::Email, "a@example.com", Attribute::EMAIL_HOME);
        add(&mut store, handle, Field::Email, "b@example.com", Attribute::EMAIL_WORK);

        let mut out: Vec<String> = Vec::new();
        let err = ContactInspector::new(&mut store, handle)
            .remove_field_value(&mut out, Field::Email, 2)
            .unwrap_err();

        assert_eq!(
            err,
            InspectError::InvalidIndex {
                field: Field::Email,
                index: 2,
                count: 2
            }
        );
        assert_eq!(out, vec!["error: EMAIL has no value at index 2 (2 values)".to_string()]);
        assert_eq!(store.field_value_count(handle, Field::Email).unwrap(), 2);
        assert_eq!(
            store.get_field_value(handle, Field::Email, 1).unwrap().value,
            FieldValue::text("b@example.com")
        );
    }

    #[test]
    fn test_populate_refuses_non_empty_contact_without_mutating() {
        let (mut store, handle) = new_contact();
        add(&mut store, handle, Field::Title, "Engineer", Attribute::NONE);
        let before: Vec<usize> = Field::ALL
            .iter()
            .map(|field| store.field_value_count(handle, *field).unwrap())
            .collect();

        let mut out: Vec<String> = Vec::new();
        let err = ContactInspector::new(&mut store, handle)
            .populate_empty_fields(&mut out)
            .unwrap_err();

        assert_eq!(err, InspectError::FieldNotEmpty { field: Field::Title, count: 1 });
        let after: Vec<usize> = Field::ALL
            .iter()
            .map(|field| store.field_value_count(handle, *field).unwrap())
            .collect();
        assert_eq!(before, after);
        assert!(out[0].starts_with("error: TITLE already holds 1 value(s)"));
    }

    #[test]
    fn test_modify_primary_address_without_address_fails() {
        let (mut store, handle) = new_contact();
        let mut out: Vec<String> = Vec::new();
        let err = ContactInspector::new(&mut store, handle)
            .modify_primary_address(&mut out, FieldValue::structured(["", "", "Elm St"]), "Cabin")
            .unwrap_err();
        assert_eq!(err, InspectError::FieldValueMissing { field: Field::Address });
        assert_eq!(store.field_value_count(handle, Field::Address).unwrap(), 0);
    }

    #[test]
    fn test_modify_primary_address_sets_custom_label() {
        let (mut store, handle) = new_contact();
        store
            .add_field_value(
                handle,
                Field::Address,
                FieldValue::structured(["", "", "Old St"]),
                Attribute::ADDR_WORK,
                None,
            )
            .unwrap();

        let mut out: Vec<String> = Vec::new();
        ContactInspector::new(&mut store, handle)
            .modify_primary_address(&mut out, FieldValue::structured(["", "", "Elm St", "Oslo"]), "Cabin")
            .unwrap();

        let stored = store.get_field_value(handle, Field::Address, 0).unwrap();
        assert_eq!(stored.attribute, Attribute::CUSTOM);
        assert_eq!(stored.label.as_deref(), Some("Cabin"));
        assert_eq!(
            stored.value,
            FieldValue::structured(["", "", "Elm St", "Oslo", "", "", "", ""])
        );
        assert_eq!(out, vec!["Modified ADDR value 0 (Cabin)".to_string()]);
    }

    #[test]
    fn test_populate_print_remove_scenario() {
        let (mut store, handle) = new_contact();
        let mut out: Vec<String> = Vec::new();
        let mut inspector = ContactInspector::new(&mut store, handle);
        assert_eq!(inspector.handle(), handle);

        let added = inspector.populate_empty_fields(&mut out).unwrap();
        assert_eq!(added, 15);

        out.clear();
        inspector.print_all(&mut out).unwrap();
        for (field, title) in TITLES {
            let expected = usize::from(catalog::spec(field).sample.is_some()
                || matches!(field, Field::Uid | Field::Revision));
            assert_eq!(lines_for(&out, title), expected, "lines for {}", title);
        }
        assert!(out.contains(&"Email: jane.doe@club.example (Club)".to_string()));

        inspector.remove_field_value(&mut out, Field::Note, 0).unwrap();
        drop(inspector);
        assert_eq!(store.field_value_count(handle, Field::Note).unwrap(), 0);
    }

    #[test]
    fn test_provider_errors_are_reported() {
        let mut store = MemoryProvider::new();
        let ghost = ContactHandle::new(7);
        let mut out: Vec<String> = Vec::new();
        let err = ContactInspector::new(&mut store, ghost)
            .print_all(&mut out)
            .unwrap_err();
        assert_eq!(err, InspectError::Provider(ProviderError::UnknownHandle(ghost)));
        assert_eq!(out, vec!["error: no contact with handle 7".to_string()]);
    }

    #[test]
    fn test_attribute_name_prefers_label_for_custom() {
        let lookup = |field, attribute| catalog::attribute_name(field, attribute);
        assert_eq!(attribute_name(Field::Phone, Attribute::CUSTOM, Some("Boat"), lookup), "Boat");
        assert_eq!(attribute_name(Field::Phone, Attribute::CUSTOM, None, lookup), "custom");
        assert_eq!(
            attribute_name(Field::Phone, Attribute::PHONE_CAR, None, lookup),
            "car"
        );
    }
}
