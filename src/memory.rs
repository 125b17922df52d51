//! In-memory contact list implementing [`PimProvider`].

use std::collections::BTreeMap;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::catalog;
use crate::field::{Attribute, Field};
use crate::provider::{ContactHandle, PimProvider, ProviderError};
use crate::value::{FieldValue, StoredValue};

#[derive(Debug)]
struct ContactRecord {
    handle: ContactHandle,
    fields: BTreeMap<Field, Vec<StoredValue>>,
}

impl ContactRecord {
    fn values(&self, field: Field) -> &[StoredValue] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    fn touch_revision(&mut self) {
        let stamp = StoredValue::new(
            FieldValue::DateTime(OffsetDateTime::now_utc()),
            Attribute::NONE,
        );
        self.fields.insert(Field::Revision, vec![stamp]);
    }
}

/// Contacts kept in list order; handles are never reused.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    last_handle: u32,
    contacts: Vec<ContactRecord>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    fn record(&self, handle: ContactHandle) -> Result<&ContactRecord, ProviderError> {
        self.contacts
            .iter()
            .find(|record| record.handle == handle)
            .ok_or(ProviderError::UnknownHandle(handle))
    }

    fn record_mut(&mut self, handle: ContactHandle) -> Result<&mut ContactRecord, ProviderError> {
        self.contacts
            .iter_mut()
            .find(|record| record.handle == handle)
            .ok_or(ProviderError::UnknownHandle(handle))
    }

    fn has_uid(&self, uid: &str) -> bool {
        self.contacts.iter().any(|record| {
            record
                .values(Field::Uid)
                .iter()
                .any(|stored| stored.value.as_text() == Some(uid))
        })
    }

    /// Validate a write and return the value in stored form.
    fn prepare(
        field: Field,
        value: FieldValue,
        attribute: Attribute,
        label: Option<&str>,
    ) -> Result<StoredValue, ProviderError> {
        let spec = catalog::spec(field);
        if !spec.writable {
            return Err(ProviderError::ReadOnlyField { field });
        }
        let value = spec.check(value, attribute, label)?;
        Ok(StoredValue {
            value,
            attribute,
            label: label.map(str::to_string),
        })
    }
}

impl PimProvider for MemoryProvider {
    fn create_item(&mut self, uid: Option<Uuid>) -> Result<ContactHandle, ProviderError> {
        let uid = uid.unwrap_or_else(Uuid::new_v4);
        if self.has_uid(&uid.to_string()) {
            return Err(ProviderError::DuplicateUid(uid));
        }

        self.last_handle += 1;
        let handle = ContactHandle::new(self.last_handle);
        let mut record = ContactRecord {
            handle,
            fields: BTreeMap::new(),
        };
        record.fields.insert(
            Field::Uid,
            vec![StoredValue::new(
                FieldValue::Text(uid.to_string()),
                Attribute::NONE,
            )],
        );
        record.touch_revision();
        self.contacts.push(record);

        debug!(%handle, %uid, "created contact");
        Ok(handle)
    }

    fn items(&self) -> Vec<ContactHandle> {
        self.contacts.iter().map(|record| record.handle).collect()
    }

    fn remove_item(&mut self, handle: ContactHandle) -> Result<(), ProviderError> {
        let position = self
            .contacts
            .iter()
            .position(|record| record.handle == handle)
            .ok_or(ProviderError::UnknownHandle(handle))?;
        self.contacts.remove(position);
        debug!(%handle, "removed contact");
        Ok(())
    }

    fn field_value_count(
        &self,
        handle: ContactHandle,
        field: Field,
    ) -> Result<usize, ProviderError> {
        Ok(self.record(handle)?.values(field).len())
    }

    fn get_field_value(
        &self,
        handle: ContactHandle,
        field: Field,
        index: usize,
    ) -> Result<StoredValue, ProviderError> {
        let values = self.record(handle)?.values(field);
        values
            .get(index)
            .cloned()
            .ok_or(ProviderError::IndexOutOfRange {
                field,
                index,
                count: values.len(),
            })
    }

    fn set_field_value(
        &mut self,
        handle: ContactHandle,
        field: Field,
        index: usize,
        value: FieldValue,
        attribute: Attribute,
        label: Option<&str>,
    ) -> Result<(), ProviderError> {
        let stored = Self::prepare(field, value, attribute, label)?;
        let record = self.record_mut(handle)?;
        let count = record.values(field).len();
        let slot = record
            .fields
            .get_mut(&field)
            .and_then(|values| values.get_mut(index))
            .ok_or(ProviderError::IndexOutOfRange {
                field,
                index,
                count,
            })?;
        *slot = stored;
        record.touch_revision();
        Ok(())
    }

    fn add_field_value(
        &mut self,
        handle: ContactHandle,
        field: Field,
        value: FieldValue,
        attribute: Attribute,
        label: Option<&str>,
    ) -> Result<usize, ProviderError> {
        let stored = Self::prepare(field, value, attribute, label)?;
        let singular = catalog::spec(field).singular;
        let record = self.record_mut(handle)?;
        let values = record.fields.entry(field).or_default();
        if singular && !values.is_empty() {
            return Err(ProviderError::FieldFull { field });
        }
        values.push(stored);
        let index = values.len() - 1;
        record.touch_revision();
        Ok(index)
    }

    fn remove_value(
        &mut self,
        handle: ContactHandle,
        field: Field,
        index: usize,
    ) -> Result<(), ProviderError> {
        if !catalog::spec(field).writable {
            return Err(ProviderError::ReadOnlyField { field });
        }
        let record = self.record_mut(handle)?;
        let count = record.values(field).len();
        if index >= count {
            return Err(ProviderError::IndexOutOfRange {
                field,
                index,
                count,
            });
        }
        if count == 1 {
            record.fields.remove(&field);
        } else if let Some(values) = record.fields.get_mut(&field) {
            values.remove(index);
        }
        record.touch_revision();
        Ok(())
    }
}
