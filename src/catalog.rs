//! Per-field dispatch table: how each contact field is validated, rendered
//! and populated with a representative value.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use time::macros::date;

use crate::field::{Attribute, Field};
use crate::phone;
use crate::provider::ProviderError;
use crate::value::{FieldValue, ValueKind};

/// Settings that influence how values are rendered.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub phone_region: Option<String>,
}

/// A representative value inserted when populating an empty contact.
#[derive(Debug, Clone)]
pub struct Sample {
    pub value: FieldValue,
    pub attribute: Attribute,
    pub label: Option<&'static str>,
}

pub struct FieldSpec {
    pub field: Field,
    pub title: &'static str,
    pub kind: ValueKind,
    /// Component names of structured values; empty for other kinds.
    pub components: &'static [&'static str],
    pub singular: bool,
    /// `false` for fields maintained by the store itself.
    pub writable: bool,
    pub attributes: &'static [(Attribute, &'static str)],
    pub render: fn(&FieldSpec, &FieldValue, &RenderContext) -> String,
    pub sample: Option<fn() -> Sample>,
}

impl FieldSpec {
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Display name of a well-known attribute, or of the custom tag.
    pub fn attribute_name(&self, attribute: Attribute) -> Option<&'static str> {
        if !self.has_attributes() {
            return None;
        }
        if attribute.is_custom() {
            return Some("custom");
        }
        self.attributes
            .iter()
            .find(|(candidate, _)| *candidate == attribute)
            .map(|(_, name)| *name)
    }

    pub fn render(&self, value: &FieldValue, ctx: &RenderContext) -> String {
        (self.render)(self, value, ctx)
    }

    /// Validate a value before it is stored.
    ///
    /// Structured values are padded to the full component list.
    pub fn check(
        &self,
        value: FieldValue,
        attribute: Attribute,
        label: Option<&str>,
    ) -> Result<FieldValue, ProviderError> {
        let field = self.field;
        if value.kind() != self.kind {
            return Err(ProviderError::ValueKindMismatch {
                field,
                expected: self.kind,
                actual: value.kind(),
            });
        }

        if attribute.is_custom() {
            if !self.has_attributes() {
                return Err(ProviderError::InvalidAttribute { field, attribute });
            }
            if label.map(str::trim).filter(|label| !label.is_empty()).is_none() {
                return Err(ProviderError::LabelRequired { field });
            }
        } else {
            if label.is_some() {
                return Err(ProviderError::LabelNotAllowed { field });
            }
            let known = if self.has_attributes() {
                self.attribute_name(attribute).is_some()
            } else {
                attribute == Attribute::NONE
            };
            if !known {
                return Err(ProviderError::InvalidAttribute { field, attribute });
            }
        }

        match value {
            FieldValue::Structured(mut parts) => {
                let max = self.components.len();
                if parts.len() > max {
                    return Err(ProviderError::TooManyComponents {
                        field,
                        max,
                        actual: parts.len(),
                    });
                }
                parts.resize(max, String::new());
                Ok(FieldValue::Structured(parts))
            }
            other => Ok(other),
        }
    }
}

/// Look up the table entry of a field.
pub fn spec(field: Field) -> &'static FieldSpec {
    // CATALOG is declared in `Field::ALL` order.
    &CATALOG[field as usize]
}

/// Display name of `attribute` within `field`, independent of any label.
pub fn attribute_name(field: Field, attribute: Attribute) -> String {
    match spec(field).attribute_name(attribute) {
        Some(name) => name.to_string(),
        None if attribute == Attribute::NONE => String::new(),
        None => format!("unknown ({})", attribute),
    }
}

const NAME_COMPONENTS: &[&str] = &[
    "family",
    "given",
    "other",
    "prefix",
    "suffix",
    "phonetic family",
    "phonetic given",
    "phonetic other",
];

const ADDRESS_COMPONENTS: &[&str] = &[
    "PO box",
    "extra",
    "street",
    "locality",
    "region",
    "postal code",
    "country",
    "neighborhood",
];

const IM_COMPONENTS: &[&str] = &["username", "protocol"];

const ORG_INFO_COMPONENTS: &[&str] = &[
    "department",
    "job description",
    "symbol",
    "phonetic name",
    "office location",
];

const NO_ATTRIBUTES: &[(Attribute, &str)] = &[];

const ADDRESS_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::ADDR_HOME, "home"),
    (Attribute::ADDR_WORK, "work"),
    (Attribute::ADDR_OTHER, "other"),
];

const EMAIL_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::EMAIL_HOME, "home"),
    (Attribute::EMAIL_WORK, "work"),
    (Attribute::EMAIL_MOBILE, "mobile"),
    (Attribute::EMAIL_OTHER, "other"),
];

const PHONE_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::PHONE_HOME, "home"),
    (Attribute::PHONE_MOBILE, "mobile"),
    (Attribute::PHONE_HOME_FAX, "home fax"),
    (Attribute::PHONE_WORK_FAX, "work fax"),
    (Attribute::PHONE_PAGER, "pager"),
    (Attribute::PHONE_IPHONE, "iPhone"),
    (Attribute::PHONE_WORK, "work"),
    (Attribute::PHONE_CALLBACK, "callback"),
    (Attribute::PHONE_CAR, "car"),
    (Attribute::PHONE_COMPANY_MAIN, "company main"),
    (Attribute::PHONE_ISDN, "ISDN"),
    (Attribute::PHONE_OTHER_FAX, "other fax"),
    (Attribute::PHONE_RADIO, "radio"),
    (Attribute::PHONE_TELEX, "telex"),
    (Attribute::PHONE_TTY_TDD, "TTY/TDD"),
    (Attribute::PHONE_WORK_MOBILE, "work mobile"),
    (Attribute::PHONE_WORK_PAGER, "work pager"),
    (Attribute::PHONE_ASSISTANT, "assistant"),
    (Attribute::PHONE_MMS, "MMS"),
    (Attribute::PHONE_OTHER, "other"),
];

const URL_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::URL_HOMEPAGE, "homepage"),
    (Attribute::URL_BLOG, "blog"),
    (Attribute::URL_PROFILE, "profile"),
    (Attribute::URL_HOME, "home"),
    (Attribute::URL_WORK, "work"),
    (Attribute::URL_FTP, "FTP"),
    (Attribute::URL_OTHER, "other"),
];

const IM_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::IM_HOME, "home"),
    (Attribute::IM_WORK, "work"),
    (Attribute::IM_OTHER, "other"),
];

const RELATION_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::RELATION_MOTHER, "mother"),
    (Attribute::RELATION_FATHER, "father"),
    (Attribute::RELATION_PARENT, "parent"),
    (Attribute::RELATION_SISTER, "sister"),
    (Attribute::RELATION_BROTHER, "brother"),
    (Attribute::RELATION_CHILD, "child"),
    (Attribute::RELATION_FRIEND, "friend"),
    (Attribute::RELATION_SPOUSE, "spouse"),
    (Attribute::RELATION_PARTNER, "partner"),
    (Attribute::RELATION_MANAGER, "manager"),
    (Attribute::RELATION_ASSISTANT, "assistant"),
    (Attribute::RELATION_DOMESTIC_PARTNER, "domestic partner"),
    (Attribute::RELATION_REFERRED_BY, "referred by"),
    (Attribute::RELATION_RELATIVE, "relative"),
];

const ORG_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::ORG_WORK, "work"),
    (Attribute::ORG_OTHER, "other"),
];

/// 1x1 transparent PNG.
const SAMPLE_PHOTO: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

const BLOB_PREVIEW_CHARS: usize = 16;

static CATALOG: [FieldSpec; 20] = [
    FieldSpec {
        field: Field::Name,
        title: "Name",
        kind: ValueKind::Structured,
        components: NAME_COMPONENTS,
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_structured,
        sample: Some(sample_name),
    },
    FieldSpec {
        field: Field::Address,
        title: "Address",
        kind: ValueKind::Structured,
        components: ADDRESS_COMPONENTS,
        singular: false,
        writable: true,
        attributes: ADDRESS_ATTRIBUTES,
        render: render_structured,
        sample: Some(sample_address),
    },
    FieldSpec {
        field: Field::Birthday,
        title: "Birthday",
        kind: ValueKind::Date,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_birthday),
    },
    FieldSpec {
        field: Field::Email,
        title: "Email",
        kind: ValueKind::Text,
        components: &[],
        singular: false,
        writable: true,
        attributes: EMAIL_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_email),
    },
    FieldSpec {
        field: Field::FormattedAddress,
        title: "Formatted address",
        kind: ValueKind::Text,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: None,
    },
    FieldSpec {
        field: Field::Nickname,
        title: "Nickname",
        kind: ValueKind::Text,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_nickname),
    },
    FieldSpec {
        field: Field::Note,
        title: "Note",
        kind: ValueKind::Text,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_note),
    },
    FieldSpec {
        field: Field::Org,
        title: "Organization",
        kind: ValueKind::Text,
        components: &[],
        singular: false,
        writable: true,
        attributes: ORG_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_org),
    },
    FieldSpec {
        field: Field::Photo,
        title: "Photo",
        kind: ValueKind::Blob,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_blob,
        sample: Some(sample_photo),
    },
    FieldSpec {
        field: Field::PhotoUrl,
        title: "Photo URL",
        kind: ValueKind::Text,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_photo_url),
    },
    FieldSpec {
        field: Field::PublicKey,
        title: "Public key",
        kind: ValueKind::Blob,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_blob,
        sample: None,
    },
    FieldSpec {
        field: Field::PublicKeyString,
        title: "Public key string",
        kind: ValueKind::Text,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: None,
    },
    FieldSpec {
        field: Field::Revision,
        title: "Revision",
        kind: ValueKind::DateTime,
        components: &[],
        singular: true,
        writable: false,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: None,
    },
    FieldSpec {
        field: Field::Phone,
        title: "Phone",
        kind: ValueKind::Text,
        components: &[],
        singular: false,
        writable: true,
        attributes: PHONE_ATTRIBUTES,
        render: render_phone,
        sample: Some(sample_phone),
    },
    FieldSpec {
        field: Field::Title,
        title: "Title",
        kind: ValueKind::Text,
        components: &[],
        singular: true,
        writable: true,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_title),
    },
    FieldSpec {
        field: Field::Uid,
        title: "UID",
        kind: ValueKind::Text,
        components: &[],
        singular: true,
        writable: false,
        attributes: NO_ATTRIBUTES,
        render: render_plain,
        sample: None,
    },
    FieldSpec {
        field: Field::Url,
        title: "URL",
        kind: ValueKind::Text,
        components: &[],
        singular: false,
        writable: true,
        attributes: URL_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_url),
    },
    FieldSpec {
        field: Field::Im,
        title: "Instant message",
        kind: ValueKind::Structured,
        components: IM_COMPONENTS,
        singular: false,
        writable: true,
        attributes: IM_ATTRIBUTES,
        render: render_structured,
        sample: Some(sample_im),
    },
    FieldSpec {
        field: Field::Relation,
        title: "Relation",
        kind: ValueKind::Text,
        components: &[],
        singular: false,
        writable: true,
        attributes: RELATION_ATTRIBUTES,
        render: render_plain,
        sample: Some(sample_relation),
    },
    FieldSpec {
        field: Field::OrgInfo,
        title: "Organization info",
        kind: ValueKind::Structured,
        components: ORG_INFO_COMPONENTS,
        singular: true,
        writable: true,
        attributes: ORG_ATTRIBUTES,
        render: render_structured,
        sample: Some(sample_org_info),
    },
];

fn render_plain(_spec: &FieldSpec, value: &FieldValue, _ctx: &RenderContext) -> String {
    value.to_string()
}

fn render_phone(_spec: &FieldSpec, value: &FieldValue, ctx: &RenderContext) -> String {
    match value {
        FieldValue::Text(raw) => phone::display_value(raw, ctx.phone_region.as_deref()),
        other => other.to_string(),
    }
}

fn render_structured(spec: &FieldSpec, value: &FieldValue, _ctx: &RenderContext) -> String {
    let FieldValue::Structured(parts) = value else {
        return value.to_string();
    };
    parts
        .iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(idx, part)| match spec.components.get(idx) {
            Some(component) => format!("{}: {}", component, part),
            None => part.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_blob(_spec: &FieldSpec, value: &FieldValue, _ctx: &RenderContext) -> String {
    let FieldValue::Blob(bytes) = value else {
        return value.to_string();
    };
    let encoded = STANDARD.encode(bytes);
    if encoded.len() > BLOB_PREVIEW_CHARS {
        format!(
            "{} bytes, base64 {}...",
            bytes.len(),
            &encoded[..BLOB_PREVIEW_CHARS]
        )
    } else {
        format!("{} bytes, base64 {}", bytes.len(), encoded)
    }
}

fn sample_name() -> Sample {
    Sample {
        value: FieldValue::structured(["Doe", "Jane", "Marie", "Dr.", "PhD"]),
        attribute: Attribute::NONE,
        label: None,
    }
}

fn sample_address() -> Sample {
    Sample {
        value: FieldValue::structured([
            "",
            "Apt 4",
            "221 Baker Street",
            "London",
            "Greater London",
            "NW1 6XE",
            "United Kingdom",
            "Marylebone",
        ]),
        attribute: Attribute::ADDR_HOME,
        label: None,
    }
}

fn sample_birthday() -> Sample {
    Sample {
        value: FieldValue::Date(date!(1985-06-15)),
        attribute: Attribute::NONE,
        label: None,
    }
}

fn sample_email() -> Sample {
    Sample {
        value: FieldValue::text("jane.doe@club.example"),
        attribute: Attribute::CUSTOM,
        label: Some("Club"),
    }
}

fn sample_nickname() -> Sample {
    Sample {
        value: FieldValue::text("JD"),
        attribute: Attribute::NONE,
        label: None,
    }
}

fn sample_note() -> Sample {
    Sample {
        value: FieldValue::text("Met at the 2019 sensors conference."),
        attribute: Attribute::NONE,
        label: None,
    }
}

fn sample_org() -> Sample {
    Sample {
        value: FieldValue::text("Acme Corporation"),
        attribute: Attribute::ORG_WORK,
        label: None,
    }
}

fn sample_photo() -> Sample {
    Sample {
        value: FieldValue::Blob(SAMPLE_PHOTO.to_vec()),
        attribute: Attribute::NONE,
        label: None,
    }
}

fn sample_photo_url() -> Sample {
    Sample {
        value: FieldValue::text("https://example.com/photos/jane.png"),
        attribute: Attribute::NONE,
        label: None,
    }
}

fn sample_phone() -> Sample {
    Sample {
        value: FieldValue::text("+44 20 7946 0958"),
        attribute: Attribute::PHONE_MOBILE,
        label: None,
    }
}

fn sample_title() -> Sample {
    Sample {
        value: FieldValue::text("Chief Engineer"),
        attribute: Attribute::NONE,
        label: None,
    }
}

fn sample_url() -> Sample {
    Sample {
        value: FieldValue::text("https://jane.example.com/portfolio"),
        attribute: Attribute::CUSTOM,
        label: Some("Portfolio"),
    }
}

fn sample_im() -> Sample {
    Sample {
        value: FieldValue::structured(["jane.doe", "xmpp"]),
        attribute: Attribute::IM_HOME,
        label: None,
    }
}

fn sample_relation() -> Sample {
    Sample {
        value: FieldValue::text("John Doe"),
        attribute: Attribute::CUSTOM,
        label: Some("Mentor"),
    }
}

fn sample_org_info() -> Sample {
    Sample {
        value: FieldValue::structured([
            "Research",
            "Leads the sensor team",
            "ACME",
            "",
            "Building 7",
        ]),
        attribute: Attribute::ORG_WORK,
        label: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_field_order() {
        for field in Field::ALL {
            assert_eq!(spec(field).field, field);
        }
    }

    #[test]
    fn test_titles_do_not_shadow_each_other() {
        for a in &CATALOG {
            for b in &CATALOG {
                if a.field != b.field {
                    let prefix = format!("{}: ", a.title);
                    assert!(
                        !format!("{}: ", b.title).starts_with(&prefix),
                        "{} shadows {}",
                        a.title,
                        b.title
                    );
                }
            }
        }
    }

    #[test]
    fn test_every_sample_passes_its_own_check() {
        for entry in &CATALOG {
            let Some(sample) = entry.sample else {
                continue;
            };
            let sample = sample();
            assert!(entry.writable, "{} has a sample but is read-only", entry.field);
            entry
                .check(sample.value, sample.attribute, sample.label)
                .unwrap_or_else(|err| panic!("{}: {}", entry.field, err));
        }
    }

    #[test]
    fn test_check_rejects_label_without_custom_attribute() {
        let err = spec(Field::Email)
            .check(FieldValue::text("a@b.c"), Attribute::EMAIL_WORK, Some("Office"))
            .unwrap_err();
        assert_eq!(err, ProviderError::LabelNotAllowed { field: Field::Email });
    }

    #[test]
    fn test_check_requires_label_for_custom_attribute() {
        let err = spec(Field::Phone)
            .check(FieldValue::text("123"), Attribute::CUSTOM, Some("  "))
            .unwrap_err();
        assert_eq!(err, ProviderError::LabelRequired { field: Field::Phone });
    }

    #[test]
    fn test_check_rejects_attribute_from_another_field() {
        let err = spec(Field::Email)
            .check(FieldValue::text("a@b.c"), Attribute::PHONE_MOBILE, None)
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::InvalidAttribute {
                field: Field::Email,
                attribute: Attribute::PHONE_MOBILE
            }
        );

        let err = spec(Field::Note)
            .check(FieldValue::text("x"), Attribute::CUSTOM, Some("label"))
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_check_rejects_wrong_value_kind() {
        let err = spec(Field::Birthday)
            .check(FieldValue::text("yesterday"), Attribute::NONE, None)
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::ValueKindMismatch {
                field: Field::Birthday,
                expected: ValueKind::Date,
                actual: ValueKind::Text
            }
        );
    }

    #[test]
    fn test_check_pads_structured_values() {
        let value = spec(Field::Im)
            .check(FieldValue::structured(["jane"]), Attribute::IM_WORK, None)
            .unwrap();
        assert_eq!(value, FieldValue::structured(["jane", ""]));

        let err = spec(Field::Im)
            .check(FieldValue::structured(["a", "b", "c"]), Attribute::IM_WORK, None)
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::TooManyComponents {
                field: Field::Im,
                max: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_attribute_name_lookup() {
        assert_eq!(attribute_name(Field::Address, Attribute::ADDR_WORK), "work");
        assert_eq!(attribute_name(Field::Phone, Attribute::PHONE_TTY_TDD), "TTY/TDD");
        assert_eq!(attribute_name(Field::Url, Attribute::CUSTOM), "custom");
        assert_eq!(attribute_name(Field::Note, Attribute::NONE), "");
        assert_eq!(
            attribute_name(Field::Email, Attribute::ADDR_HOME),
            "unknown (101)"
        );
    }

    #[test]
    fn test_render_structured_names_components() {
        let ctx = RenderContext::default();
        let rendered = spec(Field::Address).render(
            &FieldValue::structured(["", "", "1 Main St", "Springfield"]),
            &ctx,
        );
        assert_eq!(rendered, "street: 1 Main St, locality: Springfield");
    }

    #[test]
    fn test_render_blob_previews_base64() {
        let ctx = RenderContext::default();
        let rendered = spec(Field::Photo).render(&FieldValue::Blob(SAMPLE_PHOTO.to_vec()), &ctx);
        assert_eq!(rendered, "67 bytes, base64 iVBORw0KGgoAAAAN...");

        let short = spec(Field::PublicKey).render(&FieldValue::Blob(b"key".to_vec()), &ctx);
        assert_eq!(short, "3 bytes, base64 a2V5");
    }

    #[test]
    fn test_render_phone_normalizes_with_region() {
        let ctx = RenderContext {
            phone_region: Some("GB".to_string()),
        };
        let rendered = spec(Field::Phone).render(&FieldValue::text("020 7946 0958"), &ctx);
        assert_eq!(rendered, "+442079460958");
    }
}
