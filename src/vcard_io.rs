//! Read-only vCard import used to seed a contact list.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use time::Date;
use tracing::{debug, warn};
use uuid::Uuid;
use vcard4::parameter::{Parameters, TypeParameter};
use vcard4::property::TextOrUriProperty;
use vcard4::{parse, Vcard};

use crate::field::{Attribute, Field};
use crate::phone;
use crate::provider::PimProvider;
use crate::value::{FieldValue, StoredValue};

/// Field values extracted from one vCard, ready to be added to a store.
#[derive(Debug, Clone, Default)]
pub struct ImportedContact {
    pub uid: Option<Uuid>,
    pub values: Vec<(Field, StoredValue)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub contacts: usize,
    pub values: usize,
    pub skipped: usize,
}

/// Parse a UTF-8 encoded vCard file.
pub fn load_file(path: &Path) -> Result<Vec<ImportedContact>> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read vCard file at {}", path.display()))?;
    load_str(&input).with_context(|| format!("failed to load {}", path.display()))
}

/// Parse vCard text into importable contacts.
pub fn load_str(input: &str) -> Result<Vec<ImportedContact>> {
    let cards = parse(input)
        .map_err(|err| anyhow!(err))
        .context("parsing vCard data")?;
    Ok(cards.iter().map(contact_from_card).collect())
}

/// Add imported contacts to `provider`.
///
/// Values the store rejects are skipped with a warning; a UID clash gives the
/// contact a fresh UID.
pub fn seed<P: PimProvider + ?Sized>(provider: &mut P, contacts: Vec<ImportedContact>) -> SeedReport {
    let mut report = SeedReport::default();

    for contact in contacts {
        let handle = match provider.create_item(contact.uid) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(error = %err, "assigning a fresh UID");
                match provider.create_item(None) {
                    Ok(handle) => handle,
                    Err(err) => {
                        warn!(error = %err, "skipping contact");
                        report.skipped += contact.values.len();
                        continue;
                    }
                }
            }
        };
        report.contacts += 1;

        for (field, stored) in contact.values {
            match provider.add_field_value(
                handle,
                field,
                stored.value,
                stored.attribute,
                stored.label.as_deref(),
            ) {
                Ok(_) => report.values += 1,
                Err(err) => {
                    warn!(%handle, %field, error = %err, "skipping vCard value");
                    report.skipped += 1;
                }
            }
        }
    }

    debug!(?report, "seeded contact list");
    report
}

fn contact_from_card(card: &Vcard) -> ImportedContact {
    let mut values: Vec<(Field, StoredValue)> = Vec::new();
    let mut push = |field: Field, value: FieldValue, (attribute, label): (Attribute, Option<String>)| {
        values.push((
            field,
            StoredValue {
                value,
                attribute,
                label,
            },
        ));
    };

    if let Some(name) = &card.name {
        push(Field::Name, FieldValue::Structured(name.value.clone()), plain());
    }

    for prop in &card.address {
        let address = &prop.value;
        let parts: Vec<String> = [
            &address.po_box,
            &address.extended_address,
            &address.street_address,
            &address.locality,
            &address.region,
            &address.postal_code,
            &address.country_name,
        ]
        .into_iter()
        .map(|part| part.as_deref().unwrap_or_default().trim().to_string())
        .collect();

        // A LABEL parameter names the address and overrides its TYPE.
        let label = prop
            .parameters
            .as_ref()
            .and_then(|params| params.label.as_deref())
            .map(str::trim)
            .filter(|label| !label.is_empty());
        let attribute = match label {
            Some(label) => (Attribute::CUSTOM, Some(label.to_string())),
            None => classify(
                &type_names(prop.parameters.as_ref()),
                ADDRESS_TYPES,
                Attribute::ADDR_OTHER,
            ),
        };
        push(Field::Address, FieldValue::Structured(parts), attribute);
    }

    if let Some(bday) = &card.bday {
        match parse_date(&bday.to_string()) {
            Some(date) => push(Field::Birthday, FieldValue::Date(date), plain()),
            None => warn!(value = %bday, "ignoring birthday without a full date"),
        }
    }

    for prop in &card.email {
        let attribute = classify(
            &type_names(prop.parameters.as_ref()),
            EMAIL_TYPES,
            Attribute::EMAIL_OTHER,
        );
        push(Field::Email, FieldValue::text(prop.value.trim()), attribute);
    }

    for prop in &card.nickname {
        push(Field::Nickname, FieldValue::text(prop.value.trim()), plain());
    }

    for prop in &card.note {
        push(Field::Note, FieldValue::text(prop.value.trim()), plain());
    }

    for prop in &card.org {
        if let Some(org) = prop.value.first().filter(|org| !org.is_empty()) {
            let attribute = classify(
                &type_names(prop.parameters.as_ref()),
                ORG_TYPES,
                Attribute::ORG_WORK,
            );
            push(Field::Org, FieldValue::text(org.as_str()), attribute);
        }
    }

    for photo in &card.photo {
        let (raw, _) = text_or_uri(photo);
        match decode_data_uri(&raw) {
            Some(bytes) => push(Field::Photo, FieldValue::Blob(bytes), plain()),
            None => push(Field::PhotoUrl, FieldValue::Text(raw), plain()),
        }
    }

    for prop in &card.tel {
        let (raw, params) = text_or_uri(prop);
        let attribute = classify_phone(&type_names(params));
        push(
            Field::Phone,
            FieldValue::text(phone::strip_tel_scheme(&raw)),
            attribute,
        );
    }

    for prop in &card.title {
        push(Field::Title, FieldValue::text(prop.value.trim()), plain());
    }

    for prop in &card.url {
        let attribute = classify(
            &type_names(prop.parameters.as_ref()),
            URL_TYPES,
            Attribute::URL_OTHER,
        );
        push(Field::Url, FieldValue::Text(prop.value.to_string()), attribute);
    }

    for prop in &card.impp {
        let raw = prop.value.to_string();
        let parts = match raw.split_once(':') {
            Some((protocol, username)) => vec![username.to_string(), protocol.to_string()],
            None => vec![raw.clone()],
        };
        let attribute = classify(
            &type_names(prop.parameters.as_ref()),
            IM_TYPES,
            Attribute::IM_OTHER,
        );
        push(Field::Im, FieldValue::Structured(parts), attribute);
    }

    for prop in &card.related {
        let (raw, params) = text_or_uri(prop);
        let attribute = classify(
            &type_names(params),
            RELATION_TYPES,
            Attribute::RELATION_RELATIVE,
        );
        push(Field::Relation, FieldValue::Text(raw), attribute);
    }

    let department = card
        .org
        .first()
        .and_then(|org| org.value.get(1))
        .cloned()
        .unwrap_or_default();
    let role = card
        .role
        .first()
        .map(|role| role.value.trim().to_string())
        .unwrap_or_default();
    if !department.is_empty() || !role.is_empty() {
        push(
            Field::OrgInfo,
            FieldValue::structured([department, role]),
            (Attribute::ORG_WORK, None),
        );
    }

    ImportedContact {
        uid: card_uuid(card),
        values,
    }
}

fn plain() -> (Attribute, Option<String>) {
    (Attribute::NONE, None)
}

fn text_or_uri(prop: &TextOrUriProperty) -> (String, Option<&Parameters>) {
    match prop {
        TextOrUriProperty::Text(text) => (text.value.clone(), text.parameters.as_ref()),
        TextOrUriProperty::Uri(uri) => (uri.value.to_string(), uri.parameters.as_ref()),
    }
}

/// UUID of the card's UID property, accepting the `urn:uuid:` form.
fn card_uuid(card: &Vcard) -> Option<Uuid> {
    let raw = match &card.uid {
        Some(TextOrUriProperty::Text(text)) => text.value.clone(),
        Some(TextOrUriProperty::Uri(uri)) => uri.value.to_string(),
        None => return None,
    };
    let trimmed = raw.trim();
    let bare = trimmed
        .get(..9)
        .filter(|prefix| prefix.eq_ignore_ascii_case("urn:uuid:"))
        .map(|_| &trimmed[9..])
        .unwrap_or(trimmed);
    Uuid::parse_str(bare).ok()
}

/// Accepts `YYYYMMDD` and `YYYY-MM-DD`, optionally followed by a time.
fn parse_date(raw: &str) -> Option<Date> {
    let date_part = raw.split('T').next().unwrap_or_default();
    let digits: String = date_part.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 8 || date_part.trim().starts_with("--") {
        return None;
    }
    let year: i32 = digits[..4].parse().ok()?;
    let month: u8 = digits[4..6].parse().ok()?;
    let day: u8 = digits[6..].parse().ok()?;
    Date::from_calendar_date(year, time::Month::try_from(month).ok()?, day).ok()
}

fn decode_data_uri(raw: &str) -> Option<Vec<u8>> {
    let rest = raw.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    STANDARD.decode(payload.trim()).ok()
}

fn type_parameter_to_string(param: &TypeParameter) -> String {
    match param {
        TypeParameter::Telephone(value) => value.to_string(),
        TypeParameter::Related(value) => value.to_string(),
        TypeParameter::Home => "home".to_string(),
        TypeParameter::Work => "work".to_string(),
        TypeParameter::Extension(value) => value
            .strip_prefix("X-")
            .or_else(|| value.strip_prefix("x-"))
            .unwrap_or(value)
            .to_string(),
    }
}

const IGNORED_TYPES: &[&str] = &["pref", "voice", "internet", "text"];

/// TYPE parameter values of a property, without ones that carry no role.
fn type_names(params: Option<&Parameters>) -> Vec<String> {
    params
        .and_then(|params| params.types.as_ref())
        .map(|types| {
            types
                .iter()
                .map(type_parameter_to_string)
                .filter(|name| !IGNORED_TYPES.contains(&name.to_ascii_lowercase().as_str()))
                .collect()
        })
        .unwrap_or_default()
}

const ADDRESS_TYPES: &[(&str, Attribute)] = &[
    ("home", Attribute::ADDR_HOME),
    ("work", Attribute::ADDR_WORK),
    ("other", Attribute::ADDR_OTHER),
];

const EMAIL_TYPES: &[(&str, Attribute)] = &[
    ("home", Attribute::EMAIL_HOME),
    ("work", Attribute::EMAIL_WORK),
    ("mobile", Attribute::EMAIL_MOBILE),
    ("cell", Attribute::EMAIL_MOBILE),
    ("other", Attribute::EMAIL_OTHER),
];

const URL_TYPES: &[(&str, Attribute)] = &[
    ("homepage", Attribute::URL_HOMEPAGE),
    ("blog", Attribute::URL_BLOG),
    ("profile", Attribute::URL_PROFILE),
    ("home", Attribute::URL_HOME),
    ("work", Attribute::URL_WORK),
    ("ftp", Attribute::URL_FTP),
    ("other", Attribute::URL_OTHER),
];

const IM_TYPES: &[(&str, Attribute)] = &[
    ("home", Attribute::IM_HOME),
    ("work", Attribute::IM_WORK),
    ("other", Attribute::IM_OTHER),
];

const RELATION_TYPES: &[(&str, Attribute)] = &[
    ("mother", Attribute::RELATION_MOTHER),
    ("father", Attribute::RELATION_FATHER),
    ("parent", Attribute::RELATION_PARENT),
    ("sister", Attribute::RELATION_SISTER),
    ("brother", Attribute::RELATION_BROTHER),
    ("child", Attribute::RELATION_CHILD),
    ("friend", Attribute::RELATION_FRIEND),
    ("spouse", Attribute::RELATION_SPOUSE),
    ("partner", Attribute::RELATION_PARTNER),
    ("sweetheart", Attribute::RELATION_PARTNER),
    ("manager", Attribute::RELATION_MANAGER),
    ("assistant", Attribute::RELATION_ASSISTANT),
    ("agent", Attribute::RELATION_ASSISTANT),
    ("domestic-partner", Attribute::RELATION_DOMESTIC_PARTNER),
    ("referred-by", Attribute::RELATION_REFERRED_BY),
    ("kin", Attribute::RELATION_RELATIVE),
    ("relative", Attribute::RELATION_RELATIVE),
];

const ORG_TYPES: &[(&str, Attribute)] = &[
    ("work", Attribute::ORG_WORK),
    ("other", Attribute::ORG_OTHER),
];

/// Map TYPE values to an attribute.
///
/// The first recognised value wins; otherwise the first value becomes the
/// label of a custom attribute.
fn classify(names: &[String], known: &[(&str, Attribute)], default: Attribute) -> (Attribute, Option<String>) {
    for name in names {
        let lower = name.to_ascii_lowercase();
        if let Some((_, attribute)) = known.iter().find(|(candidate, _)| *candidate == lower) {
            return (*attribute, None);
        }
    }
    match names.first() {
        Some(label) => (Attribute::CUSTOM, Some(label.clone())),
        None => (default, None),
    }
}

fn classify_phone(names: &[String]) -> (Attribute, Option<String>) {
    let has = |wanted: &str| names.iter().any(|name| name.eq_ignore_ascii_case(wanted));
    let home = has("home");
    let work = has("work");

    let attribute = if has("fax") {
        if home {
            Attribute::PHONE_HOME_FAX
        } else if work {
            Attribute::PHONE_WORK_FAX
        } else {
            Attribute::PHONE_OTHER_FAX
        }
    } else if has("cell") || has("mobile") {
        if work {
            Attribute::PHONE_WORK_MOBILE
        } else {
            Attribute::PHONE_MOBILE
        }
    } else if has("pager") {
        if work {
            Attribute::PHONE_WORK_PAGER
        } else {
            Attribute::PHONE_PAGER
        }
    } else {
        let known: &[(&str, Attribute)] = &[
            ("iphone", Attribute::PHONE_IPHONE),
            ("callback", Attribute::PHONE_CALLBACK),
            ("car", Attribute::PHONE_CAR),
            ("main", Attribute::PHONE_COMPANY_MAIN),
            ("isdn", Attribute::PHONE_ISDN),
            ("radio", Attribute::PHONE_RADIO),
            ("telex", Attribute::PHONE_TELEX),
            ("textphone", Attribute::PHONE_TTY_TDD),
            ("assistant", Attribute::PHONE_ASSISTANT),
            ("mms", Attribute::PHONE_MMS),
            ("home", Attribute::PHONE_HOME),
            ("work", Attribute::PHONE_WORK),
            ("other", Attribute::PHONE_OTHER),
        ];
        return classify(names, known, Attribute::PHONE_OTHER);
    };
    (attribute, None)
}
