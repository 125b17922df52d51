use rlibphonenumber::{region_code::RegionCode, PhoneNumber, PhoneNumberFormat, PHONE_NUMBER_UTIL};

/// Strip an optional `tel:` scheme and return the number part.
pub fn strip_tel_scheme(value: &str) -> &str {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 4 && bytes[..3].eq_ignore_ascii_case(b"tel") && bytes[3] == b':' {
        trimmed[4..].trim()
    } else {
        trimmed
    }
}

/// E.164 form of `raw` when it parses as a phone number, the trimmed input otherwise.
pub fn display_value(raw: &str, default_region: Option<&str>) -> String {
    let number = strip_tel_scheme(raw);
    if number.is_empty() {
        return String::new();
    }
    parse_with_regions(number, default_region).unwrap_or_else(|| number.to_string())
}

fn parse_with_regions(input: &str, default_region: Option<&str>) -> Option<String> {
    let util = &*PHONE_NUMBER_UTIL;
    let mut candidates: Vec<&str> = Vec::new();

    if let Some(region) = default_region.filter(|region| !region.is_empty()) {
        candidates.push(region);
    }

    let unknown = RegionCode::get_unknown();
    if candidates
        .iter()
        .all(|candidate| !candidate.eq_ignore_ascii_case(unknown))
    {
        candidates.push(unknown);
    }

    candidates
        .into_iter()
        .find_map(|region| util.parse(input, region).ok())
        .map(|parsed| format_parsed_number(&parsed))
}

fn format_parsed_number(number: &PhoneNumber) -> String {
    let mut normalized = PHONE_NUMBER_UTIL
        .format(number, PhoneNumberFormat::E164)
        .into_owned();

    if number.has_extension() {
        let ext = number.extension();
        if !ext.is_empty() {
            normalized.push_str(";ext=");
            normalized.push_str(ext);
        }
    }

    normalized
}
