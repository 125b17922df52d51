use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Contact field kinds known to the PIM store.
///
/// The declaration order is the order in which fields are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Address,
    Birthday,
    Email,
    FormattedAddress,
    Nickname,
    Note,
    Org,
    Photo,
    PhotoUrl,
    PublicKey,
    PublicKeyString,
    Revision,
    Phone,
    Title,
    Uid,
    Url,
    Im,
    Relation,
    OrgInfo,
}

impl Field {
    pub const ALL: [Field; 20] = [
        Field::Name,
        Field::Address,
        Field::Birthday,
        Field::Email,
        Field::FormattedAddress,
        Field::Nickname,
        Field::Note,
        Field::Org,
        Field::Photo,
        Field::PhotoUrl,
        Field::PublicKey,
        Field::PublicKeyString,
        Field::Revision,
        Field::Phone,
        Field::Title,
        Field::Uid,
        Field::Url,
        Field::Im,
        Field::Relation,
        Field::OrgInfo,
    ];

    /// Canonical identifier used on the command line and in log output.
    pub fn id(self) -> &'static str {
        match self {
            Field::Name => "NAME",
            Field::Address => "ADDR",
            Field::Birthday => "BIRTHDAY",
            Field::Email => "EMAIL",
            Field::FormattedAddress => "FORMATTED_ADDR",
            Field::Nickname => "NICKNAME",
            Field::Note => "NOTE",
            Field::Org => "ORG",
            Field::Photo => "PHOTO",
            Field::PhotoUrl => "PHOTO_URL",
            Field::PublicKey => "PUBLIC_KEY",
            Field::PublicKeyString => "PUBLIC_KEY_STRING",
            Field::Revision => "REVISION",
            Field::Phone => "TEL",
            Field::Title => "TITLE",
            Field::Uid => "UID",
            Field::Url => "URL",
            Field::Im => "IM",
            Field::Relation => "RELATION",
            Field::OrgInfo => "ORG_INFO",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown contact field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        if let Some(field) = Field::ALL.iter().find(|field| field.id() == upper) {
            return Ok(*field);
        }
        match upper.as_str() {
            "ADDRESS" | "ADR" => Ok(Field::Address),
            "BDAY" => Ok(Field::Birthday),
            "PHONE" => Ok(Field::Phone),
            "REV" => Ok(Field::Revision),
            "IMPP" => Ok(Field::Im),
            "RELATED" => Ok(Field::Relation),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

/// Integer tag classifying the role of a value within its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attribute(pub u32);

impl Attribute {
    /// Fields without attributes store every value with this tag.
    pub const NONE: Attribute = Attribute(0);
    /// Custom tag; its display name comes from the value's label.
    pub const CUSTOM: Attribute = Attribute(0xFFFF);

    pub const ADDR_HOME: Attribute = Attribute(101);
    pub const ADDR_WORK: Attribute = Attribute(102);
    pub const ADDR_OTHER: Attribute = Attribute(103);

    pub const EMAIL_HOME: Attribute = Attribute(201);
    pub const EMAIL_WORK: Attribute = Attribute(202);
    pub const EMAIL_MOBILE: Attribute = Attribute(203);
    pub const EMAIL_OTHER: Attribute = Attribute(204);

    pub const PHONE_HOME: Attribute = Attribute(301);
    pub const PHONE_MOBILE: Attribute = Attribute(302);
    pub const PHONE_HOME_FAX: Attribute = Attribute(303);
    pub const PHONE_WORK_FAX: Attribute = Attribute(304);
    pub const PHONE_PAGER: Attribute = Attribute(305);
    pub const PHONE_IPHONE: Attribute = Attribute(306);
    pub const PHONE_WORK: Attribute = Attribute(307);
    pub const PHONE_CALLBACK: Attribute = Attribute(308);
    pub const PHONE_CAR: Attribute = Attribute(309);
    pub const PHONE_COMPANY_MAIN: Attribute = Attribute(310);
    pub const PHONE_ISDN: Attribute = Attribute(311);
    pub const PHONE_OTHER_FAX: Attribute = Attribute(312);
    pub const PHONE_RADIO: Attribute = Attribute(313);
    pub const PHONE_TELEX: Attribute = Attribute(314);
    pub const PHONE_TTY_TDD: Attribute = Attribute(315);
    pub const PHONE_WORK_MOBILE: Attribute = Attribute(316);
    pub const PHONE_WORK_PAGER: Attribute = Attribute(317);
    pub const PHONE_ASSISTANT: Attribute = Attribute(318);
    pub const PHONE_MMS: Attribute = Attribute(319);
    pub const PHONE_OTHER: Attribute = Attribute(320);

    pub const URL_HOMEPAGE: Attribute = Attribute(401);
    pub const URL_BLOG: Attribute = Attribute(402);
    pub const URL_PROFILE: Attribute = Attribute(403);
    pub const URL_HOME: Attribute = Attribute(404);
    pub const URL_WORK: Attribute = Attribute(405);
    pub const URL_FTP: Attribute = Attribute(406);
    pub const URL_OTHER: Attribute = Attribute(407);

    pub const IM_HOME: Attribute = Attribute(501);
    pub const IM_WORK: Attribute = Attribute(502);
    pub const IM_OTHER: Attribute = Attribute(503);

    pub const RELATION_MOTHER: Attribute = Attribute(601);
    pub const RELATION_FATHER: Attribute = Attribute(602);
    pub const RELATION_PARENT: Attribute = Attribute(603);
    pub const RELATION_SISTER: Attribute = Attribute(604);
    pub const RELATION_BROTHER: Attribute = Attribute(605);
    pub const RELATION_CHILD: Attribute = Attribute(606);
    pub const RELATION_FRIEND: Attribute = Attribute(607);
    pub const RELATION_SPOUSE: Attribute = Attribute(608);
    pub const RELATION_PARTNER: Attribute = Attribute(609);
    pub const RELATION_MANAGER: Attribute = Attribute(610);
    pub const RELATION_ASSISTANT: Attribute = Attribute(611);
    pub const RELATION_DOMESTIC_PARTNER: Attribute = Attribute(612);
    pub const RELATION_REFERRED_BY: Attribute = Attribute(613);
    pub const RELATION_RELATIVE: Attribute = Attribute(614);

    pub const ORG_WORK: Attribute = Attribute(701);
    pub const ORG_OTHER: Attribute = Attribute(702);

    pub fn is_custom(self) -> bool {
        self == Attribute::CUSTOM
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
