//! GST registration identifier.

use serde::{Deserialize, Serialize};

use gstsync_core::ValueObject;

use crate::checksum::{PAYLOAD_LEN, compute_check_digit};
use crate::error::GstinError;
use crate::pan::{Pan, is_pan_layout};
use crate::state::StateCode;

pub const GSTIN_LEN: usize = 15;

/// Registration kind, told apart by the 14th character.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GstinKind {
    /// Normal taxpayer: state code + PAN + entity number + `Z` + check.
    Regular,
    /// Tax deductor at source, registered against a TAN.
    TaxDeductor,
    /// E-commerce operator collecting tax at source.
    TaxCollector,
}

/// A validated GSTIN, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin {
    value: String,
    kind: GstinKind,
    state: StateCode,
}

impl ValueObject for Gstin {}

impl Gstin {
    /// Validate layout, state code and check digit.
    pub fn parse(raw: &str) -> Result<Self, GstinError> {
        let value = raw.trim().to_ascii_uppercase();
        let len = value.chars().count();
        if len != GSTIN_LEN {
            return Err(GstinError::WrongLength {
                expected: GSTIN_LEN,
                actual: len,
            });
        }
        if !value.is_ascii() {
            return Err(GstinError::InvalidFormat(
                "only ASCII letters and digits are allowed".to_string(),
            ));
        }

        let kind = detect_kind(value.as_bytes())?;
        let state = StateCode::parse(&value[..2])?;

        let expected = compute_check_digit(&value[..PAYLOAD_LEN])?;
        let found = value.as_bytes()[PAYLOAD_LEN] as char;
        if expected != found {
            return Err(GstinError::ChecksumMismatch { expected, found });
        }

        Ok(Self { value, kind, state })
    }

    /// Layout and state code only; skips the check digit.
    ///
    /// Matches what a form does while the user is still typing.
    pub fn has_valid_layout(raw: &str) -> bool {
        let value = raw.trim().to_ascii_uppercase();
        value.len() == GSTIN_LEN
            && value.is_ascii()
            && detect_kind(value.as_bytes()).is_ok()
            && StateCode::parse(&value[..2]).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> GstinKind {
        self.kind
    }

    pub fn state_code(&self) -> StateCode {
        self.state
    }

    /// Embedded PAN (regular and TCS registrations only).
    pub fn pan(&self) -> Option<Pan> {
        match self.kind {
            GstinKind::Regular | GstinKind::TaxCollector => Pan::parse(&self.value[2..12]).ok(),
            GstinKind::TaxDeductor => None,
        }
    }

    /// Entity number for the same PAN within a state (13th character).
    pub fn entity_code(&self) -> char {
        self.value.as_bytes()[12] as char
    }
}

fn detect_kind(b: &[u8]) -> Result<GstinKind, GstinError> {
    if !b[..2].iter().all(u8::is_ascii_digit) {
        return Err(GstinError::InvalidFormat(
            "first two characters must be a state code".to_string(),
        ));
    }
    let entity_ok = matches!(b[12], b'1'..=b'9' | b'A'..=b'Z');
    let check_ok = b[14].is_ascii_digit() || b[14].is_ascii_uppercase();
    if !entity_ok || !check_ok {
        return Err(GstinError::InvalidFormat(
            "entity code or check character out of range".to_string(),
        ));
    }

    match b[13] {
        b'Z' if is_pan_layout(&b[2..12]) => Ok(GstinKind::Regular),
        b'C' if is_pan_layout(&b[2..12]) => Ok(GstinKind::TaxCollector),
        b'D' if is_tan_layout(&b[2..12]) => Ok(GstinKind::TaxDeductor),
        b'Z' | b'C' | b'D' => Err(GstinError::InvalidFormat(
            "characters 3-12 do not match the registration kind".to_string(),
        )),
        other => Err(GstinError::InvalidFormat(format!(
            "unsupported registration marker {:?}",
            other as char
        ))),
    }
}

/// TAN layout: `AAAA99999A`.
fn is_tan_layout(b: &[u8]) -> bool {
    b.len() == 10
        && b[..4].iter().all(u8::is_ascii_uppercase)
        && b[4..9].iter().all(u8::is_ascii_digit)
        && b[9].is_ascii_uppercase()
}

impl core::fmt::Display for Gstin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.value)
    }
}

impl core::str::FromStr for Gstin {
    type Err = GstinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Gstin {
    type Error = GstinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Gstin> for String {
    fn from(value: Gstin) -> Self {
        value.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_regular_gstins() {
        for raw in ["27AAPFU0939F1ZV", "29AAGCB7383J1Z4", "24AAACC1206D1ZM", "27AAAAP0267H2ZN"] {
            let gstin = Gstin::parse(raw).unwrap();
            assert_eq!(gstin.kind(), GstinKind::Regular);
            assert_eq!(gstin.as_str(), raw);
        }
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let gstin = Gstin::parse("  27aapfu0939f1zv ").unwrap();
        assert_eq!(gstin.as_str(), "27AAPFU0939F1ZV");
        assert_eq!(gstin.state_code().name(), "Maharashtra");
        assert_eq!(gstin.pan().unwrap().as_str(), "AAPFU0939F");
        assert_eq!(gstin.entity_code(), '1');
    }

    #[test]
    fn detects_tds_and_tcs_registrations() {
        let tds = Gstin::parse("07DELA12345B1DE").unwrap();
        assert_eq!(tds.kind(), GstinKind::TaxDeductor);
        assert!(tds.pan().is_none());

        let tcs = Gstin::parse("07AAACF1234A1CS").unwrap();
        assert_eq!(tcs.kind(), GstinKind::TaxCollector);
        assert_eq!(tcs.pan().unwrap().as_str(), "AAACF1234A");
    }

    #[test]
    fn rejects_bad_check_digit() {
        let err = Gstin::parse("33AAACH1234A1ZX").unwrap_err();
        assert_eq!(
            err,
            GstinError::ChecksumMismatch {
                expected: 'K',
                found: 'X'
            }
        );
    }

    #[test]
    fn rejects_bad_layout() {
        assert!(matches!(
            Gstin::parse("27AAPFU0939F1Z"),
            Err(GstinError::WrongLength { actual: 14, .. })
        ));
        assert!(matches!(
            Gstin::parse("27AAPFU0939F1XV"),
            Err(GstinError::InvalidFormat(_))
        ));
        assert!(matches!(
            Gstin::parse("27AAPF10939F1ZV"),
            Err(GstinError::InvalidFormat(_))
        ));
        assert!(matches!(
            Gstin::parse("27AAPFU0939F0ZV"),
            Err(GstinError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_unknown_state_code() {
        // Valid layout and recomputed check digit, but state 40 does not exist.
        let payload = "40AAPFU0939F1Z";
        let check = compute_check_digit(payload).unwrap();
        let raw = format!("{payload}{check}");
        assert!(matches!(
            Gstin::parse(&raw),
            Err(GstinError::InvalidStateCode(_))
        ));
    }

    #[test]
    fn layout_check_ignores_check_digit() {
        assert!(Gstin::has_valid_layout("33AAACH1234A1ZX"));
        assert!(!Gstin::has_valid_layout("33AAACH1234A1Z"));
        assert!(!Gstin::has_valid_layout("00AAACH1234A1ZX"));
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let gstin: Gstin = serde_json::from_str("\"29AAGCB7383J1Z4\"").unwrap();
        assert_eq!(serde_json::to_string(&gstin).unwrap(), "\"29AAGCB7383J1Z4\"");
        assert!(serde_json::from_str::<Gstin>("\"29AAGCB7383J1Z5\"").is_err());
    }

    #[test]
    fn usable_as_set_key() {
        use std::collections::HashSet;

        let set: HashSet<Gstin> = ["27AAPFU0939F1ZV", " 27aapfu0939f1zv", "07DELA12345B1DE"]
            .into_iter()
            .map(|raw| Gstin::parse(raw).unwrap())
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.iter().any(|g| g.kind() == GstinKind::TaxDeductor));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

        proptest! {
            /// Property: any other character in the check position is rejected.
            #[test]
            fn single_check_digit_corruption_is_rejected(idx in 0usize..36) {
                let valid = "27AAPFU0939F1ZV";
                let replacement = ALPHABET[idx] as char;
                prop_assume!(replacement != 'V');
                let corrupted = format!("{}{}", &valid[..14], replacement);
                let is_mismatch = matches!(
                    Gstin::parse(&corrupted),
                    Err(GstinError::ChecksumMismatch { .. })
                );
                prop_assert!(is_mismatch);
            }

            /// Property: appending the computed check digit to a well-formed
            /// payload always yields a valid regular GSTIN.
            #[test]
            fn computed_check_digit_validates(
                state in 1u8..=38,
                pan in "[A-Z]{5}[0-9]{4}[A-Z]",
                entity in "[1-9A-Z]",
            ) {
                let payload = format!("{state:02}{pan}{entity}Z");
                let check = compute_check_digit(&payload).unwrap();
                let gstin = Gstin::parse(&format!("{payload}{check}")).unwrap();
                let embedded = gstin.pan().unwrap();
                prop_assert_eq!(gstin.kind(), GstinKind::Regular);
                prop_assert_eq!(embedded.as_str(), pan.as_str());
            }
        }
    }
}
