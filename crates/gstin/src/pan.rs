//! Permanent Account Number (income-tax identifier).

use serde::{Deserialize, Serialize};

use gstsync_core::ValueObject;

use crate::error::GstinError;

pub const PAN_LEN: usize = 10;

/// Category of the PAN holder, encoded in the fourth character.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanHolder {
    Individual,
    Company,
    HinduUndividedFamily,
    Firm,
    AssociationOfPersons,
    Trust,
    BodyOfIndividuals,
    LocalAuthority,
    ArtificialJuridicalPerson,
    Government,
    Other,
}

impl PanHolder {
    fn from_code(code: u8) -> Self {
        match code {
            b'P' => PanHolder::Individual,
            b'C' => PanHolder::Company,
            b'H' => PanHolder::HinduUndividedFamily,
            b'F' => PanHolder::Firm,
            b'A' => PanHolder::AssociationOfPersons,
            b'T' => PanHolder::Trust,
            b'B' => PanHolder::BodyOfIndividuals,
            b'L' => PanHolder::LocalAuthority,
            b'J' => PanHolder::ArtificialJuridicalPerson,
            b'G' => PanHolder::Government,
            _ => PanHolder::Other,
        }
    }
}

/// A validated PAN (`AAAAA9999A`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pan(String);

impl ValueObject for Pan {}

impl Pan {
    pub fn parse(raw: &str) -> Result<Self, GstinError> {
        let value = raw.trim().to_ascii_uppercase();
        if value.len() != PAN_LEN {
            return Err(GstinError::WrongLength {
                expected: PAN_LEN,
                actual: value.chars().count(),
            });
        }
        if !is_pan_layout(value.as_bytes()) {
            return Err(GstinError::InvalidFormat(format!(
                "PAN {value:?} does not match AAAAA9999A"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn holder(&self) -> PanHolder {
        PanHolder::from_code(self.0.as_bytes()[3])
    }
}

pub(crate) fn is_pan_layout(b: &[u8]) -> bool {
    b.len() == PAN_LEN
        && b[..5].iter().all(u8::is_ascii_uppercase)
        && b[5..9].iter().all(u8::is_ascii_digit)
        && b[9].is_ascii_uppercase()
}

impl core::fmt::Display for Pan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for Pan {
    type Err = GstinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pan {
    type Error = GstinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pan> for String {
    fn from(value: Pan) -> Self {
        value.0
    }
}
