//! GST state codes (first two digits of a GSTIN).

use serde::{Deserialize, Serialize};

use crate::error::GstinError;

const STATES: &[(u8, &str)] = &[
    (1, "Jammu and Kashmir"),
    (2, "Himachal Pradesh"),
    (3, "Punjab"),
    (4, "Chandigarh"),
    (5, "Uttarakhand"),
    (6, "Haryana"),
    (7, "Delhi"),
    (8, "Rajasthan"),
    (9, "Uttar Pradesh"),
    (10, "Bihar"),
    (11, "Sikkim"),
    (12, "Arunachal Pradesh"),
    (13, "Nagaland"),
    (14, "Manipur"),
    (15, "Mizoram"),
    (16, "Tripura"),
    (17, "Meghalaya"),
    (18, "Assam"),
    (19, "West Bengal"),
    (20, "Jharkhand"),
    (21, "Odisha"),
    (22, "Chhattisgarh"),
    (23, "Madhya Pradesh"),
    (24, "Gujarat"),
    (25, "Daman and Diu"),
    (26, "Dadra and Nagar Haveli and Daman and Diu"),
    (27, "Maharashtra"),
    (28, "Andhra Pradesh (Before Division)"),
    (29, "Karnataka"),
    (30, "Goa"),
    (31, "Lakshadweep Islands"),
    (32, "Kerala"),
    (33, "Tamil Nadu"),
    (34, "Puducherry"),
    (35, "Andaman and Nicobar Islands"),
    (36, "Telangana"),
    (37, "Andhra Pradesh"),
    (38, "Ladakh"),
    (96, "Foreign Country"),
    (97, "Other Territory"),
    (99, "Centre Jurisdiction"),
];

/// Two-digit state code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCode(u8);

impl StateCode {
    pub fn new(code: u8) -> Result<Self, GstinError> {
        if state_name(code).is_some() {
            Ok(Self(code))
        } else {
            Err(GstinError::InvalidStateCode(format!("{code:02}")))
        }
    }

    /// Parse the two leading digits of a GSTIN.
    pub fn parse(raw: &str) -> Result<Self, GstinError> {
        if raw.len() != 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GstinError::InvalidStateCode(raw.to_string()));
        }
        let code = raw
            .parse::<u8>()
            .map_err(|_| GstinError::InvalidStateCode(raw.to_string()))?;
        Self::new(code)
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        state_name(self.0).unwrap_or("")
    }
}

impl core::fmt::Display for StateCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Name of the state or territory for a numeric code.
pub fn state_name(code: u8) -> Option<&'static str> {
    STATES
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|idx| STATES[idx].1)
}
