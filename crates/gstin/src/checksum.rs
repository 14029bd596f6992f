//! GSTIN check digit (15th character).

use crate::error::GstinError;

const CHARSET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of leading characters the check digit is computed over.
pub const PAYLOAD_LEN: usize = 14;

fn base36_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some(u32::from(b - b'0')),
        b'A'..=b'Z' => Some(u32::from(b - b'A') + 10),
        _ => None,
    }
}

/// Compute the check digit for the first 14 characters of a GSTIN.
///
/// Each character's base-36 value is weighted 1 or 2 alternately, and the
/// base-36 digits of every product are summed.
pub fn compute_check_digit(payload: &str) -> Result<char, GstinError> {
    let bytes = payload.as_bytes();
    if bytes.len() != PAYLOAD_LEN {
        return Err(GstinError::WrongLength {
            expected: PAYLOAD_LEN,
            actual: payload.chars().count(),
        });
    }

    let mut sum = 0u32;
    for (i, &b) in bytes.iter().enumerate() {
        let value = base36_value(b).ok_or_else(|| {
            GstinError::InvalidFormat(format!("character {:?} at position {}", b as char, i + 1))
        })?;
        let product = value * if i % 2 == 0 { 1 } else { 2 };
        sum += product / 36 + product % 36;
    }

    let check = (36 - sum % 36) % 36;
    Ok(CHARSET[check as usize] as char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_check_digits() {
        assert_eq!(compute_check_digit("27AAPFU0939F1Z").unwrap(), 'V');
        assert_eq!(compute_check_digit("29AAGCB7383J1Z").unwrap(), '4');
        assert_eq!(compute_check_digit("24AAACC1206D1Z").unwrap(), 'M');
        assert_eq!(compute_check_digit("07DELA12345B1D").unwrap(), 'E');
    }

    #[test]
    fn rejects_wrong_length_and_lowercase() {
        assert!(matches!(
            compute_check_digit("27AAPFU0939F1"),
            Err(GstinError::WrongLength { expected: 14, actual: 13 })
        ));
        assert!(matches!(
            compute_check_digit("27aapfu0939f1z"),
            Err(GstinError::InvalidFormat(_))
        ));
    }
}
