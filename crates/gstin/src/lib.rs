//! `gstsync-gstin`: GSTIN and PAN validation.
//!
//! Pure, allocation-light checks that mirror what the GST portal enforces
//! before a registry lookup: character layout per registration kind, a valid
//! state code, and the base-36 check digit.

pub mod checksum;
pub mod error;
pub mod gstin;
pub mod pan;
pub mod state;

pub use checksum::compute_check_digit;
pub use error::GstinError;
pub use gstin::{Gstin, GstinKind};
pub use pan::{Pan, PanHolder};
pub use state::{StateCode, state_name};
