//! Wiring for the `gstsync` binary: configuration and the HTTP collaborator,
//! plus the form that turns user input into a regeneration request.

pub mod cli;
pub mod forms;
pub mod rpc;
pub mod settings;

pub use forms::{FormDriver, FormEffect, FormHooks, Indicator, RegenerationForm, StatusBadge};
pub use rpc::RpcRegenerationService;
pub use settings::{SettingKey, Settings, SettingsError};
