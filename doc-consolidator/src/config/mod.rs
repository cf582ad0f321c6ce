//! Configuration and dependency wiring for the consolidator.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, Settings, SettingsOverrides};
