//! Runtime settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ConsolidatorError;
use doc_consolidator_pipeline::loader::DEFAULT_DATASET_PREFIX;
use doc_consolidator_pipeline::profile::SPECIALTY_ROLLUP_PROFILE;

/// Default local data root.
const DEFAULT_LOCAL_DATA_ROOT_DIR: &str = "data/";

/// Default directory, under the data root, holding physician sources.
const DEFAULT_DOWNLOAD_PREFIX: &str = "physician-data/";

/// Default directory, under the data root, holding specialty rollup sources.
const DEFAULT_ROLLUP_DOWNLOAD_PREFIX: &str = "specialty-data/";

/// Default directory, under the data root, receiving the output.
const DEFAULT_UPLOAD_PREFIX: &str = "transformed-data/";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConsolidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConsolidatorError::config(format!(
                "Unknown LOG_FORMAT '{}', expected 'text' or 'json'",
                other
            ))),
        }
    }
}

/// Settings for one consolidator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_root: PathBuf,
    /// Source directory; the profile default when unset.
    pub download_prefix: Option<String>,
    pub upload_prefix: String,
    /// Output name; the profile default when unset.
    pub transformed_filename: Option<String>,
    pub dataset_prefix: String,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_LOCAL_DATA_ROOT_DIR),
            download_prefix: None,
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            transformed_filename: None,
            dataset_prefix: DEFAULT_DATASET_PREFIX.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Values that take precedence over the environment, usually from the CLI.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub data_root: Option<PathBuf>,
    pub download_prefix: Option<String>,
    pub upload_prefix: Option<String>,
    pub transformed_filename: Option<String>,
    pub dataset_prefix: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LOCAL_DATA_ROOT_DIR`: data root (default: data/)
    /// - `DOWNLOAD_PREFIX`: source directory under the root (default: physician-data/,
    ///   or specialty-data/ for the specialty rollup)
    /// - `UPLOAD_PREFIX`: output directory under the root (default: transformed-data/)
    /// - `TRANSFORMED_FILENAME`: output name (default: per profile)
    /// - `DATASET_PREFIX`: prefix stripped from source names (default: HartfordHealthCare_)
    /// - `LOG_FORMAT`: `text` or `json` (default: text)
    pub fn from_env() -> Result<Self, ConsolidatorError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConsolidatorError> {
        let defaults = Self::default();
        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            data_root: lookup("LOCAL_DATA_ROOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_root),
            download_prefix: lookup("DOWNLOAD_PREFIX").filter(|prefix| !prefix.trim().is_empty()),
            upload_prefix: lookup("UPLOAD_PREFIX").unwrap_or(defaults.upload_prefix),
            transformed_filename: lookup("TRANSFORMED_FILENAME").filter(|name| !name.trim().is_empty()),
            dataset_prefix: lookup("DATASET_PREFIX").unwrap_or(defaults.dataset_prefix),
            log_format,
        })
    }

    /// Replace every setting the overrides carry.
    pub fn apply(&mut self, overrides: SettingsOverrides) {
        if let Some(data_root) = overrides.data_root {
            self.data_root = data_root;
        }
        if let Some(prefix) = overrides.download_prefix {
            self.download_prefix = Some(prefix);
        }
        if let Some(prefix) = overrides.upload_prefix {
            self.upload_prefix = prefix;
        }
        if let Some(name) = overrides.transformed_filename {
            self.transformed_filename = Some(name);
        }
        if let Some(prefix) = overrides.dataset_prefix {
            self.dataset_prefix = prefix;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
    }

    /// Source directory for `profile` under the data root.
    pub fn download_prefix_for(&self, profile: &str) -> &str {
        match (&self.download_prefix, profile) {
            (Some(prefix), _) => prefix.as_str(),
            (None, SPECIALTY_ROLLUP_PROFILE) => DEFAULT_ROLLUP_DOWNLOAD_PREFIX,
            (None, _) => DEFAULT_DOWNLOAD_PREFIX,
        }
    }

    /// Directory holding the relation sources of `profile`.
    pub fn input_dir(&self, profile: &str) -> PathBuf {
        self.data_root.join(self.download_prefix_for(profile))
    }

    /// Directory receiving the output.
    pub fn output_dir(&self) -> PathBuf {
        self.data_root.join(&self.upload_prefix)
    }
}
