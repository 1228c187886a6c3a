use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::error::Result;
use crate::models::ProfileSet;
use crate::processors::CatalogResolver;
use crate::readers::CsvDirectorySource;
use crate::utils::constants::*;

/// Effective configuration: built-in defaults, then the TOML file, then
/// `WXCHECK__*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub source: SourceSettings,
    pub output: OutputSettings,
    pub smtp: Option<SmtpSettings>,
    #[validate(nested)]
    pub profiles: ProfileSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SourceSettings {
    pub data_dir: PathBuf,
    #[validate(length(min = 1))]
    pub timestamp_column: String,
    #[validate(length(min = 1))]
    pub water_year_column: String,
    #[validate(length(min = 1))]
    pub clean_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub dir: PathBuf,
    /// Keep earlier reports of the same profile instead of replacing them
    pub keep_previous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SmtpSettings {
    #[validate(length(min = 1))]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default = "default_smtp_tls")]
    pub tls: bool,
    #[validate(length(min = 3))]
    pub from: String,
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_smtp_tls() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings {
                data_dir: PathBuf::from(DEFAULT_DATA_DIR),
                timestamp_column: DEFAULT_TIMESTAMP_COLUMN.to_string(),
                water_year_column: DEFAULT_WATER_YEAR_COLUMN.to_string(),
                clean_prefix: DEFAULT_CLEAN_PREFIX.to_string(),
            },
            output: OutputSettings {
                dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
                keep_previous: false,
            },
            smtp: None,
            profiles: ProfileSet::default(),
        }
    }
}

impl Settings {
    /// Load and validate settings.
    ///
    /// An explicit `path` must exist; without one, `wx-check.toml` in the
    /// working directory is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Settings::default())?);

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate_all()?;

        debug!(
            data_dir = %settings.source.data_dir.display(),
            output_dir = %settings.output.dir.display(),
            smtp = settings.smtp.is_some(),
            "settings loaded"
        );
        Ok(settings)
    }

    pub fn validate_all(&self) -> Result<()> {
        self.validate()?;
        if let Some(smtp) = &self.smtp {
            smtp.validate()?;
        }
        Ok(())
    }

    pub fn data_source(&self) -> CsvDirectorySource {
        CsvDirectorySource::new(&self.source.data_dir)
            .with_timestamp_column(&self.source.timestamp_column)
            .with_water_year_column(&self.source.water_year_column)
    }

    pub fn resolver(&self) -> CatalogResolver {
        CatalogResolver::with_clean_prefix(&self.source.clean_prefix)
    }
}
