use crate::error::{MonitorError, Result};
use crate::models::{CheckProfile, Station};
use crate::utils::constants::DEFAULT_CLEAN_PREFIX;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub struct CatalogResolver {
    clean_prefix: String,
}

impl CatalogResolver {
    pub fn new() -> Self {
        Self {
            clean_prefix: DEFAULT_CLEAN_PREFIX.to_string(),
        }
    }

    pub fn with_clean_prefix(clean_prefix: impl Into<String>) -> Self {
        Self {
            clean_prefix: clean_prefix.into(),
        }
    }

    /// Derive the stations a profile evaluates from the raw source names.
    ///
    /// Only names carrying the clean prefix are candidates; the profile's
    /// exclusion set is applied to the raw name. Output is ordered by source
    /// name.
    pub fn resolve(
        &self,
        all_source_names: &BTreeSet<String>,
        profile: &CheckProfile,
    ) -> Result<Vec<Station>> {
        if all_source_names.is_empty() {
            return Err(MonitorError::InvalidCatalog(
                "data source reported no tables".to_string(),
            ));
        }

        let stations: Vec<Station> = all_source_names
            .iter()
            .filter(|name| name.starts_with(self.clean_prefix.as_str()))
            .filter(|name| {
                let excluded = profile.exclusions.excludes(name);
                if excluded {
                    debug!(source = %name, profile = %profile.kind, "source excluded");
                }
                !excluded
            })
            .map(|name| Station::from_source_name(name, &self.clean_prefix))
            .collect();

        if stations.is_empty() {
            warn!(
                profile = %profile.kind,
                sources = all_source_names.len(),
                "no stations left after filtering the catalog"
            );
        }

        Ok(stations)
    }
}

impl Default for CatalogResolver {
    fn default() -> Self {
        Self::new()
    }
}
