//! Layered planner configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `PLANNER_` prefix (`PLANNER_SEED=7`,
//!    `PLANNER_HOLIDAY_POLICY=skip`, `PLANNER_HTTP_ADDR=127.0.0.1:8080`)
//! 2. An optional TOML file passed by the caller
//! 3. Built-in defaults
//!
//! The taxonomy table is kept in its own TOML or JSON file referenced by
//! `taxonomy_file`; without one the built-in table is used. Yearly holidays
//! go in the TOML file as `recurring_holidays = [{ month = 5, day = 1 }]`.

use crate::calendar::{HolidayPolicy, RecurringHoliday};
use crate::error::PlanningError;
use crate::planner::{LevelSelection, PlannerOptions};
use crate::scheduler::{SchedulerOptions, TestAlignment};
use crate::taxonomy::Taxonomy;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_PREFIX: &str = "PLANNER_";
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid taxonomy TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid taxonomy JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] PlanningError),
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub holiday_policy: HolidayPolicy,
    #[serde(default)]
    pub test_alignment: TestAlignment,
    #[serde(default)]
    pub level_selection: LevelSelection,
    /// Seed for verb and phrase selection; random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_file: Option<PathBuf>,
    /// Holidays observed every year, merged into each request's holiday list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurring_holidays: Vec<RecurringHoliday>,
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

fn default_http_addr() -> String {
    DEFAULT_HTTP_ADDR.to_string()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            holiday_policy: HolidayPolicy::default(),
            test_alignment: TestAlignment::default(),
            level_selection: LevelSelection::default(),
            seed: None,
            taxonomy_file: None,
            recurring_holidays: Vec::new(),
            http_addr: default_http_addr(),
        }
    }
}

impl PlannerConfig {
    /// Provider chain: defaults, then `file` if given, then `PLANNER_*` variables.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(file).extract()?;
        Ok(config)
    }

    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            scheduler: SchedulerOptions {
                holiday_policy: self.holiday_policy,
                test_alignment: self.test_alignment,
            },
            level_selection: self.level_selection.clone(),
            recurring_holidays: self.recurring_holidays.clone(),
        }
    }

    /// The configured taxonomy table, or the built-in one.
    pub fn taxonomy(&self) -> Result<Taxonomy, ConfigError> {
        match &self.taxonomy_file {
            Some(path) => load_taxonomy(path),
            None => Ok(Taxonomy::default()),
        }
    }
}

/// Read a taxonomy table from a `.json` file, or TOML for any other extension.
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let taxonomy: Taxonomy = if is_json {
        serde_json::from_str(&raw)?
    } else {
        toml::from_str(&raw)?
    };
    taxonomy.validate()?;
    Ok(taxonomy)
}
