//! Configuration for geoquery.
//!
//! [`Config::load`] reads `~/.config/geoquery/config.json` when present and
//! falls back to the built-in defaults otherwise. [`Config::default`] returns
//! the same defaults without touching the filesystem (useful in tests).
//!
//! # Configuration
//!
//! ```json
//! {
//!     "admin": {
//!         "analyzer": "admin_analyzer",
//!         "fields": [
//!             { "name": "country", "index_field": "parent.country", "boost": 5.0 },
//!             { "name": "locality", "index_field": "parent.locality" }
//!         ]
//!     },
//!     "search": {
//!         "text_fields": ["name.default", "phrase.default^2"],
//!         "text_analyzer": "standard",
//!         "size": 10
//!     }
//! }
//! ```

use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{GeoQueryError, Result};

// ---------------------------------------------------------------------------
// Built-in admin field table
// ---------------------------------------------------------------------------

/// The standard admin hierarchy, most significant level first. Order matters:
/// the fallback matcher takes its query text from the first usable entry.
static DEFAULT_ADMIN_FIELDS: Lazy<Vec<AdminFieldSpec>> = Lazy::new(|| {
    vec![
        AdminFieldSpec::boosted("country", "parent.country", 5.0),
        AdminFieldSpec::boosted("region", "parent.region", 3.0),
        AdminFieldSpec::boosted("county", "parent.county", 2.0),
        AdminFieldSpec::boosted("locality", "parent.locality", 4.0),
        AdminFieldSpec::boosted("localadmin", "parent.localadmin", 3.0),
        AdminFieldSpec::boosted("borough", "parent.borough", 2.0),
        AdminFieldSpec::plain("neighbourhood", "parent.neighbourhood"),
    ]
});

// ---------------------------------------------------------------------------
// Admin config
// ---------------------------------------------------------------------------

/// One level of the admin hierarchy and the index field it matches against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminFieldSpec {
    /// Admin field name as used in store keys (`input:<name>`, `admin:<name>:field`).
    pub name: String,
    /// Index field this admin level matches against.
    pub index_field: String,
    /// Optional boost applied to the index field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

impl AdminFieldSpec {
    fn plain(name: &str, index_field: &str) -> Self {
        Self {
            name: name.to_string(),
            index_field: index_field.to_string(),
            boost: None,
        }
    }

    fn boosted(name: &str, index_field: &str, boost: f64) -> Self {
        Self {
            name: name.to_string(),
            index_field: index_field.to_string(),
            boost: Some(boost),
        }
    }
}

/// `admin` section of `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Admin hierarchy levels to consider, in order.
    pub fields: Vec<AdminFieldSpec>,
    /// Analyzer applied to admin matching clauses.
    pub analyzer: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            fields: DEFAULT_ADMIN_FIELDS.clone(),
            analyzer: "admin_analyzer".to_string(),
        }
    }
}

impl AdminConfig {
    /// Admin field names in configured order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Search config
// ---------------------------------------------------------------------------

/// `search` section of `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Index fields the main search text matches against.
    pub text_fields: Vec<String>,
    /// Analyzer applied to the main text clause.
    pub text_analyzer: String,
    /// Result page size.
    pub size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            text_fields: vec!["name.default".to_string(), "phrase.default^2".to_string()],
            text_analyzer: "standard".to_string(),
            size: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level geoquery configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub admin: AdminConfig,
    pub search: SearchConfig,
}

impl Config {
    /// Load from `~/.config/geoquery/config.json`, falling back to the
    /// built-in defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            GeoQueryError::Config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants a usable config must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.admin.fields.is_empty() {
            return Err(GeoQueryError::Config(
                "admin field table must not be empty".to_string(),
            ));
        }
        if self.admin.fields.iter().any(|f| f.name.is_empty()) {
            return Err(GeoQueryError::Config(
                "admin field names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("geoquery")
        .join("config.json")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
