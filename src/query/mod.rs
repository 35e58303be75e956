//! Query assembly: composing view fragments into one search request.
//!
//! A [`Layout`] holds an ordered set of views in `must` / `should` /
//! `filter` slots. Rendering runs every view against one store, silently
//! drops the views that abstain, and wraps the surviving fragments in a
//! `bool` query envelope with the request-level knobs (`size`,
//! `track_scores`).
//!
//! [`search_store`] and [`search_layout`] build the standard pairing: a
//! store seeded from [`Config`] plus per-request inputs, and the layout of
//! the stock search views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::error::{GeoQueryError, Result};
use crate::vars::{VarValue, VariableStore};
use crate::view::{multi_match, AdminFallbackMatcher, Fragment, View};

/// Store key holding the main search text.
pub const NAME_INPUT_KEY: &str = "input:name";

/// Store key holding the result page size.
pub const SIZE_KEY: &str = "size";

const DEFAULT_SIZE: u32 = 10;

// ---------------------------------------------------------------------------
// Search request
// ---------------------------------------------------------------------------

/// Per-request user inputs for a search query build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Main search text.
    pub text: Option<String>,
    /// Admin field inputs, keyed by admin field name.
    pub admin: BTreeMap<String, String>,
}

impl SearchRequest {
    /// Parses a request from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Store seeding
// ---------------------------------------------------------------------------

/// Seeds a fresh [`VariableStore`] from configuration and request inputs.
///
/// Configuration contributes the `admin:<field>:field` mappings, boosts,
/// and the result size; the request contributes `input:` text variables.
/// Admin inputs naming a field absent from the configured table are
/// rejected.
pub fn search_store(config: &Config, request: &SearchRequest) -> Result<VariableStore> {
    let mut vs = VariableStore::new();
    vs.set(SIZE_KEY, config.search.size);

    for spec in &config.admin.fields {
        vs.set_admin_index_field(&spec.name, spec.index_field.clone());
        if let Some(boost) = spec.boost {
            vs.set_admin_boost(&spec.name, boost);
        }
    }

    if let Some(text) = &request.text {
        vs.set(NAME_INPUT_KEY, text.clone());
    }

    for (field, text) in &request.admin {
        if !config.admin.fields.iter().any(|spec| &spec.name == field) {
            return Err(GeoQueryError::UnknownAdminField(field.clone()));
        }
        vs.set_input(field, text.clone());
    }

    Ok(vs)
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Ordered composition of views into a `bool` query request body.
#[derive(Default)]
pub struct Layout {
    must: Vec<Box<dyn View>>,
    should: Vec<Box<dyn View>>,
    filter: Vec<Box<dyn View>>,
}

impl Layout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a view whose fragment lands in `bool.must`.
    pub fn must(mut self, view: impl View + 'static) -> Self {
        self.must.push(Box::new(view));
        self
    }

    /// Adds a view whose fragment lands in `bool.should`.
    pub fn should(mut self, view: impl View + 'static) -> Self {
        self.should.push(Box::new(view));
        self
    }

    /// Adds a view whose fragment lands in `bool.filter`.
    pub fn filter(mut self, view: impl View + 'static) -> Self {
        self.filter.push(Box::new(view));
        self
    }

    /// Renders every view against `vs` and assembles the request body.
    ///
    /// Views returning `None` are omitted; sections with no surviving
    /// fragment are left out of the `bool` body entirely. A request where
    /// every view abstained still renders the envelope (the engine treats
    /// an empty `bool` as match-all).
    pub fn render(&self, vs: &VariableStore) -> Fragment {
        let mut body = serde_json::Map::new();
        for (section, views) in [
            ("must", &self.must),
            ("should", &self.should),
            ("filter", &self.filter),
        ] {
            let fragments: Vec<Fragment> = views.iter().filter_map(|v| v.render(vs)).collect();
            debug!(
                section,
                configured = views.len(),
                rendered = fragments.len(),
                "layout section rendered"
            );
            if !fragments.is_empty() {
                body.insert(section.to_string(), Fragment::Array(fragments));
            }
        }

        let size = vs
            .get(SIZE_KEY)
            .and_then(VarValue::as_num)
            .unwrap_or(DEFAULT_SIZE as f64) as u64;

        json!({
            "query": { "bool": body },
            "size": size,
            "track_scores": true,
        })
    }
}

/// The stock search layout: main-text matching plus the admin last-token
/// fallback, both scoring clauses.
pub fn search_layout(config: &Config) -> Layout {
    Layout::new()
        .should(multi_match(
            NAME_INPUT_KEY,
            config.search.text_fields.clone(),
            config.search.text_analyzer.clone(),
        ))
        .should(AdminFallbackMatcher::new(
            config.admin.field_names(),
            config.admin.analyzer.clone(),
        ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
