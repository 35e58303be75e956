//! Generic multi-field admin-area matching view.
//!
//! Matches one admin input text against the index fields of every usable
//! admin property in a single `multi_match` clause. The admin fallback
//! matcher delegates here after rewriting inputs to a single token, but the
//! view also stands on its own in a layout.

use serde_json::json;

use crate::vars::{valid_admin_properties, VariableStore};
use crate::view::{Fragment, View};

/// Builds the generic admin `multi_match` view over `admin_fields`.
///
/// For each usable admin property the store's `admin:<field>:field` mapping
/// becomes an entry in the `fields` list, suffixed `^<boost>` when
/// `admin:<field>:boost` is set. The query text is taken from the first
/// usable property's input; as with the fallback matcher, this assumes all
/// usable admin inputs carry equivalent text.
///
/// Returns `None` when no admin property is usable.
pub fn admin_multi_match(admin_fields: Vec<String>, analyzer: impl Into<String>) -> impl View {
    let analyzer = analyzer.into();

    move |vs: &VariableStore| -> Option<Fragment> {
        let valid = valid_admin_properties(vs, &admin_fields);
        let first = *valid.first()?;

        let fields: Vec<String> = valid
            .iter()
            .filter_map(|prop| {
                let index_field = vs.admin_index_field(prop)?;
                Some(boosted_field(index_field, vs.admin_boost(prop)))
            })
            .collect();

        let text = vs.input(first)?;

        Some(json!({
            "multi_match": {
                "query": text,
                "fields": fields,
                "analyzer": analyzer,
            }
        }))
    }
}

/// Renders `field` or `field^boost`, trimming the trailing `.0` from
/// integral boosts.
fn boosted_field(field: &str, boost: Option<f64>) -> String {
    match boost {
        Some(b) if b.fract() == 0.0 && b.is_finite() => format!("{}^{}", field, b as i64),
        Some(b) => format!("{}^{}", field, b),
        None => field.to_string(),
    }
}
