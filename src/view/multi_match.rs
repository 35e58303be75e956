//! Generic multi-field text matching view.
//!
//! The workhorse view for the main search text: one input variable matched
//! against a configured list of index fields with a single analyzer.

use serde_json::json;

use crate::vars::{VarValue, VariableStore};
use crate::view::{Fragment, View};

/// Builds a `multi_match` view reading the text at `input_key`.
///
/// Returns `None` when the variable is unset, not a string, or blank.
pub fn multi_match(
    input_key: impl Into<String>,
    fields: Vec<String>,
    analyzer: impl Into<String>,
) -> impl View {
    let input_key = input_key.into();
    let analyzer = analyzer.into();

    move |vs: &VariableStore| -> Option<Fragment> {
        let text = vs.get(&input_key).and_then(VarValue::as_str)?;
        if text.trim().is_empty() {
            return None;
        }

        Some(json!({
            "multi_match": {
                "query": text,
                "fields": fields,
                "analyzer": analyzer,
            }
        }))
    }
}
