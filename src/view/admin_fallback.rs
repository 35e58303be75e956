//! Last-token admin-area fallback matching.
//!
//! A specialized fallback strategy for queries whose admin input carries a
//! multi-word value (e.g. "New York" supplied as a region): instead of
//! matching the full text, reduce it to its final whitespace-delimited
//! token and hand the generic admin matching view a store rewritten to that
//! single token. The strategy is all-or-nothing: if no admin field is
//! usable, or the usable text yields no tokens, no fragment is rendered.
//!
//! # Example
//!
//! ```rust
//! use geoquery::vars::VariableStore;
//! use geoquery::view::{AdminFallbackMatcher, View};
//!
//! let matcher = AdminFallbackMatcher::new(
//!     vec!["country".to_string(), "region".to_string()],
//!     "admin_analyzer",
//! );
//!
//! let mut vs = VariableStore::new();
//! vs.set_input("country", "United States");
//! vs.set_admin_index_field("country", "parent.country");
//!
//! let fragment = matcher.render(&vs).unwrap();
//! // The delegated multi_match sees only the last token.
//! assert_eq!(fragment["multi_match"]["query"], "States");
//! ```

use tracing::debug;

use crate::vars::{valid_admin_properties, VariableStore};
use crate::view::{admin_multi_match, Fragment, View};

/// Decides whether last-token admin matching applies and, if so, delegates
/// to a downstream view over a rewritten store copy.
///
/// # Known limitation
///
/// The query text is taken from the *first* usable admin field only, on the
/// assumption that every usable admin field carries equivalent text. That
/// assumption is not validated; divergent admin inputs are not reconciled,
/// and fields past the first are silently ignored when extracting tokens.
pub struct AdminFallbackMatcher {
    admin_fields: Vec<String>,
    subview: Box<dyn View>,
}

impl AdminFallbackMatcher {
    /// Creates a matcher that delegates to the standard
    /// [`admin_multi_match`] view over the same `admin_fields`.
    pub fn new(admin_fields: Vec<String>, analyzer: impl Into<String> + 'static) -> Self {
        let subview = Box::new(admin_multi_match(admin_fields.clone(), analyzer));
        Self {
            admin_fields,
            subview,
        }
    }

    /// Creates a matcher with an injected downstream view.
    pub fn with_subview(admin_fields: Vec<String>, subview: Box<dyn View>) -> Self {
        Self {
            admin_fields,
            subview,
        }
    }
}

impl View for AdminFallbackMatcher {
    fn render(&self, vs: &VariableStore) -> Option<Fragment> {
        // Which of the configured admin properties are actually usable with
        // this store.
        let valid = valid_admin_properties(vs, &self.admin_fields);

        if valid.is_empty() {
            debug!("admin fallback: no usable admin properties, skipping");
            return None;
        }

        // TODO: handle the case where not all admin input values are the same
        let text = vs.input(valid[0])?;
        let tokens: Vec<&str> = text.split_whitespace().collect();

        debug!(
            properties = ?valid,
            token_count = tokens.len(),
            "admin fallback: usable properties and extracted tokens"
        );

        // No tokens to use (empty or whitespace-only input), don't render.
        let Some(last_token) = tokens.last() else {
            debug!("admin fallback: no tokens, skipping");
            return None;
        };

        debug!(last_token = *last_token, "admin fallback: active");

        // Work on a copy so the original store is never mutated.
        let mut copy = VariableStore::from_snapshot(vs.export());

        // Every configured admin input is rewritten to the last token,
        // including fields that carried no input before.
        for field in &self.admin_fields {
            copy.set_input(field, *last_token);
        }

        self.subview.render(&copy)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use mockall::mock;
    use serde_json::json;

    use super::*;
    use crate::vars::StoreSnapshot;

    mock! {
        Subview {}

        impl View for Subview {
            fn render(&self, vs: &VariableStore) -> Option<Fragment>;
        }
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Fake downstream that counts calls and records the store it was given.
    struct RecordingSubview {
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Option<StoreSnapshot>>>,
        result: Option<Fragment>,
    }

    impl View for RecordingSubview {
        fn render(&self, vs: &VariableStore) -> Option<Fragment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some(vs.export());
            self.result.clone()
        }
    }

    fn recording_matcher(
        admin_fields: Vec<String>,
        result: Option<Fragment>,
    ) -> (AdminFallbackMatcher, Arc<AtomicUsize>, Arc<Mutex<Option<StoreSnapshot>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(None));
        let matcher = AdminFallbackMatcher::with_subview(
            admin_fields,
            Box::new(RecordingSubview {
                calls: Arc::clone(&calls),
                seen: Arc::clone(&seen),
                result,
            }),
        );
        (matcher, calls, seen)
    }

    #[test]
    fn test_no_usable_fields_skips_without_calling_downstream() {
        let (matcher, calls, _) =
            recording_matcher(fields(&["country", "region"]), Some(json!({"x": 1})));

        // input without mapping, mapping without input: neither is usable.
        let mut vs = VariableStore::new();
        vs.set_input("country", "Germany");
        vs.set_admin_index_field("region", "parent.region");

        assert_eq!(matcher.render(&vs), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_whitespace_only_input_is_skipped() {
        let (matcher, calls, _) =
            recording_matcher(fields(&["country"]), Some(json!({"x": 1})));

        let mut vs = VariableStore::new();
        vs.set_input("country", "   ");
        vs.set_admin_index_field("country", "parent.country");

        assert_eq!(matcher.render(&vs), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_input_is_skipped() {
        let (matcher, calls, _) = recording_matcher(fields(&["country"]), Some(json!({"x": 1})));

        let mut vs = VariableStore::new();
        vs.set_input("country", "");
        vs.set_admin_index_field("country", "parent.country");

        assert_eq!(matcher.render(&vs), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_tokens_ignore_surrounding_whitespace() {
        let (matcher, _, seen) = recording_matcher(fields(&["country"]), None);

        let mut vs = VariableStore::new();
        vs.set_input("country", "  United  States \t ");
        vs.set_admin_index_field("country", "parent.country");

        matcher.render(&vs);

        // Leading/trailing whitespace never yields empty tokens; the last
        // real token is "States".
        let snapshot = seen.lock().unwrap().take().unwrap();
        let copy = VariableStore::from_snapshot(snapshot);
        assert_eq!(copy.input("country"), Some("States"));
    }

    #[test]
    fn test_original_store_is_never_mutated() {
        let (matcher, _, _) = recording_matcher(
            fields(&["country", "region"]),
            Some(json!({"x": 1})),
        );

        let mut vs = VariableStore::new();
        vs.set_input("country", "United States");
        vs.set_admin_index_field("country", "parent.country");

        let before = vs.export();
        matcher.render(&vs);
        assert_eq!(vs.export(), before);
    }

    #[test]
    fn test_uniform_overwrite_covers_all_configured_fields() {
        let (matcher, _, seen) =
            recording_matcher(fields(&["country", "region", "locality"]), None);

        let mut vs = VariableStore::new();
        vs.set_input("country", "United States");
        vs.set_admin_index_field("country", "parent.country");
        // region had different input; locality had none. Both get the token.
        vs.set_input("region", "somewhere else");
        vs.set_admin_index_field("region", "parent.region");

        matcher.render(&vs);

        let copy = VariableStore::from_snapshot(seen.lock().unwrap().take().unwrap());
        assert_eq!(copy.input("country"), Some("States"));
        assert_eq!(copy.input("region"), Some("States"));
        assert_eq!(copy.input("locality"), Some("States"));
    }

    #[test]
    fn test_first_valid_field_text_wins() {
        let (matcher, _, seen) = recording_matcher(fields(&["country", "region"]), None);

        let mut vs = VariableStore::new();
        vs.set_input("country", "United States");
        vs.set_admin_index_field("country", "parent.country");
        vs.set_input("region", "New York");
        vs.set_admin_index_field("region", "parent.region");

        matcher.render(&vs);

        // "New York" is ignored: tokens come from the first usable field.
        let copy = VariableStore::from_snapshot(seen.lock().unwrap().take().unwrap());
        assert_eq!(copy.input("region"), Some("States"));
    }

    #[test]
    fn test_downstream_result_passes_through() {
        let fragment = json!({"multi_match": {"query": "States"}});
        let (matcher, _, _) =
            recording_matcher(fields(&["country"]), Some(fragment.clone()));

        let mut vs = VariableStore::new();
        vs.set_input("country", "United States");
        vs.set_admin_index_field("country", "parent.country");

        assert_eq!(matcher.render(&vs), Some(fragment));
    }

    #[test]
    fn test_downstream_none_passes_through() {
        let (matcher, calls, _) = recording_matcher(fields(&["country"]), None);

        let mut vs = VariableStore::new();
        vs.set_input("country", "Germany");
        vs.set_admin_index_field("country", "parent.country");

        assert_eq!(matcher.render(&vs), None);
        // The matcher activated; the None came from downstream.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mocked_subview_sees_last_token() {
        let mut subview = MockSubview::new();
        subview
            .expect_render()
            .withf(|vs: &VariableStore| {
                vs.input("country") == Some("States") && vs.input("region") == Some("States")
            })
            .times(1)
            .returning(|_| Some(json!({"ok": true})));

        let matcher =
            AdminFallbackMatcher::with_subview(fields(&["country", "region"]), Box::new(subview));

        let mut vs = VariableStore::new();
        vs.set_input("country", "United States");
        vs.set_admin_index_field("country", "parent.country");

        assert_eq!(matcher.render(&vs), Some(json!({"ok": true})));
    }

    #[test]
    fn test_default_subview_end_to_end() {
        let matcher = AdminFallbackMatcher::new(fields(&["country", "region"]), "admin_analyzer");

        let mut vs = VariableStore::new();
        vs.set_input("country", "United States");
        vs.set_admin_index_field("country", "parent.country");
        vs.set_admin_index_field("region", "parent.region");

        let fragment = matcher.render(&vs).unwrap();

        // After the rewrite, region is usable too (its input was filled in),
        // so both index fields participate in the delegated match.
        assert_eq!(fragment["multi_match"]["query"], "States");
        assert_eq!(
            fragment["multi_match"]["fields"],
            json!(["parent.country", "parent.region"])
        );
        assert_eq!(fragment["multi_match"]["analyzer"], "admin_analyzer");
    }

    #[test]
    fn test_single_token_input_activates() {
        let (matcher, calls, seen) = recording_matcher(fields(&["country"]), None);

        let mut vs = VariableStore::new();
        vs.set_input("country", "Germany");
        vs.set_admin_index_field("country", "parent.country");

        matcher.render(&vs);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let copy = VariableStore::from_snapshot(seen.lock().unwrap().take().unwrap());
        assert_eq!(copy.input("country"), Some("Germany"));
    }
}
