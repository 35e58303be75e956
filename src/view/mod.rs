//! Query views: the pluggable fragment builders of the assembly pipeline.
//!
//! A view is a pure function from a [`VariableStore`] to an optional query
//! [`Fragment`]. Returning `None` means "this strategy does not apply to
//! this request" and is never an error; the layout simply omits the
//! fragment. Views never mutate the store they are given; a view that
//! needs rewritten inputs (see [`AdminFallbackMatcher`]) works on an
//! exported copy.
//!
//! # Example
//!
//! ```rust
//! use geoquery::vars::VariableStore;
//! use geoquery::view::{Fragment, View};
//!
//! let view = |vs: &VariableStore| -> Option<Fragment> {
//!     let text = vs.get("input:name")?.as_str()?;
//!     Some(serde_json::json!({ "match": { "name.default": text } }))
//! };
//!
//! let mut vs = VariableStore::new();
//! vs.set("input:name", "union square");
//! assert!(view.render(&vs).is_some());
//! ```

use crate::vars::VariableStore;

mod admin_fallback;
mod admin_multi_match;
mod multi_match;

pub use admin_fallback::AdminFallbackMatcher;
pub use admin_multi_match::admin_multi_match;
pub use multi_match::multi_match;

/// An opaque unit of query-language structure produced by a view.
///
/// Only the view that built a fragment knows its shape; everything
/// downstream forwards it unchanged into the request body.
pub type Fragment = serde_json::Value;

/// A query fragment builder.
///
/// Implementations must be pure with respect to the store: read it, never
/// write it. `Send + Sync` so one configured view can serve concurrent
/// request builds.
pub trait View: Send + Sync {
    /// Renders a fragment for the given store, or `None` when the view
    /// does not apply.
    fn render(&self, vs: &VariableStore) -> Option<Fragment>;
}

/// Any matching closure is a view, so simple strategies and test fakes
/// don't need a named type.
impl<F> View for F
where
    F: Fn(&VariableStore) -> Option<Fragment> + Send + Sync,
{
    fn render(&self, vs: &VariableStore) -> Option<Fragment> {
        self(vs)
    }
}
