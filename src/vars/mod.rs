//! Variable store: the typed key-value bag of query-build state.
//!
//! Every view in the assembly pipeline reads from a single [`VariableStore`]
//! populated per request. Keys are namespaced by convention, and the shapes
//! below must be preserved exactly for interop with the rest of the
//! pipeline:
//!
//! - `input:<field>` - user-supplied text for an admin field
//! - `admin:<field>:field` - which index field `<field>` maps to
//! - `admin:<field>:boost` - optional boost applied to that index field
//!
//! An admin field is *usable* only when both its `input:` and
//! `admin:<field>:field` entries are set; [`valid_admin_properties`]
//! implements that filter once for every admin view.
//!
//! Stores are copied, never shared: [`VariableStore::export`] produces a
//! [`StoreSnapshot`] owning fully independent data, and
//! [`VariableStore::from_snapshot`] rebuilds a store from one. A store built
//! from a snapshot shares no substructure with its origin, so views that
//! rewrite variables (e.g. the admin fallback matcher) mutate a copy and
//! leave the original untouched.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Variable values
// ---------------------------------------------------------------------------

/// A typed variable value held by the store.
///
/// Serializes untagged, so snapshots read as plain JSON objects
/// (`{"input:country": "United States", "size": 10}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    /// Raw text, e.g. user input for an admin field.
    Str(String),
    /// Numeric value, e.g. a boost or result size.
    Num(f64),
    /// Boolean flag.
    Bool(bool),
}

impl VarValue {
    /// Returns the string form if this is a `Str` variable.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VarValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric form if this is a `Num` variable.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            VarValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean form if this is a `Bool` variable.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Str(s) => write!(f, "{}", s),
            // Integral numbers render without the trailing ".0" so boost
            // suffixes come out as "country_a^5", not "country_a^5.0".
            VarValue::Num(n) if n.fract() == 0.0 && n.is_finite() => {
                write!(f, "{}", *n as i64)
            }
            VarValue::Num(n) => write!(f, "{}", n),
            VarValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::Str(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::Str(s)
    }
}

impl From<f64> for VarValue {
    fn from(n: f64) -> Self {
        VarValue::Num(n)
    }
}

impl From<u32> for VarValue {
    fn from(n: u32) -> Self {
        VarValue::Num(n as f64)
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        VarValue::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An exported, fully owned copy of a store's contents.
///
/// The snapshot holds deep-copied data: constructing a new store from it and
/// mutating that store never affects the store the snapshot was exported
/// from, and vice versa. This is the one concurrency-relevant contract the
/// store upholds for the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot(HashMap<String, VarValue>);

// ---------------------------------------------------------------------------
// Variable store
// ---------------------------------------------------------------------------

/// Request-scoped key-value store of query-build inputs and configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    vars: HashMap<String, VarValue>,
}

impl VariableStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from an exported snapshot.
    ///
    /// The resulting store is independent of the snapshot's origin.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self { vars: snapshot.0 }
    }

    /// Exports the full contents as an owned [`StoreSnapshot`].
    pub fn export(&self) -> StoreSnapshot {
        StoreSnapshot(self.vars.clone())
    }

    /// Returns true if `key` has a value set.
    pub fn isset(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Returns the value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<&VarValue> {
        self.vars.get(key)
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<VarValue>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Removes `key` from the store.
    pub fn unset(&mut self, key: &str) {
        self.vars.remove(key);
    }

    /// Number of variables currently set.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    // -----------------------------------------------------------------------
    // Typed admin accessors
    //
    // These wrap the string-concatenation key convention so callers never
    // assemble `input:`/`admin:` keys by hand.
    // -----------------------------------------------------------------------

    /// User-supplied text for an admin field (`input:<field>`).
    pub fn input(&self, field: &str) -> Option<&str> {
        self.get(&input_key(field)).and_then(VarValue::as_str)
    }

    /// Sets the user-supplied text for an admin field.
    pub fn set_input(&mut self, field: &str, text: impl Into<String>) {
        self.set(input_key(field), text.into());
    }

    /// Returns true if `input:<field>` is set.
    pub fn has_input(&self, field: &str) -> bool {
        self.isset(&input_key(field))
    }

    /// Index field an admin field maps to (`admin:<field>:field`).
    pub fn admin_index_field(&self, field: &str) -> Option<&str> {
        self.get(&admin_field_key(field)).and_then(VarValue::as_str)
    }

    /// Sets the index field an admin field maps to.
    pub fn set_admin_index_field(&mut self, field: &str, index_field: impl Into<String>) {
        self.set(admin_field_key(field), index_field.into());
    }

    /// Returns true if `admin:<field>:field` is set.
    pub fn has_admin_index_field(&self, field: &str) -> bool {
        self.isset(&admin_field_key(field))
    }

    /// Boost for an admin field's index field (`admin:<field>:boost`).
    pub fn admin_boost(&self, field: &str) -> Option<f64> {
        self.get(&admin_boost_key(field)).and_then(VarValue::as_num)
    }

    /// Sets the boost for an admin field's index field.
    pub fn set_admin_boost(&mut self, field: &str, boost: f64) {
        self.set(admin_boost_key(field), boost);
    }
}

fn input_key(field: &str) -> String {
    format!("input:{}", field)
}

fn admin_field_key(field: &str) -> String {
    format!("admin:{}:field", field)
}

fn admin_boost_key(field: &str) -> String {
    format!("admin:{}:boost", field)
}

// ---------------------------------------------------------------------------
// Usability filter
// ---------------------------------------------------------------------------

/// Filters `fields` down to the admin properties actually usable with this
/// store: non-empty name, `input:<field>` set, and `admin:<field>:field`
/// set. Order is preserved from `fields`.
pub fn valid_admin_properties<'a>(vs: &VariableStore, fields: &'a [String]) -> Vec<&'a str> {
    fields
        .iter()
        .map(String::as_str)
        .filter(|field| {
            !field.is_empty() && vs.has_input(field) && vs.has_admin_index_field(field)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
