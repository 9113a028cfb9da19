//! Declarative configuration-scheme primitives.
//!
//! Plugins describe the shape of their configuration block with these
//! types; the host validates user-supplied config against them before
//! any event fires.

use serde::Serialize;

/// The value type a configuration field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// A filesystem path, resolved relative to the configuration file.
    File {
        /// Whether the referenced file must exist at validation time.
        must_exist: bool,
    },
    /// A string scalar.
    Str,
    /// A boolean scalar.
    Bool,
    /// An ordered list of strings.
    StrList,
    /// A mapping of string keys to arbitrary values.
    Map,
}

/// One field of a repeatable configuration item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Field name as it appears in the configuration file.
    pub name: &'static str,
    /// Accepted value type.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
}

/// One entry of a plugin's configuration scheme: a named key accepting
/// zero or more items of the given field shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeEntry {
    /// Configuration key.
    pub key: String,
    /// Whether the key must be present.
    pub required: bool,
    /// Shape of each repeatable item under the key.
    pub fields: &'static [FieldSpec],
}

/// A plugin's full configuration scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigScheme {
    /// Scheme entries, in declaration order.
    pub entries: Vec<SchemeEntry>,
}

impl ConfigScheme {
    /// Returns the entry for a given configuration key.
    pub fn entry(&self, key: &str) -> Option<&SchemeEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}
