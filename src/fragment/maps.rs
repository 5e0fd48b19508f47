//! Open-shaped mapping fragments
//!
//! Options, packs, and ATC are mappings from a string key to an arbitrary
//! JSON value. The values are never inspected; they must survive a
//! decode/encode round trip unmodified. The underlying map is sorted by key,
//! so encoding is deterministic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

macro_rules! open_map_fragment {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Map<String, Value>);

        impl $name {
            /// Create an empty fragment
            pub fn new() -> Self {
                Self::default()
            }

            /// Insert or overwrite a key (last write wins, no nested merge)
            pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
                self.0.insert(key.into(), value)
            }

            /// Look up a key
            pub fn get(&self, key: &str) -> Option<&Value> {
                self.0.get(key)
            }

            /// Remove a key, returning its value if present
            pub fn remove(&mut self, key: &str) -> Option<Value> {
                self.0.remove(key)
            }

            /// Number of entries
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the fragment has no entries
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Iterate entries in key order
            pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
                self.0.iter()
            }
        }

        impl From<Map<String, Value>> for $name {
            fn from(map: Map<String, Value>) -> Self {
                Self(map)
            }
        }
    };
}

open_map_fragment! {
    /// Agent options: arbitrary string key to arbitrary JSON value
    Options
}

open_map_fragment! {
    /// Query packs: pack name to either a reference string or an inline entry
    Packs
}

open_map_fragment! {
    /// Automatic table construction: table name to an opaque table spec
    Atc
}
