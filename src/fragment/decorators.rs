//! Decorators fragment

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decorator queries attached as metadata to agent log events
///
/// The only fragment whose top level is not a mapping. `interval` is an
/// opaque mapping of named intervals to query lists and is never inspected.
/// Empty slots are omitted on encode, so an empty fragment encodes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Decorators {
    /// Queries run once at agent startup
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub load: Vec<String>,

    /// Queries run on every log event
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub always: Vec<String>,

    /// Named-interval query lists, opaque
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Value>,
}

impl Decorators {
    /// Whether all three slots are empty
    pub fn is_empty(&self) -> bool {
        self.load.is_empty() && self.always.is_empty() && self.interval.is_none()
    }
}

// Manual impl so that only a JSON object is accepted at the top level.
impl<'de> Deserialize<'de> for Decorators {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            #[serde(default)]
            load: Vec<String>,
            #[serde(default)]
            always: Vec<String>,
            #[serde(default)]
            interval: Option<Value>,
        }

        let repr: Repr = super::from_object(deserializer, "decorators")?;
        Ok(Self {
            load: repr.load,
            always: repr.always,
            interval: repr.interval,
        })
    }
}
