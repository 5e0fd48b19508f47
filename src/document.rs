//! Composed configuration document

use serde::{Deserialize, Deserializer, Serialize};

use crate::fragment::{Atc, Decorators, Options, Packs, Schedule};

/// The full configuration document delivered to an agent
///
/// A pure aggregation of the five fragments with no identity of its own.
/// The top-level key names and nesting are part of the compatibility
/// contract with the consuming agent; `atc` serializes as
/// `auto_table_construction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentConfig {
    /// Agent options
    pub options: Options,

    /// Scheduled queries
    pub schedule: Schedule,

    /// Query packs
    pub packs: Packs,

    /// Decorator queries
    pub decorators: Decorators,

    /// Automatic table construction specs
    #[serde(rename = "auto_table_construction")]
    pub atc: Atc,
}

// Manual impl so that only a JSON object is accepted at the top level.
impl<'de> Deserialize<'de> for AgentConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            #[serde(default)]
            options: Options,
            #[serde(default)]
            schedule: Schedule,
            #[serde(default)]
            packs: Packs,
            #[serde(default)]
            decorators: Decorators,
            #[serde(default, rename = "auto_table_construction")]
            atc: Atc,
        }

        let repr: Repr = crate::fragment::from_object(deserializer, "configuration")?;
        Ok(Self {
            options: repr.options,
            schedule: repr.schedule,
            packs: repr.packs,
            decorators: repr.decorators,
            atc: repr.atc,
        })
    }
}

impl AgentConfig {
    /// Serialize the whole document, pretty (two-space indent) or compact
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Parse a whole document; blank input yields the all-empty document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }
}
