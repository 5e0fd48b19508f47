//! Typed configuration fragments
//!
//! An agent configuration is stored as five independently-maintained JSON
//! fragments: options, schedule, packs, decorators, and automatic table
//! construction (ATC). Each fragment has a fixed top-level shape; the values
//! inside are opaque and pass through composition unmodified.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

mod decorators;
mod maps;
mod schedule;

pub use decorators::Decorators;
pub use maps::{Atc, Options, Packs};
pub use schedule::{PackEntry, Schedule, ScheduleEntry};

/// The five fragment kinds making up an agent configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Flat key/value agent options
    Options,
    /// Named scheduled queries
    Schedule,
    /// Named query packs, inline or referenced
    Packs,
    /// Decorator queries attached to log events
    Decorators,
    /// Automatic table construction specs
    Atc,
}

impl FragmentKind {
    /// All five kinds, in composed-document order
    pub const ALL: [FragmentKind; 5] = [
        FragmentKind::Options,
        FragmentKind::Schedule,
        FragmentKind::Packs,
        FragmentKind::Decorators,
        FragmentKind::Atc,
    ];

    /// Returns the fragment name as stored and reported in errors
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKind::Options => "options",
            FragmentKind::Schedule => "schedule",
            FragmentKind::Packs => "packs",
            FragmentKind::Decorators => "decorators",
            FragmentKind::Atc => "atc",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed fragment shape, bound to its kind
///
/// Implemented by exactly the five shapes in this module. `Default` is the
/// empty-but-valid instance that blank stored text decodes to.
pub trait Fragment: Default + Serialize + DeserializeOwned + PartialEq {
    /// Which of the five fragments this shape is
    const KIND: FragmentKind;
}

impl Fragment for Options {
    const KIND: FragmentKind = FragmentKind::Options;
}

impl Fragment for Schedule {
    const KIND: FragmentKind = FragmentKind::Schedule;
}

impl Fragment for Packs {
    const KIND: FragmentKind = FragmentKind::Packs;
}

impl Fragment for Decorators {
    const KIND: FragmentKind = FragmentKind::Decorators;
}

impl Fragment for Atc {
    const KIND: FragmentKind = FragmentKind::Atc;
}

/// Deserialize a struct shape from a JSON object only
///
/// Derived struct deserialization also accepts serde's positional sequence
/// form, which would let an array pass where the data model requires an
/// object. Shapes with named fields route their `Deserialize` through this
/// guard instead.
pub(crate) fn from_object<'de, D, T>(deserializer: D, shape: &'static str) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom(format!(
            "expected {shape} object, found {}",
            json_type(&value)
        )));
    }
    serde_json::from_value(value).map_err(serde::de::Error::custom)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(FragmentKind::Options.as_str(), "options");
        assert_eq!(FragmentKind::Schedule.as_str(), "schedule");
        assert_eq!(FragmentKind::Packs.as_str(), "packs");
        assert_eq!(FragmentKind::Decorators.as_str(), "decorators");
        assert_eq!(FragmentKind::Atc.as_str(), "atc");
    }

    #[test]
    fn test_kind_display_matches_as_str() {
        for kind in FragmentKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_all_lists_five_kinds() {
        assert_eq!(FragmentKind::ALL.len(), 5);
    }
}
