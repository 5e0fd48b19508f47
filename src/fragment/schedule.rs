//! Schedule fragment and scheduled-query entries

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

fn is_false(value: &bool) -> bool {
    !value
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// One scheduled query
///
/// `query` and `interval` are required; every other field defaults and is
/// omitted on encode while it holds its zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleEntry {
    /// Query text, passed through byte-for-byte
    pub query: String,

    /// Execution interval in seconds
    pub interval: u32,

    /// Emit removed-row events
    #[serde(skip_serializing_if = "is_false")]
    pub removed: bool,

    /// Log full result snapshots instead of differentials
    #[serde(skip_serializing_if = "is_false")]
    pub snapshot: bool,

    /// Platform restriction (empty = all platforms)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub platform: String,

    /// Agent version restriction (empty = all versions)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Shard percentage of the fleet running this query (0 = all)
    #[serde(skip_serializing_if = "is_zero")]
    pub shard: u32,

    /// Whether the query participates in the denylist
    #[serde(skip_serializing_if = "is_false")]
    pub denylist: bool,
}

impl ScheduleEntry {
    /// Create an entry with the required fields, everything else defaulted
    pub fn new(query: impl Into<String>, interval: u32) -> Self {
        Self {
            query: query.into(),
            interval,
            ..Self::default()
        }
    }
}

// Manual impl so that only a JSON object is accepted; the derived form
// would also decode a positional array.
impl<'de> Deserialize<'de> for ScheduleEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            query: String,
            interval: u32,
            #[serde(default)]
            removed: bool,
            #[serde(default)]
            snapshot: bool,
            #[serde(default)]
            platform: String,
            #[serde(default)]
            version: String,
            #[serde(default)]
            shard: u32,
            #[serde(default)]
            denylist: bool,
        }

        let repr: Repr = super::from_object(deserializer, "scheduled query")?;
        Ok(Self {
            query: repr.query,
            interval: repr.interval,
            removed: repr.removed,
            snapshot: repr.snapshot,
            platform: repr.platform,
            version: repr.version,
            shard: repr.shard,
            denylist: repr.denylist,
        })
    }
}

/// Schedule fragment: query name to scheduled-query entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule(BTreeMap<String, ScheduleEntry>);

impl Schedule {
    /// Create an empty schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace an entry under `name` (no field-level merge)
    pub fn insert(&mut self, name: impl Into<String>, entry: ScheduleEntry) -> Option<ScheduleEntry> {
        self.0.insert(name.into(), entry)
    }

    /// Look up an entry by query name
    pub fn get(&self, name: &str) -> Option<&ScheduleEntry> {
        self.0.get(name)
    }

    /// Remove an entry, returning it if present
    pub fn remove(&mut self, name: &str) -> Option<ScheduleEntry> {
        self.0.remove(name)
    }

    /// Number of scheduled queries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the schedule has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScheduleEntry)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, ScheduleEntry>> for Schedule {
    fn from(map: BTreeMap<String, ScheduleEntry>) -> Self {
        Self(map)
    }
}

/// An inline pack, as stored inside the opaque packs fragment
///
/// A pack value may also be a plain reference string; this is the typed
/// shape for building inline packs. Every field is optional and omitted
/// while empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackEntry {
    /// Scheduled queries carried by the pack
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub queries: BTreeMap<String, ScheduleEntry>,

    /// Platform restriction (empty = all platforms)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub platform: String,

    /// Shard percentage (0 = all)
    #[serde(skip_serializing_if = "is_zero")]
    pub shard: u32,

    /// Agent version restriction (empty = all versions)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Discovery queries gating the pack
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discovery: Vec<String>,
}

impl<'de> Deserialize<'de> for PackEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            #[serde(default)]
            queries: BTreeMap<String, ScheduleEntry>,
            #[serde(default)]
            platform: String,
            #[serde(default)]
            shard: u32,
            #[serde(default)]
            version: String,
            #[serde(default)]
            discovery: Vec<String>,
        }

        let repr: Repr = super::from_object(deserializer, "pack")?;
        Ok(Self {
            queries: repr.queries,
            platform: repr.platform,
            shard: repr.shard,
            version: repr.version,
            discovery: repr.discovery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_entry_omits_optional_fields() {
        let entry = ScheduleEntry::new("SELECT * FROM processes;", 60);
        let text = serde_json::to_string(&entry).unwrap();

        assert_eq!(
            text,
            "{\"query\":\"SELECT * FROM processes;\",\"interval\":60}"
        );
    }

    #[test]
    fn test_set_fields_are_emitted() {
        let entry = ScheduleEntry {
            snapshot: true,
            platform: "linux".to_string(),
            shard: 25,
            ..ScheduleEntry::new("SELECT * FROM users;", 300)
        };
        let text = serde_json::to_string(&entry).unwrap();

        assert!(text.contains("\"snapshot\":true"));
        assert!(text.contains("\"platform\":\"linux\""));
        assert!(text.contains("\"shard\":25"));
        assert!(!text.contains("removed"));
        assert!(!text.contains("denylist"));
        assert!(!text.contains("version"));
    }

    #[test]
    fn test_optional_fields_default_on_decode() {
        let entry: ScheduleEntry =
            serde_json::from_str("{\"query\":\"SELECT 1;\",\"interval\":10}").unwrap();

        assert!(!entry.removed);
        assert!(!entry.snapshot);
        assert!(entry.platform.is_empty());
        assert_eq!(entry.shard, 0);
    }

    #[test]
    fn test_entry_rejects_positional_array_form() {
        assert!(serde_json::from_str::<ScheduleEntry>("[\"SELECT 1;\", 60]").is_err());
        assert!(serde_json::from_str::<Schedule>("{\"q1\": [\"SELECT 1;\", 60]}").is_err());
    }

    #[test]
    fn test_schedule_insert_replaces_whole_entry() {
        let mut schedule = Schedule::new();
        schedule.insert(
            "uptime",
            ScheduleEntry {
                platform: "darwin".to_string(),
                ..ScheduleEntry::new("SELECT * FROM uptime;", 3600)
            },
        );
        schedule.insert("uptime", ScheduleEntry::new("SELECT total_seconds FROM uptime;", 600));

        assert_eq!(schedule.len(), 1);
        let entry = schedule.get("uptime").unwrap();
        assert_eq!(entry.interval, 600);
        assert!(entry.platform.is_empty(), "replacement keeps no prior fields");
    }

    #[test]
    fn test_schedule_remove_and_iter() {
        let mut schedule = Schedule::new();
        schedule.insert("b_query", ScheduleEntry::new("SELECT 2;", 20));
        schedule.insert("a_query", ScheduleEntry::new("SELECT 1;", 10));

        let names: Vec<&String> = schedule.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a_query", "b_query"]);

        let removed = schedule.remove("a_query").unwrap();
        assert_eq!(removed.interval, 10);
        assert!(schedule.get("a_query").is_none());
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_pack_entry_round_trip() {
        let mut queries = BTreeMap::new();
        queries.insert("listening".to_string(), ScheduleEntry::new("SELECT * FROM listening_ports;", 120));
        let pack = PackEntry {
            queries,
            platform: "linux".to_string(),
            discovery: vec!["SELECT 1 FROM osquery_info;".to_string()],
            ..PackEntry::default()
        };

        let text = serde_json::to_string(&pack).unwrap();
        let back: PackEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, pack);
        assert!(!text.contains("shard"));
        assert!(!text.contains("version"));
    }

    #[test]
    fn test_pack_entry_rejects_array_form() {
        assert!(serde_json::from_str::<PackEntry>("[]").is_err());
        assert!(serde_json::from_str::<PackEntry>("[{}, \"linux\", 0, \"\", []]").is_err());
    }
}
