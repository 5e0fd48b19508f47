//! Fragment decode/encode
//!
//! Decoding is strict about top-level shape: non-blank text must parse as
//! JSON into exactly the fragment's declared shape. Blank text is not an
//! error; it decodes to the empty instance of the shape. Encoding emits
//! either pretty text (two-space indent, the stored form) or compact text,
//! omitting zero-valued optional fields.

use serde::Serialize;

use crate::fragment::{Atc, Decorators, Fragment, FragmentKind, Options, Packs, Schedule};

/// Longest raw-input excerpt carried inside a decode error
const EXCERPT_MAX: usize = 64;

/// A fragment that failed to decode
#[derive(Debug, thiserror::Error)]
#[error("cannot decode {kind} fragment: {detail}")]
pub struct DecodeError {
    /// Which fragment shape was expected
    pub kind: FragmentKind,

    /// Parser or shape-mismatch message
    pub detail: String,

    /// Truncated head of the offending raw text
    pub excerpt: String,
}

impl DecodeError {
    fn new(kind: FragmentKind, err: &serde_json::Error, raw: &str) -> Self {
        let mut excerpt: String = raw.chars().take(EXCERPT_MAX).collect();
        if raw.chars().count() > EXCERPT_MAX {
            excerpt.push_str("...");
        }
        Self {
            kind,
            detail: err.to_string(),
            excerpt,
        }
    }
}

/// A value that failed to serialize
///
/// Not reachable for the shapes this crate defines, but the kind exists and
/// propagates rather than being swallowed.
#[derive(Debug, thiserror::Error)]
#[error("cannot encode fragment: {0}")]
pub struct EncodeError(#[from] pub serde_json::Error);

/// Decode raw stored text into a typed fragment
///
/// Blank (empty or whitespace-only) input decodes to the empty instance.
pub fn decode<F: Fragment>(raw: &str) -> Result<F, DecodeError> {
    if raw.trim().is_empty() {
        return Ok(F::default());
    }
    serde_json::from_str(raw).map_err(|err| DecodeError::new(F::KIND, &err, raw))
}

/// Encode a fragment or composed document
pub fn encode<T: Serialize>(value: &T, pretty: bool) -> Result<String, EncodeError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

/// Check that raw text decodes as the given fragment kind
///
/// Runtime-dispatch counterpart of [`decode`] for callers that carry the
/// kind as a value, such as wholesale fragment replacement.
pub fn validate(raw: &str, kind: FragmentKind) -> Result<(), DecodeError> {
    match kind {
        FragmentKind::Options => decode::<Options>(raw).map(drop),
        FragmentKind::Schedule => decode::<Schedule>(raw).map(drop),
        FragmentKind::Packs => decode::<Packs>(raw).map(drop),
        FragmentKind::Decorators => decode::<Decorators>(raw).map(drop),
        FragmentKind::Atc => decode::<Atc>(raw).map(drop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::ScheduleEntry;
    use serde_json::json;

    #[test]
    fn test_blank_input_decodes_empty() {
        assert!(decode::<Options>("").unwrap().is_empty());
        assert!(decode::<Schedule>("  \n\t").unwrap().is_empty());
        assert!(decode::<Decorators>("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = decode::<Options>("{not json").unwrap_err();
        assert_eq!(err.kind, FragmentKind::Options);
        assert_eq!(err.excerpt, "{not json");
    }

    #[test]
    fn test_wrong_top_level_shape_fails() {
        assert!(decode::<Options>("[1, 2]").is_err());
        assert!(decode::<Packs>("\"just a string\"").is_err());
        assert!(decode::<Atc>("42").is_err());
        assert!(decode::<Decorators>("[]").is_err());
    }

    #[test]
    fn test_null_is_not_a_fragment() {
        assert!(decode::<Options>("null").is_err());
        assert!(decode::<Decorators>("null").is_err());
    }

    #[test]
    fn test_type_mismatched_field_fails() {
        // query must be a string
        let err = decode::<Schedule>("{\"q1\":{\"query\":1}}").unwrap_err();
        assert_eq!(err.kind, FragmentKind::Schedule);
    }

    #[test]
    fn test_excerpt_is_truncated() {
        let raw = format!("[{}]", "1,".repeat(100));
        let err = decode::<Options>(&raw).unwrap_err();
        assert!(err.excerpt.ends_with("..."));
        assert!(err.excerpt.chars().count() <= EXCERPT_MAX + 3);
    }

    #[test]
    fn test_pretty_encode_uses_two_space_indent() {
        let mut options = Options::new();
        options.insert("verbose", json!(true));

        let text = encode(&options, true).unwrap();
        assert!(text.contains("\n  \"verbose\": true"));
    }

    #[test]
    fn test_round_trip_pretty_and_compact() {
        let mut schedule = Schedule::new();
        schedule.insert(
            "procs",
            ScheduleEntry {
                snapshot: true,
                ..ScheduleEntry::new("SELECT * FROM processes;", 60)
            },
        );

        for pretty in [true, false] {
            let text = encode(&schedule, pretty).unwrap();
            let back: Schedule = decode(&text).unwrap();
            assert_eq!(back, schedule);
        }
    }

    #[test]
    fn test_validate_dispatches_by_kind() {
        assert!(validate("{}", FragmentKind::Options).is_ok());
        assert!(validate("", FragmentKind::Decorators).is_ok());
        assert!(validate("[]", FragmentKind::Schedule).is_err());

        let err = validate("{\"t\":", FragmentKind::Atc).unwrap_err();
        assert_eq!(err.kind, FragmentKind::Atc);
    }
}
