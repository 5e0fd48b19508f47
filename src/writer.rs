//! Persistence orchestration
//!
//! `ConfigWriter` runs the read-current-fragments, compose or mutate,
//! encode, persist sequences against the external store. Every mutation
//! ends with a refresh that rebuilds the cached composed text from the
//! stored fragments; the composed field is never patched incrementally.
//!
//! Operations are synchronous and scoped to one environment. They provide
//! no cross-operation atomicity: concurrent mutators of the same
//! environment must be serialized by the caller or the store.

use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::{self, DecodeError, EncodeError};
use crate::compose::{self, FragmentError};
use crate::document::AgentConfig;
use crate::fragment::{FragmentKind, Options, Schedule, ScheduleEntry};
use crate::store::{ConfigStore, ConfigUpdate, StoreError};

/// A failed write operation, with environment and operation context
#[derive(Debug, thiserror::Error)]
#[error("{op} failed for environment {env}: {source}")]
pub struct WriteError {
    /// Environment the operation targeted
    pub env: String,

    /// Operation name (refresh, add_option, ...)
    pub op: &'static str,

    /// What went wrong
    #[source]
    pub source: WriteCause,
}

/// Underlying cause of a failed write operation
#[derive(Debug, thiserror::Error)]
pub enum WriteCause {
    /// Composition or decomposition failed
    #[error(transparent)]
    Fragment(#[from] FragmentError),

    /// A single fragment failed to decode
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A value failed to serialize
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The store reported a failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn write_failed<'a, E: Into<WriteCause>>(
    env: &'a str,
    op: &'static str,
) -> impl FnOnce(E) -> WriteError + 'a {
    move |cause| WriteError {
        env: env.to_string(),
        op,
        source: cause.into(),
    }
}

/// Orchestrates configuration writes for environments in one store
#[derive(Debug, Clone)]
pub struct ConfigWriter<S: ConfigStore> {
    store: S,
}

impl<S: ConfigStore> ConfigWriter<S> {
    /// Create a writer over a store handle
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rebuild the composed text from the stored fragments
    ///
    /// The canonical rebuild-from-source-of-truth path, run after every
    /// fragment mutation. Writes nothing on failure.
    pub fn refresh(&self, env: &str) -> Result<(), WriteError> {
        self.rebuild(env, "refresh")
    }

    fn rebuild(&self, env: &str, op: &'static str) -> Result<(), WriteError> {
        let current = self.store.get(env).map_err(write_failed(env, op))?;
        let config = compose::compose(&current.fragments).map_err(|err| {
            warn!(env, fragment = %err.name(), "composition failed, composed text left unchanged");
            write_failed(env, op)(err)
        })?;
        let text = codec::encode(&config, true).map_err(write_failed(env, op))?;
        self.store
            .update(env, ConfigUpdate::composed(text))
            .map_err(write_failed(env, op))?;
        debug!(env, op, "composed configuration rebuilt");
        Ok(())
    }

    /// Write a composed configuration directly, bypassing decomposition
    ///
    /// For bulk admin replacement of the delivered artifact; the stored
    /// fragments are not touched.
    pub fn replace_whole(&self, env: &str, config: &AgentConfig) -> Result<(), WriteError> {
        let op = "replace_whole";
        let text = codec::encode(config, true).map_err(write_failed(env, op))?;
        self.store
            .update(env, ConfigUpdate::composed(text))
            .map_err(write_failed(env, op))?;
        debug!(env, "composed configuration replaced wholesale");
        Ok(())
    }

    /// Replace all five stored fragments from a composed configuration
    ///
    /// All five fragments are encoded before any write is issued; the five
    /// fields are then written as one logical update and the composed text
    /// rebuilt. On any failure nothing is modified.
    pub fn replace_parts(&self, env: &str, config: &AgentConfig) -> Result<(), WriteError> {
        let op = "replace_parts";
        let fragments = compose::decompose(config).map_err(write_failed(env, op))?;
        self.store
            .update(env, ConfigUpdate::fragments(fragments))
            .map_err(write_failed(env, op))?;
        self.rebuild(env, op)
    }

    /// Replace one fragment's raw text wholesale
    ///
    /// The text must decode as the fragment's shape; it is then stored
    /// verbatim and the composed text rebuilt from the stored fragments.
    pub fn replace_fragment(
        &self,
        env: &str,
        kind: FragmentKind,
        raw: &str,
    ) -> Result<(), WriteError> {
        let op = "replace_fragment";
        codec::validate(raw, kind).map_err(write_failed(env, op))?;
        self.store
            .update(env, ConfigUpdate::fragment(kind, raw))
            .map_err(write_failed(env, op))?;
        self.rebuild(env, op)
    }

    /// Set one option, overwriting any prior value for the key
    pub fn add_option(&self, env: &str, key: &str, value: Value) -> Result<(), WriteError> {
        let op = "add_option";
        let current = self.store.get(env).map_err(write_failed(env, op))?;
        let mut options: Options =
            codec::decode(&current.fragments.options).map_err(write_failed(env, op))?;
        options.insert(key, value);
        let text = codec::encode(&options, true).map_err(write_failed(env, op))?;
        self.store
            .update(env, ConfigUpdate::fragment(FragmentKind::Options, text))
            .map_err(write_failed(env, op))?;
        self.rebuild(env, op)
    }

    /// Set one scheduled query, fully replacing any prior entry for the name
    pub fn add_schedule_entry(
        &self,
        env: &str,
        name: &str,
        entry: ScheduleEntry,
    ) -> Result<(), WriteError> {
        let op = "add_schedule_entry";
        let current = self.store.get(env).map_err(write_failed(env, op))?;
        let mut schedule: Schedule =
            codec::decode(&current.fragments.schedule).map_err(write_failed(env, op))?;
        schedule.insert(name, entry);
        let text = codec::encode(&schedule, true).map_err(write_failed(env, op))?;
        self.store
            .update(env, ConfigUpdate::fragment(FragmentKind::Schedule, text))
            .map_err(write_failed(env, op))?;
        self.rebuild(env, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FailureConfig, MemoryStore, StoreOp};
    use serde_json::json;

    fn writer_with_env(env: &str) -> ConfigWriter<MemoryStore> {
        let store = MemoryStore::new();
        store.add_environment(env);
        ConfigWriter::new(store)
    }

    #[test]
    fn test_refresh_writes_composed_text() {
        let writer = writer_with_env("prod");
        writer.refresh("prod").unwrap();

        let composed = writer.store().record("prod").unwrap().composed;
        let config = AgentConfig::from_json(&composed).unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    fn test_error_carries_env_and_op() {
        let writer = ConfigWriter::new(MemoryStore::new());
        let err = writer.refresh("missing").unwrap_err();

        assert_eq!(err.env, "missing");
        assert_eq!(err.op, "refresh");
        assert!(matches!(err.source, WriteCause::Store(StoreError::NotFound(_))));
    }

    #[test]
    fn test_add_option_updates_fragment_and_composed() {
        let writer = writer_with_env("prod");
        writer.add_option("prod", "verbose", json!(true)).unwrap();

        let record = writer.store().record("prod").unwrap();
        assert!(record.fragments.options.contains("\"verbose\": true"));

        let config = AgentConfig::from_json(&record.composed).unwrap();
        assert_eq!(config.options.get("verbose"), Some(&json!(true)));
    }

    #[test]
    fn test_store_failure_is_opaque() {
        let writer = writer_with_env("prod");
        writer
            .store()
            .inject_failure(StoreOp::Update, FailureConfig::backend("disk full"));

        let err = writer.add_option("prod", "k", json!(1)).unwrap_err();
        assert!(matches!(
            err.source,
            WriteCause::Store(StoreError::Backend(ref msg)) if msg == "disk full"
        ));
    }
}
