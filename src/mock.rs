//! In-memory store double
//!
//! A `ConfigStore` backed by a shared in-memory map, with per-operation
//! failure injection for exercising error paths and no-partial-write
//! guarantees in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compose::RawFragments;
use crate::store::{ConfigStore, ConfigUpdate, EnvironmentConfig, StoreError};

/// Store operations that can have failures injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Environment reads
    Get,
    /// Environment field updates
    Update,
}

/// Failure configuration for a store operation
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Message carried by the injected backend error
    pub message: String,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Create a config that returns a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fail_count: None,
        }
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Failure injector for the memory store
#[derive(Debug, Default)]
struct FailureInjector {
    /// Per-operation failure configs
    configs: HashMap<StoreOp, FailureConfig>,
    /// Call counts per operation (for fail_count tracking)
    call_counts: HashMap<StoreOp, u32>,
}

impl FailureInjector {
    fn inject(&mut self, op: StoreOp, config: FailureConfig) {
        self.configs.insert(op, config);
        self.call_counts.insert(op, 0);
    }

    fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    /// Returns the error to report for this call, if one is due
    fn check(&mut self, op: StoreOp) -> Option<StoreError> {
        let config = self.configs.get(&op)?;
        let count = self.call_counts.entry(op).or_insert(0);
        *count += 1;

        if let Some(fail_limit) = config.fail_count {
            if *count > fail_limit {
                return None; // Exceeded fail count, succeed now
            }
        }

        Some(StoreError::Backend(config.message.clone()))
    }
}

/// One environment's stored record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvRecord {
    /// The five raw fragment texts
    pub fragments: RawFragments,
    /// Cached composed-configuration text
    pub composed: String,
    /// When the environment was seeded
    pub created_at: DateTime<Utc>,
    /// When any field was last written
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    environments: HashMap<String, EnvRecord>,
}

/// In-memory `ConfigStore` for tests
///
/// Cloning yields another handle to the same shared state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    failures: Arc<Mutex<FailureInjector>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an environment with all-blank fragments and composed text
    pub fn add_environment(&self, name: impl Into<String>) {
        self.add_environment_with(name, RawFragments::default(), String::new());
    }

    /// Seed an environment with specific fragment and composed texts
    pub fn add_environment_with(
        &self,
        name: impl Into<String>,
        fragments: RawFragments,
        composed: impl Into<String>,
    ) {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        state.environments.insert(
            name.into(),
            EnvRecord {
                fragments,
                composed: composed.into(),
                created_at: now,
                updated_at: now,
            },
        );
    }

    /// Inject a failure for a store operation
    pub fn inject_failure(&self, op: StoreOp, config: FailureConfig) {
        self.failures.lock().unwrap().inject(op, config);
    }

    /// Clear all failure injections
    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Snapshot an environment's record, if present
    pub fn record(&self, env: &str) -> Option<EnvRecord> {
        self.state.lock().unwrap().environments.get(env).cloned()
    }

    /// When the environment was last written, if present
    pub fn updated_at(&self, env: &str) -> Option<DateTime<Utc>> {
        self.record(env).map(|record| record.updated_at)
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, env: &str) -> Result<EnvironmentConfig, StoreError> {
        if let Some(err) = self.failures.lock().unwrap().check(StoreOp::Get) {
            return Err(err);
        }

        let state = self.state.lock().unwrap();
        let record = state
            .environments
            .get(env)
            .ok_or_else(|| StoreError::NotFound(env.to_string()))?;
        Ok(EnvironmentConfig {
            fragments: record.fragments.clone(),
            composed: record.composed.clone(),
        })
    }

    fn update(&self, env: &str, update: ConfigUpdate) -> Result<(), StoreError> {
        if let Some(err) = self.failures.lock().unwrap().check(StoreOp::Update) {
            return Err(err);
        }

        let mut state = self.state.lock().unwrap();
        let record = state
            .environments
            .get_mut(env)
            .ok_or_else(|| StoreError::NotFound(env.to_string()))?;

        if let Some(options) = update.options {
            record.fragments.options = options;
        }
        if let Some(schedule) = update.schedule {
            record.fragments.schedule = schedule;
        }
        if let Some(packs) = update.packs {
            record.fragments.packs = packs;
        }
        if let Some(decorators) = update.decorators {
            record.fragments.decorators = decorators;
        }
        if let Some(atc) = update.atc {
            record.fragments.atc = atc;
        }
        if let Some(composed) = update.composed {
            record.composed = composed;
        }
        record.updated_at = Utc::now();

        Ok(())
    }
}
