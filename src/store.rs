//! External store seam
//!
//! The persistent store holds, per environment, five raw fragment text
//! fields and one composed-configuration text field. Its transaction and
//! locking semantics live behind this trait; errors it reports are opaque
//! to this crate and never retried.

use serde::{Deserialize, Serialize};

use crate::compose::RawFragments;
use crate::fragment::FragmentKind;

/// One environment's stored configuration fields, as returned by a get
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// The five raw fragment texts
    pub fragments: RawFragments,
    /// Cached composed-configuration text
    pub composed: String,
}

/// A sparse update to an environment's configuration fields
///
/// `None` leaves a stored field untouched. All fields set in one value form
/// one logical update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// New options fragment text
    pub options: Option<String>,
    /// New schedule fragment text
    pub schedule: Option<String>,
    /// New packs fragment text
    pub packs: Option<String>,
    /// New decorators fragment text
    pub decorators: Option<String>,
    /// New ATC fragment text
    pub atc: Option<String>,
    /// New composed-configuration text
    pub composed: Option<String>,
}

impl ConfigUpdate {
    /// Update only the composed-configuration field
    pub fn composed(text: impl Into<String>) -> Self {
        Self {
            composed: Some(text.into()),
            ..Self::default()
        }
    }

    /// Update a single fragment field
    pub fn fragment(kind: FragmentKind, raw: impl Into<String>) -> Self {
        let mut update = Self::default();
        let slot = match kind {
            FragmentKind::Options => &mut update.options,
            FragmentKind::Schedule => &mut update.schedule,
            FragmentKind::Packs => &mut update.packs,
            FragmentKind::Decorators => &mut update.decorators,
            FragmentKind::Atc => &mut update.atc,
        };
        *slot = Some(raw.into());
        update
    }

    /// Update all five fragment fields as one logical write
    pub fn fragments(fragments: RawFragments) -> Self {
        Self {
            options: Some(fragments.options),
            schedule: Some(fragments.schedule),
            packs: Some(fragments.packs),
            decorators: Some(fragments.decorators),
            atc: Some(fragments.atc),
            composed: None,
        }
    }

    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.options.is_none()
            && self.schedule.is_none()
            && self.packs.is_none()
            && self.decorators.is_none()
            && self.atc.is_none()
            && self.composed.is_none()
    }
}

/// A failure reported by the store, opaque and non-retryable here
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No environment with the given name
    #[error("environment not found: {0}")]
    NotFound(String),

    /// Any other backend failure, forwarded as-is
    #[error("store backend error: {0}")]
    Backend(String),
}

/// The persistent configuration store for environments
pub trait ConfigStore {
    /// Read one environment's configuration fields
    fn get(&self, env: &str) -> Result<EnvironmentConfig, StoreError>;

    /// Apply one logical update to an environment's fields
    fn update(&self, env: &str, update: ConfigUpdate) -> Result<(), StoreError>;
}
