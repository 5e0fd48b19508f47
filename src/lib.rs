//! fleetconf - configuration composition core for fleet-managed agents
//!
//! Each environment in the fleet stores its agent configuration as five
//! independently-maintained JSON fragments: options, schedule, packs,
//! decorators, and automatic table construction. This crate composes those
//! fragments into the single document delivered to agents, with
//! all-or-nothing validation, stable round-trip encoding, default injection
//! for fresh environments, and safe partial-fragment mutation.
//!
//! The persistent store, environment lifecycle, and network layers are
//! external; this crate defines only the [`store::ConfigStore`] seam they
//! plug into.

pub mod codec;
pub mod compose;
pub mod defaults;
pub mod document;
pub mod fragment;
pub mod mock;
pub mod store;
pub mod writer;

pub use codec::{DecodeError, EncodeError};
pub use compose::{compose, decompose, empty_configuration, FragmentError, RawFragments};
pub use document::AgentConfig;
pub use fragment::{
    Atc, Decorators, Fragment, FragmentKind, Options, PackEntry, Packs, Schedule, ScheduleEntry,
};
pub use mock::MemoryStore;
pub use store::{ConfigStore, ConfigUpdate, EnvironmentConfig, StoreError};
pub use writer::{ConfigWriter, WriteCause, WriteError};
