//! Configuration composition and decomposition
//!
//! Composition is a pure function of the five raw fragment texts, decoupled
//! from storage. It is all-or-nothing: one undecodable fragment fails the
//! whole call and no partial document is produced.

use serde::{Deserialize, Serialize};

use crate::codec::{self, DecodeError, EncodeError};
use crate::defaults;
use crate::document::AgentConfig;
use crate::fragment::FragmentKind;

/// The five raw fragment texts as stored for one environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFragments {
    /// Options fragment text
    pub options: String,
    /// Schedule fragment text
    pub schedule: String,
    /// Packs fragment text
    pub packs: String,
    /// Decorators fragment text
    pub decorators: String,
    /// ATC fragment text
    pub atc: String,
}

/// A fragment that broke composition or decomposition
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    /// A fragment failed to decode during [`compose`]
    #[error("fragment {name}: {source}")]
    Decode {
        /// The failing fragment
        name: FragmentKind,
        #[source]
        source: DecodeError,
    },

    /// A fragment failed to encode during [`decompose`]
    #[error("fragment {name}: {source}")]
    Encode {
        /// The failing fragment
        name: FragmentKind,
        #[source]
        source: EncodeError,
    },
}

impl FragmentError {
    /// Which of the five fragments failed
    pub fn name(&self) -> FragmentKind {
        match self {
            FragmentError::Decode { name, .. } => *name,
            FragmentError::Encode { name, .. } => *name,
        }
    }
}

fn decode_failed(name: FragmentKind) -> impl FnOnce(DecodeError) -> FragmentError {
    move |source| FragmentError::Decode { name, source }
}

fn encode_failed(name: FragmentKind) -> impl FnOnce(EncodeError) -> FragmentError {
    move |source| FragmentError::Encode { name, source }
}

/// Assemble a composed configuration from the five raw fragments
///
/// Decodes each fragment independently; the first failure aborts with an
/// error naming that fragment and no document is returned.
pub fn compose(raw: &RawFragments) -> Result<AgentConfig, FragmentError> {
    let options = codec::decode(&raw.options).map_err(decode_failed(FragmentKind::Options))?;
    let schedule = codec::decode(&raw.schedule).map_err(decode_failed(FragmentKind::Schedule))?;
    let packs = codec::decode(&raw.packs).map_err(decode_failed(FragmentKind::Packs))?;
    let decorators =
        codec::decode(&raw.decorators).map_err(decode_failed(FragmentKind::Decorators))?;
    let atc = codec::decode(&raw.atc).map_err(decode_failed(FragmentKind::Atc))?;

    Ok(AgentConfig {
        options,
        schedule,
        packs,
        decorators,
        atc,
    })
}

/// Split a composed configuration back into five pretty-encoded fragments
///
/// All five encodes complete before anything is returned; a failure yields
/// no partial output.
pub fn decompose(config: &AgentConfig) -> Result<RawFragments, FragmentError> {
    let options = codec::encode(&config.options, true).map_err(encode_failed(FragmentKind::Options))?;
    let schedule =
        codec::encode(&config.schedule, true).map_err(encode_failed(FragmentKind::Schedule))?;
    let packs = codec::encode(&config.packs, true).map_err(encode_failed(FragmentKind::Packs))?;
    let decorators =
        codec::encode(&config.decorators, true).map_err(encode_failed(FragmentKind::Decorators))?;
    let atc = codec::encode(&config.atc, true).map_err(encode_failed(FragmentKind::Atc))?;

    Ok(RawFragments {
        options,
        schedule,
        packs,
        decorators,
        atc,
    })
}

/// The canonical starting configuration for a newly provisioned environment
///
/// All fragments empty except decorators, whose `always` slot carries the
/// built-in default set.
pub fn empty_configuration(pretty: bool) -> Result<String, EncodeError> {
    let config = AgentConfig {
        decorators: defaults::decorators(),
        ..AgentConfig::default()
    };
    codec::encode(&config, pretty)
}
