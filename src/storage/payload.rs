// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stored narrative payloads
//!
//! The narrative service returns an encoded JSON document which is replayed
//! to clients byte-for-byte. It is classified once, at the store boundary, so
//! readers never have to parse the raw text themselves.

use serde::{Deserialize, Serialize};

/// Recognized shape of a narrative generation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativePayload {
    pub story_text: String,
    #[serde(default)]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub inventory: Vec<String>,
    #[serde(default)]
    pub new_scene: bool,
    #[serde(default)]
    pub no_progress: bool,
    #[serde(default)]
    pub remove_objects: Vec<String>,
}

/// A stored response, raw text plus its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinuationPayload {
    Narrative {
        raw: String,
        payload: NarrativePayload,
    },
    /// Text that does not parse as a narrative payload. Still replayed as-is.
    Legacy { raw: String },
}

impl ContinuationPayload {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match serde_json::from_str::<NarrativePayload>(&raw) {
            Ok(payload) => Self::Narrative { raw, payload },
            Err(_) => Self::Legacy { raw },
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Narrative { raw, .. } | Self::Legacy { raw } => raw,
        }
    }

    pub fn into_raw(self) -> String {
        match self {
            Self::Narrative { raw, .. } | Self::Legacy { raw } => raw,
        }
    }

    pub fn narrative(&self) -> Option<&NarrativePayload> {
        match self {
            Self::Narrative { payload, .. } => Some(payload),
            Self::Legacy { .. } => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }
}
