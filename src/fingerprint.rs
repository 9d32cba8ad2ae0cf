// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversation state fingerprinting
//!
//! A fingerprint is the FNV-1a 64-bit digest of a conversation's canonical
//! JSON form. The browser client computes the same digest over
//! `JSON.stringify` output one UTF-16 code unit at a time, so the canonical
//! form and the hashed unit stream here follow that exactly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// FNV-1a 64-bit offset basis
pub const FNV_OFFSET_BASIS: u64 = 14695981039346656037;

/// FNV-1a 64-bit prime
pub const FNV_PRIME: u64 = 1099511628211;

/// Hex length of an encoded fingerprint
pub const FINGERPRINT_HEX_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FingerprintParseError {
    #[error("fingerprint is empty")]
    Empty,

    #[error("fingerprint must be {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("fingerprint contains non-hex character '{0}'")]
    InvalidCharacter(char),
}

/// Deterministic 64-bit identifier of a conversation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Fingerprint of an arbitrary serializable value, using the same
    /// canonical-JSON-then-FNV scheme as conversation states.
    pub fn of_value<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let canonical = serde_json::to_string(value)?;
        Ok(Self(fnv1a_utf16(&canonical)))
    }

    /// Lowercase, zero-padded hex form
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(FingerprintParseError::Empty);
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(FingerprintParseError::InvalidCharacter(c));
        }
        if s.len() != FINGERPRINT_HEX_LEN {
            return Err(FingerprintParseError::InvalidLength {
                expected: FINGERPRINT_HEX_LEN,
                actual: s.len(),
            });
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| FingerprintParseError::InvalidLength {
                expected: FINGERPRINT_HEX_LEN,
                actual: s.len(),
            })
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered conversation history between the player and the narrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub assistant_responses: Vec<String>,
    pub user_responses: Vec<String>,
}

impl ConversationState {
    /// The empty state every adventure starts from
    pub fn genesis() -> Self {
        Self::default()
    }

    pub fn new(assistant_responses: Vec<String>, user_responses: Vec<String>) -> Self {
        Self {
            assistant_responses,
            user_responses,
        }
    }

    /// The assistant may trail the player by at most one turn and never lead.
    pub fn is_well_formed(&self) -> bool {
        let a = self.assistant_responses.len();
        let u = self.user_responses.len();
        a == u || a + 1 == u
    }

    /// Canonical serialization hashed by [`ConversationState::fingerprint`].
    ///
    /// Field order is fixed (assistant first) regardless of how the map type
    /// orders keys.
    pub fn canonical_json(&self) -> String {
        let assistant = Value::from(self.assistant_responses.clone());
        let user = Value::from(self.user_responses.clone());
        format!(
            "{{\"assistant_responses\":{},\"user_responses\":{}}}",
            assistant, user
        )
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint(fnv1a_utf16(&self.canonical_json()))
    }
}

/// FNV-1a over the UTF-16 code units of `text`
pub fn fnv1a_utf16(text: &str) -> u64 {
    text.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u64::from(unit)).wrapping_mul(FNV_PRIME)
    })
}
