// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Continuation cache endpoints
//!
//! Provides GET and POST /continuations/{hash}.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{get_continuation_handler, missing_hash_handler, store_continuation_handler};
pub use request::StoreContinuationRequest;
pub use response::{ContinuationResponse, MessageResponse, MESSAGE_ALREADY_EXISTS, MESSAGE_STORED};
