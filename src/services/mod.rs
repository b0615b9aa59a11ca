// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - upstream API clients.

pub mod aptos;
pub mod bias_detection;

pub use aptos::AptosClient;
pub use bias_detection::{BiasDetectionClient, UploadedFile};
