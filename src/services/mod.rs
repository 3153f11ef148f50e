// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session and account logic.

pub mod account;
pub mod bootstrap;
pub mod challenge;
pub mod request_context;
pub mod signer;

pub use account::{AccountClient, UpdateOutcome};
pub use bootstrap::{AppLogin, Lifetime, LifetimeToken, SessionBootstrapper};
pub use challenge::{ChallengeMode, ChallengeSequence, HttpChallengeClient};
pub use request_context::{RequestContext, TokenSink};
pub use signer::{generate_key_material, DeviceSigner};
