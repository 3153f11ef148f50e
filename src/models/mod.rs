// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the session layer.

pub mod credentials;
pub mod profile;
pub mod user;

pub use credentials::{AccessTokenDto, KeyMaterial, SessionCredentials};
pub use profile::{AccountUpdate, ProfileState, UpdateUserResponse, UserRecord};
pub use user::{AuthPhase, AuthState, ProfileType, UserProfile, UserSummary};
