// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! app-session runner
//!
//! Opens the device credential store, runs the startup session bootstrap
//! against the configured authority and logs the resulting state.
//! Pass `--provision` to create device keys when none exist yet.

use app_session::{
    config::Config,
    services::generate_key_material,
    storage::{get_json, keys, set_json, EncryptedFileStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(api_url = %config.api_url, "Starting app-session");

    let store = EncryptedFileStore::open(&config.storage_dir, &config.storage_key).await?;
    tracing::info!(dir = %store.dir().display(), "Credential store opened");

    if std::env::args().any(|arg| arg == "--provision") {
        let existing: Option<String> = get_json(&store, keys::PUBLIC_KEY).await?;
        match existing {
            Some(public_key) => tracing::info!(public_key = %public_key, "Device keys already present"),
            None => {
                let material = generate_key_material()?;
                set_json(&store, keys::PRIVATE_KEY, &material.private_key).await?;
                set_json(&store, keys::PUBLIC_KEY, &material.public_key).await?;
                tracing::info!(public_key = %material.public_key, "Provisioned device keys");
            }
        }
    }

    let state = AppState::new(config, Arc::new(store))?;

    let mut login = state.bootstrapper.clone().mount();
    let auth = login.loaded().await;

    tracing::info!(
        authorized = auth.is_authorized(),
        user_id = auth.user().map(|u| u.id.as_str()).unwrap_or("<none>"),
        profile_type = auth.user().map(|u| u.profile_type().as_str()).unwrap_or("<none>"),
        "Session bootstrap finished"
    );
    println!("{}", serde_json::to_string_pretty(&auth)?);

    login.unmount();
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("app_session=debug,info")),
        )
        .with(format)
        .init();
}
