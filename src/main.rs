//! # Resource Actors demo
//!
//! ```bash
//! resource-actors [config.json]
//! ```
//!
//! Starts the configured resources (default: `/logging` and `/template`),
//! prints the whole tree, and runs until Ctrl-C.

use resource_actors::clients::RegistryClient;
use resource_actors::config::SystemConfig;
use resource_actors::lifecycle::{setup_tracing, ResourceSystem};
use resource_actors::resources::builtin_factories;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match std::env::args().nth(1) {
        Some(path) => SystemConfig::load(&path),
        None => Ok(SystemConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("resource-actors: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Setup tracing once for the entire application
    let levels = setup_tracing(&config.log_level);
    info!(resources = config.resources.len(), "Starting resource system");

    let system = ResourceSystem::new();
    if let Err(e) = system
        .start_from_config(&config, &builtin_factories(levels))
        .await
    {
        error!(error = %e, "Startup failed");
        let _ = system.shutdown().await;
        return ExitCode::FAILURE;
    }

    let registry = RegistryClient::new(system.registries().clone());
    match serde_json::to_string_pretty(&registry.get("/").await) {
        Ok(tree) => println!("{tree}"),
        Err(e) => error!(error = %e, "Could not render resource tree"),
    }

    info!("Running, press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for Ctrl-C");
    }

    // Shutdown system gracefully
    match system.shutdown().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Shutdown failed");
            ExitCode::FAILURE
        }
    }
}
