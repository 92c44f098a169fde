//! Runtime orchestration and lifecycle management.
//!
//! This module contains the infrastructure for running resources:
//!
//! - **Actor lifecycle management**: Starting resources and shutting them all down
//! - **Config-driven startup**: Building resources by kind through [`ResourceFactories`]
//! - **Observability setup**: Initializing tracing, with a run-time adjustable level
//!
//! # Main Components
//!
//! - [`ResourceSystem`] - Owns the shared registries and every actor task
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod system;
pub mod tracing;

pub use self::system::*;
pub use self::tracing::{setup_tracing, LogLevel, LogLevelHandle};
