//! Generic actor framework for path-addressed resources.
//!
//! This module provides the coordination substrate: isolated resource actors,
//! the registry that addresses them by path, and the registry that carries
//! state changes between them.
//!
//! # Main Components
//!
//! - [`Resource`] - Trait that resource kinds implement to be run by actors
//! - [`ResourceActor`] - Generic actor that owns one resource
//! - [`ResourceHandle`] - Cloneable proxy used to reach an actor
//! - [`ResourceRegistry`] - Path directory with subtree get/set/delete
//! - [`StateChangeRegistry`] - Pub/sub of state changes by path prefix
//! - [`StateMachine`] - Guarded state every resource keeps
//! - [`ServiceError`] / [`ErrorCode`] - Error taxonomy with stable codes
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test registries without spawning actors.

pub mod actor;
pub mod context;
pub mod error;
pub mod handle;
pub mod machine;
pub mod message;
pub mod mock;
pub mod path;
pub mod registry;
pub mod resource;
pub mod state;
pub mod state_change;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use context::{Registries, ResourceContext};
pub use error::{ErrorCode, ServiceError};
pub use handle::{ActorId, ResourceHandle};
pub use machine::StateMachine;
pub use message::{ResourceRequest, Response};
pub use path::ResourcePath;
pub use registry::ResourceRegistry;
pub use resource::Resource;
pub use state::State;
pub use state_change::StateChangeRegistry;
