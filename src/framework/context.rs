//! The shared registries and the per-actor context handed to every hook.

use crate::framework::error::ServiceError;
use crate::framework::handle::ResourceHandle;
use crate::framework::path::ResourcePath;
use crate::framework::registry::ResourceRegistry;
use crate::framework::state::State;
use crate::framework::state_change::StateChangeRegistry;
use std::sync::Arc;

/// The only state shared across actors.
#[derive(Debug, Default)]
pub struct Registries {
    pub resources: ResourceRegistry,
    pub state_changes: StateChangeRegistry,
}

impl Registries {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// What a resource sees of the world while handling a message.
#[derive(Debug, Clone)]
pub struct ResourceContext {
    path: ResourcePath,
    handle: ResourceHandle,
    registries: Arc<Registries>,
}

impl ResourceContext {
    pub fn new(path: ResourcePath, handle: ResourceHandle, registries: Arc<Registries>) -> Self {
        Self {
            path,
            handle,
            registries,
        }
    }

    /// The path this resource is registered under.
    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// This resource's own proxy.
    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }

    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    /// Broadcasts a change of this resource's state to every watcher of an
    /// ancestor path. Callers publish only when the state actually changed.
    pub async fn publish(&self, state: State) -> usize {
        self.registries
            .state_changes
            .notify(&self.path, &state)
            .await
    }

    /// Starts watching `path` and everything below it.
    pub async fn subscribe(&self, path: &str) -> Result<(), ServiceError> {
        let watched = ResourcePath::parse(path)?;
        self.registries
            .state_changes
            .register(self.handle.clone(), watched)
            .await;
        Ok(())
    }

    /// Stops watching `path`. Returns whether a subscription was removed.
    pub async fn unsubscribe(&self, path: &str) -> Result<bool, ServiceError> {
        let watched = ResourcePath::parse(path)?;
        Ok(self
            .registries
            .state_changes
            .unregister(&self.handle, &watched)
            .await)
    }
}
