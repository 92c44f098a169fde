use crate::framework::{ResourceHandle, ServiceError, State};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the common operations.
///
/// Implementors only expose their handle; typed accessors are built on top
/// of `snapshot` and `write`.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Access the handle of the resource this client wraps.
    fn inner(&self) -> &ResourceHandle;

    /// Fetch the resource's whole state.
    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> Result<State, ServiceError> {
        tracing::debug!("Sending request");
        self.inner().get_state().await
    }

    /// Write a partial state and wait for the outcome.
    #[tracing::instrument(skip(self))]
    async fn write(&self, state: State) -> Result<(), ServiceError> {
        tracing::debug!("Sending request");
        self.inner().set_state(state).await
    }

    /// Delete the resource.
    #[tracing::instrument(skip(self))]
    async fn delete(&self) -> Result<(), ServiceError> {
        tracing::debug!("Sending request");
        self.inner().delete().await
    }
}
