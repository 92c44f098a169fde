//! # The Resource Contract
//!
//! [`Resource`] is the capability set every resource kind implements. The
//! [`ResourceActor`](crate::framework::ResourceActor) owns one resource and is
//! the only thing that ever calls these hooks, one message at a time, so
//! implementations hold plain fields with no locking.

use crate::framework::context::ResourceContext;
use crate::framework::error::ServiceError;
use crate::framework::path::ResourcePath;
use crate::framework::state::State;
use async_trait::async_trait;

/// Trait that any resource must implement to be run by a `ResourceActor`.
///
/// # Provided Methods
/// `on_start` and `on_stop` default to doing nothing. The externally reachable
/// capabilities (`notify`, `get_state`, `set_state`, `delete`) default to
/// failing with [`ServiceError::MethodNotImplemented`], so a resource only
/// writes the entry points it supports.
///
/// # Context
/// Every hook receives the actor's [`ResourceContext`]: its own path and
/// handle plus the shared registries, used to publish state changes and to
/// reach other resources.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Short name used in logs.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
    }

    /// Runs once after registration, before any message is handled. Acquire
    /// external handles and subscribe to other paths here.
    async fn on_start(&mut self, _ctx: &ResourceContext) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Runs once before deregistration. The framework removes the actor's
    /// subscriptions and registry entry afterwards, whatever this returns.
    async fn on_stop(&mut self, _ctx: &ResourceContext) -> Result<(), ServiceError> {
        Ok(())
    }

    /// A watched path changed. `state` is nested relative to the watched path.
    ///
    /// Must not wait on other actors.
    async fn notify(
        &mut self,
        _path: &ResourcePath,
        _state: State,
        _ctx: &ResourceContext,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::MethodNotImplemented("notify"))
    }

    async fn get_state(&self, _ctx: &ResourceContext) -> Result<State, ServiceError> {
        Err(ServiceError::MethodNotImplemented("get_state"))
    }

    async fn set_state(&mut self, _state: State, _ctx: &ResourceContext) -> Result<(), ServiceError> {
        Err(ServiceError::MethodNotImplemented("set_state"))
    }

    /// Approves a delete request. On `Ok` the actor stops and deregisters.
    async fn delete(&mut self, _ctx: &ResourceContext) -> Result<(), ServiceError> {
        Err(ServiceError::MethodNotImplemented("delete"))
    }
}

/// Lets resources built at run time (see
/// [`ResourceFactory`](crate::lifecycle::ResourceFactory)) run in the same actor.
#[async_trait]
impl Resource for Box<dyn Resource> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    async fn on_start(&mut self, ctx: &ResourceContext) -> Result<(), ServiceError> {
        (**self).on_start(ctx).await
    }

    async fn on_stop(&mut self, ctx: &ResourceContext) -> Result<(), ServiceError> {
        (**self).on_stop(ctx).await
    }

    async fn notify(
        &mut self,
        path: &ResourcePath,
        state: State,
        ctx: &ResourceContext,
    ) -> Result<(), ServiceError> {
        (**self).notify(path, state, ctx).await
    }

    async fn get_state(&self, ctx: &ResourceContext) -> Result<State, ServiceError> {
        (**self).get_state(ctx).await
    }

    async fn set_state(&mut self, state: State, ctx: &ResourceContext) -> Result<(), ServiceError> {
        (**self).set_state(state, ctx).await
    }

    async fn delete(&mut self, ctx: &ResourceContext) -> Result<(), ServiceError> {
        (**self).delete(ctx).await
    }
}
