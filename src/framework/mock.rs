//! # Mock Framework
//!
//! Utilities for testing registries and clients in isolation.
//!
//! Use [`create_mock_handle`] to get a handle whose mailbox you hold yourself,
//! then the `expect_*` helpers to pull requests off it and answer them. For
//! end-to-end tests with real actors, [`MockResource`] is a scriptable
//! resource that reports every notification it receives through a
//! [`MockProbe`].

use crate::framework::context::ResourceContext;
use crate::framework::error::ServiceError;
use crate::framework::handle::ResourceHandle;
use crate::framework::message::{ResourceRequest, Response};
use crate::framework::path::ResourcePath;
use crate::framework::resource::Resource;
use crate::framework::state::State;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

/// The receiving side of a mock handle.
pub type MockMailbox = mpsc::UnboundedReceiver<ResourceRequest>;

// =============================================================================
// MAILBOX HELPERS
// =============================================================================

/// Creates a handle and the receiver for asserting requests sent to it.
///
/// # Testing Strategy
/// Registry tests don't need a running actor: they only need to see which
/// requests arrive at which mailbox, and to answer them deterministically.
///
/// # Panics
/// If `path` is not an absolute path.
pub fn create_mock_handle(path: &str) -> (ResourceHandle, MockMailbox) {
    let path = ResourcePath::parse(path).expect("mock handle path must be absolute");
    let (sender, receiver) = mpsc::unbounded_channel();
    (ResourceHandle::new(path, sender), receiver)
}

/// Helper to verify that the next message is a Notify request
pub async fn expect_notify(receiver: &mut MockMailbox) -> Option<(ResourcePath, State)> {
    match receiver.recv().await {
        Some(ResourceRequest::Notify { path, state }) => Some((path, state)),
        _ => None,
    }
}

/// Helper to verify that the next message is a GetState request
pub async fn expect_get_state(receiver: &mut MockMailbox) -> Option<Response<State>> {
    match receiver.recv().await {
        Some(ResourceRequest::GetState { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a SetState request
pub async fn expect_set_state(
    receiver: &mut MockMailbox,
) -> Option<(State, Option<Response<()>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::SetState { state, respond_to }) => Some((state, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete(receiver: &mut MockMailbox) -> Option<Response<()>> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { respond_to }) => Some(respond_to),
        _ => None,
    }
}

// =============================================================================
// SCRIPTABLE RESOURCE
// =============================================================================

/// Receives what a [`MockResource`] observed.
pub struct MockProbe {
    notifications: mpsc::UnboundedReceiver<(ResourcePath, State)>,
}

impl MockProbe {
    /// Waits up to one second for the next notification.
    pub async fn next_notification(&mut self) -> Option<(ResourcePath, State)> {
        tokio::time::timeout(Duration::from_secs(1), self.notifications.recv())
            .await
            .ok()
            .flatten()
    }

    /// Waits briefly and reports whether no notification arrived.
    pub async fn is_quiet(&mut self) -> bool {
        tokio::time::timeout(Duration::from_millis(50), self.notifications.recv())
            .await
            .is_err()
    }
}

/// A resource whose behavior is set up by the test.
///
/// It subscribes to its watch list on start, serves `state` from
/// `get_state`, replaces it on `set_state` (publishing the change), and
/// forwards every notification to its probe.
pub struct MockResource {
    state: State,
    watch: Vec<String>,
    deletable: bool,
    fail_on_stop: bool,
    notifications: mpsc::UnboundedSender<(ResourcePath, State)>,
}

impl MockResource {
    pub fn new(state: State) -> (Self, MockProbe) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let resource = Self {
            state,
            watch: Vec::new(),
            deletable: true,
            fail_on_stop: false,
            notifications: sender,
        };
        (resource, MockProbe { notifications: receiver })
    }

    /// Subscribes to `path` when the actor starts.
    pub fn watching(mut self, path: &str) -> Self {
        self.watch.push(path.to_string());
        self
    }

    /// Makes `delete` fail with `ResourceCannotBeDeleted`.
    pub fn undeletable(mut self) -> Self {
        self.deletable = false;
        self
    }

    /// Makes `on_stop` fail.
    pub fn failing_on_stop(mut self) -> Self {
        self.fail_on_stop = true;
        self
    }
}

#[async_trait]
impl Resource for MockResource {
    async fn on_start(&mut self, ctx: &ResourceContext) -> Result<(), ServiceError> {
        for path in &self.watch {
            ctx.subscribe(path).await?;
        }
        Ok(())
    }

    async fn on_stop(&mut self, _ctx: &ResourceContext) -> Result<(), ServiceError> {
        if self.fail_on_stop {
            return Err(ServiceError::ResourceException("mock on_stop failure".into()));
        }
        Ok(())
    }

    async fn notify(
        &mut self,
        path: &ResourcePath,
        state: State,
        _ctx: &ResourceContext,
    ) -> Result<(), ServiceError> {
        let _ = self.notifications.send((path.clone(), state));
        Ok(())
    }

    async fn get_state(&self, _ctx: &ResourceContext) -> Result<State, ServiceError> {
        Ok(self.state.clone())
    }

    async fn set_state(&mut self, state: State, ctx: &ResourceContext) -> Result<(), ServiceError> {
        if !state.is_object() {
            return Err(ServiceError::MalformedDataObject(state.to_string()));
        }
        if state != self.state {
            self.state = state;
            ctx.publish(self.state.clone()).await;
        }
        Ok(())
    }

    async fn delete(&mut self, ctx: &ResourceContext) -> Result<(), ServiceError> {
        if self.deletable {
            Ok(())
        } else {
            Err(ServiceError::ResourceCannotBeDeleted(ctx.path().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_handle() {
        let (handle, mut receiver) = create_mock_handle("/speech/detector");
        assert_eq!(handle.path().to_string(), "/speech/detector");

        let get_task = tokio::spawn(async move { handle.get_state().await });

        let responder = expect_get_state(&mut receiver)
            .await
            .expect("Expected GetState request");
        responder.send(Ok(json!({"state": "LISTENING"}))).unwrap();

        let result = get_task.await.unwrap();
        assert_eq!(result, Ok(json!({"state": "LISTENING"})));
    }

    #[tokio::test]
    async fn test_mock_handle_closed() {
        let (handle, receiver) = create_mock_handle("/a");
        drop(receiver);
        assert!(handle.is_closed());
        assert_eq!(handle.get_state().await, Err(ServiceError::ActorClosed));
        assert_eq!(handle.stop().await, Ok(()));
    }
}
