//! # Resource Handles
//!
//! A [`ResourceHandle`] is the proxy through which everything outside an actor
//! talks to it. It is cheap to clone and only holds the mailbox sender, so the
//! registries can store handles without ever touching resource state.

use crate::framework::error::ServiceError;
use crate::framework::message::ResourceRequest;
use crate::framework::path::ResourcePath;
use crate::framework::state::State;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    fn next() -> Self {
        Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor_{}", self.0)
    }
}

/// Proxy for one resource actor.
///
/// Equality and hashing go by [`ActorId`], so two clones of the same handle
/// compare equal and handles to different actors never do.
#[derive(Clone)]
pub struct ResourceHandle {
    id: ActorId,
    path: Arc<ResourcePath>,
    sender: mpsc::UnboundedSender<ResourceRequest>,
}

impl ResourceHandle {
    pub fn new(path: ResourcePath, sender: mpsc::UnboundedSender<ResourceRequest>) -> Self {
        Self {
            id: ActorId::next(),
            path: Arc::new(path),
            sender,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The path the actor was created for.
    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// True once the actor has stopped and dropped its mailbox.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn send(&self, request: ResourceRequest) -> Result<(), ServiceError> {
        self.sender
            .send(request)
            .map_err(|_| ServiceError::ActorClosed)
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(oneshot::Sender<Result<T, ServiceError>>) -> ResourceRequest,
    ) -> Result<T, ServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.send(request(respond_to))?;
        response.await.map_err(|_| ServiceError::ActorDropped)?
    }

    /// Fire-and-forget delivery of a state change.
    pub fn notify(&self, path: ResourcePath, state: State) -> Result<(), ServiceError> {
        self.send(ResourceRequest::Notify { path, state })
    }

    /// Reads the resource's state, waiting for the actor to answer.
    pub async fn get_state(&self) -> Result<State, ServiceError> {
        self.call(|respond_to| ResourceRequest::GetState { respond_to })
            .await
    }

    /// Writes the resource's state, waiting for the handler's result.
    pub async fn set_state(&self, state: State) -> Result<(), ServiceError> {
        self.call(|respond_to| ResourceRequest::SetState {
            state,
            respond_to: Some(respond_to),
        })
        .await
    }

    /// Queues a state write without waiting. Handler errors are only logged.
    pub fn tell_set_state(&self, state: State) -> Result<(), ServiceError> {
        self.send(ResourceRequest::SetState {
            state,
            respond_to: None,
        })
    }

    /// Asks the resource to delete itself and waits until it has stopped.
    pub async fn delete(&self) -> Result<(), ServiceError> {
        self.call(|respond_to| ResourceRequest::Delete { respond_to })
            .await
    }

    /// Stops the actor and waits for `on_stop` and deregistration.
    ///
    /// Stopping an actor that is already gone succeeds.
    pub async fn stop(&self) -> Result<(), ServiceError> {
        match self
            .call(|respond_to| ResourceRequest::Stop {
                respond_to: Some(respond_to),
            })
            .await
        {
            Err(ServiceError::ActorClosed | ServiceError::ActorDropped) => Ok(()),
            other => other,
        }
    }
}

impl PartialEq for ResourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResourceHandle {}

impl Hash for ResourceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("id", &self.id)
            .field("path", &self.path.to_string())
            .finish()
    }
}
