//! # Resource Actor
//!
//! [`ResourceActor`] is the isolation unit: it owns one [`Resource`] and the
//! receiving end of its mailbox, and processes messages strictly one at a
//! time in arrival order. Other actors only ever see its [`ResourceHandle`].
//!
//! ## Lifecycle
//!
//! ```text
//! new()   parse path, register handle          (conflict => error, no task)
//! run()   on_start ─► message loop ─► Stop / Delete
//!                                         │
//!                     on_stop ◄───────────┘
//!                     unregister_all (state changes)
//!                     unregister (resources)
//! ```
//!
//! ## Failure Model
//!
//! Handler errors are caught here, and so are handler panics, which surface
//! as `ResourceException`. Fire-and-forget messages (notifications, untracked
//! writes) only log them; synchronous calls hand them back to the caller.
//! Either way the actor keeps running and the registries stay intact. If the
//! task ever ends without a clean stop, its entries are removed anyway.

use crate::framework::context::{Registries, ResourceContext};
use crate::framework::error::ServiceError;
use crate::framework::handle::ResourceHandle;
use crate::framework::message::ResourceRequest;
use crate::framework::path::ResourcePath;
use crate::framework::resource::Resource;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Reports the outcome of `on_start` to whoever spawned the actor.
type Started = oneshot::Sender<Result<(), ServiceError>>;

/// The actor that runs one resource.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` registers the path and returns the
///     `actor` (server) and its `handle` (proxy).
/// 2.  **Run**: spawn `actor.run()` in a background task.
///
/// [`ResourceActor::start`] does both and waits for `on_start` to finish.
pub struct ResourceActor<R: Resource> {
    resource: R,
    receiver: mpsc::UnboundedReceiver<ResourceRequest>,
    context: ResourceContext,
}

impl<R: Resource> ResourceActor<R> {
    /// Creates the actor and registers its handle under `path`.
    ///
    /// Fails with `MalformedDataObject` for a relative path and with
    /// `ResourcePathConflict` when the path is taken.
    pub async fn new(
        path: &str,
        resource: R,
        registries: Arc<Registries>,
    ) -> Result<(Self, ResourceHandle), ServiceError> {
        let path = ResourcePath::parse(path)?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = ResourceHandle::new(path.clone(), sender);
        registries.resources.register(handle.clone(), &path).await?;

        let actor = Self {
            resource,
            receiver,
            context: ResourceContext::new(path, handle.clone(), registries),
        };
        Ok((actor, handle))
    }

    /// Registers, spawns and starts a resource.
    ///
    /// Returns once `on_start` has completed. If it failed, the actor has
    /// already deregistered and the error is returned.
    pub async fn start(
        path: &str,
        resource: R,
        registries: Arc<Registries>,
    ) -> Result<(ResourceHandle, JoinHandle<()>), ServiceError> {
        let (actor, handle) = Self::new(path, resource, registries).await?;
        let (started, on_started) = oneshot::channel();
        let join = tokio::spawn(actor.run_reporting(Some(started)));
        on_started.await.map_err(|_| ServiceError::ActorDropped)??;
        Ok((handle, join))
    }

    /// Runs `on_start` and then the message loop until the actor is stopped
    /// or deleted.
    pub async fn run(self) {
        self.run_reporting(None).await
    }

    async fn run_reporting(mut self, started: Option<Started>) {
        let kind = self.resource.kind();
        let path = self.context.path().clone();
        let mut cleanup = DeregisterOnDrop::new(self.context.clone());

        if let Err(e) = guarded("on_start", self.resource.on_start(&self.context)).await {
            error!(kind, %path, error = %e, "on_start failed");
            deregister(&self.context).await;
            cleanup.disarm();
            if let Some(started) = started {
                let _ = started.send(Err(e));
            }
            return;
        }
        info!(kind, %path, "Resource started");
        if let Some(started) = started {
            let _ = started.send(Ok(()));
        }

        let mut stopped = false;
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Notify {
                    path: changed,
                    state,
                } => {
                    debug!(kind, %path, %changed, "Notify");
                    let result =
                        guarded("notify", self.resource.notify(&changed, state, &self.context)).await;
                    if let Err(e) = result {
                        warn!(kind, %path, %changed, error = %e, "notify failed");
                    }
                }
                ResourceRequest::GetState { respond_to } => {
                    let result = guarded("get_state", self.resource.get_state(&self.context)).await;
                    if let Err(e) = &result {
                        warn!(kind, %path, error = %e, "get_state failed");
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::SetState { state, respond_to } => {
                    debug!(kind, %path, %state, "SetState");
                    let result =
                        guarded("set_state", self.resource.set_state(state, &self.context)).await;
                    if let Err(e) = &result {
                        warn!(kind, %path, error = %e, "set_state failed");
                    }
                    if let Some(respond_to) = respond_to {
                        let _ = respond_to.send(result);
                    }
                }
                ResourceRequest::Delete { respond_to } => {
                    debug!(kind, %path, "Delete");
                    if let Err(e) = guarded("delete", self.resource.delete(&self.context)).await {
                        warn!(kind, %path, error = %e, "delete refused");
                        let _ = respond_to.send(Err(e));
                        continue;
                    }
                    let result = self.stop().await;
                    stopped = true;
                    let _ = respond_to.send(result);
                    break;
                }
                ResourceRequest::Stop { respond_to } => {
                    let result = self.stop().await;
                    stopped = true;
                    if let Some(respond_to) = respond_to {
                        let _ = respond_to.send(result);
                    }
                    break;
                }
            }
        }

        // Mailbox closed without a Stop.
        if !stopped {
            let _ = self.stop().await;
        }
        cleanup.disarm();
        info!(kind, %path, "Shutdown");
    }

    /// `on_stop`, then removal from both registries. Deregistration happens
    /// even when `on_stop` fails; the failure is still reported.
    async fn stop(&mut self) -> Result<(), ServiceError> {
        let kind = self.resource.kind();
        let result = guarded("on_stop", self.resource.on_stop(&self.context)).await;
        if let Err(e) = &result {
            warn!(kind, path = %self.context.path(), error = %e, "on_stop failed");
        }
        deregister(&self.context).await;
        result
    }
}

/// Removes the actor's subscriptions and then its registry entry.
async fn deregister(context: &ResourceContext) {
    let registries = context.registries();
    let handle = context.handle();
    registries.state_changes.unregister_all(handle).await;
    registries
        .resources
        .unregister(handle, Some(context.path()))
        .await;
}

/// Runs one resource hook. A panic inside it becomes `ResourceException`.
async fn guarded<T>(
    hook: &'static str,
    fut: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, ServiceError> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ServiceError::ResourceException(format!(
            "{hook} panicked: {}",
            panic_message(&*panic)
        ))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Deregisters the actor if its task unwinds before reaching a clean stop.
struct DeregisterOnDrop {
    context: Option<ResourceContext>,
}

impl DeregisterOnDrop {
    fn new(context: ResourceContext) -> Self {
        Self {
            context: Some(context),
        }
    }

    fn disarm(&mut self) {
        self.context = None;
    }
}

impl Drop for DeregisterOnDrop {
    fn drop(&mut self) {
        let Some(context) = self.context.take() else {
            return;
        };
        error!(path = %context.path(), "Actor task ended abnormally, deregistering");
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move { deregister(&context).await });
        }
    }
}
