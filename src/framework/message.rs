//! # Mailbox Messages
//!
//! Every entry point of a resource is a variant here. Variants with a
//! responder are synchronous calls: the sender waits on the oneshot. Variants
//! without one (or with `None`) are fire-and-forget.

use crate::framework::error::ServiceError;
use crate::framework::path::ResourcePath;
use crate::framework::state::State;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, ServiceError>>;

/// Message delivered to a resource actor's mailbox.
#[derive(Debug)]
pub enum ResourceRequest {
    /// A watched path changed. `state` is already re-rooted relative to the
    /// watched path.
    Notify { path: ResourcePath, state: State },
    GetState {
        respond_to: Response<State>,
    },
    SetState {
        state: State,
        respond_to: Option<Response<()>>,
    },
    Delete {
        respond_to: Response<()>,
    },
    Stop {
        respond_to: Option<Response<()>>,
    },
}
