//! Type-safe wrappers around [`ResourceHandle`](crate::framework::ResourceHandle)
//! and the registry API surface.

pub mod logging_client;
pub mod registry_client;
pub mod resource_client;
pub mod response;
pub mod template_client;

pub use logging_client::*;
pub use registry_client::*;
pub use resource_client::*;
pub use response::*;
pub use template_client::*;
