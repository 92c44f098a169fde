use crate::clients::response::ServiceResponse;
use crate::framework::{Registries, State};
use std::sync::Arc;
use tracing::{debug, instrument};

/// The registry API surface for an outer command layer.
///
/// Every call answers with a [`ServiceResponse`] instead of a `Result`, so
/// the caller can serialize it as is.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    registries: Arc<Registries>,
}

impl RegistryClient {
    pub fn new(registries: Arc<Registries>) -> Self {
        Self { registries }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, path: &str) -> ServiceResponse {
        debug!("Sending request");
        self.registries.resources.get_resource(path).await.into()
    }

    #[instrument(skip(self, data))]
    pub async fn set(&self, path: &str, data: State) -> ServiceResponse {
        debug!("Sending request");
        self.registries.resources.set_resource(path, data).await.into()
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, paths: &[&str]) -> ServiceResponse {
        debug!("Sending request");
        self.registries
            .resources
            .delete_resources(paths.iter().copied())
            .await
            .into()
    }

    /// Every registered path, parents first.
    pub async fn paths(&self) -> Vec<String> {
        self.registries
            .resources
            .paths()
            .await
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}
