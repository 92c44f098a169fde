use crate::clients::resource_client::ResourceClient;
use crate::framework::{ResourceHandle, ServiceError};
use serde_json::json;

/// Client for a template resource.
#[derive(Debug, Clone)]
pub struct TemplateClient {
    inner: ResourceHandle,
}

impl TemplateClient {
    pub fn new(inner: ResourceHandle) -> Self {
        Self { inner }
    }

    pub async fn temperature(&self) -> Result<i64, ServiceError> {
        let state = self.snapshot().await?;
        state["temperature"]
            .as_i64()
            .ok_or_else(|| ServiceError::MalformedDataObject(state.to_string()))
    }

    pub async fn set_temperature(&self, temperature: i64) -> Result<(), ServiceError> {
        self.write(json!({ "temperature": temperature })).await
    }
}

impl ResourceClient for TemplateClient {
    fn inner(&self) -> &ResourceHandle {
        &self.inner
    }
}
