use crate::clients::resource_client::ResourceClient;
use crate::framework::{ResourceHandle, ServiceError};
use crate::lifecycle::LogLevel;
use serde_json::json;
use tracing::instrument;

/// Client for the logging resource.
#[derive(Debug, Clone)]
pub struct LoggingClient {
    inner: ResourceHandle,
}

impl LoggingClient {
    pub fn new(inner: ResourceHandle) -> Self {
        Self { inner }
    }

    /// The configured level, or `None` while logging is switched off.
    #[instrument(skip(self))]
    pub async fn level(&self) -> Result<Option<LogLevel>, ServiceError> {
        let state = self.snapshot().await?;
        if state["state"] == "OFF" {
            return Ok(None);
        }
        state["debug_level"]
            .as_str()
            .ok_or_else(|| ServiceError::MalformedDataObject(state.to_string()))?
            .parse::<LogLevel>()
            .map(Some)
    }

    /// Switches logging on at `level`, or off with `None`.
    #[instrument(skip(self))]
    pub async fn set_level(&self, level: Option<LogLevel>) -> Result<(), ServiceError> {
        let state = match level {
            Some(level) => json!({"state": "ON", "debug_level": level.as_str()}),
            None => json!({"state": "OFF"}),
        };
        self.write(state).await
    }
}

impl ResourceClient for LoggingClient {
    fn inner(&self) -> &ResourceHandle {
        &self.inner
    }
}
