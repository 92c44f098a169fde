//! The template resource: the smallest complete implementation of the
//! resource contract, and the starting point for new resource kinds.
//!
//! State: `{"state": "READY", "temperature": <integer>}`. Only `temperature`
//! can be written.

use crate::config::{ConfigError, ResourceConfig};
use crate::framework::{Resource, ResourceContext, ResourcePath, ServiceError, State, StateMachine};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

pub const DEFAULT_TEMPERATURE: i64 = 50;

#[derive(Debug)]
pub struct TemplateResource {
    state: StateMachine,
    temperature: i64,
}

impl TemplateResource {
    pub fn new(temperature: i64) -> Result<Self, ServiceError> {
        Ok(Self {
            state: StateMachine::new(["READY"], "READY")?,
            temperature,
        })
    }

    pub fn from_config(config: &ResourceConfig) -> Result<Self, ConfigError> {
        let temperature = config.setting_or("temperature", DEFAULT_TEMPERATURE)?;
        Ok(Self::new(temperature)?)
    }

    fn snapshot(&self) -> State {
        json!({
            "state": self.state.state(),
            "temperature": self.temperature,
        })
    }
}

#[async_trait]
impl Resource for TemplateResource {
    async fn on_start(&mut self, ctx: &ResourceContext) -> Result<(), ServiceError> {
        ctx.publish(self.snapshot()).await;
        Ok(())
    }

    async fn notify(
        &mut self,
        path: &ResourcePath,
        state: State,
        _ctx: &ResourceContext,
    ) -> Result<(), ServiceError> {
        debug!(%path, %state, "Template observed change");
        Ok(())
    }

    async fn get_state(&self, _ctx: &ResourceContext) -> Result<State, ServiceError> {
        Ok(self.snapshot())
    }

    async fn set_state(&mut self, state: State, ctx: &ResourceContext) -> Result<(), ServiceError> {
        let fields = state
            .as_object()
            .ok_or_else(|| ServiceError::MalformedDataObject(state.to_string()))?;

        if let Some(requested) = fields.get("state") {
            if requested.as_str() != Some(self.state.state()) {
                return Err(ServiceError::MethodNotSupportedOnObject(
                    "state of a template resource is read-only".into(),
                ));
            }
        }

        let Some(temperature) = fields.get("temperature") else {
            return Ok(());
        };
        let temperature = temperature
            .as_i64()
            .ok_or_else(|| ServiceError::MalformedDataObject(format!("temperature: {temperature}")))?;

        if temperature != self.temperature {
            self.temperature = temperature;
            ctx.publish(self.snapshot()).await;
        }
        Ok(())
    }

    async fn delete(&mut self, _ctx: &ResourceContext) -> Result<(), ServiceError> {
        Ok(())
    }
}
