//! The logging resource: controls the process-wide log filter.
//!
//! State: `{"state": "ON"|"OFF", "debug_level": "ERROR"|"WARN"|"INFO"|"DEBUG"}`.
//! OFF silences all output; ON applies `debug_level`.

use crate::config::{ConfigError, ResourceConfig};
use crate::framework::{Resource, ResourceContext, ServiceError, State, StateMachine};
use crate::lifecycle::{LogLevel, LogLevelHandle};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::info;

const SWITCH_STATES: [&str; 2] = ["ON", "OFF"];
const LEVELS: [&str; 4] = ["ERROR", "WARN", "INFO", "DEBUG"];

#[derive(Debug)]
pub struct LoggingResource {
    state: StateMachine,
    debug_level: StateMachine,
    levels: LogLevelHandle,
}

impl LoggingResource {
    pub fn new(enabled: bool, level: LogLevel, levels: LogLevelHandle) -> Result<Self, ServiceError> {
        Ok(Self {
            state: StateMachine::new(SWITCH_STATES, if enabled { "ON" } else { "OFF" })?,
            debug_level: StateMachine::new(LEVELS, level.as_str())?,
            levels,
        })
    }

    /// Settings: `state` (`on`/`off`, default `on`) and `level` (default `info`).
    pub fn from_config(config: &ResourceConfig, levels: LogLevelHandle) -> Result<Self, ConfigError> {
        let state = config.choice("state", &["on", "off"], "on")?;
        let level = config.choice("level", &["error", "warn", "info", "debug"], "info")?;
        let level = level.parse::<LogLevel>()?;
        Ok(Self::new(state == "on", level, levels)?)
    }

    fn level(&self) -> Result<LogLevel, ServiceError> {
        self.debug_level.state().parse()
    }

    fn apply(&self) -> Result<(), ServiceError> {
        if self.state.state() == "ON" {
            self.levels.apply(Some(self.level()?))
        } else {
            self.levels.apply(None)
        }
    }

    fn snapshot(&self) -> State {
        json!({
            "state": self.state.state(),
            "debug_level": self.debug_level.state(),
        })
    }
}

fn requested<'a>(fields: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>, ServiceError> {
    match fields.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(ServiceError::MalformedDataObject(format!("{key}: {other}"))),
    }
}

#[async_trait]
impl Resource for LoggingResource {
    async fn on_start(&mut self, ctx: &ResourceContext) -> Result<(), ServiceError> {
        self.apply()?;
        ctx.publish(self.snapshot()).await;
        Ok(())
    }

    async fn get_state(&self, _ctx: &ResourceContext) -> Result<State, ServiceError> {
        Ok(self.snapshot())
    }

    async fn set_state(&mut self, state: State, ctx: &ResourceContext) -> Result<(), ServiceError> {
        let fields = state
            .as_object()
            .ok_or_else(|| ServiceError::MalformedDataObject(state.to_string()))?;
        let switch = requested(fields, "state")?;
        let level = requested(fields, "debug_level")?;

        // Both fields are checked before either is stored.
        if let Some(switch) = switch {
            self.state.validate(switch)?;
        }
        if let Some(level) = level {
            self.debug_level.validate(level)?;
        }

        let mut changed = false;
        if let Some(switch) = switch {
            changed |= self.state.set_if_changed(switch)?;
        }
        if let Some(level) = level {
            changed |= self.debug_level.set_if_changed(level)?;
        }
        if !changed {
            return Ok(());
        }

        self.apply()?;
        info!(state = %self.state.state(), level = %self.debug_level.state(), "Log filter changed");
        ctx.publish(self.snapshot()).await;
        Ok(())
    }

    async fn delete(&mut self, ctx: &ResourceContext) -> Result<(), ServiceError> {
        Err(ServiceError::ResourceCannotBeDeleted(ctx.path().to_string()))
    }
}
