//! Concrete resources shipped with the crate.
//!
//! - [`TemplateResource`] (`template`) - minimal reference implementation
//! - [`LoggingResource`] (`logging`) - run-time control of the log filter
//!
//! [`builtin_factories`] registers both kinds for config-driven startup.

pub mod logging;
pub mod template;

pub use logging::LoggingResource;
pub use template::TemplateResource;

use crate::config::{ConfigError, ResourceConfig};
use crate::framework::Resource;
use crate::lifecycle::{LogLevelHandle, ResourceFactories};

/// Factories for every built-in kind. The logging resource drives `levels`.
pub fn builtin_factories(levels: LogLevelHandle) -> ResourceFactories {
    ResourceFactories::new()
        .with(
            "template",
            |config: &ResourceConfig| -> Result<Box<dyn Resource>, ConfigError> {
                Ok(Box::new(TemplateResource::from_config(config)?))
            },
        )
        .with(
            "logging",
            move |config: &ResourceConfig| -> Result<Box<dyn Resource>, ConfigError> {
                Ok(Box::new(LoggingResource::from_config(config, levels.clone())?))
            },
        )
}
