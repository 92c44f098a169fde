use crate::config::{ConfigError, ResourceConfig, SystemConfig};
use crate::framework::{Registries, Resource, ResourceActor, ResourceHandle, ServiceError, State};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Builds one kind of resource from its configuration.
pub trait ResourceFactory: Send + Sync {
    fn build(&self, config: &ResourceConfig) -> Result<Box<dyn Resource>, ConfigError>;
}

impl<F> ResourceFactory for F
where
    F: Fn(&ResourceConfig) -> Result<Box<dyn Resource>, ConfigError> + Send + Sync,
{
    fn build(&self, config: &ResourceConfig) -> Result<Box<dyn Resource>, ConfigError> {
        self(config)
    }
}

/// Factories by resource kind name.
#[derive(Default)]
pub struct ResourceFactories {
    factories: BTreeMap<String, Box<dyn ResourceFactory>>,
}

impl ResourceFactories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: &str, factory: impl ResourceFactory + 'static) -> Self {
        self.factories.insert(kind.to_string(), Box::new(factory));
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    fn build(&self, config: &ResourceConfig) -> Result<Box<dyn Resource>, ConfigError> {
        self.factories
            .get(&config.kind)
            .ok_or_else(|| ConfigError::UnknownResource(config.kind.clone()))?
            .build(config)
    }
}

/// The runtime orchestrator: owns the shared registries and every actor task.
///
/// `ResourceSystem` is responsible for:
/// - **Lifecycle Management**: Starting resources and stopping all of them
/// - **Dependency Wiring**: Every actor it starts shares the same [`Registries`]
/// - **Registry API Surface**: `get_resource`, `set_resource`, `delete_resources`
///   for an outer command layer
///
/// # Example
///
/// ```ignore
/// let system = ResourceSystem::new();
/// system.spawn("/template", TemplateResource::new(21)).await?;
///
/// let snapshot = system.get_resource("/").await?;
///
/// system.shutdown().await?;
/// ```
pub struct ResourceSystem {
    registries: Arc<Registries>,

    /// Task handles for all spawned actors (used for graceful shutdown)
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for ResourceSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSystem {
    pub fn new() -> Self {
        Self {
            registries: Registries::new(),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    /// Registers `resource` at `path`, runs its `on_start`, and keeps its task.
    pub async fn spawn<R: Resource>(
        &self,
        path: &str,
        resource: R,
    ) -> Result<ResourceHandle, ServiceError> {
        let (handle, join) = ResourceActor::start(path, resource, self.registries.clone()).await?;
        self.handles.lock().await.push(join);
        Ok(handle)
    }

    /// Builds and starts every enabled resource of `config`, in order.
    ///
    /// Stops at the first failure; resources started before it keep running
    /// and are stopped by [`shutdown`](Self::shutdown).
    pub async fn start_from_config(
        &self,
        config: &SystemConfig,
        factories: &ResourceFactories,
    ) -> Result<Vec<ResourceHandle>, ConfigError> {
        let mut started = Vec::new();
        for resource_config in config.enabled() {
            let resource = factories.build(resource_config)?;
            let handle = self.spawn(&resource_config.path, resource).await?;
            info!(kind = %resource_config.kind, path = %handle.path(), "Started from config");
            started.push(handle);
        }
        Ok(started)
    }

    pub async fn get_resource(&self, path: &str) -> Result<State, ServiceError> {
        self.registries.resources.get_resource(path).await
    }

    pub async fn set_resource(&self, path: &str, data: State) -> Result<(), ServiceError> {
        self.registries.resources.set_resource(path, data).await
    }

    pub async fn delete_resources<I, S>(&self, paths: I) -> Result<(), ServiceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registries.resources.delete_resources(paths).await
    }

    /// Gracefully shuts down every resource.
    ///
    /// 1. Sends Stop to each registered resource and waits for its `on_stop`
    ///    and deregistration (failures are logged, the sweep continues)
    /// 2. Waits for all actor tasks to complete, even after one has failed
    /// 3. Returns the first failure if any actor task panicked
    pub async fn shutdown(self) -> Result<(), ServiceError> {
        info!("Shutting down system...");

        for (_, handle) in self.registries.resources.lookup("/").await {
            if let Err(e) = handle.stop().await {
                warn!(path = %handle.path(), error = %e, "Resource stopped with error");
            }
        }

        let mut failure = None;
        for handle in self.handles.into_inner() {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                failure.get_or_insert(ServiceError::ResourceException(format!(
                    "Actor task failed: {e}"
                )));
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
