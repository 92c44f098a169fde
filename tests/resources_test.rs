use resource_actors::clients::{LoggingClient, RegistryClient, ResourceClient, TemplateClient};
use resource_actors::config::SystemConfig;
use resource_actors::framework::mock::MockResource;
use resource_actors::lifecycle::{LogLevel, LogLevelHandle, ResourceSystem};
use resource_actors::resources::builtin_factories;
use serde_json::json;

const CONFIG: &str = r#"{
    "log_level": "info",
    "resources": [
        { "kind": "logging", "path": "/logging", "level": "warn" },
        { "kind": "template", "path": "/devices/thermostat", "temperature": 18 },
        { "kind": "template", "path": "/devices/spare", "enable": false }
    ]
}"#;

/// Full end-to-end test with the built-in resources started from config.
#[tokio::test]
async fn test_builtin_resources_from_config() {
    let config = SystemConfig::from_json_str(CONFIG).expect("Failed to parse config");
    let system = ResourceSystem::new();
    let started = system
        .start_from_config(&config, &builtin_factories(LogLevelHandle::detached()))
        .await
        .expect("Failed to start resources");
    assert_eq!(started.len(), 2);

    let (watcher, mut probe) = MockResource::new(json!({}));
    system.spawn("/ui", watcher.watching("/devices")).await.unwrap();

    let registry = RegistryClient::new(system.registries().clone());
    assert_eq!(registry.paths().await, ["/devices/thermostat", "/logging", "/ui"]);

    let tree = registry.get("/").await;
    assert!(tree.is_success());
    assert_eq!(
        tree.data,
        Some(json!({
            "logging": {"state": "ON", "debug_level": "WARN"},
            "devices": {"thermostat": {"state": "READY", "temperature": 18}},
            "ui": {}
        }))
    );

    // A nested write reaches the thermostat, which broadcasts the change.
    let response = registry
        .set("/devices", json!({"thermostat": {"temperature": 21}}))
        .await;
    assert!(response.is_success());
    let (path, state) = probe.next_notification().await.expect("No notification");
    assert_eq!(path.to_string(), "/devices/thermostat");
    assert_eq!(
        state,
        json!({"thermostat": {"state": "READY", "temperature": 21}})
    );

    let response = registry.set("/devices/thermostat", json!({"temperature": "warm"})).await;
    assert_eq!(response.error_code, 11);

    let response = registry.delete(&["/logging"]).await;
    assert_eq!(response.error_code, 6);
    let response = registry.delete(&["/devices/thermostat", "/devices/spare"]).await;
    assert_eq!(response.error_code, 2);
    assert_eq!(registry.get("/devices/thermostat").await.error_code, 0);

    system.shutdown().await.expect("Failed to shut down");
}

#[tokio::test]
async fn test_typed_clients() {
    let system = ResourceSystem::new();
    system
        .start_from_config(
            &SystemConfig::default(),
            &builtin_factories(LogLevelHandle::detached()),
        )
        .await
        .unwrap();
    let resources = &system.registries().resources;

    let logging = LoggingClient::new(resources.handle("/logging").await.unwrap());
    assert_eq!(logging.level().await.unwrap(), Some(LogLevel::Info));
    logging.set_level(Some(LogLevel::Debug)).await.unwrap();
    assert_eq!(logging.level().await.unwrap(), Some(LogLevel::Debug));
    logging.set_level(None).await.unwrap();
    assert_eq!(logging.level().await.unwrap(), None);
    assert_eq!(
        logging.snapshot().await.unwrap(),
        json!({"state": "OFF", "debug_level": "DEBUG"})
    );

    let template = TemplateClient::new(resources.handle("/template").await.unwrap());
    assert_eq!(template.temperature().await.unwrap(), 50);
    template.set_temperature(30).await.unwrap();
    assert_eq!(template.temperature().await.unwrap(), 30);

    template.delete().await.unwrap();
    assert!(resources.handle("/template").await.is_none());

    system.shutdown().await.unwrap();
}
