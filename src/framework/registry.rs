//! # Resource Registry
//!
//! Process-wide directory from paths to resource handles. The map is flat, but
//! every path also names the subtree below it:
//!
//! ```text
//! /audio/pulse      -> handle A
//! /speech/detector  -> handle B
//! /speech/intent    -> handle C
//!
//! get_resource("/speech") => {"detector": <B state>, "intent": <C state>}
//! get_resource("/speech/detector") => <B state>
//! ```
//!
//! The map sits behind one lock. Lookups copy the matching handles out and
//! drop the lock before any actor is called, so a slow resource never holds
//! up registration or other readers.

use crate::framework::error::ServiceError;
use crate::framework::handle::ResourceHandle;
use crate::framework::path::ResourcePath;
use crate::framework::state::{descend, insert_nested, State};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// One lookup hit: the segments below the queried path, and the handle.
pub type Match = (Vec<String>, ResourceHandle);

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: RwLock<BTreeMap<ResourcePath, ResourceHandle>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `handle` at `path`. Fails if the path is taken.
    pub async fn register(
        &self,
        handle: ResourceHandle,
        path: &ResourcePath,
    ) -> Result<(), ServiceError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(path) {
            warn!(%path, "Resource path conflict");
            return Err(ServiceError::ResourcePathConflict(path.to_string()));
        }
        entries.insert(path.clone(), handle);
        info!(%path, size = entries.len(), "Registered");
        Ok(())
    }

    /// Removes the entry at `path`, or with no path every entry held by
    /// `handle`. Returns the number of entries removed.
    pub async fn unregister(&self, handle: &ResourceHandle, path: Option<&ResourcePath>) -> usize {
        let mut entries = self.entries.write().await;
        let removed = match path {
            Some(path) => usize::from(entries.remove(path).is_some()),
            None => {
                let before = entries.len();
                entries.retain(|_, registered| registered != handle);
                before - entries.len()
            }
        };
        if removed > 0 {
            info!(path = %handle.path(), removed, size = entries.len(), "Unregistered");
        }
        removed
    }

    /// Every registered path at or below `path`, parents before children.
    ///
    /// A path that does not parse matches nothing.
    pub async fn lookup(&self, path: &str) -> Vec<Match> {
        let Ok(root) = ResourcePath::parse(path) else {
            return Vec::new();
        };
        self.entries
            .read()
            .await
            .iter()
            .filter_map(|(registered, handle)| {
                registered
                    .relative_to(&root)
                    .map(|relative| (relative.to_vec(), handle.clone()))
            })
            .collect()
    }

    /// The handle registered at exactly `path`.
    pub async fn handle(&self, path: &str) -> Option<ResourceHandle> {
        let path = ResourcePath::parse(path).ok()?;
        self.entries.read().await.get(&path).cloned()
    }

    /// All registered paths, sorted.
    pub async fn paths(&self) -> Vec<ResourcePath> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Reads the state at `path`.
    ///
    /// An exactly registered path returns that resource's state as is.
    /// Otherwise the states of everything below `path` are composed into one
    /// mapping mirroring the path hierarchy.
    pub async fn get_resource(&self, path: &str) -> Result<State, ServiceError> {
        let matches = self.lookup(path).await;
        if matches.is_empty() {
            return Err(ServiceError::ResourceDoesNotExist(path.to_string()));
        }
        debug!(path, matched = matches.len(), "get_resource");

        if let Some((_, handle)) = matches.iter().find(|(relative, _)| relative.is_empty()) {
            return handle.get_state().await.map_err(|e| vanished(e, handle));
        }

        let mut composed = Map::new();
        let mut found = false;
        for (relative, handle) in matches {
            match handle.get_state().await {
                Ok(state) => {
                    insert_nested(&mut composed, &relative, state);
                    found = true;
                }
                Err(ServiceError::ActorClosed | ServiceError::ActorDropped) => {
                    debug!(target_path = %handle.path(), "Resource gone during read, skipped");
                }
                Err(e) => return Err(e),
            }
        }
        if !found {
            return Err(ServiceError::ResourceDoesNotExist(path.to_string()));
        }
        Ok(Value::Object(composed))
    }

    /// Writes `data` into the subtree at `path`.
    ///
    /// The exactly registered resource (if any) gets `data` whole; each
    /// descendant gets the part of `data` found under its relative segments
    /// and is skipped when that part is absent.
    pub async fn set_resource(&self, path: &str, data: State) -> Result<(), ServiceError> {
        let matches = self.lookup(path).await;
        if matches.is_empty() {
            return Err(ServiceError::ResourceDoesNotExist(path.to_string()));
        }
        debug!(path, matched = matches.len(), "set_resource");

        for (relative, handle) in matches {
            if relative.is_empty() {
                handle
                    .set_state(data.clone())
                    .await
                    .map_err(|e| vanished(e, &handle))?;
                continue;
            }
            match descend(&data, &relative) {
                Some(part) => handle
                    .set_state(part.clone())
                    .await
                    .map_err(|e| vanished(e, &handle))?,
                None => debug!(target_path = %handle.path(), "No data for resource, skipped"),
            }
        }
        Ok(())
    }

    /// Deletes the resources registered at exactly `paths`.
    ///
    /// All paths are checked under one lock before anything is deleted, so a
    /// single missing path leaves every resource in place.
    pub async fn delete_resources<I, S>(&self, paths: I) -> Result<(), ServiceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets: Vec<ResourceHandle> = {
            let entries = self.entries.read().await;
            let mut targets = Vec::new();
            for raw in paths {
                let raw = raw.as_ref();
                let handle = ResourcePath::parse(raw)
                    .ok()
                    .and_then(|path| entries.get(&path))
                    .ok_or_else(|| ServiceError::ResourceDoesNotExist(raw.to_string()))?;
                if !targets.contains(handle) {
                    targets.push(handle.clone());
                }
            }
            targets
        };

        for handle in targets {
            debug!(path = %handle.path(), "Deleting");
            handle.delete().await.map_err(|e| vanished(e, &handle))?;
        }
        Ok(())
    }
}

/// An actor that stopped after it was looked up no longer exists.
fn vanished(error: ServiceError, handle: &ResourceHandle) -> ServiceError {
    match error {
        ServiceError::ActorClosed | ServiceError::ActorDropped => {
            ServiceError::ResourceDoesNotExist(handle.path().to_string())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_handle, expect_delete, expect_get_state, expect_set_state};
    use serde_json::json;

    fn p(raw: &str) -> ResourcePath {
        ResourcePath::parse(raw).unwrap()
    }

    async fn registry_with(paths: &[&str]) -> (ResourceRegistry, Vec<crate::framework::mock::MockMailbox>) {
        let registry = ResourceRegistry::new();
        let mut mailboxes = Vec::new();
        for raw in paths {
            let (handle, rx) = create_mock_handle(raw);
            registry.register(handle, &p(raw)).await.unwrap();
            mailboxes.push(rx);
        }
        (registry, mailboxes)
    }

    #[tokio::test]
    async fn duplicate_path_conflicts_siblings_do_not() {
        let (registry, _mailboxes) = registry_with(&["/a", "/b"]).await;
        let (dup, _rx) = create_mock_handle("/a");
        let err = registry.register(dup, &p("/a")).await.unwrap_err();
        assert_eq!(err, ServiceError::ResourcePathConflict("/a".into()));
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn lookup_returns_relative_segments() {
        let (registry, _mailboxes) =
            registry_with(&["/speech/detector", "/speech/intent", "/speechless"]).await;

        let hits: Vec<Vec<String>> = registry
            .lookup("/speech")
            .await
            .into_iter()
            .map(|(relative, _)| relative)
            .collect();
        assert_eq!(hits, vec![vec!["detector".to_string()], vec!["intent".to_string()]]);

        let exact = registry.lookup("/speech/detector").await;
        assert_eq!(exact.len(), 1);
        assert!(exact[0].0.is_empty());

        assert_eq!(registry.lookup("/").await.len(), 3);
        assert!(registry.lookup("").await.is_empty());
        assert!(registry.lookup("speech").await.is_empty());
    }

    #[tokio::test]
    async fn unregister_by_path_or_by_handle() {
        let registry = ResourceRegistry::new();
        let (handle, _rx) = create_mock_handle("/a");
        registry.register(handle.clone(), &p("/a")).await.unwrap();
        registry.register(handle.clone(), &p("/alias")).await.unwrap();

        assert_eq!(registry.unregister(&handle, Some(&p("/alias"))).await, 1);
        assert_eq!(registry.unregister(&handle, Some(&p("/alias"))).await, 0);
        registry.register(handle.clone(), &p("/alias")).await.unwrap();
        assert_eq!(registry.unregister(&handle, None).await, 2);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn get_resource_composes_subtree() {
        let (registry, mut mailboxes) = registry_with(&["/a", "/b"]).await;
        let mut b_rx = mailboxes.pop().unwrap();
        let mut a_rx = mailboxes.pop().unwrap();

        let responder = tokio::spawn(async move {
            let reply = expect_get_state(&mut a_rx).await.unwrap();
            reply.send(Ok(json!({"state": "A"}))).unwrap();
            let reply = expect_get_state(&mut b_rx).await.unwrap();
            reply.send(Ok(json!({"state": "B"}))).unwrap();
        });

        let state = registry.get_resource("/").await.unwrap();
        assert_eq!(state, json!({"a": {"state": "A"}, "b": {"state": "B"}}));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn exact_match_is_returned_unwrapped() {
        let (registry, mut mailboxes) = registry_with(&["/a", "/a/b"]).await;
        let _child_rx = mailboxes.pop().unwrap();
        let mut a_rx = mailboxes.pop().unwrap();

        let responder = tokio::spawn(async move {
            let reply = expect_get_state(&mut a_rx).await.unwrap();
            reply.send(Ok(json!({"state": "ON"}))).unwrap();
        });

        let state = registry.get_resource("/a").await.unwrap();
        assert_eq!(state, json!({"state": "ON"}));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn missing_paths_do_not_exist() {
        let (registry, _mailboxes) = registry_with(&["/a"]).await;
        assert_eq!(
            registry.get_resource("/nope").await.unwrap_err(),
            ServiceError::ResourceDoesNotExist("/nope".into())
        );
        assert!(matches!(
            registry.set_resource("/nope", json!({})).await,
            Err(ServiceError::ResourceDoesNotExist(_))
        ));
    }

    #[tokio::test]
    async fn set_resource_routes_sub_mappings() {
        let (registry, mut mailboxes) =
            registry_with(&["/audio", "/audio/alerts", "/audio/pulse"]).await;
        let mut pulse_rx = mailboxes.pop().unwrap();
        let mut alerts_rx = mailboxes.pop().unwrap();
        let mut audio_rx = mailboxes.pop().unwrap();

        let data = json!({"mute": true, "pulse": {"volume": 40}});
        let responder = tokio::spawn(async move {
            let (state, reply) = expect_set_state(&mut audio_rx).await.unwrap();
            assert_eq!(state, json!({"mute": true, "pulse": {"volume": 40}}));
            reply.unwrap().send(Ok(())).unwrap();

            let (state, reply) = expect_set_state(&mut pulse_rx).await.unwrap();
            assert_eq!(state, json!({"volume": 40}));
            reply.unwrap().send(Ok(())).unwrap();
            alerts_rx
        });

        registry.set_resource("/audio", data).await.unwrap();
        let mut alerts_rx = responder.await.unwrap();
        assert!(alerts_rx.try_recv().is_err(), "alerts had no data and is skipped");
    }

    #[tokio::test]
    async fn delete_is_all_or_nothing() {
        let (registry, mut mailboxes) = registry_with(&["/a", "/b"]).await;

        let err = registry.delete_resources(["/a", "/missing"]).await.unwrap_err();
        assert_eq!(err, ServiceError::ResourceDoesNotExist("/missing".into()));
        for rx in &mut mailboxes {
            assert!(rx.try_recv().is_err(), "nothing was asked to delete");
        }

        let mut b_rx = mailboxes.pop().unwrap();
        let responder = tokio::spawn(async move {
            let reply = expect_delete(&mut b_rx).await.unwrap();
            reply.send(Ok(())).unwrap();
        });
        registry.delete_resources(["/b"]).await.unwrap();
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_vanished_actor_reports_missing_path() {
        let (registry, mut mailboxes) = registry_with(&["/gone", "/dropping"]).await;

        // Mailbox already closed.
        drop(mailboxes.remove(0));
        let err = registry.delete_resources(["/gone"]).await.unwrap_err();
        assert_eq!(err, ServiceError::ResourceDoesNotExist("/gone".into()));
        assert_eq!(err.code().as_u8(), 2);

        // Actor ends before it can answer.
        let mut dropping_rx = mailboxes.remove(0);
        let responder = tokio::spawn(async move {
            drop(expect_delete(&mut dropping_rx).await.unwrap());
        });
        let err = registry.delete_resources(["/dropping"]).await.unwrap_err();
        assert_eq!(err, ServiceError::ResourceDoesNotExist("/dropping".into()));
        responder.await.unwrap();
    }
}
