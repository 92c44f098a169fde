//! # State-Change Registry
//!
//! Pub/sub directory of `(subscriber, watched path)` pairs. A change at a path
//! reaches every subscriber watching that path or one of its ancestors, with
//! the payload nested under the segments between the two.
//!
//! ```text
//! watch /speech  +  change at /speech/detector {"state": "LISTENING"}
//!   => notify("/speech/detector", {"detector": {"state": "LISTENING"}})
//! ```
//!
//! Delivery is a fire-and-forget send into each subscriber's mailbox, made
//! after the lock is released. A publisher's successive notifications reach
//! one subscriber in the order they were published.

use crate::framework::handle::ResourceHandle;
use crate::framework::path::ResourcePath;
use crate::framework::state::{nest, State};
use tokio::sync::RwLock;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct Subscription {
    subscriber: ResourceHandle,
    watched: ResourcePath,
}

#[derive(Debug, Default)]
pub struct StateChangeRegistry {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl StateChangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription. Returns `false` if the pair was already present.
    pub async fn register(&self, subscriber: ResourceHandle, watched: ResourcePath) -> bool {
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions
            .iter()
            .any(|s| s.subscriber == subscriber && s.watched == watched)
        {
            return false;
        }
        debug!(subscriber = %subscriber.path(), %watched, "Subscribed");
        subscriptions.push(Subscription {
            subscriber,
            watched,
        });
        true
    }

    /// Removes one subscription. Returns whether it existed.
    pub async fn unregister(&self, subscriber: &ResourceHandle, watched: &ResourcePath) -> bool {
        let mut subscriptions = self.subscriptions.write().await;
        let before = subscriptions.len();
        subscriptions.retain(|s| !(&s.subscriber == subscriber && &s.watched == watched));
        before != subscriptions.len()
    }

    /// Removes every subscription held by `subscriber`. Returns how many.
    pub async fn unregister_all(&self, subscriber: &ResourceHandle) -> usize {
        let mut subscriptions = self.subscriptions.write().await;
        let before = subscriptions.len();
        subscriptions.retain(|s| &s.subscriber != subscriber);
        let removed = before - subscriptions.len();
        if removed > 0 {
            debug!(subscriber = %subscriber.path(), removed, "Unsubscribed all");
        }
        removed
    }

    /// Paths `subscriber` currently watches, in subscription order.
    pub async fn subscriptions(&self, subscriber: &ResourceHandle) -> Vec<ResourcePath> {
        self.subscriptions
            .read()
            .await
            .iter()
            .filter(|s| &s.subscriber == subscriber)
            .map(|s| s.watched.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscriptions.read().await.is_empty()
    }

    /// Fans a change at `changed` out to every matching subscriber.
    ///
    /// Returns the number of mailboxes the notification was queued on.
    /// Subscribers that have already shut down are skipped.
    pub async fn notify(&self, changed: &ResourcePath, state: &State) -> usize {
        let targets: Vec<(ResourceHandle, Vec<String>)> = {
            let subscriptions = self.subscriptions.read().await;
            subscriptions
                .iter()
                .filter_map(|s| {
                    changed
                        .relative_to(&s.watched)
                        .map(|relative| (s.subscriber.clone(), relative.to_vec()))
                })
                .collect()
        };

        let mut delivered = 0;
        for (subscriber, relative) in targets {
            let payload = nest(&relative, state.clone());
            match subscriber.notify(changed.clone(), payload) {
                Ok(()) => delivered += 1,
                Err(_) => debug!(subscriber = %subscriber.path(), %changed, "Subscriber gone"),
            }
        }
        trace!(%changed, delivered, "Notified");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_handle, expect_notify};
    use serde_json::json;

    fn p(raw: &str) -> ResourcePath {
        ResourcePath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn notification_is_rerooted_for_ancestor_watchers() {
        let registry = StateChangeRegistry::new();
        let (speech, mut speech_rx) = create_mock_handle("/watcher/speech");
        let (root, mut root_rx) = create_mock_handle("/watcher/root");
        let (exact, mut exact_rx) = create_mock_handle("/watcher/exact");

        registry.register(speech, p("/speech")).await;
        registry.register(root, p("/")).await;
        registry.register(exact, p("/speech/detector")).await;

        let state = json!({"state": "LISTENING"});
        let delivered = registry.notify(&p("/speech/detector"), &state).await;
        assert_eq!(delivered, 3);

        let (path, payload) = expect_notify(&mut speech_rx).await.unwrap();
        assert_eq!(path, p("/speech/detector"));
        assert_eq!(payload, json!({"detector": {"state": "LISTENING"}}));

        let (_, payload) = expect_notify(&mut root_rx).await.unwrap();
        assert_eq!(payload, json!({"speech": {"detector": {"state": "LISTENING"}}}));

        let (_, payload) = expect_notify(&mut exact_rx).await.unwrap();
        assert_eq!(payload, state);
    }

    #[tokio::test]
    async fn sibling_prefixes_do_not_match() {
        let registry = StateChangeRegistry::new();
        let (watcher, mut rx) = create_mock_handle("/watcher");
        registry.register(watcher, p("/speech")).await;

        assert_eq!(registry.notify(&p("/speechless"), &json!({})).await, 0);
        assert_eq!(registry.notify(&p("/audio/pulse"), &json!({})).await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn per_subscriber_order_is_preserved() {
        let registry = StateChangeRegistry::new();
        let (watcher, mut rx) = create_mock_handle("/watcher");
        registry.register(watcher, p("/volume")).await;

        for level in 0..5 {
            registry.notify(&p("/volume"), &json!({"level": level})).await;
        }
        for level in 0..5 {
            let (_, payload) = expect_notify(&mut rx).await.unwrap();
            assert_eq!(payload, json!({"level": level}));
        }
    }

    #[tokio::test]
    async fn unregister_all_stops_delivery() {
        let registry = StateChangeRegistry::new();
        let (watcher, mut rx) = create_mock_handle("/watcher");
        assert!(registry.register(watcher.clone(), p("/a")).await);
        assert!(registry.register(watcher.clone(), p("/b")).await);
        assert!(!registry.register(watcher.clone(), p("/a")).await);
        assert_eq!(registry.subscriptions(&watcher).await, vec![p("/a"), p("/b")]);

        assert!(registry.unregister(&watcher, &p("/b")).await);
        assert!(!registry.unregister(&watcher, &p("/b")).await);

        assert_eq!(registry.unregister_all(&watcher).await, 1);
        assert!(registry.is_empty().await);
        assert_eq!(registry.notify(&p("/a"), &json!({})).await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_subscribers_are_skipped() {
        let registry = StateChangeRegistry::new();
        let (gone, rx) = create_mock_handle("/gone");
        let (alive, mut alive_rx) = create_mock_handle("/alive");
        registry.register(gone, p("/")).await;
        registry.register(alive, p("/")).await;
        drop(rx);

        assert_eq!(registry.notify(&p("/x"), &json!({"v": 1})).await, 1);
        assert!(expect_notify(&mut alive_rx).await.is_some());
    }
}
