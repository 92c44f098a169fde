#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Resource Actors
//!
//! > **A path-addressed tree of resource actors in Rust.**
//!
//! Every resource (a device, a sensor, a service) lives in its own Tokio task
//! and is reachable by an absolute path such as `/devices/radio`. Callers read
//! and write whole subtrees through one registry, and resources watch each
//! other's state changes by path prefix.
//!
//! ## Core Concepts
//!
//! ### One actor per resource
//! A [`ResourceActor`](framework::ResourceActor) owns exactly one
//! [`Resource`](framework::Resource) and processes its mailbox one message at
//! a time, so a resource never needs a lock for its own state. Other code only
//! holds a cloneable [`ResourceHandle`](framework::ResourceHandle).
//!
//! ### The path tree is a view
//! The [`ResourceRegistry`](framework::ResourceRegistry) maps paths to
//! handles. A `get` on `/devices` asks every resource below it for its state
//! and assembles one nested document; a `set` splits a nested document back
//! into per-resource writes.
//!
//! ### State changes flow upward
//! A resource that changes publishes through its
//! [`ResourceContext`](framework::ResourceContext). Every watcher of an
//! ancestor path receives the new state wrapped in the path segments between
//! the two, as a fire-and-forget notification.
//!
//! ### Mocking
//! [`framework::mock`] provides mailbox-level helpers for registry tests and a
//! scriptable resource for end-to-end tests.
//!
//! ## Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Actors, handles, the two registries, guarded state and the error taxonomy.
//!
//! ### 2. The Orchestrator ([`lifecycle`])
//! [`ResourceSystem`](lifecycle::ResourceSystem) starts resources (by hand or
//! from [`config`]) and shuts them all down; [`lifecycle::tracing`] sets up
//! logging with a run-time adjustable level.
//!
//! ### 3. The Interface ([`clients`])
//! [`RegistryClient`](clients::RegistryClient) answers with serializable
//! [`ServiceResponse`](clients::ServiceResponse) envelopes; typed clients wrap
//! single resources.
//!
//! ### 4. The Implementation ([`resources`])
//! The built-in `template` and `logging` resources.
//!
//! ### Running the Demo
//!
//! ```bash
//! # Default resources, info logs
//! cargo run
//!
//! # Resources from a config file
//! cargo run -- config.json
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod resources;
