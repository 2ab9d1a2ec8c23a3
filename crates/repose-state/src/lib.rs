//! # Global state
//!
//! `repose-state` is a small store of named reactive values shared across a
//! whole UI. There are four pieces:
//!
//! - `initialize` / `get` / `set`: named values with first-writer-wins
//!   initialization and equality-checked writes.
//! - `subscribe` / `use_global_state`: listeners and per-component bindings
//!   that see every accepted change before `set` returns.
//! - `define_derived`: values computed from other keys and recomputed,
//!   transitively, when a declared dependency changes.
//! - the change log: an ordered, bounded record of accepted mutations that
//!   the debug overlay (`repose-devtools`) renders.
//!
//! ## Basic use
//!
//! ```rust
//! use repose_state::*;
//!
//! let store = GlobalStore::new();
//! store.initialize("counter", 0i32);
//! store.set("counter", 1).unwrap();
//! store.update("counter", |c: &i32| c + 1).unwrap();
//! assert_eq!(store.get::<i32>("counter").unwrap(), 2);
//!
//! // Writing the current value again is a no-op.
//! store.set("counter", 2).unwrap();
//! assert_eq!(store.log_len(), 2);
//! ```
//!
//! ## Derived state
//!
//! ```rust
//! use repose_state::*;
//!
//! let store = GlobalStore::new();
//! store.initialize("counter", 1i32);
//! store
//!     .define_derived("double", |s| Ok(s.get::<i32>("counter")? * 2), ["counter"])
//!     .unwrap();
//! assert_eq!(store.get::<i32>("double").unwrap(), 2);
//!
//! store.set("counter", 5).unwrap();
//! assert_eq!(store.get::<i32>("double").unwrap(), 10);
//! ```
//!
//! Dependency lists that would close a cycle are rejected unless the store
//! is configured with `CyclePolicy::Warn`.
//!
//! ## Components
//!
//! `use_global_state` returns a [`StateBinding`] holding a local copy and a
//! [`Setter`]. Created inside a [`Scope`], the binding's listener is released
//! when the scope is disposed:
//!
//! ```rust
//! use repose_state::*;
//!
//! let store = GlobalStore::new();
//! store.initialize("name", String::from("ann"));
//!
//! let scope = Scope::new();
//! let binding = scope.run(|| store.use_global_state::<String>("name")).unwrap();
//! store.set("name", String::from("bob")).unwrap();
//! assert_eq!(binding.get(), "bob");
//!
//! scope.dispose();
//! assert_eq!(store.listener_count("name"), 0);
//! ```
//!
//! ## Threads
//!
//! Stores are `Rc`-based and stay on the thread that created them. The free
//! functions (`set`, `get`, ...) act on [`current_store`], which is either
//! the store installed with [`with_store`] or a per-thread default.

mod async_set;
mod bridge;
mod bundle;
mod changelog;
mod config;
mod derived;
mod engine;
mod error;
mod global;
mod graph;
mod listeners;
mod overlay;
mod runtime;
mod scope;
mod store;
mod value;


pub use bridge::{Setter, StateBinding};
pub use bundle::GlobalState;
pub use changelog::{LogEntry, LogRecord, Origin};
pub use config::{
    CyclePolicy, DEFAULT_LOG_CAPACITY, DEFAULT_MAX_CASCADE_DEPTH, ListenerFailurePolicy,
    StoreConfig,
};
pub use error::{Result, StateError};
pub use global::{
    create_global_state, current_store, define_derived, get, initialize, set, set_async,
    subscribe, toggle_debug_overlay, update, use_global_state, with_store,
};
pub use listeners::{Subscription, SubscriptionId};
pub use overlay::{OverlayMount, OverlayRenderer, OverlaySnapshot};
pub use runtime::GlobalStore;
pub use scope::{Scope, current_scope};
pub use value::{ByRef, StateData, StateValue};
