//! Ambient store and the free-function surface.
//!
//! Components reach the store through `current_store()`: the innermost store
//! installed with [`with_store`], or else a per-thread default created on
//! first use and kept for the life of the thread.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::panic::Location;

use crate::{
    GlobalState, GlobalStore, Origin, Result, StateBinding, StateData, Subscription,
};

thread_local! {
    static STORE_STACK: RefCell<Vec<GlobalStore>> = const { RefCell::new(Vec::new()) };
    static DEFAULT_STORE: GlobalStore = GlobalStore::new();
}

/// Make `store` the ambient store while `f` runs.
pub fn with_store<R>(store: &GlobalStore, f: impl FnOnce() -> R) -> R {
    // Pops on unwind too.
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            STORE_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    STORE_STACK.with(|st| st.borrow_mut().push(store.clone()));
    let _guard = Guard;
    f()
}

pub fn current_store() -> GlobalStore {
    STORE_STACK
        .with(|st| st.borrow().last().cloned())
        .unwrap_or_else(|| DEFAULT_STORE.with(GlobalStore::clone))
}

pub fn initialize<T: StateData>(key: impl Into<String>, initial: T) -> bool {
    current_store().initialize(key, initial)
}

pub fn get<T: StateData>(key: &str) -> Result<T> {
    current_store().get(key)
}

#[track_caller]
pub fn set<T: StateData>(key: &str, value: T) -> Result<()> {
    current_store().set_with_origin(key, value, Origin::Caller(Location::caller()))
}

#[track_caller]
pub fn update<T: StateData>(key: &str, f: impl FnOnce(&T) -> T) -> Result<()> {
    current_store().update_with_origin(key, f, Origin::Caller(Location::caller()))
}

#[track_caller]
pub fn set_async<T, E, P, Fut>(
    key: impl Into<String>,
    producer: P,
) -> impl Future<Output = Result<()>>
where
    T: StateData,
    E: fmt::Display,
    P: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    current_store().set_async(key, producer)
}

pub fn subscribe<T: StateData>(key: &str, listener: impl Fn(&T) + 'static) -> Result<Subscription> {
    current_store().subscribe(key, listener)
}

pub fn define_derived<T, F, I, S>(key: &str, compute: F, dependencies: I) -> Result<()>
where
    T: StateData,
    F: Fn(&GlobalStore) -> Result<T> + 'static,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    current_store().define_derived(key, compute, dependencies)
}

pub fn use_global_state<T: StateData>(key: &str) -> Result<StateBinding<T>> {
    current_store().use_global_state(key)
}

pub fn create_global_state<T: StateData>(key: impl Into<String>, initial: T) -> GlobalState<T> {
    current_store().create_global_state(key, initial)
}

pub fn toggle_debug_overlay() -> bool {
    current_store().toggle_debug_overlay()
}
