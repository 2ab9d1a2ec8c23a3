use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::Location;
use std::rc::Rc;

use crate::{
    GlobalStore, Origin, Result, StateBinding, StateData, Subscription,
};

/// Typed handle to one key, as returned by `create_global_state`.
pub struct GlobalState<T> {
    key: Rc<str>,
    store: GlobalStore,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for GlobalState<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for GlobalState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalState").field("key", &self.key).finish()
    }
}

impl<T: StateData> GlobalState<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &GlobalStore {
        &self.store
    }

    pub fn get(&self) -> Result<T> {
        self.store.get(&self.key)
    }

    #[track_caller]
    pub fn set(&self, value: T) -> Result<()> {
        self.store
            .set_with_origin(&self.key, value, Origin::Caller(Location::caller()))
    }

    #[track_caller]
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<()> {
        self.store
            .update_with_origin(&self.key, f, Origin::Caller(Location::caller()))
    }

    #[track_caller]
    pub fn set_async<E, P, Fut>(
        &self,
        producer: P,
    ) -> impl Future<Output = Result<()>> + use<T, E, P, Fut>
    where
        E: fmt::Display,
        P: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.store.set_async(self.key.to_string(), producer)
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Result<Subscription> {
        self.store.subscribe(&self.key, listener)
    }

    pub fn use_global_state(&self) -> Result<StateBinding<T>> {
        self.store.use_global_state(&self.key)
    }

    /// Turn this key into a derived state.
    pub fn define_derived<F, I, S>(&self, compute: F, dependencies: I) -> Result<()>
    where
        F: Fn(&GlobalStore) -> Result<T> + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.define_derived(&self.key, compute, dependencies)
    }
}

impl GlobalStore {
    /// Initialize `key` (first writer wins) and return a typed handle to it.
    pub fn create_global_state<T: StateData>(
        &self,
        key: impl Into<String>,
        initial: T,
    ) -> GlobalState<T> {
        let key: String = key.into();
        self.initialize(key.as_str(), initial);
        GlobalState {
            key: Rc::from(key),
            store: self.clone(),
            _marker: PhantomData,
        }
    }
}
