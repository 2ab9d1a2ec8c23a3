use std::cell::RefCell;
use std::rc::Rc;

use crate::changelog::ChangeLog;
use crate::graph::DependencyGraph;
use crate::listeners::{Listener, ListenerRegistry};
use crate::overlay::OverlayState;
use crate::store::Store;
use crate::{LogEntry, Result, StateData, StateError, StateValue, StoreConfig, Subscription};

/// Handle to one store: values, listeners, derived graph and change log.
///
/// Clone is cheap and every clone refers to the same store. Not `Send`:
/// all mutation happens on the thread that owns it.
#[derive(Clone)]
pub struct GlobalStore {
    pub(crate) inner: Rc<StoreInner>,
}

pub(crate) struct StoreInner {
    pub config: StoreConfig,
    pub store: RefCell<Store>,
    pub listeners: Rc<RefCell<ListenerRegistry>>,
    pub graph: RefCell<DependencyGraph>,
    pub log: RefCell<ChangeLog>,
    pub overlay: RefCell<OverlayState>,
}

impl Default for GlobalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let log = ChangeLog::new(config.log_capacity);
        Self {
            inner: Rc::new(StoreInner {
                config,
                store: RefCell::new(Store::default()),
                listeners: Rc::new(RefCell::new(ListenerRegistry::default())),
                graph: RefCell::new(DependencyGraph::default()),
                log: RefCell::new(log),
                overlay: RefCell::new(OverlayState::default()),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// True if both handles point at the same store.
    pub fn ptr_eq(&self, other: &GlobalStore) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Registers `key` with `initial`. Repeat calls are ignored and return `false`.
    pub fn initialize<T: StateData>(&self, key: impl Into<String>, initial: T) -> bool {
        self.initialize_value(&key.into(), StateValue::new(initial))
    }

    pub(crate) fn initialize_value(&self, key: &str, initial: StateValue) -> bool {
        let inserted = self.inner.store.borrow_mut().insert_if_absent(key, initial);
        if inserted {
            self.inner.listeners.borrow_mut().ensure_key(key);
            log::trace!("initialized global state `{key}`");
        } else {
            log::debug!("initialize(`{key}`) ignored: already initialized");
        }
        inserted
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.store.borrow().contains(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.store.borrow().keys().map(str::to_string).collect();
        keys.sort();
        keys
    }

    pub fn get_value(&self, key: &str) -> Result<StateValue> {
        self.inner
            .store
            .borrow()
            .get(key)
            .ok_or_else(|| StateError::not_found(key))
    }

    pub fn get<T: StateData>(&self, key: &str) -> Result<T> {
        let value = self.get_value(key)?;
        value.get::<T>().ok_or_else(|| mismatch::<T>(key, &value))
    }

    /// Fails with `NotFound` if `key` has no listener set.
    pub fn subscribe<T: StateData>(
        &self,
        key: &str,
        listener: impl Fn(&T) + 'static,
    ) -> Result<Subscription> {
        let current = self.get_value(key)?;
        if !current.is::<T>() {
            return Err(mismatch::<T>(key, &current));
        }
        let erased: Listener = Rc::new(move |value: &StateValue| {
            if let Some(v) = value.downcast_ref::<T>() {
                listener(v);
            }
        });
        let id = self
            .inner
            .listeners
            .borrow_mut()
            .insert(key, erased)
            .ok_or_else(|| StateError::not_found(key))?;
        log::trace!("subscribed to `{key}`");
        Ok(Subscription::new(id, &self.inner.listeners))
    }

    pub fn listener_count(&self, key: &str) -> usize {
        self.inner.listeners.borrow().count(key)
    }

    pub fn is_derived(&self, key: &str) -> bool {
        self.inner.graph.borrow().is_derived(key)
    }

    /// Ordered copy of the retained change log.
    pub fn log_snapshot(&self) -> Vec<LogEntry> {
        self.inner.log.borrow().snapshot()
    }

    pub fn log_len(&self) -> usize {
        self.inner.log.borrow().len()
    }

    /// Entries dropped by the ring buffer or by `clear_log`.
    pub fn log_evicted(&self) -> u64 {
        self.inner.log.borrow().evicted()
    }

    pub fn clear_log(&self) {
        self.inner.log.borrow_mut().clear();
    }
}

pub(crate) fn mismatch<T: 'static>(key: &str, found: &StateValue) -> StateError {
    StateError::TypeMismatch {
        key: key.to_string(),
        expected: std::any::type_name::<T>(),
        found: found.type_name(),
    }
}
