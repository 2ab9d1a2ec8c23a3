use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;
use std::rc::Rc;

use crate::scope::current_scope;
use crate::{GlobalStore, Origin, Result, StateData, Subscription};

/// Setter bound to one key. Cheap to clone into event handlers.
pub struct Setter<T> {
    key: Rc<str>,
    store: GlobalStore,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: StateData> Setter<T> {
    pub fn key(&self) -> &str {
        &self.key
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
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").field("key", &self.key).finish()
    }
}

/// A component's live view of one global state.
///
/// The local copy is replaced synchronously on every accepted change, before
/// the `set` that caused it returns. The listener is released when the
/// owning [`Scope`](crate::Scope) is disposed, or when the binding drops if
/// it was created outside any scope.
pub struct StateBinding<T> {
    local: Rc<RefCell<T>>,
    setter: Setter<T>,
    subscription: Rc<Subscription>,
}

impl<T: StateData> StateBinding<T> {
    pub fn get(&self) -> T {
        self.local.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.local.borrow())
    }

    pub fn key(&self) -> &str {
        self.setter.key()
    }

    pub fn setter(&self) -> Setter<T> {
        self.setter.clone()
    }

    #[track_caller]
    pub fn set(&self, value: T) -> Result<()> {
        self.setter.set(value)
    }

    #[track_caller]
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<()> {
        self.setter.update(f)
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop tracking the store; the local copy freezes.
    pub fn detach(&self) {
        self.subscription.unsubscribe();
    }

    /// `(current value, setter)`; the subscription is released.
    pub fn into_parts(self) -> (T, Setter<T>) {
        let value = self.get();
        self.detach();
        (value, self.setter)
    }
}

impl GlobalStore {
    pub fn use_global_state<T: StateData>(&self, key: &str) -> Result<StateBinding<T>> {
        let initial: T = self.get(key)?;
        let local = Rc::new(RefCell::new(initial));

        let sink = local.clone();
        let subscription = Rc::new(self.subscribe(key, move |value: &T| {
            *sink.borrow_mut() = value.clone();
        })?);

        if let Some(scope) = current_scope() {
            let held = subscription.clone();
            scope.on_dispose(move || held.unsubscribe());
        }

        Ok(StateBinding {
            local,
            setter: Setter {
                key: Rc::from(key),
                store: self.clone(),
                _marker: PhantomData,
            },
            subscription,
        })
    }
}
