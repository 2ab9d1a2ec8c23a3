use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::StateValue;

new_key_type! {
    /// Capability handle for one listener registration.
    pub struct SubscriptionId;
}

pub(crate) type Listener = Rc<dyn Fn(&StateValue)>;

pub(crate) type ListenerList = SmallVec<[(SubscriptionId, Listener); 4]>;

/// Per-key listener sets, in insertion order.
///
/// Identity is the `SubscriptionId`, never the closure itself.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    owners: SlotMap<SubscriptionId, String>,
    by_key: HashMap<String, ListenerList>,
}

impl ListenerRegistry {
    pub fn ensure_key(&mut self, key: &str) {
        if !self.by_key.contains_key(key) {
            self.by_key.insert(key.to_string(), SmallVec::new());
        }
    }

    /// `None` if the key has no listener set (never initialized).
    pub fn insert(&mut self, key: &str, listener: Listener) -> Option<SubscriptionId> {
        let list = self.by_key.get_mut(key)?;
        let id = self.owners.insert(key.to_string());
        list.push((id, listener));
        Some(id)
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let Some(key) = self.owners.remove(id) else {
            return false;
        };
        if let Some(list) = self.by_key.get_mut(&key) {
            list.retain(|(sid, _)| *sid != id);
        }
        true
    }

    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.owners.contains_key(id)
    }

    /// Cloned so listeners can run without the registry borrowed.
    pub fn snapshot(&self, key: &str) -> ListenerList {
        self.by_key.get(key).cloned().unwrap_or_default()
    }

    pub fn count(&self, key: &str) -> usize {
        self.by_key.get(key).map_or(0, |list| list.len())
    }
}

/// A live listener registration.
///
/// Dropping it unsubscribes; call [`Subscription::leak`] to keep the
/// listener for the lifetime of the store instead.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<RefCell<ListenerRegistry>>,
    released: Cell<bool>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: &Rc<RefCell<ListenerRegistry>>) -> Self {
        Self {
            id,
            registry: Rc::downgrade(registry),
            released: Cell::new(false),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Safe to call more than once.
    pub fn unsubscribe(&self) {
        if self.released.replace(true) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        !self.released.get()
            && self
                .registry
                .upgrade()
                .is_some_and(|r| r.borrow().is_live(self.id))
    }

    pub fn leak(self) -> SubscriptionId {
        self.released.set(true);
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
