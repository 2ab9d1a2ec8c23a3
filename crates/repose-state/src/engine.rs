//! Mutation path: resolve, compare, commit, log, notify, recompute.

use std::panic::{AssertUnwindSafe, Location, catch_unwind};

use crate::error::panic_message;
use crate::graph::ComputeFn;
use crate::runtime::mismatch;
use crate::{
    CyclePolicy, GlobalStore, ListenerFailurePolicy, Origin, Result, StateData, StateError, StateValue,
};

impl GlobalStore {
    /// Replace the value of `key`, recording the caller as the origin.
    ///
    /// Equal values (`PartialEq`) are a silent no-op: no log entry, no
    /// listener call, no recomputation. Everything else finishes, including
    /// the derived cascade, before this returns.
    #[track_caller]
    pub fn set<T: StateData>(&self, key: &str, value: T) -> Result<()> {
        self.set_with_origin(key, value, Origin::Caller(Location::caller()))
    }

    /// Functional update: `f` receives the current value.
    #[track_caller]
    pub fn update<T: StateData>(&self, key: &str, f: impl FnOnce(&T) -> T) -> Result<()> {
        self.update_with_origin(key, f, Origin::Caller(Location::caller()))
    }

    pub fn set_with_origin<T: StateData>(&self, key: &str, value: T, origin: Origin) -> Result<()> {
        let previous = self.get_value(key)?;
        if !previous.is::<T>() {
            return Err(mismatch::<T>(key, &previous));
        }
        self.commit(key, previous, StateValue::new(value), origin, 0);
        Ok(())
    }

    pub fn update_with_origin<T: StateData>(
        &self,
        key: &str,
        f: impl FnOnce(&T) -> T,
        origin: Origin,
    ) -> Result<()> {
        let previous = self.get_value(key)?;
        let resolved = match previous.downcast_ref::<T>() {
            Some(prev) => f(prev),
            None => return Err(mismatch::<T>(key, &previous)),
        };
        self.commit(key, previous, StateValue::new(resolved), origin, 0);
        Ok(())
    }

    /// Returns `false` when `next` equals `previous`.
    pub(crate) fn commit(
        &self,
        key: &str,
        previous: StateValue,
        next: StateValue,
        origin: Origin,
        depth: usize,
    ) -> bool {
        if previous.same_as(&next) {
            log::debug!("`{key}` unchanged ({next:?}); skipping");
            return false;
        }
        self.inner.store.borrow_mut().replace(key, next.clone());
        let seq = self
            .inner
            .log
            .borrow_mut()
            .push(key, previous, next.clone(), origin);
        log::trace!("`{key}` = {next:?} (#{seq})");

        self.notify(key, &next);
        self.refresh_overlay();
        self.recompute(key, depth);
        true
    }

    fn notify(&self, key: &str, value: &StateValue) {
        let listeners = self.inner.listeners.borrow().snapshot(key);
        for (id, listener) in listeners {
            // Unsubscribed by an earlier listener in this same pass.
            if !self.inner.listeners.borrow().is_live(id) {
                continue;
            }
            match self.inner.config.listener_failures {
                ListenerFailurePolicy::Propagate => listener(value),
                ListenerFailurePolicy::Isolate => {
                    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(value))) {
                        let err = StateError::ListenerPanicked {
                            key: key.to_string(),
                            message: panic_message(payload.as_ref()),
                        };
                        log::error!("{err}");
                    }
                }
            }
        }
    }

    /// Depth-first: each derived key that changes cascades into its own dependents.
    pub(crate) fn recompute(&self, changed: &str, depth: usize) {
        let dependents = self.inner.graph.borrow().dependents_of(changed);
        if dependents.is_empty() {
            return;
        }
        let max = self.inner.config.max_cascade_depth;
        // `Reject` keeps the graph acyclic.
        if self.inner.config.cycles == CyclePolicy::Warn && depth >= max {
            log::error!("derived cascade from `{changed}` exceeded depth {max}; stopping");
            return;
        }
        for derived in &dependents {
            let Some(compute) = self.inner.graph.borrow().compute_fn(derived) else {
                continue;
            };
            let Some(next) = self.run_compute(derived, &compute) else {
                continue;
            };
            let Ok(previous) = self.get_value(derived) else {
                continue;
            };
            self.commit(derived, previous, next, Origin::Derived, depth + 1);
        }
    }

    /// `None` if the compute function failed; the failure is logged.
    pub(crate) fn run_compute(&self, key: &str, compute: &ComputeFn) -> Option<StateValue> {
        let outcome = match self.inner.config.listener_failures {
            ListenerFailurePolicy::Propagate => Ok(compute(self)),
            ListenerFailurePolicy::Isolate => catch_unwind(AssertUnwindSafe(|| compute(self))),
        };
        let message = match outcome {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        let err = StateError::Compute {
            key: key.to_string(),
            message,
        };
        log::warn!("{err}; keeping previous value");
        None
    }
}
