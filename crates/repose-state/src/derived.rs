use std::rc::Rc;

use crate::graph::{ComputeFn, DerivedDef, KeyList};
use crate::runtime::mismatch;
use crate::{CyclePolicy, GlobalStore, Result, StateData, StateError, StateValue};

impl GlobalStore {
    /// Register `key` as computed from `dependencies`.
    ///
    /// `compute` reads whatever it needs from the store it is handed; it is
    /// re-run whenever a declared dependency accepts a new value. The first
    /// result is stored as-is, without a log entry or notification. A key
    /// that already holds a plain state of the same type becomes derived and
    /// keeps its listeners; a different type is a `TypeMismatch`.
    pub fn define_derived<T, F, I, S>(&self, key: &str, compute: F, dependencies: I) -> Result<()>
    where
        T: StateData,
        F: Fn(&GlobalStore) -> Result<T> + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dependencies: KeyList = dependencies.into_iter().map(Into::into).collect();

        if self.is_derived(key) {
            return Err(StateError::AlreadyDerived {
                key: key.to_string(),
            });
        }
        if let Some(missing) = dependencies.iter().find(|d| !self.contains(d)) {
            return Err(StateError::not_found(missing));
        }
        let cycle = self.inner.graph.borrow().find_cycle(key, &dependencies);
        if let Some(path) = cycle {
            let err = StateError::Cycle {
                key: key.to_string(),
                path,
            };
            match self.inner.config.cycles {
                CyclePolicy::Reject => return Err(err),
                CyclePolicy::Warn => log::warn!("{err}"),
            }
        }

        if let Ok(existing) = self.get_value(key)
            && !existing.is::<T>()
        {
            return Err(mismatch::<T>(key, &existing));
        }

        let compute: ComputeFn = Rc::new(move |store: &GlobalStore| compute(store).map(StateValue::new));
        let initial = compute(self)?;

        if !self.initialize_value(key, initial.clone()) {
            self.inner.store.borrow_mut().replace(key, initial);
        }
        log::debug!("derived state `{key}` depends on {:?}", dependencies.as_slice());
        self.inner
            .graph
            .borrow_mut()
            .add_derived(key, DerivedDef { compute, dependencies });
        Ok(())
    }

    pub fn dependencies_of(&self, key: &str) -> Option<Vec<String>> {
        self.inner
            .graph
            .borrow()
            .dependencies_of(key)
            .map(<[String]>::to_vec)
    }
}
