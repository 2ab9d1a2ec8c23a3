//! Component lifetimes. Anything registered with `on_dispose` while a scope is
//! current is released when the component's scope is disposed or dropped.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

#[derive(Clone, Default)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

#[derive(Default)]
struct ScopeInner {
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
    disposed: Cell<bool>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with this scope current, restoring the previous one afterwards.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Restore(Option<Weak<ScopeInner>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }
        let prev = CURRENT_SCOPE.with(|current| {
            current.borrow_mut().replace(Rc::downgrade(&self.inner))
        });
        let _restore = Restore(prev);
        f()
    }

    /// Registering on an already-disposed scope runs `f` right away.
    pub fn on_dispose(&self, f: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            f();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(f));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Children first, then this scope's disposers in registration order.
    pub fn dispose(&self) {
        self.inner.release();
    }
}

impl ScopeInner {
    fn release(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.release();
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Scope { inner })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispose_runs_children_then_self_once() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let parent = Scope::new();
        let child = parent.child();

        let o = order.clone();
        parent.on_dispose(move || o.borrow_mut().push("parent"));
        let o = order.clone();
        child.on_dispose(move || o.borrow_mut().push("child"));

        parent.dispose();
        parent.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
        assert!(child.is_disposed());
    }

    #[test]
    fn test_run_sets_and_restores_current() {
        assert!(current_scope().is_none());
        let outer = Scope::new();
        outer.run(|| {
            let inner = Scope::new();
            inner.run(|| {
                assert!(current_scope().is_some_and(|s| Rc::ptr_eq(&s.inner, &inner.inner)));
            });
            assert!(current_scope().is_some_and(|s| Rc::ptr_eq(&s.inner, &outer.inner)));
        });
        assert!(current_scope().is_none());
    }

    #[test]
    fn test_drop_of_last_handle_disposes() {
        let hit = Rc::new(Cell::new(false));
        {
            let scope = Scope::new();
            let h = hit.clone();
            scope.on_dispose(move || h.set(true));
        }
        assert!(hit.get());
    }

    #[test]
    fn test_on_dispose_after_dispose_runs_immediately() {
        let scope = Scope::new();
        scope.dispose();
        let hit = Rc::new(Cell::new(false));
        let h = hit.clone();
        scope.on_dispose(move || h.set(true));
        assert!(hit.get());
    }
}
