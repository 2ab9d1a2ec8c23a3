use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

/// Anything that can live in the store.
///
/// `PartialEq` drives the no-op check on `set`, `Debug` feeds the change log.
pub trait StateData: Clone + PartialEq + fmt::Debug + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + 'static> StateData for T {}

trait DynState: fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynState) -> bool;
    fn type_name(&self) -> &'static str;
}

impl<T: StateData> DynState for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynState) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Type-erased stored value. Clone is cheap (one `Rc` bump).
#[derive(Clone)]
pub struct StateValue(Rc<dyn DynState>);

impl StateValue {
    pub fn new<T: StateData>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Strict equality: same allocation, or same type and `PartialEq`-equal.
    pub fn same_as(&self, other: &StateValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.dyn_eq(other.0.as_ref())
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for StateValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

/// Identity-compared wrapper: two `ByRef`s are equal only if they share an allocation.
///
/// Use it for values where a rebuilt-but-equal container must still count as a change.
pub struct ByRef<T>(pub Rc<T>);

impl<T> ByRef<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(value))
    }
}

impl<T> Clone for ByRef<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> PartialEq for ByRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: fmt::Debug> fmt::Debug for ByRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<T> std::ops::Deref for ByRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_value_downcast() {
        let v = StateValue::new(42i32);
        assert!(v.is::<i32>());
        assert!(!v.is::<i64>());
        assert_eq!(v.get::<i32>(), Some(42));
        assert_eq!(v.get::<String>(), None);
        assert_eq!(v.type_name(), "i32");
        assert_eq!(format!("{v:?}"), "42");
    }

    #[test]
    fn test_state_value_equality() {
        let a = StateValue::new(vec![1, 2]);
        let b = StateValue::new(vec![1, 2]);
        let c = StateValue::new(vec![1, 3]);
        assert!(a.same_as(&a.clone()));
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
        // Different types never compare equal, even with equal debug output.
        assert!(!StateValue::new(1i32).same_as(&StateValue::new(1i64)));
    }

    #[test]
    fn test_by_ref_compares_identity() {
        let a = ByRef::new(vec![1, 2]);
        let rebuilt = ByRef::new(vec![1, 2]);
        assert!(a == a.clone());
        assert!(a != rebuilt);
        assert_eq!(a.len(), 2);
        assert!(!StateValue::new(a).same_as(&StateValue::new(rebuilt)));
    }
}
