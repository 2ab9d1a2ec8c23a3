use std::any::Any;

pub type Result<T, E = StateError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The key was never passed to `initialize` (or `define_derived`).
    #[error("global state `{key}` was never initialized")]
    NotFound { key: String },

    /// A typed read or subscription asked for a different type than the one stored.
    #[error("global state `{key}` holds `{found}`, not `{expected}`")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Declaring these dependencies would make the derived graph cyclic.
    #[error("derived state `{key}` would form a dependency cycle: {}", .path.join(" -> "))]
    Cycle { key: String, path: Vec<String> },

    #[error("`{key}` is already a derived state")]
    AlreadyDerived { key: String },

    #[error("async producer for `{key}` failed: {message}")]
    AsyncProducer { key: String, message: String },

    #[error("listener of `{key}` panicked: {message}")]
    ListenerPanicked { key: String, message: String },

    #[error("compute function of derived state `{key}` failed: {message}")]
    Compute { key: String, message: String },
}

impl StateError {
    pub(crate) fn not_found(key: &str) -> Self {
        StateError::NotFound {
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StateError::NotFound { key }
            | StateError::TypeMismatch { key, .. }
            | StateError::Cycle { key, .. }
            | StateError::AlreadyDerived { key }
            | StateError::AsyncProducer { key, .. }
            | StateError::ListenerPanicked { key, .. }
            | StateError::Compute { key, .. } => key,
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
