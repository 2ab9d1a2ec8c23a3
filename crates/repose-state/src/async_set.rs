use std::fmt;
use std::future::Future;
use std::panic::Location;

use crate::{GlobalStore, Origin, Result, StateData, StateError};

impl GlobalStore {
    /// Await `producer`, then `set` its value.
    ///
    /// A failing producer is logged and leaves the state untouched; the
    /// returned future still resolves to `Ok(())`. Nothing is queued or
    /// cancelled: when two of these race on one key, the last to finish wins.
    /// The call site is captured now, not when the future completes.
    #[track_caller]
    pub fn set_async<T, E, P, Fut, K>(
        &self,
        key: K,
        producer: P,
    ) -> impl Future<Output = Result<()>> + use<T, E, P, Fut, K>
    where
        K: Into<String>,
        T: StateData,
        E: fmt::Display,
        P: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let origin = Origin::Async(Location::caller());
        let store = self.clone();
        let key = key.into();
        let pending = producer();
        async move {
            match pending.await {
                Ok(value) => store.set_with_origin(&key, value, origin),
                Err(e) => {
                    let err = StateError::AsyncProducer {
                        key,
                        message: e.to_string(),
                    };
                    log::warn!("{err}; state left unchanged");
                    Ok(())
                }
            }
        }
    }
}
