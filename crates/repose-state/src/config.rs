use std::str::FromStr;

pub const DEFAULT_LOG_CAPACITY: usize = 512;
pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 64;

/// What happens when a listener panics during a notification pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ListenerFailurePolicy {
    /// Catch the panic, log it, keep notifying the remaining listeners.
    #[default]
    Isolate,
    /// Let the panic unwind out of `set`; later listeners and derived keys are skipped.
    Propagate,
}

/// What `define_derived` does with a dependency list that closes a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    #[default]
    Reject,
    /// Accept with a warning; the cascade stops at `max_cascade_depth`.
    Warn,
}

impl FromStr for ListenerFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!("unknown listener failure policy `{other}`")),
        }
    }
}

impl FromStr for CyclePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "warn" => Ok(Self::Warn),
            other => Err(format!("unknown cycle policy `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Change log retention. `None` keeps every entry, `Some(0)` none.
    pub log_capacity: Option<usize>,
    pub listener_failures: ListenerFailurePolicy,
    pub cycles: CyclePolicy,
    pub max_cascade_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_capacity: Some(DEFAULT_LOG_CAPACITY),
            listener_failures: ListenerFailurePolicy::default(),
            cycles: CyclePolicy::default(),
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
        }
    }
}

impl StoreConfig {
    pub fn with_log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.log_capacity = capacity;
        self
    }

    pub fn with_listener_failures(mut self, policy: ListenerFailurePolicy) -> Self {
        self.listener_failures = policy;
        self
    }

    pub fn with_cycles(mut self, policy: CyclePolicy) -> Self {
        self.cycles = policy;
        self
    }

    pub fn with_max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    /// Defaults overridden by `REPOSE_STATE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("REPOSE_STATE_LOG_CAPACITY") {
            match raw.trim() {
                "unbounded" => config.log_capacity = None,
                n => match n.parse::<usize>() {
                    Ok(cap) => config.log_capacity = Some(cap),
                    Err(e) => log::warn!("ignoring REPOSE_STATE_LOG_CAPACITY={raw:?}: {e}"),
                },
            }
        }
        if let Some(raw) = lookup("REPOSE_STATE_LISTENER_FAILURES") {
            match raw.parse() {
                Ok(policy) => config.listener_failures = policy,
                Err(e) => log::warn!("ignoring REPOSE_STATE_LISTENER_FAILURES: {e}"),
            }
        }
        if let Some(raw) = lookup("REPOSE_STATE_CYCLES") {
            match raw.parse() {
                Ok(policy) => config.cycles = policy,
                Err(e) => log::warn!("ignoring REPOSE_STATE_CYCLES: {e}"),
            }
        }
        config
    }
}
