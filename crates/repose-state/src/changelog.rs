//! Append-only record of accepted mutations, read by the debug overlay.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use std::panic::Location;

use web_time::Instant;

use crate::StateValue;

/// Where a mutation came from. Diagnostic only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Call site captured through `#[track_caller]`.
    Caller(&'static Location<'static>),
    /// Explicit label passed by the caller.
    Label(Cow<'static, str>),
    /// Recomputation of a derived state.
    Derived,
    /// Completion of `set_async`, with the call site that started it.
    Async(&'static Location<'static>),
    Unknown,
}

impl Origin {
    pub fn label(text: impl Into<Cow<'static, str>>) -> Self {
        Origin::Label(text.into())
    }

    #[track_caller]
    pub fn caller() -> Self {
        Origin::Caller(Location::caller())
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, Origin::Derived)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Caller(loc) => write!(f, "{}:{}:{}", loc.file(), loc.line(), loc.column()),
            Origin::Label(text) => f.write_str(text),
            Origin::Derived => f.write_str("derived state update"),
            Origin::Async(loc) => {
                write!(f, "async update @ {}:{}:{}", loc.file(), loc.line(), loc.column())
            }
            Origin::Unknown => f.write_str("unknown source"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub seq: u64,
    pub key: String,
    pub previous: StateValue,
    pub new: StateValue,
    pub origin: Origin,
    pub at: Instant,
}

impl LogEntry {
    pub fn record(&self) -> LogRecord {
        LogRecord {
            seq: self.seq,
            key: self.key.clone(),
            previous: format!("{:?}", self.previous),
            new: format!("{:?}", self.new),
            origin: self.origin.to_string(),
        }
    }
}

/// Plain-text export of a [`LogEntry`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LogRecord {
    pub seq: u64,
    pub key: String,
    pub previous: String,
    pub new: String,
    pub origin: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {}: {} -> {} ({})",
            self.seq, self.key, self.previous, self.new, self.origin
        )
    }
}

/// Ring buffer of log entries. `capacity: None` keeps everything.
pub(crate) struct ChangeLog {
    entries: VecDeque<LogEntry>,
    capacity: Option<usize>,
    next_seq: u64,
    evicted: u64,
}

impl ChangeLog {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            next_seq: 0,
            evicted: 0,
        }
    }

    pub fn push(&mut self, key: &str, previous: StateValue, new: StateValue, origin: Origin) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(cap) = self.capacity {
            if cap == 0 {
                self.evicted += 1;
                return seq;
            }
            while self.entries.len() >= cap {
                self.entries.pop_front();
                self.evicted += 1;
            }
        }
        self.entries.push_back(LogEntry {
            seq,
            key: key.to_string(),
            previous,
            new,
            origin,
            at: Instant::now(),
        });
        seq
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn clear(&mut self) {
        self.evicted += self.entries.len() as u64;
        self.entries.clear();
    }
}
