use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use easel_protocol::{Handle, HandleKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What the leak tracker records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakTracking {
    /// Nothing is tracked and teardown reports no leaks
    Off,
    /// Live handles are counted and reported by kind
    #[default]
    Count,
    /// Like `Count`, plus the call site each handle was created from
    Origin,
}

struct LiveEntry {
    kind: HandleKind,
    origin: Option<&'static Location<'static>>,
}

/// Live user-owned handles of one context.
/// Readable from any thread without taking the context lock.
///
/// Entries are keyed by handle alone, so a tracker belongs to the first
/// context built with it and cannot be handed to another one.
pub struct LeakTracker {
    mode: LeakTracking,
    live: DashMap<Handle, LiveEntry>,
    claimed: AtomicBool,
}

impl LeakTracker {
    pub fn new(mode: LeakTracking) -> Self {
        Self {
            mode,
            live: DashMap::new(),
            claimed: AtomicBool::new(false),
        }
    }

    /// Marks the tracker as owned. False when a context already owns it.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    pub fn mode(&self) -> LeakTracking {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != LeakTracking::Off
    }

    pub fn track(&self, handle: Handle, kind: HandleKind, origin: &'static Location<'static>) {
        if !self.is_active() {
            return;
        }
        let origin = (self.mode == LeakTracking::Origin).then_some(origin);
        let previous = self.live.insert(handle, LiveEntry { kind, origin });
        assert!(previous.is_none(), "handle {} allocated while still alive", handle);
    }

    pub fn untrack(&self, handle: Handle) {
        if !self.is_active() {
            return;
        }
        assert!(
            self.live.remove(&handle).is_some(),
            "freeing handle {} which is not alive",
            handle
        );
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn report(&self) -> LeakReport {
        let mut leaks: Vec<LeakedHandle> = self
            .live
            .iter()
            .map(|entry| LeakedHandle {
                handle: *entry.key(),
                kind: entry.value().kind,
                origin: entry.value().origin.map(|loc| loc.to_string()),
            })
            .collect();
        leaks.sort_by_key(|leak| (leak.handle.index, leak.handle.generation));
        LeakReport { leaks }
    }
}

impl Default for LeakTracker {
    fn default() -> Self {
        Self::new(LeakTracking::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeakedHandle {
    pub handle: Handle,
    pub kind: HandleKind,
    /// `file:line:column` of the creating call, when origins are captured
    pub origin: Option<String>,
}

/// Handles still alive when a context was torn down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeakReport {
    pub leaks: Vec<LeakedHandle>,
}

impl LeakReport {
    pub fn count(&self) -> usize {
        self.leaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaks.is_empty()
    }

    pub fn count_of(&self, kind: HandleKind) -> usize {
        self.leaks.iter().filter(|leak| leak.kind == kind).count()
    }

    pub fn log(&self) {
        for leak in &self.leaks {
            match &leak.origin {
                Some(origin) => warn!("{} handle {} leaked, created at {}", leak.kind, leak.handle, origin),
                None => warn!("{} handle {} leaked", leak.kind, leak.handle),
            }
        }
        if !self.is_empty() {
            warn!("leak count: {}", self.count());
        }
    }
}
