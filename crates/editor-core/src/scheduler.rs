//! Frame-scheduled pass coalescing
//!
//! Expensive work is never done inside input handlers. Handlers `request` a
//! pass; the host's display-refresh callback `fire`s the scheduler once per
//! frame and runs whatever became due. Each pass kind has a single pending
//! slot, so any number of requests within a frame collapse into one run, and a
//! new request replaces (cancels) the not-yet-fired one.
//!
//! A pass may span several frames (page rasterization drains a queue a few
//! pages per frame). While it is marked running, a request that fires is
//! re-armed for the following frame instead of starting a second run.

use std::collections::{BTreeMap, BTreeSet};

/// Logical pass types, in the order they run within one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PassKind {
    /// Recompute page scales and containers after a resize or zoom change
    Relayout,
    /// Evict, window and rasterize pages
    RenderPages,
    /// Apply the latest drag pointer and re-render affected overlays
    Overlay,
    /// Draw stroke samples accumulated since the previous frame
    Stroke,
}

/// Handle of one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_token: u64,
    pending: BTreeMap<PassKind, FrameToken>,
    running: BTreeSet<PassKind>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` for the next frame, cancelling its previous schedule
    pub fn request(&mut self, kind: PassKind) -> FrameToken {
        self.next_token += 1;
        let token = FrameToken(self.next_token);
        if let Some(previous) = self.pending.insert(kind, token) {
            tracing::trace!("Coalesced {:?} request, cancelled {:?}", kind, previous);
        }
        token
    }

    /// Drop the pending schedule of `kind`, returning whether one existed
    pub fn cancel(&mut self, kind: PassKind) -> bool {
        self.pending.remove(&kind).is_some()
    }

    pub fn pending_token(&self, kind: PassKind) -> Option<FrameToken> {
        self.pending.get(&kind).copied()
    }

    pub fn is_pending(&self, kind: PassKind) -> bool {
        self.pending.contains_key(&kind)
    }

    pub fn is_running(&self, kind: PassKind) -> bool {
        self.running.contains(&kind)
    }

    /// Whether the host needs to schedule another frame
    pub fn wants_frame(&self) -> bool {
        !self.pending.is_empty() || !self.running.is_empty()
    }

    /// Fire the frame callback
    ///
    /// Returns the passes to run now, in `PassKind` order. A due pass whose
    /// previous run is still in flight is re-armed for the next frame.
    pub fn fire(&mut self) -> Vec<PassKind> {
        let due = std::mem::take(&mut self.pending);
        let mut ready = Vec::with_capacity(due.len());
        for kind in due.into_keys() {
            if self.running.contains(&kind) {
                self.request(kind);
            } else {
                ready.push(kind);
            }
        }
        ready
    }

    /// Mark a multi-frame pass as in flight
    pub fn begin(&mut self, kind: PassKind) {
        self.running.insert(kind);
    }

    /// Mark an in-flight pass as complete
    pub fn finish(&mut self, kind: PassKind) {
        self.running.remove(&kind);
    }
}
