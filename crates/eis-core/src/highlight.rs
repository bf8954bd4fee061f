//! "What's new since the last poll" for an append-only series.
//!
//! The tracker is a small state machine with one pending-expiry slot:
//!
//! ```text
//!            grow (L > prev)                     now >= deadline
//!   Idle ─────────────────────▶ Highlighting ───────────────────▶ Idle
//!                                 │    ▲
//!                                 └────┘ grow: replace ids, re-arm deadline
//! ```
//!
//! A new batch supersedes the current one: its ids replace the highlight set
//! and the single deadline is re-armed, so an earlier window can end before
//! its nominal duration. Snapshots that do not grow leave the slot alone.
//!
//! Time is passed in, never read, so transitions are deterministic.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::constants::HIGHLIGHT_WINDOW_MS;
use crate::measurement::{Measurement, record_id};

#[derive(Clone, Debug)]
struct PendingExpiry {
    ids: Vec<String>,
    deadline: Instant,
}

#[derive(Clone, Debug)]
pub struct HighlightTracker {
    window: Duration,
    previous_len: usize,
    slot: Option<PendingExpiry>,
}

impl Default for HighlightTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(HIGHLIGHT_WINDOW_MS))
    }
}

impl HighlightTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            previous_len: 0,
            slot: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Snapshot length as of the last call to `track`.
    pub fn previous_len(&self) -> usize {
        self.previous_len
    }

    /// When the current highlight set will be cleared, if one is pending.
    pub fn pending_expiry(&self) -> Option<Instant> {
        self.slot.as_ref().map(|s| s.deadline)
    }

    /// Ids highlighted at `now`. Empty once the deadline has passed, even if
    /// `expire` has not been called yet.
    pub fn current(&self, now: Instant) -> &[String] {
        match &self.slot {
            Some(slot) if now < slot.deadline => slot.ids.as_slice(),
            _ => &[],
        }
    }

    pub fn is_highlighted(&self, id: &str, now: Instant) -> bool {
        self.current(now).iter().any(|h| h == id)
    }

    /// Clear the slot if its deadline has passed. Returns true if a set was
    /// cleared by this call.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.slot.as_ref().is_some_and(|s| now >= s.deadline) {
            self.slot = None;
            true
        } else {
            false
        }
    }

    /// Feed one snapshot of the series (ids in series order) and return the
    /// ids highlighted afterwards.
    ///
    /// Only a suffix beyond the previous length counts as new; the series is
    /// assumed never to reorder or drop earlier entries. A shrink or a repeat
    /// adds nothing but still resets the remembered length.
    pub fn track<S: AsRef<str>>(&mut self, snapshot: &[S], now: Instant) -> Vec<String> {
        self.expire(now);

        let len = snapshot.len();
        if len > self.previous_len {
            let mut seen = HashSet::new();
            let ids: Vec<String> = snapshot[self.previous_len..]
                .iter()
                .map(|s| s.as_ref())
                .filter(|id| seen.insert(*id))
                .map(str::to_string)
                .collect();
            self.slot = Some(PendingExpiry {
                ids,
                deadline: now + self.window,
            });
        }
        self.previous_len = len;

        self.current(now).to_vec()
    }

    pub fn track_measurements(&mut self, snapshot: &[Measurement], now: Instant) -> Vec<String> {
        let ids: Vec<&str> = snapshot.iter().map(|m| m.source_key.as_str()).collect();
        self.track(&ids, now)
    }

    /// Raw records without a source key contribute an empty id.
    pub fn track_records(&mut self, snapshot: &[Value], now: Instant) -> Vec<String> {
        let ids: Vec<&str> = snapshot
            .iter()
            .map(|r| record_id(r).unwrap_or_default())
            .collect();
        self.track(&ids, now)
    }
}
