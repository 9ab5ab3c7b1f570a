//! Duplicate-submission guard.
//!
//! A second triage for the same patient inside the window is treated as a
//! client retry and rejected. The window is inclusive at its upper bound.

use chrono::{DateTime, Duration, Utc};

use crate::config::DEFAULT_DUPLICATE_WINDOW_MINUTES;
use crate::models::Triage;

/// What the guard concluded about a new submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The patient has no triage yet
    NoPrior,
    /// The latest triage has no usable timestamp; let the submission through
    Indeterminate { last_triage_id: i64 },
    /// The latest triage is older than the window
    Clear { last_triage_id: i64, elapsed: Duration },
    /// The latest triage falls inside the window
    Conflict { last_triage_id: i64, elapsed: Duration },
}

impl GuardDecision {
    pub fn is_conflict(&self) -> bool {
        matches!(self, GuardDecision::Conflict { .. })
    }
}

/// Time-window check against a patient's latest triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateGuard {
    window: Duration,
}

impl Default for DuplicateGuard {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_DUPLICATE_WINDOW_MINUTES))
    }
}

impl DuplicateGuard {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decide whether a submission at `now` duplicates `latest`.
    pub fn check(&self, latest: Option<&Triage>, now: DateTime<Utc>) -> GuardDecision {
        let Some(latest) = latest else {
            return GuardDecision::NoPrior;
        };
        let Some(recorded_at) = latest.effective_timestamp() else {
            return GuardDecision::Indeterminate {
                last_triage_id: latest.id,
            };
        };

        // A timestamp in the future yields a negative span and counts as recent
        let elapsed = now - recorded_at;
        if elapsed <= self.window {
            GuardDecision::Conflict {
                last_triage_id: latest.id,
                elapsed,
            }
        } else {
            GuardDecision::Clear {
                last_triage_id: latest.id,
                elapsed,
            }
        }
    }
}
