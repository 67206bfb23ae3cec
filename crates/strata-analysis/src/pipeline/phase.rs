//! Run phases and the transitions between them.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use strata_core::errors::PipelineError;
use strata_core::tracing::metrics;

/// Phase of one indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Discovering,
    Parsing,
    Resolving,
    Aggregating,
    AnalyticsRecompute,
    Committed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Discovering => "discovering",
            Phase::Parsing => "parsing",
            Phase::Resolving => "resolving",
            Phase::Aggregating => "aggregating",
            Phase::AnalyticsRecompute => "analytics_recompute",
            Phase::Committed => "committed",
        }
    }

    fn successor(self) -> Option<Phase> {
        match self {
            Phase::Idle => Some(Phase::Discovering),
            Phase::Discovering => Some(Phase::Parsing),
            Phase::Parsing => Some(Phase::Resolving),
            Phase::Resolving => Some(Phase::Aggregating),
            Phase::Aggregating => Some(Phase::AnalyticsRecompute),
            Phase::AnalyticsRecompute => Some(Phase::Committed),
            Phase::Committed => None,
        }
    }

    /// Phases only move forward one step at a time. The one shortcut is an
    /// up-to-date tree, which commits straight after discovery.
    pub fn can_advance_to(self, next: Phase) -> bool {
        self.successor() == Some(next) || (self == Phase::Discovering && next == Phase::Committed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current phase of a run and logs every transition.
#[derive(Debug)]
pub struct PhaseTracker {
    run_id: i64,
    current: Phase,
    entered: Instant,
}

impl PhaseTracker {
    pub fn new(run_id: i64) -> Self {
        Self {
            run_id,
            current: Phase::Idle,
            entered: Instant::now(),
        }
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn advance(&mut self, next: Phase) -> Result<(), PipelineError> {
        if !self.current.can_advance_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.current.to_string(),
                to: next.to_string(),
            });
        }
        let previous_ms = self.entered.elapsed().as_millis() as u64;
        tracing::info!(
            { metrics::RUN_ID } = self.run_id,
            { metrics::PHASE } = next.as_str(),
            from = self.current.as_str(),
            previous_ms,
            "phase transition"
        );
        self.current = next;
        self.entered = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sequence_is_accepted() {
        let mut tracker = PhaseTracker::new(1);
        for next in [
            Phase::Discovering,
            Phase::Parsing,
            Phase::Resolving,
            Phase::Aggregating,
            Phase::AnalyticsRecompute,
            Phase::Committed,
        ] {
            tracker.advance(next).unwrap();
        }
        assert_eq!(tracker.current(), Phase::Committed);
    }

    #[test]
    fn test_up_to_date_shortcut() {
        let mut tracker = PhaseTracker::new(1);
        tracker.advance(Phase::Discovering).unwrap();
        tracker.advance(Phase::Committed).unwrap();
    }

    #[test]
    fn test_skipping_a_phase_is_rejected() {
        let mut tracker = PhaseTracker::new(1);
        tracker.advance(Phase::Discovering).unwrap();
        let err = tracker.advance(Phase::Resolving).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidTransition { ref from, ref to }
                if from == "discovering" && to == "resolving"
        ));
        assert_eq!(tracker.current(), Phase::Discovering);
    }

    #[test]
    fn test_committed_is_terminal() {
        assert!(!Phase::Committed.can_advance_to(Phase::Idle));
        assert!(!Phase::Parsing.can_advance_to(Phase::Parsing));
    }
}
