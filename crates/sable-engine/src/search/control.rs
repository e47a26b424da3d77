//! Search control: stop flag, node budget, and wall-clock budget.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::search::SearchLimits;

/// The clock is consulted once every this many nodes.
pub const POLL_INTERVAL: u64 = 1024;

/// Fraction (in percent) of the time budget after which the search aborts.
///
/// The remainder is left for unwinding and assembling the result.
pub const HARD_LIMIT_PERCENT: u32 = 93;

/// Fraction (in percent) of the time budget after which no new
/// iteration is started.
pub const SOFT_LIMIT_PERCENT: u32 = 50;

/// Decides when a search must stop.
///
/// Polled by every node. Three sources can stop a search:
/// - the external stop flag (set by another thread),
/// - the node budget (checked on every poll),
/// - the time budget (checked every [`POLL_INTERVAL`] nodes).
///
/// Once a budget trips, the control latches into the stopped state so
/// the remaining frames unwind without re-reading the clock. The latch is
/// private: the caller's flag is only ever read.
pub struct SearchControl {
    external: Arc<AtomicBool>,
    tripped: AtomicBool,
    start: Instant,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
    node_limit: Option<u64>,
}

impl SearchControl {
    /// Build control for `limits`; the clock starts now.
    pub fn new(external: Arc<AtomicBool>, limits: &SearchLimits) -> Self {
        let (soft_limit, hard_limit) = match limits.time_limit {
            Some(budget) => (
                Some(budget * SOFT_LIMIT_PERCENT / 100),
                Some(budget * HARD_LIMIT_PERCENT / 100),
            ),
            None => (None, None),
        };
        Self {
            external,
            tripped: AtomicBool::new(false),
            start: Instant::now(),
            soft_limit,
            hard_limit,
            node_limit: limits.node_limit,
        }
    }

    /// Control with no budget; only the external flag can stop the search.
    pub fn new_infinite(external: Arc<AtomicBool>) -> Self {
        Self::new(external, &SearchLimits::default())
    }

    /// Whether the search should abort now, given `nodes` visited so far.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.is_stopped() {
            return true;
        }

        if let Some(limit) = self.node_limit
            && nodes >= limit
        {
            self.trip();
            return true;
        }

        if nodes % POLL_INTERVAL != 0 {
            return false;
        }

        if let Some(hard) = self.hard_limit
            && self.elapsed() >= hard
        {
            self.trip();
            return true;
        }

        false
    }

    /// Whether iterative deepening should skip the next iteration.
    ///
    /// True once the soft limit has passed: the next iteration would
    /// almost certainly be cut short by the hard limit.
    pub fn should_stop_iterating(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        match self.soft_limit {
            Some(soft) => self.elapsed() >= soft,
            None => false,
        }
    }

    /// Whether a stop has been requested or a budget has tripped.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.tripped.load(Ordering::Relaxed) || self.external.load(Ordering::Relaxed)
    }

    /// Time since the control was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn trip(&self) {
        self.tripped.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn infinite_never_stops_by_itself() {
        let control = SearchControl::new_infinite(flag());
        assert!(!control.should_stop(0));
        assert!(!control.should_stop(POLL_INTERVAL * 1000));
        assert!(!control.should_stop_iterating());
    }

    #[test]
    fn external_flag_stops_immediately() {
        let stop = flag();
        let control = SearchControl::new_infinite(Arc::clone(&stop));
        stop.store(true, Ordering::Relaxed);
        assert!(control.should_stop(1));
        assert!(control.should_stop_iterating());
    }

    #[test]
    fn node_limit_trips_and_latches() {
        let control = SearchControl::new(flag(), &SearchLimits::depth(10).with_nodes(500));
        assert!(!control.should_stop(499));
        assert!(control.should_stop(500));
        assert!(control.should_stop(3));
    }

    #[test]
    fn tripping_does_not_touch_external_flag() {
        let stop = flag();
        let control = SearchControl::new(Arc::clone(&stop), &SearchLimits::depth(10).with_nodes(1));
        assert!(control.should_stop(1));
        assert!(!stop.load(Ordering::Relaxed));
    }

    #[test]
    fn zero_time_budget_stops_at_first_poll() {
        let control = SearchControl::new(flag(), &SearchLimits::depth(10).with_time(Duration::ZERO));
        assert!(control.should_stop_iterating());
        // Off-interval node counts do not read the clock.
        assert!(!control.should_stop(1));
        assert!(control.should_stop(POLL_INTERVAL));
    }

    #[test]
    fn limits_apply_safety_margins() {
        let control = SearchControl::new(flag(), &SearchLimits::depth(10).with_time(Duration::from_millis(1000)));
        assert_eq!(control.hard_limit, Some(Duration::from_millis(930)));
        assert_eq!(control.soft_limit, Some(Duration::from_millis(500)));
    }
}
