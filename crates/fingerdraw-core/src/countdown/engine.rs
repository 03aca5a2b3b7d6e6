//! Countdown controller.
//!
//! Like the rest of the crate this is a clock-free state machine: the caller
//! passes the current time (milliseconds on any monotonic scale) to every
//! command and calls `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Armed -> Expired
//!           |
//!           +-> Idle (cancel)
//! ```

use serde::{Deserialize, Serialize};

use super::strobe::StrobePhase;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;
pub const DEFAULT_STROBE_PERIOD: f32 = 1.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Armed,
    Expired,
}

/// Progress report produced while armed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountdownTick {
    pub remaining_ms: u64,
    /// Elapsed fraction, 0.0 ..= 1.0.
    pub fraction: f32,
    /// Whole seconds left, rounded up.
    pub seconds_remaining: u32,
    pub strobe: StrobePhase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownSignal {
    Tick(CountdownTick),
    /// Reported once per arming.
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownController {
    state: CountdownState,
    duration_ms: u64,
    /// When the current arming started. `None` unless armed.
    armed_at_ms: Option<u64>,
    /// Last time a tick was reported, for rate limiting.
    last_report_ms: Option<u64>,
    tick_interval_ms: u64,
    strobe_period: f32,
}

impl Default for CountdownController {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL_MS, DEFAULT_STROBE_PERIOD)
    }
}

impl CountdownController {
    pub fn new(tick_interval_ms: u64, strobe_period: f32) -> Self {
        Self {
            state: CountdownState::Idle,
            duration_ms: 0,
            armed_at_ms: None,
            last_report_ms: None,
            tick_interval_ms,
            strobe_period,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == CountdownState::Armed
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Absolute expiry time of the current arming.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.armed_at_ms
            .map(|start| start.saturating_add(self.duration_ms))
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.deadline_ms() {
            Some(deadline) => deadline.saturating_sub(now_ms),
            None => 0,
        }
    }

    /// Current progress, without touching the tick rate limiter.
    pub fn progress(&self, now_ms: u64) -> Option<CountdownTick> {
        if self.state != CountdownState::Armed {
            return None;
        }
        let remaining_ms = self.remaining_ms(now_ms);
        let fraction = if self.duration_ms == 0 {
            1.0
        } else {
            (1.0 - remaining_ms as f64 / self.duration_ms as f64) as f32
        };
        Some(CountdownTick {
            remaining_ms,
            fraction,
            seconds_remaining: remaining_ms.div_ceil(1000) as u32,
            strobe: StrobePhase::at(fraction, self.strobe_period),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down `duration_ms` from `now_ms`. Arming again while
    /// armed restarts the full duration.
    pub fn arm(&mut self, duration_ms: u64, now_ms: u64) {
        self.state = CountdownState::Armed;
        self.duration_ms = duration_ms;
        self.armed_at_ms = Some(now_ms);
        self.last_report_ms = None;
    }

    /// Back to `Idle`. Safe to call in any state.
    pub fn cancel(&mut self) {
        self.state = CountdownState::Idle;
        self.armed_at_ms = None;
        self.last_report_ms = None;
    }

    /// Call periodically. Returns a tick at most once per tick interval and
    /// `Expired` exactly once when the duration runs out.
    pub fn tick(&mut self, now_ms: u64) -> Option<CountdownSignal> {
        if self.state != CountdownState::Armed {
            return None;
        }
        if self.remaining_ms(now_ms) == 0 {
            self.state = CountdownState::Expired;
            self.armed_at_ms = None;
            self.last_report_ms = None;
            return Some(CountdownSignal::Expired);
        }
        let due = match self.last_report_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.tick_interval_ms,
            None => true,
        };
        if !due {
            return None;
        }
        self.last_report_ms = Some(now_ms);
        self.progress(now_ms).map(CountdownSignal::Tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_then_expire_once() {
        let mut cd = CountdownController::default();
        cd.arm(3000, 1_000);
        assert_eq!(cd.state(), CountdownState::Armed);
        assert_eq!(cd.deadline_ms(), Some(4_000));

        assert!(matches!(cd.tick(2_000), Some(CountdownSignal::Tick(_))));
        assert_eq!(cd.tick(4_000), Some(CountdownSignal::Expired));
        assert_eq!(cd.state(), CountdownState::Expired);
        assert_eq!(cd.tick(4_050), None);
        assert_eq!(cd.tick(9_000), None);
    }

    #[test]
    fn tick_reports_fraction_and_ceiling_seconds() {
        let mut cd = CountdownController::default();
        cd.arm(3000, 0);
        match cd.tick(1_500) {
            Some(CountdownSignal::Tick(t)) => {
                assert_eq!(t.remaining_ms, 1_500);
                assert!((t.fraction - 0.5).abs() < 1e-6);
                assert_eq!(t.seconds_remaining, 2);
                assert_eq!(t.strobe.completed, 1);
            }
            other => panic!("expected tick, got {other:?}"),
        }
        match cd.tick(2_999) {
            Some(CountdownSignal::Tick(t)) => assert_eq!(t.seconds_remaining, 1),
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[test]
    fn ticks_are_rate_limited() {
        let mut cd = CountdownController::new(50, DEFAULT_STROBE_PERIOD);
        cd.arm(3000, 0);
        assert!(cd.tick(10).is_some());
        assert!(cd.tick(30).is_none());
        assert!(cd.tick(60).is_some());
    }

    #[test]
    fn expiry_is_not_rate_limited() {
        let mut cd = CountdownController::new(1_000, DEFAULT_STROBE_PERIOD);
        cd.arm(100, 0);
        assert!(cd.tick(50).is_some());
        assert_eq!(cd.tick(100), Some(CountdownSignal::Expired));
    }

    #[test]
    fn rearm_restarts_duration() {
        let mut cd = CountdownController::default();
        cd.arm(3000, 0);
        cd.arm(3000, 2_000);
        assert_eq!(cd.remaining_ms(2_500), 2_500);
        assert!(matches!(cd.tick(3_500), Some(CountdownSignal::Tick(_))));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut cd = CountdownController::default();
        cd.cancel();
        assert_eq!(cd.state(), CountdownState::Idle);
        cd.arm(3000, 0);
        cd.cancel();
        cd.cancel();
        assert_eq!(cd.state(), CountdownState::Idle);
        assert_eq!(cd.tick(5_000), None);
        assert_eq!(cd.deadline_ms(), None);
    }

    #[test]
    fn zero_duration_expires_on_first_tick() {
        let mut cd = CountdownController::default();
        cd.arm(0, 10);
        assert_eq!(cd.tick(10), Some(CountdownSignal::Expired));
    }

    #[test]
    fn can_rearm_after_expiry() {
        let mut cd = CountdownController::default();
        cd.arm(100, 0);
        cd.tick(100);
        cd.arm(100, 200);
        assert!(cd.is_armed());
        assert_eq!(cd.tick(300), Some(CountdownSignal::Expired));
    }
}
