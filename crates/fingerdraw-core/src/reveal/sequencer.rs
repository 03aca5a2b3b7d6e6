//! Strictly ordered reveal sequencer.
//!
//! Pending units sit in a queue. Exactly one unit is active at a time and
//! [`AnimationSequencer::advance`] is the only place a unit completes and the
//! next one starts. [`AnimationSequencer::frame`] calls it whenever the active
//! unit's duration has elapsed.
//!
//! ```text
//! Idle -> Running -> Finished
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::unit::{ease_in_out, RevealUnit};
use crate::contact::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencerState {
    Idle,
    Running,
    /// Every unit revealed. Inert until `reset()`.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerSignal {
    UnitStarted(usize),
    UnitRevealed(usize),
    AllRevealed,
}

/// Presentation snapshot of the active unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealFrame {
    pub unit_index: usize,
    /// Linear progress, 0.0 ..= 1.0.
    pub linear: f32,
    /// Eased progress, 0.0 ..= 1.0.
    pub progress: f32,
    /// Current coverage radius of a cover unit.
    pub radius: Option<f32>,
    /// Current tip of the segment being drawn into a rank unit.
    pub segment_tip: Option<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActiveUnit {
    index: usize,
    unit: RevealUnit,
    started_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSequencer {
    unit_duration_ms: u64,
    state: SequencerState,
    pending: VecDeque<RevealUnit>,
    active: Option<ActiveUnit>,
    revealed: Vec<RevealUnit>,
    next_index: usize,
}

impl AnimationSequencer {
    pub fn new(unit_duration_ms: u64) -> Self {
        Self {
            unit_duration_ms,
            state: SequencerState::Idle,
            pending: VecDeque::new(),
            active: None,
            revealed: Vec::new(),
            next_index: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SequencerState::Running
    }

    pub fn unit_duration_ms(&self) -> u64 {
        self.unit_duration_ms
    }

    /// Index of the active unit, which is also the number of units revealed
    /// so far.
    pub fn cursor(&self) -> usize {
        self.revealed.len()
    }

    pub fn total_units(&self) -> usize {
        self.revealed.len() + usize::from(self.active.is_some()) + self.pending.len()
    }

    pub fn active_unit(&self) -> Option<(usize, &RevealUnit)> {
        self.active.as_ref().map(|a| (a.index, &a.unit))
    }

    /// Unit `index` of the sequence, whether revealed, active or pending.
    pub fn unit(&self, index: usize) -> Option<&RevealUnit> {
        if let Some(unit) = self.revealed.get(index) {
            return Some(unit);
        }
        match &self.active {
            Some(active) if active.index == index => Some(&active.unit),
            Some(active) => index
                .checked_sub(active.index + 1)
                .and_then(|i| self.pending.get(i)),
            None => None,
        }
    }

    /// Units that have completed, in reveal order.
    pub fn revealed_units(&self) -> &[RevealUnit] {
        &self.revealed
    }

    pub fn current_frame(&self, now_ms: u64) -> Option<RevealFrame> {
        let active = self.active.as_ref()?;
        let linear = if self.unit_duration_ms == 0 {
            1.0
        } else {
            let elapsed = now_ms.saturating_sub(active.started_at_ms);
            (elapsed as f64 / self.unit_duration_ms as f64).min(1.0) as f32
        };
        let progress = ease_in_out(linear);
        let radius = match &active.unit {
            RevealUnit::Cover {
                from_radius,
                to_radius,
                ..
            } => Some(from_radius + (to_radius - from_radius) * progress),
            _ => None,
        };
        Some(RevealFrame {
            unit_index: active.index,
            linear,
            progress,
            radius,
            segment_tip: active.unit.segment().map(|s| s.point_at(progress)),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin revealing `units`, the first one starting at `now_ms`.
    /// Ignored unless the sequencer is idle.
    pub fn start(&mut self, units: Vec<RevealUnit>, now_ms: u64) -> Vec<SequencerSignal> {
        if self.state != SequencerState::Idle {
            debug!(state = ?self.state, "sequencer start ignored");
            return Vec::new();
        }
        self.pending = units.into();
        self.state = SequencerState::Running;
        self.activate_next(now_ms)
    }

    /// Complete the active unit and start the next one at `now_ms`.
    pub fn advance(&mut self, now_ms: u64) -> Vec<SequencerSignal> {
        if self.state != SequencerState::Running {
            return Vec::new();
        }
        let mut signals = Vec::with_capacity(2);
        if let Some(done) = self.active.take() {
            debug!(unit = done.index, "unit revealed");
            signals.push(SequencerSignal::UnitRevealed(done.index));
            self.revealed.push(done.unit);
        }
        signals.extend(self.activate_next(now_ms));
        signals
    }

    /// Advance past every unit whose duration has elapsed by `now_ms`. Each
    /// next unit starts at its predecessor's scheduled end.
    pub fn frame(&mut self, now_ms: u64) -> Vec<SequencerSignal> {
        let mut signals = Vec::new();
        while let Some(active) = &self.active {
            let ends_at = active.started_at_ms.saturating_add(self.unit_duration_ms);
            if now_ms < ends_at {
                break;
            }
            signals.extend(self.advance(ends_at));
        }
        signals
    }

    pub fn reset(&mut self) {
        self.state = SequencerState::Idle;
        self.pending.clear();
        self.active = None;
        self.revealed.clear();
        self.next_index = 0;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn activate_next(&mut self, now_ms: u64) -> Vec<SequencerSignal> {
        match self.pending.pop_front() {
            Some(unit) => {
                let index = self.next_index;
                self.next_index += 1;
                self.active = Some(ActiveUnit {
                    index,
                    unit,
                    started_at_ms: now_ms,
                });
                vec![SequencerSignal::UnitStarted(index)]
            }
            None => {
                self.state = SequencerState::Finished;
                self.active = None;
                vec![SequencerSignal::AllRevealed]
            }
        }
    }
}
