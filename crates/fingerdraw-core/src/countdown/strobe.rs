use serde::{Deserialize, Serialize};

/// Pulse position inside a countdown.
///
/// The countdown is cut into strobes of `period` (a fraction of the total
/// duration). `completed` counts the strobes already finished and `progress`
/// is the position inside the current one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrobePhase {
    pub completed: u32,
    /// 0.0 .. 1.0 within the current strobe.
    pub progress: f32,
    pub period: f32,
}

impl StrobePhase {
    pub fn at(fraction: f32, period: f32) -> Self {
        if !(period.is_finite() && period > 0.0) {
            return Self {
                completed: 0,
                progress: 0.0,
                period: 0.0,
            };
        }
        let fraction = fraction.clamp(0.0, 1.0);
        Self {
            completed: (fraction / period).floor() as u32,
            progress: ((fraction % period) / period).clamp(0.0, 1.0),
            period,
        }
    }

    /// Pulse amplitude in 0.0 ..= 1.0. Each strobe reaches a little further
    /// than the one before it.
    pub fn glow_extent(&self) -> f32 {
        ((self.completed + 1) as f32 * self.period * self.progress).min(1.0)
    }
}
