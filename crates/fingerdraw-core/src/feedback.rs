//! Fire-and-forget audio/haptic triggers.
//!
//! The state machine calls these at fixed points of a session. Failures are
//! logged and dropped; they never change the session.

use tracing::warn;

use crate::config::FeedbackConfig;
use crate::error::FeedbackError;

pub trait Feedback {
    /// Countdown (re)armed. Typically starts a build-up sound.
    fn on_countdown_armed(&mut self) -> Result<(), FeedbackError>;

    /// A reveal unit started. Typically plays a final note.
    fn on_outcome_revealed(&mut self) -> Result<(), FeedbackError>;

    /// Session reset. Typically stops whatever is playing.
    fn on_reset(&mut self) -> Result<(), FeedbackError>;

    /// Countdown cancelled on quorum loss.
    fn on_countdown_cancelled(&mut self) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Feedback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl Feedback for NoFeedback {
    fn on_countdown_armed(&mut self) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn on_outcome_revealed(&mut self) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn on_reset(&mut self) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Which trigger fired, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cue {
    CountdownArmed,
    CountdownCancelled,
    OutcomeRevealed,
    Reset,
}

/// Wraps the caller's feedback, applies the config switches and swallows
/// errors.
pub(crate) struct FeedbackGate {
    inner: Box<dyn Feedback>,
    config: FeedbackConfig,
}

impl FeedbackGate {
    pub(crate) fn new(inner: Box<dyn Feedback>, config: FeedbackConfig) -> Self {
        Self { inner, config }
    }

    pub(crate) fn fire(&mut self, cue: Cue) {
        if !self.config.enabled {
            return;
        }
        let result = match cue {
            Cue::CountdownArmed => self.inner.on_countdown_armed(),
            Cue::CountdownCancelled => self.inner.on_countdown_cancelled(),
            Cue::OutcomeRevealed if self.config.reveal_notes => self.inner.on_outcome_revealed(),
            Cue::OutcomeRevealed => Ok(()),
            Cue::Reset => self.inner.on_reset(),
        };
        if let Err(e) = result {
            warn!(?cue, error = %e, "feedback failed, ignoring");
        }
    }
}

impl std::fmt::Debug for FeedbackGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackGate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
