//! Selection session and the state machine that drives it.

mod machine;

use serde::{Deserialize, Serialize};

pub use machine::SelectionStateMachine;

use crate::assign::Outcome;
use crate::config::Config;
use crate::contact::{ContactId, ContactRegistry};
use crate::countdown::CountdownController;
use crate::mode::Mode;
use crate::reveal::AnimationSequencer;

/// Lifecycle of a session.
///
/// ```text
/// Idle -> AwaitingQuorum -> Counting -> Assigning -> Revealing -> Done
///              ^                |
///              +-- quorum lost -+
/// ```
///
/// `reset()` returns to `Idle` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No contacts held.
    Idle,
    /// Some contacts held, fewer than the mode's quorum.
    AwaitingQuorum,
    /// Quorum met, countdown running.
    Counting,
    /// Countdown expired, outcome being computed.
    Assigning,
    /// Reveal animation in progress.
    Revealing,
    /// Everything revealed. Terminal until reset.
    Done,
}

impl SessionState {
    /// Whether contact input still changes the session.
    pub fn accepts_input(self) -> bool {
        matches!(
            self,
            SessionState::Idle | SessionState::AwaitingQuorum | SessionState::Counting
        )
    }
}

/// Raw input from the touch source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    Down { id: ContactId, x: f32, y: f32 },
    Move { id: ContactId, x: f32, y: f32 },
    Up { id: ContactId },
    /// The platform gave up on the touch; treated like `Up`.
    Cancel { id: ContactId },
}

/// Everything one session owns. Replaced wholesale on reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionSession {
    pub(crate) mode: Mode,
    pub(crate) state: SessionState,
    pub(crate) contacts: ContactRegistry,
    pub(crate) countdown: CountdownController,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) sequencer: AnimationSequencer,
    /// Set once any contact has been added.
    #[serde(default)]
    pub(crate) touched: bool,
}

impl SelectionSession {
    pub fn new(config: &Config) -> Self {
        let mode = config.mode();
        Self {
            mode,
            state: SessionState::Idle,
            contacts: ContactRegistry::new(mode.color_policy()),
            countdown: CountdownController::new(
                config.session.tick_interval_ms,
                config.session.strobe_period,
            ),
            outcome: None,
            sequencer: AnimationSequencer::new(config.reveal.unit_duration_ms(mode)),
            touched: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn contacts(&self) -> &ContactRegistry {
        &self.contacts
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Countdown expiry time, while counting.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.countdown.deadline_ms()
    }

    /// Index of the unit currently being revealed.
    pub fn reveal_cursor(&self) -> usize {
        self.sequencer.cursor()
    }

    /// A session nobody has touched yet. Lifting every contact does not make
    /// a session pristine again.
    pub fn is_pristine(&self) -> bool {
        !self.touched
            && self.state == SessionState::Idle
            && self.contacts.is_empty()
            && self.outcome.is_none()
    }
}

/// Milliseconds since the Unix epoch, for callers driving the machine with
/// the wall clock.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
