use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assign::Outcome;
use crate::contact::{Color, ContactId, Point};
use crate::countdown::StrobePhase;
use crate::error::Result;
use crate::mode::Mode;
use crate::session::SessionState;

/// Every state change of a selection session produces an Event.
/// Presentation layers poll the returned events; nothing is pushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ContactAdded {
        contact_id: ContactId,
        position: Point,
        color: Color,
        at: DateTime<Utc>,
    },
    ContactRemoved {
        contact_id: ContactId,
        at: DateTime<Utc>,
    },
    /// Enough contacts are held for the current mode.
    QuorumReached {
        contacts: usize,
        quorum: usize,
        at: DateTime<Utc>,
    },
    /// Countdown (re)started from its full duration.
    CountdownArmed {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownTick {
        seconds_remaining: u32,
        fraction: f32,
        strobe: StrobePhase,
        at: DateTime<Utc>,
    },
    /// Quorum was lost before the countdown expired.
    CountdownCancelled {
        at: DateTime<Utc>,
    },
    OutcomeAssigned {
        mode: Mode,
        outcome: Outcome,
        at: DateTime<Utc>,
    },
    UnitStarted {
        unit_index: usize,
        at: DateTime<Utc>,
    },
    UnitRevealed {
        unit_index: usize,
        at: DateTime<Utc>,
    },
    /// Last unit revealed. Emitted once per session.
    AllRevealed {
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        mode: Mode,
        contacts: usize,
        quorum: usize,
        countdown_fraction: Option<f32>,
        seconds_remaining: Option<u32>,
        reveal_cursor: usize,
        reveal_total: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Variant name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ContactAdded { .. } => "ContactAdded",
            Event::ContactRemoved { .. } => "ContactRemoved",
            Event::QuorumReached { .. } => "QuorumReached",
            Event::CountdownArmed { .. } => "CountdownArmed",
            Event::CountdownTick { .. } => "CountdownTick",
            Event::CountdownCancelled { .. } => "CountdownCancelled",
            Event::OutcomeAssigned { .. } => "OutcomeAssigned",
            Event::UnitStarted { .. } => "UnitStarted",
            Event::UnitRevealed { .. } => "UnitRevealed",
            Event::AllRevealed { .. } => "AllRevealed",
            Event::SessionReset { .. } => "SessionReset",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }

    /// JSON form, as printed by the CLI and sent to presentation layers.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
