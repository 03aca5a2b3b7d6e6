use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contact::ColorPolicy;

pub const MIN_TEAMS: u8 = 2;
pub const MAX_TEAMS: u8 = 4;

/// What a session resolves its contacts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mode {
    /// One winner.
    #[default]
    SinglePick,
    /// A full random ranking.
    Ordering,
    /// Balanced teams.
    Teams { teams: u8 },
}

impl Mode {
    /// Teams mode with `count` clamped to `MIN_TEAMS..=MAX_TEAMS`.
    pub fn teams(count: u8) -> Self {
        Mode::Teams {
            teams: clamp_team_count(count),
        }
    }

    /// Minimum number of held contacts before the countdown may run.
    pub fn quorum(&self) -> usize {
        match self {
            Mode::SinglePick => 1,
            Mode::Ordering => 2,
            Mode::Teams { teams } => usize::from(clamp_team_count(*teams)),
        }
    }

    pub fn is_quorate(&self, contacts: usize) -> bool {
        contacts > 0 && contacts >= self.quorum()
    }

    pub fn color_policy(&self) -> ColorPolicy {
        match self {
            Mode::Teams { .. } => ColorPolicy::Neutral,
            Mode::SinglePick | Mode::Ordering => ColorPolicy::Distinct,
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::SinglePick => ModeKind::SinglePick,
            Mode::Ordering => ModeKind::Ordering,
            Mode::Teams { .. } => ModeKind::Teams,
        }
    }

    /// Same mode with any out-of-range team count clamped.
    pub fn clamped(self) -> Self {
        match self {
            Mode::Teams { teams } => Mode::teams(teams),
            other => other,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::SinglePick => f.write_str("single pick"),
            Mode::Ordering => f.write_str("ordering"),
            Mode::Teams { teams } => write!(f, "{teams} teams"),
        }
    }
}

/// Mode without its parameters, as written in config files and on the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    #[default]
    SinglePick,
    Ordering,
    Teams,
}

impl ModeKind {
    pub fn with_teams(self, team_count: u8) -> Mode {
        match self {
            ModeKind::SinglePick => Mode::SinglePick,
            ModeKind::Ordering => Mode::Ordering,
            ModeKind::Teams => Mode::teams(team_count),
        }
    }
}

pub fn clamp_team_count(count: u8) -> u8 {
    count.clamp(MIN_TEAMS, MAX_TEAMS)
}
