//! Random outcome assignment.
//!
//! Every function here is pure given the random source: pass a seeded
//! `rand_pcg::Mcg128Xsl64` to get reproducible outcomes. An empty contact
//! set yields `None`, which callers treat as "nothing to assign".

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::contact::{Color, ContactId, PALETTE};
use crate::mode::{clamp_team_count, Mode};

/// One team of a Teams outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub index: usize,
    pub color: Color,
    pub members: Vec<ContactId>,
}

/// Mode-specific result of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Winner {
        contact: ContactId,
    },
    /// `order[i]` holds rank `i + 1`.
    Ranking {
        order: Vec<ContactId>,
    },
    Teams {
        teams: Vec<Team>,
        /// Permutation of team indices: the order teams are revealed in.
        reveal_order: Vec<usize>,
    },
}

impl Outcome {
    /// 1-based rank of `id` in a Ranking.
    pub fn rank_of(&self, id: ContactId) -> Option<usize> {
        match self {
            Outcome::Ranking { order } => order.iter().position(|c| *c == id).map(|i| i + 1),
            _ => None,
        }
    }

    pub fn team_of(&self, id: ContactId) -> Option<&Team> {
        match self {
            Outcome::Teams { teams, .. } => teams.iter().find(|t| t.members.contains(&id)),
            _ => None,
        }
    }

    /// Every contact the outcome mentions.
    pub fn participants(&self) -> Vec<ContactId> {
        match self {
            Outcome::Winner { contact } => vec![*contact],
            Outcome::Ranking { order } => order.clone(),
            Outcome::Teams { teams, .. } => teams
                .iter()
                .flat_map(|t| t.members.iter().copied())
                .collect(),
        }
    }
}

/// Resolve `contacts` according to `mode`.
pub fn assign<R: Rng + ?Sized>(mode: Mode, contacts: &[ContactId], rng: &mut R) -> Option<Outcome> {
    match mode {
        Mode::SinglePick => pick_winner(contacts, rng).map(|contact| Outcome::Winner { contact }),
        Mode::Ordering => rank(contacts, rng).map(|order| Outcome::Ranking { order }),
        Mode::Teams { teams } => {
            partition(contacts, teams, rng).map(|(teams, reveal_order)| Outcome::Teams {
                teams,
                reveal_order,
            })
        }
    }
}

/// Uniformly random winner.
pub fn pick_winner<R: Rng + ?Sized>(contacts: &[ContactId], rng: &mut R) -> Option<ContactId> {
    contacts.choose(rng).copied()
}

/// Uniformly random permutation; index `i` gets rank `i + 1`.
pub fn rank<R: Rng + ?Sized>(contacts: &[ContactId], rng: &mut R) -> Option<Vec<ContactId>> {
    if contacts.is_empty() {
        return None;
    }
    let mut order = contacts.to_vec();
    order.shuffle(rng);
    Some(order)
}

/// Shuffle, then deal contacts round-robin into `team_count` teams (clamped
/// to 2..=4), so sizes differ by at most one. Each team gets its own palette
/// color. Also returns a random reveal order over the team indices.
pub fn partition<R: Rng + ?Sized>(
    contacts: &[ContactId],
    team_count: u8,
    rng: &mut R,
) -> Option<(Vec<Team>, Vec<usize>)> {
    if contacts.is_empty() {
        return None;
    }
    let k = usize::from(clamp_team_count(team_count));

    let mut shuffled = contacts.to_vec();
    shuffled.shuffle(rng);
    let mut colors = PALETTE.to_vec();
    colors.shuffle(rng);

    let mut teams: Vec<Team> = (0..k)
        .map(|index| Team {
            index,
            color: colors[index % colors.len()],
            members: Vec::new(),
        })
        .collect();
    for (i, id) in shuffled.into_iter().enumerate() {
        teams[i % k].members.push(id);
    }

    let mut reveal_order: Vec<usize> = (0..k).collect();
    reveal_order.shuffle(rng);

    Some((teams, reveal_order))
}
