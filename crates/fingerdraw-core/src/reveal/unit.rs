use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::assign::Outcome;
use crate::contact::{Color, ContactId, ContactRegistry, Point};

/// Size of the surface contacts are placed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1920.0,
        }
    }
}

impl Surface {
    /// Radius a circle centered on `origin` needs to cover the whole surface,
    /// i.e. the distance to the farthest corner.
    pub fn cover_radius(&self, origin: Point) -> f32 {
        let dx = origin.x.max(self.width - origin.x);
        let dy = origin.y.max(self.height - origin.y);
        dx.hypot(dy)
    }
}

/// Line drawn between two consecutively ranked contacts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn point_at(&self, t: f32) -> Point {
        self.from.lerp(self.to, t.clamp(0.0, 1.0))
    }
}

/// One step of the reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealUnit {
    /// Winner's color spreads from its position until it covers the surface.
    Cover {
        contact: ContactId,
        origin: Point,
        from_radius: f32,
        to_radius: f32,
    },
    /// One ranked contact; every rank but the first draws a segment from the
    /// previous rank's contact.
    Rank {
        contact: ContactId,
        rank: usize,
        segment: Option<Segment>,
    },
    /// Every member of one team glows at once.
    Team {
        team: usize,
        color: Color,
        members: Vec<ContactId>,
    },
}

impl RevealUnit {
    pub fn members(&self) -> Vec<ContactId> {
        match self {
            RevealUnit::Cover { contact, .. } | RevealUnit::Rank { contact, .. } => vec![*contact],
            RevealUnit::Team { members, .. } => members.clone(),
        }
    }

    pub fn segment(&self) -> Option<&Segment> {
        match self {
            RevealUnit::Rank { segment, .. } => segment.as_ref(),
            _ => None,
        }
    }
}

/// Accelerate-decelerate easing over 0.0 ..= 1.0.
pub fn ease_in_out(t: f32) -> f32 {
    ((t.clamp(0.0, 1.0) + 1.0) * PI).cos() / 2.0 + 0.5
}

/// Turn an outcome into the ordered list of reveal units.
///
/// Contacts the registry no longer knows about are skipped; in practice the
/// registry is frozen once an outcome exists.
pub fn plan(
    outcome: &Outcome,
    contacts: &ContactRegistry,
    surface: &Surface,
    contact_radius: f32,
) -> Vec<RevealUnit> {
    match outcome {
        Outcome::Winner { contact } => contacts
            .get(*contact)
            .map(|c| RevealUnit::Cover {
                contact: c.id,
                origin: c.position,
                from_radius: contact_radius,
                to_radius: surface.cover_radius(c.position).max(contact_radius),
            })
            .into_iter()
            .collect(),
        Outcome::Ranking { order } => {
            let mut units = Vec::with_capacity(order.len());
            let mut previous: Option<Point> = None;
            for (i, id) in order.iter().enumerate() {
                let Some(contact) = contacts.get(*id) else {
                    continue;
                };
                units.push(RevealUnit::Rank {
                    contact: contact.id,
                    rank: i + 1,
                    segment: previous.map(|from| Segment {
                        from,
                        to: contact.position,
                    }),
                });
                previous = Some(contact.position);
            }
            units
        }
        Outcome::Teams {
            teams,
            reveal_order,
        } => reveal_order
            .iter()
            .filter_map(|index| teams.iter().find(|t| t.index == *index))
            .filter(|team| !team.members.is_empty())
            .map(|team| RevealUnit::Team {
                team: team.index,
                color: team.color,
                members: team.members.clone(),
            })
            .collect(),
    }
}
