//! Registry of the contacts currently held on the surface.
//!
//! Contacts live in a single ordered list (insertion order) and are always
//! referenced by [`ContactId`]. Nothing else in the crate keeps its own copy.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Color, Contact, ContactId, Point, PALETTE};

/// How newly added contacts are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// A palette color not used by any other held contact, when possible.
    #[default]
    Distinct,
    /// Everyone starts out [`Color::NEUTRAL`] (teams get colored later).
    Neutral,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRegistry {
    contacts: Vec<Contact>,
    policy: ColorPolicy,
    /// Round-robin cursor used once every palette color is taken.
    fallback_cursor: usize,
}

impl ContactRegistry {
    pub fn new(policy: ColorPolicy) -> Self {
        Self {
            contacts: Vec::new(),
            policy,
            fallback_cursor: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn contains(&self, id: ContactId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    pub fn ids(&self) -> Vec<ContactId> {
        self.contacts.iter().map(|c| c.id).collect()
    }

    pub fn as_slice(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn policy(&self) -> ColorPolicy {
        self.policy
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Track a new contact. Returns `None` (and changes nothing) if `id` is
    /// already held.
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        id: ContactId,
        x: f32,
        y: f32,
        rng: &mut R,
    ) -> Option<&Contact> {
        if self.contains(id) {
            return None;
        }
        let color = self.pick_color(rng);
        self.contacts.push(Contact::new(id, Point::new(x, y), color));
        self.contacts.last()
    }

    /// Move a held contact. Returns `false` for unknown ids.
    pub fn update(&mut self, id: ContactId, x: f32, y: f32) -> bool {
        match self.get_mut(id) {
            Some(contact) => {
                contact.position = Point::new(x, y);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ContactId) -> Option<Contact> {
        let index = self.position_of(id)?;
        Some(self.contacts.remove(index))
    }

    /// Forget every contact and restart the color fallback cycle.
    pub fn clear(&mut self) {
        self.contacts.clear();
        self.fallback_cursor = 0;
    }

    /// Switch coloring policy and recolor every held contact under it.
    pub fn set_policy<R: Rng + ?Sized>(&mut self, policy: ColorPolicy, rng: &mut R) {
        self.policy = policy;
        self.fallback_cursor = 0;
        let held = std::mem::take(&mut self.contacts);
        for mut contact in held {
            contact.color = self.pick_color(rng);
            contact.clear_assignment();
            self.contacts.push(contact);
        }
    }

    pub(crate) fn get_mut(&mut self, id: ContactId) -> Option<&mut Contact> {
        self.contacts.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Contact> {
        self.contacts.iter_mut()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn position_of(&self, id: ContactId) -> Option<usize> {
        self.contacts.iter().position(|c| c.id == id)
    }

    fn pick_color<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Color {
        if self.policy == ColorPolicy::Neutral {
            return Color::NEUTRAL;
        }
        let free: Vec<Color> = PALETTE
            .iter()
            .copied()
            .filter(|color| !self.contacts.iter().any(|c| c.color == *color))
            .collect();
        match free.choose(rng) {
            Some(color) => *color,
            None => {
                let color = PALETTE[self.fallback_cursor % PALETTE.len()];
                self.fallback_cursor += 1;
                color
            }
        }
    }
}
