//! Contacts held on the surface and the colors they are drawn with.

mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use registry::{ColorPolicy, ContactRegistry};

/// Stable identifier of one physical touch for as long as it is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u32);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ContactId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Surface coordinate, in the same units the input source reports.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `to`; `t` is not clamped.
    pub fn lerp(self, to: Point, t: f32) -> Point {
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Color of a contact that has not been given a team yet.
    pub const NEUTRAL: Color = Color::rgb(0xCC, 0xCC, 0xCC);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black or white, whichever reads better on top of `self`.
    pub fn contrasting(self) -> Color {
        let luma =
            (299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b)) / 1000;
        if luma >= 128 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Fixed palette contacts and teams are colored from.
pub const PALETTE: [Color; 10] = [
    Color::rgb(255, 0, 0),
    Color::rgb(0, 255, 0),
    Color::rgb(0, 0, 255),
    Color::rgb(255, 255, 0),
    Color::rgb(0, 255, 255),
    Color::rgb(255, 0, 255),
    Color::rgb(255, 130, 50),
    Color::rgb(255, 165, 0),
    Color::rgb(128, 0, 128),
    Color::rgb(255, 20, 147),
];

/// Transient glow state used by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Glow {
    pub active: bool,
    /// 0.0 .. 1.0
    pub progress: f32,
}

/// A tracked input point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub position: Point,
    pub color: Color,
    /// 1-based rank, set in Ordering mode once assigned.
    pub rank: Option<usize>,
    /// 0-based team index, set in Teams mode once assigned.
    pub team: Option<usize>,
    #[serde(default)]
    pub glow: Glow,
    #[serde(default)]
    pub revealed: bool,
}

impl Contact {
    pub fn new(id: ContactId, position: Point, color: Color) -> Self {
        Self {
            id,
            position,
            color,
            rank: None,
            team: None,
            glow: Glow::default(),
            revealed: false,
        }
    }

    /// Drop every assignment and animation mark, keeping id, position and color.
    pub fn clear_assignment(&mut self) {
        self.rank = None;
        self.team = None;
        self.glow = Glow::default();
        self.revealed = false;
    }
}
