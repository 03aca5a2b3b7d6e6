//! # Fingerdraw Core Library
//!
//! This library provides the core logic for Fingerdraw, a multi-touch
//! "finger chooser": everyone puts a finger on the screen, a short countdown
//! runs, and the library picks a winner, ranks everyone, or splits the
//! fingers into teams, then sequences the reveal animation.
//!
//! The CLI binary drives the same state machine with a virtual clock; a
//! touch front end is expected to be a thin layer over it.
//!
//! ## Architecture
//!
//! - **Session state machine**: A clock-free state machine. The caller passes
//!   the current time to every command and periodically invokes `tick_at()`
//!   to advance the countdown and the reveal
//! - **Contacts**: Ordered registry of held touch points and their colors
//! - **Assignment**: Seedable random winner / ranking / team partition
//! - **Reveal**: Per-mode reveal units played strictly one after another
//! - **Configuration**: TOML-based durations, surface size and feedback switches
//!
//! ## Key Components
//!
//! - [`SelectionStateMachine`]: Session lifecycle and event source
//! - [`ContactRegistry`]: Held contacts
//! - [`CountdownController`]: Quorum countdown and strobe phase
//! - [`AnimationSequencer`]: Ordered reveal playback
//! - [`Config`]: Application configuration management
//! - [`Feedback`]: Trait for audio/haptic collaborators

pub mod assign;
pub mod config;
pub mod contact;
pub mod countdown;
pub mod error;
pub mod events;
pub mod feedback;
pub mod mode;
pub mod reveal;
pub mod session;

pub use assign::{Outcome, Team};
pub use config::Config;
pub use contact::{Color, ColorPolicy, Contact, ContactId, ContactRegistry, Glow, Point};
pub use countdown::{CountdownController, CountdownTick, StrobePhase};
pub use error::{ConfigError, CoreError, FeedbackError};
pub use events::Event;
pub use feedback::{Feedback, NoFeedback};
pub use mode::{Mode, ModeKind};
pub use reveal::{AnimationSequencer, RevealFrame, RevealUnit, Surface};
pub use session::{now_ms, InputEvent, SelectionSession, SelectionStateMachine, SessionState};
