//! Selection state machine.
//!
//! The machine is single-threaded and its transitions never read the clock:
//! every time-dependent command takes the current time in milliseconds and
//! returns the events it produced. The caller feeds input as it arrives and
//! calls `tick_at()` from its timer or animation-frame callback. The `at`
//! stamp on emitted events is wall-clock time, for logs only; nothing in the
//! session depends on it.
//!
//! ## Usage
//!
//! ```ignore
//! let mut machine = SelectionStateMachine::new(Config::for_mode(Mode::Ordering));
//! machine.handle_input(InputEvent::Down { id: ContactId(0), x: 10.0, y: 10.0 }, now);
//! // In the frame loop:
//! for event in machine.tick_at(now) { /* draw, play sounds, ... */ }
//! ```

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use tracing::{debug, info};

use super::{now_ms, InputEvent, SelectionSession, SessionState};
use crate::assign::{self, Outcome};
use crate::config::Config;
use crate::contact::{Contact, ContactId, ContactRegistry, Glow};
use crate::countdown::{CountdownSignal, CountdownTick};
use crate::events::Event;
use crate::feedback::{Cue, Feedback, FeedbackGate, NoFeedback};
use crate::mode::Mode;
use crate::reveal::{self, RevealFrame, RevealUnit, SequencerSignal};

#[derive(Debug)]
pub struct SelectionStateMachine {
    config: Config,
    session: SelectionSession,
    rng: Mcg128Xsl64,
    feedback: FeedbackGate,
}

impl SelectionStateMachine {
    /// Machine seeded from OS entropy, with no feedback attached.
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, Mcg128Xsl64::from_entropy())
    }

    /// Machine whose outcomes are reproducible for a given seed and input.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_rng(config, Mcg128Xsl64::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: Mcg128Xsl64) -> Self {
        let config = config.validated();
        let feedback = FeedbackGate::new(Box::new(NoFeedback), config.feedback.clone());
        Self {
            session: SelectionSession::new(&config),
            config,
            rng,
            feedback,
        }
    }

    /// Attach audio/haptic feedback.
    pub fn with_feedback(mut self, feedback: Box<dyn Feedback>) -> Self {
        self.feedback = FeedbackGate::new(feedback, self.config.feedback.clone());
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn contacts(&self) -> &ContactRegistry {
        &self.session.contacts
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.session.contacts.get(id)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.session.outcome.as_ref()
    }

    pub fn countdown_progress(&self, now_ms: u64) -> Option<CountdownTick> {
        self.session.countdown.progress(now_ms)
    }

    pub fn reveal_frame(&self, now_ms: u64) -> Option<RevealFrame> {
        self.session.sequencer.current_frame(now_ms)
    }

    pub fn active_unit(&self) -> Option<(usize, &RevealUnit)> {
        self.session.sequencer.active_unit()
    }

    pub fn revealed_units(&self) -> &[RevealUnit] {
        self.session.sequencer.revealed_units()
    }

    pub fn snapshot(&self, now_ms: u64) -> Event {
        let progress = self.countdown_progress(now_ms);
        Event::StateSnapshot {
            state: self.session.state,
            mode: self.session.mode,
            contacts: self.session.contacts.len(),
            quorum: self.session.mode.quorum(),
            countdown_fraction: progress.map(|p| p.fraction),
            seconds_remaining: progress.map(|p| p.seconds_remaining),
            reveal_cursor: self.session.sequencer.cursor(),
            reveal_total: self.session.sequencer.total_units(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn handle_input(&mut self, input: InputEvent, now_ms: u64) -> Vec<Event> {
        match input {
            InputEvent::Down { id, x, y } => self.contact_down(id, x, y, now_ms),
            InputEvent::Move { id, x, y } => self.contact_move(id, x, y),
            InputEvent::Up { id } | InputEvent::Cancel { id } => self.contact_up(id, now_ms),
        }
    }

    /// Apply every queued input, then run one tick, so the tick never sees a
    /// half-applied batch.
    pub fn step<I>(&mut self, inputs: I, now_ms: u64) -> Vec<Event>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let mut events = Vec::new();
        for input in inputs {
            events.extend(self.handle_input(input, now_ms));
        }
        events.extend(self.tick_at(now_ms));
        events
    }

    pub fn contact_down(&mut self, id: ContactId, x: f32, y: f32, now_ms: u64) -> Vec<Event> {
        if !self.session.state.accepts_input() {
            debug!(%id, state = ?self.session.state, "contact ignored, session frozen");
            return Vec::new();
        }
        let Some(contact) = self.session.contacts.add(id, x, y, &mut self.rng) else {
            return Vec::new();
        };
        self.session.touched = true;
        let mut events = vec![Event::ContactAdded {
            contact_id: contact.id,
            position: contact.position,
            color: contact.color,
            at: Utc::now(),
        }];
        debug!(%id, contacts = self.session.contacts.len(), "contact added");
        events.extend(self.evaluate_quorum(now_ms, true));
        events
    }

    /// Moves never touch the countdown.
    pub fn contact_move(&mut self, id: ContactId, x: f32, y: f32) -> Vec<Event> {
        if self.session.state.accepts_input() {
            self.session.contacts.update(id, x, y);
        }
        Vec::new()
    }

    pub fn contact_up(&mut self, id: ContactId, now_ms: u64) -> Vec<Event> {
        if !self.session.state.accepts_input() {
            return Vec::new();
        }
        if self.session.contacts.remove(id).is_none() {
            return Vec::new();
        }
        let mut events = vec![Event::ContactRemoved {
            contact_id: id,
            at: Utc::now(),
        }];
        debug!(%id, contacts = self.session.contacts.len(), "contact removed");
        events.extend(self.evaluate_quorum(now_ms, true));
        events
    }

    /// Advance using the wall clock.
    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(now_ms())
    }

    /// Advance the countdown or the reveal to `now_ms`.
    pub fn tick_at(&mut self, now_ms: u64) -> Vec<Event> {
        match self.session.state {
            SessionState::Counting => self.tick_countdown(now_ms),
            SessionState::Revealing => self.tick_reveal(now_ms),
            _ => Vec::new(),
        }
    }

    /// Drop every contact, the outcome, the color fallback cycle and any
    /// running countdown or reveal. Emits nothing when the session was never
    /// touched.
    pub fn reset(&mut self) -> Vec<Event> {
        let pristine = self.session.is_pristine();
        self.session = SelectionSession::new(&self.config);
        if pristine {
            return Vec::new();
        }
        debug!("session reset");
        self.feedback.fire(Cue::Reset);
        vec![Event::SessionReset { at: Utc::now() }]
    }

    /// Switch mode, keeping the held contacts. Any running countdown is
    /// cancelled and quorum re-evaluated under the new mode. Ignored once an
    /// outcome has been assigned.
    pub fn set_mode(&mut self, mode: Mode, now_ms: u64) -> Vec<Event> {
        let mode = mode.clamped();
        if !self.session.state.accepts_input() {
            debug!(%mode, state = ?self.session.state, "mode change ignored");
            return Vec::new();
        }
        if mode == self.session.mode {
            return Vec::new();
        }
        info!(from = %self.session.mode, to = %mode, "mode changed");
        self.config.set_mode(mode);

        let mut events = Vec::new();
        if self.session.state == SessionState::Counting {
            events.extend(self.cancel_countdown());
        }
        self.session.mode = mode;
        self.session.sequencer =
            reveal::AnimationSequencer::new(self.config.reveal.unit_duration_ms(mode));
        self.session
            .contacts
            .set_policy(mode.color_policy(), &mut self.rng);
        events.extend(self.evaluate_quorum(now_ms, false));
        events
    }

    /// Change the team count (clamped to 2..=4). Takes effect immediately in
    /// Teams mode and is remembered for later otherwise.
    pub fn set_team_count(&mut self, team_count: u8, now_ms: u64) -> Vec<Event> {
        match self.session.mode {
            Mode::Teams { .. } => self.set_mode(Mode::teams(team_count), now_ms),
            _ => {
                self.config.session.team_count = crate::mode::clamp_team_count(team_count);
                Vec::new()
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn transition(&mut self, to: SessionState) {
        if self.session.state != to {
            debug!(from = ?self.session.state, ?to, "state transition");
            self.session.state = to;
        }
    }

    /// State to fall back to when no countdown may run.
    fn resting_state(&self) -> SessionState {
        if self.session.contacts.is_empty() {
            SessionState::Idle
        } else {
            SessionState::AwaitingQuorum
        }
    }

    /// Arm, re-arm or cancel the countdown after the contact set changed.
    /// `restart` re-arms a running countdown that still has quorum.
    fn evaluate_quorum(&mut self, now_ms: u64, restart: bool) -> Vec<Event> {
        let held = self.session.contacts.len();
        let quorum = self.session.mode.quorum();
        let quorate = self.session.mode.is_quorate(held);

        match self.session.state {
            SessionState::Idle | SessionState::AwaitingQuorum => {
                if quorate {
                    self.transition(SessionState::Counting);
                    let mut events = vec![Event::QuorumReached {
                        contacts: held,
                        quorum,
                        at: Utc::now(),
                    }];
                    events.push(self.arm_countdown(now_ms));
                    events
                } else {
                    let resting = self.resting_state();
                    self.transition(resting);
                    Vec::new()
                }
            }
            SessionState::Counting if !quorate => self.cancel_countdown(),
            SessionState::Counting if restart => vec![self.arm_countdown(now_ms)],
            _ => Vec::new(),
        }
    }

    fn arm_countdown(&mut self, now_ms: u64) -> Event {
        let duration_ms = self.config.session.countdown_ms;
        self.session.countdown.arm(duration_ms, now_ms);
        self.feedback.fire(Cue::CountdownArmed);
        debug!(duration_ms, "countdown armed");
        Event::CountdownArmed {
            duration_ms,
            at: Utc::now(),
        }
    }

    fn cancel_countdown(&mut self) -> Vec<Event> {
        self.session.countdown.cancel();
        self.clear_glow();
        let resting = self.resting_state();
        self.transition(resting);
        self.feedback.fire(Cue::CountdownCancelled);
        debug!("countdown cancelled");
        vec![Event::CountdownCancelled { at: Utc::now() }]
    }

    fn tick_countdown(&mut self, now_ms: u64) -> Vec<Event> {
        if let Some(progress) = self.session.countdown.progress(now_ms) {
            let glow = Glow {
                active: true,
                progress: progress.strobe.glow_extent(),
            };
            for contact in self.session.contacts.iter_mut() {
                contact.glow = glow;
            }
        }
        match self.session.countdown.tick(now_ms) {
            Some(CountdownSignal::Tick(tick)) => vec![Event::CountdownTick {
                seconds_remaining: tick.seconds_remaining,
                fraction: tick.fraction,
                strobe: tick.strobe,
                at: Utc::now(),
            }],
            Some(CountdownSignal::Expired) => self.assign_outcome(now_ms),
            None => Vec::new(),
        }
    }

    /// Countdown expired: freeze the contact set, assign, start the reveal.
    fn assign_outcome(&mut self, now_ms: u64) -> Vec<Event> {
        self.transition(SessionState::Assigning);
        self.clear_glow();

        let mode = self.session.mode;
        let ids = self.session.contacts.ids();
        let Some(outcome) = assign::assign(mode, &ids, &mut self.rng) else {
            debug!("nothing to assign");
            let resting = self.resting_state();
            self.transition(resting);
            return Vec::new();
        };
        info!(%mode, contacts = ids.len(), "outcome assigned");
        self.apply_outcome(&outcome);

        let units = reveal::plan(
            &outcome,
            &self.session.contacts,
            &self.config.surface.surface(),
            self.config.surface.contact_radius,
        );
        let mut events = vec![Event::OutcomeAssigned {
            mode,
            outcome: outcome.clone(),
            at: Utc::now(),
        }];
        self.session.outcome = Some(outcome);

        self.transition(SessionState::Revealing);
        let signals = self.session.sequencer.start(units, now_ms);
        events.extend(self.apply_signals(signals));
        self.update_reveal_glow(now_ms);
        events
    }

    fn apply_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Winner { .. } => {}
            Outcome::Ranking { order } => {
                for (i, id) in order.iter().enumerate() {
                    if let Some(contact) = self.session.contacts.get_mut(*id) {
                        contact.rank = Some(i + 1);
                    }
                }
            }
            Outcome::Teams { teams, .. } => {
                for team in teams {
                    for id in &team.members {
                        if let Some(contact) = self.session.contacts.get_mut(*id) {
                            contact.team = Some(team.index);
                            contact.color = team.color;
                        }
                    }
                }
            }
        }
    }

    fn tick_reveal(&mut self, now_ms: u64) -> Vec<Event> {
        let signals = self.session.sequencer.frame(now_ms);
        let events = self.apply_signals(signals);
        self.update_reveal_glow(now_ms);
        events
    }

    fn apply_signals(&mut self, signals: Vec<SequencerSignal>) -> Vec<Event> {
        let mut events = Vec::with_capacity(signals.len());
        for signal in signals {
            match signal {
                SequencerSignal::UnitStarted(unit_index) => {
                    self.set_unit_glow(unit_index, Glow {
                        active: true,
                        progress: 0.0,
                    });
                    self.feedback.fire(Cue::OutcomeRevealed);
                    events.push(Event::UnitStarted {
                        unit_index,
                        at: Utc::now(),
                    });
                }
                SequencerSignal::UnitRevealed(unit_index) => {
                    let members = self
                        .session
                        .sequencer
                        .unit(unit_index)
                        .map(RevealUnit::members)
                        .unwrap_or_default();
                    for id in members {
                        if let Some(contact) = self.session.contacts.get_mut(id) {
                            contact.glow = Glow::default();
                            contact.revealed = true;
                        }
                    }
                    events.push(Event::UnitRevealed {
                        unit_index,
                        at: Utc::now(),
                    });
                }
                SequencerSignal::AllRevealed => {
                    self.transition(SessionState::Done);
                    info!("all units revealed");
                    events.push(Event::AllRevealed { at: Utc::now() });
                }
            }
        }
        events
    }

    /// Push the active unit's eased progress into its members' glow.
    fn update_reveal_glow(&mut self, now_ms: u64) {
        if let Some(frame) = self.session.sequencer.current_frame(now_ms) {
            self.set_unit_glow(frame.unit_index, Glow {
                active: true,
                progress: frame.progress,
            });
        }
    }

    fn set_unit_glow(&mut self, unit_index: usize, glow: Glow) {
        let members = self
            .session
            .sequencer
            .unit(unit_index)
            .map(RevealUnit::members)
            .unwrap_or_default();
        for id in members {
            if let Some(contact) = self.session.contacts.get_mut(id) {
                if !contact.revealed {
                    contact.glow = glow;
                }
            }
        }
    }

    fn clear_glow(&mut self) {
        for contact in self.session.contacts.iter_mut() {
            contact.glow = Glow::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(id: u32) -> InputEvent {
        InputEvent::Down {
            id: ContactId(id),
            x: 100.0 * id as f32,
            y: 200.0,
        }
    }

    fn kinds(events: &[Event]) -> Vec<&'static str> {
        events.iter().map(Event::kind).collect()
    }

    #[test]
    fn starts_idle() {
        let m = SelectionStateMachine::with_seed(Config::default(), 1);
        assert_eq!(m.state(), SessionState::Idle);
        assert!(m.session().is_pristine());
    }

    #[test]
    fn below_quorum_waits() {
        let mut m = SelectionStateMachine::with_seed(Config::for_mode(Mode::Ordering), 1);
        let events = m.handle_input(down(1), 0);
        assert_eq!(kinds(&events), vec!["ContactAdded"]);
        assert_eq!(m.state(), SessionState::AwaitingQuorum);
    }

    #[test]
    fn quorum_arms_countdown() {
        let mut m = SelectionStateMachine::with_seed(Config::for_mode(Mode::Ordering), 1);
        m.handle_input(down(1), 0);
        let events = m.handle_input(down(2), 10);
        assert_eq!(
            kinds(&events),
            vec!["ContactAdded", "QuorumReached", "CountdownArmed"]
        );
        assert_eq!(m.state(), SessionState::Counting);
        assert_eq!(m.session().deadline_ms(), Some(3_010));
    }

    #[test]
    fn duplicate_down_is_ignored() {
        let mut m = SelectionStateMachine::with_seed(Config::default(), 1);
        m.handle_input(down(1), 0);
        assert!(m.handle_input(down(1), 5).is_empty());
        assert_eq!(m.contacts().len(), 1);
    }

    #[test]
    fn unknown_up_is_ignored() {
        let mut m = SelectionStateMachine::with_seed(Config::default(), 1);
        assert!(m.handle_input(InputEvent::Up { id: ContactId(9) }, 0).is_empty());
        assert_eq!(m.state(), SessionState::Idle);
    }

    #[test]
    fn new_contact_while_counting_restarts_countdown() {
        let mut m = SelectionStateMachine::with_seed(Config::for_mode(Mode::Ordering), 1);
        m.step([down(1), down(2)], 0);
        let events = m.handle_input(down(3), 2_000);
        assert_eq!(kinds(&events), vec!["ContactAdded", "CountdownArmed"]);
        assert_eq!(m.session().deadline_ms(), Some(5_000));
    }

    #[test]
    fn move_does_not_restart_countdown() {
        let mut m = SelectionStateMachine::with_seed(Config::for_mode(Mode::Ordering), 1);
        m.step([down(1), down(2)], 0);
        let events = m.handle_input(
            InputEvent::Move {
                id: ContactId(1),
                x: 5.0,
                y: 6.0,
            },
            1_000,
        );
        assert!(events.is_empty());
        assert_eq!(m.session().deadline_ms(), Some(3_000));
        assert_eq!(m.contact(ContactId(1)).unwrap().position.x, 5.0);
    }

    #[test]
    fn losing_last_contact_returns_to_idle() {
        let mut m = SelectionStateMachine::with_seed(Config::default(), 1);
        m.handle_input(down(1), 0);
        assert_eq!(m.state(), SessionState::Counting);
        let events = m.handle_input(InputEvent::Cancel { id: ContactId(1) }, 100);
        assert_eq!(kinds(&events), vec!["ContactRemoved", "CountdownCancelled"]);
        assert_eq!(m.state(), SessionState::Idle);
    }

    #[test]
    fn countdown_glow_follows_strobe() {
        let mut m = SelectionStateMachine::with_seed(Config::for_mode(Mode::Ordering), 1);
        m.step([down(1), down(2)], 0);
        m.tick_at(500);
        let glow = m.contact(ContactId(1)).unwrap().glow;
        assert!(glow.active);
        assert!(glow.progress > 0.0);
    }

    #[test]
    fn team_count_change_rearms_with_new_quorum() {
        let mut m = SelectionStateMachine::with_seed(Config::for_mode(Mode::teams(2)), 1);
        m.step([down(1), down(2)], 0);
        assert_eq!(m.state(), SessionState::Counting);

        let events = m.set_team_count(3, 100);
        assert_eq!(kinds(&events), vec!["CountdownCancelled"]);
        assert_eq!(m.state(), SessionState::AwaitingQuorum);
        assert_eq!(m.contacts().len(), 2);

        let events = m.handle_input(down(3), 200);
        assert!(kinds(&events).contains(&"QuorumReached"));
    }

    #[test]
    fn set_team_count_outside_teams_mode_is_remembered() {
        let mut m = SelectionStateMachine::with_seed(Config::for_mode(Mode::Ordering), 1);
        assert!(m.set_team_count(9, 0).is_empty());
        assert_eq!(m.config().session.team_count, 4);
        assert_eq!(m.mode(), Mode::Ordering);
    }

    #[test]
    fn switching_to_teams_neutralizes_colors() {
        let mut m = SelectionStateMachine::with_seed(Config::default(), 1);
        m.handle_input(down(1), 0);
        m.set_mode(Mode::teams(2), 10);
        assert_eq!(
            m.contact(ContactId(1)).unwrap().color,
            crate::contact::Color::NEUTRAL
        );
        assert_eq!(m.state(), SessionState::AwaitingQuorum);
    }

    #[test]
    fn lifting_everyone_still_needs_a_reset() {
        let mut m = SelectionStateMachine::with_seed(Config::default(), 1);
        m.handle_input(down(1), 0);
        m.handle_input(InputEvent::Up { id: ContactId(1) }, 10);
        assert_eq!(m.state(), SessionState::Idle);
        assert!(!m.session().is_pristine());

        assert_eq!(kinds(&m.reset()), vec!["SessionReset"]);
        assert!(m.session().is_pristine());
        assert!(m.reset().is_empty());
    }

    #[test]
    fn snapshot_reports_countdown() {
        let mut m = SelectionStateMachine::with_seed(Config::default(), 1);
        m.handle_input(down(1), 0);
        match m.snapshot(1_500) {
            Event::StateSnapshot {
                state,
                contacts,
                quorum,
                seconds_remaining,
                ..
            } => {
                assert_eq!(state, SessionState::Counting);
                assert_eq!(contacts, 1);
                assert_eq!(quorum, 1);
                assert_eq!(seconds_remaining, Some(2));
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
