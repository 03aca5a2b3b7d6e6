use std::f32::consts::TAU;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use fingerdraw_core::{
    ContactId, Event, Feedback, FeedbackError, InputEvent, ModeKind, SelectionStateMachine,
    SessionState,
};
use tracing::{info, warn};

/// Hard stop for the virtual clock, so a misconfigured run cannot spin forever.
const MAX_SIMULATED_MS: u64 = 10 * 60 * 1000;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    SinglePick,
    Ordering,
    Teams,
}

impl From<ModeArg> for ModeKind {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::SinglePick => ModeKind::SinglePick,
            ModeArg::Ordering => ModeKind::Ordering,
            ModeArg::Teams => ModeKind::Teams,
        }
    }
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Selection mode (defaults to the configured one)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Number of simulated fingers
    #[arg(long, default_value = "3")]
    contacts: u32,
    /// Team count for teams mode (clamped to 2..=4)
    #[arg(long)]
    teams: Option<u8>,
    /// Random seed; omit for a random outcome
    #[arg(long)]
    seed: Option<u64>,
    /// Virtual frame interval in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u64,
    /// Override the countdown duration in milliseconds
    #[arg(long)]
    countdown_ms: Option<u64>,
    /// Lift this many fingers halfway through the countdown
    #[arg(long, default_value = "0")]
    lift: u32,
    /// Also print countdown ticks
    #[arg(long)]
    ticks: bool,
    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Pretty-print events
    #[arg(long)]
    pretty: bool,
}

/// Feedback that only logs, standing in for audio/haptics.
struct LogFeedback;

impl Feedback for LogFeedback {
    fn on_countdown_armed(&mut self) -> Result<(), FeedbackError> {
        info!("feedback: countdown build-up");
        Ok(())
    }

    fn on_outcome_revealed(&mut self) -> Result<(), FeedbackError> {
        info!("feedback: reveal note");
        Ok(())
    }

    fn on_reset(&mut self) -> Result<(), FeedbackError> {
        info!("feedback: stop");
        Ok(())
    }

    fn on_countdown_cancelled(&mut self) -> Result<(), FeedbackError> {
        info!("feedback: countdown cancelled");
        Ok(())
    }
}

/// Fingers spread on a circle around the surface center.
fn finger_positions(count: u32, width: f32, height: f32) -> Vec<InputEvent> {
    let center = (width / 2.0, height / 2.0);
    let radius = width.min(height) * 0.35;
    (0..count)
        .map(|i| {
            let angle = TAU * i as f32 / count.max(1) as f32;
            InputEvent::Down {
                id: ContactId(i),
                x: center.0 + radius * angle.cos(),
                y: center.1 + radius * angle.sin(),
            }
        })
        .collect()
}

fn print_event(event: &Event, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", event.to_json(pretty)?);
    Ok(())
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.frame_ms == 0 {
        return Err("--frame-ms must be greater than zero".into());
    }

    let mut config = super::config::load(args.config.as_ref())?;
    if let Some(mode) = args.mode {
        config.session.mode = mode.into();
    }
    if let Some(teams) = args.teams {
        config.session.team_count = teams;
    }
    if let Some(countdown_ms) = args.countdown_ms {
        config.session.countdown_ms = countdown_ms;
    }

    let surface = config.surface.surface();
    let machine = match args.seed {
        Some(seed) => SelectionStateMachine::with_seed(config, seed),
        None => SelectionStateMachine::new(config),
    };
    let mut machine = machine.with_feedback(Box::new(LogFeedback));
    info!(mode = %machine.mode(), contacts = args.contacts, "simulation started");

    let print = |event: &Event| -> Result<(), Box<dyn std::error::Error>> {
        if matches!(event, Event::CountdownTick { .. }) && !args.ticks {
            return Ok(());
        }
        print_event(event, args.pretty)
    };

    let mut now = 0;
    for event in machine.step(
        finger_positions(args.contacts, surface.width, surface.height),
        now,
    ) {
        print(&event)?;
    }

    let lift_at = machine.session().deadline_ms().map(|deadline| deadline / 2);
    let mut lifted = args.lift == 0 || lift_at.is_none();

    while machine.state() != SessionState::Done && now < MAX_SIMULATED_MS {
        let running = matches!(
            machine.state(),
            SessionState::Counting | SessionState::Revealing
        );
        if !running {
            break;
        }
        now += args.frame_ms;

        let mut inputs = Vec::new();
        if !lifted && lift_at.is_some_and(|at| now >= at) {
            let held = machine.contacts().ids();
            inputs.extend(
                held.into_iter()
                    .rev()
                    .take(args.lift as usize)
                    .map(|id| InputEvent::Up { id }),
            );
            lifted = true;
        }
        for event in machine.step(inputs, now) {
            print(&event)?;
        }
    }

    if machine.state() != SessionState::Done {
        warn!(state = ?machine.state(), "session did not finish");
    }
    print_event(&machine.snapshot(now), args.pretty)?;
    Ok(())
}
