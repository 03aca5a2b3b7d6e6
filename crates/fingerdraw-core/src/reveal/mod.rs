mod sequencer;
mod unit;

pub use sequencer::{AnimationSequencer, RevealFrame, SequencerSignal, SequencerState};
pub use unit::{ease_in_out, plan, RevealUnit, Segment, Surface};
