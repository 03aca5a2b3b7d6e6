mod engine;
mod strobe;

pub use engine::{
    CountdownController, CountdownSignal, CountdownState, CountdownTick, DEFAULT_STROBE_PERIOD,
    DEFAULT_TICK_INTERVAL_MS,
};
pub use strobe::StrobePhase;
