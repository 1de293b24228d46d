pub mod confidence_gate;
pub mod cross;
pub mod pattern;
pub mod signal_engine;

pub use confidence_gate::{ConfidenceGate, ConfidenceInterval};
pub use cross::{
    Confirmation, ConfirmationRules, CrossPair, CrossPhase, CrossState, CrossStep, CrossTracker,
    PendingReason,
};
pub use pattern::PatternDetector;
pub use signal_engine::{
    EngineAction, EngineConfig, InstrumentState, SignalEngine, TickOutcome, TickReport,
};
