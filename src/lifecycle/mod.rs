pub mod engine;
pub mod exit_orchestrator;

pub use engine::{ExitContext, ExitRules, ExitTrigger, OpenTrade};
pub use exit_orchestrator::ExitOrchestrator;
