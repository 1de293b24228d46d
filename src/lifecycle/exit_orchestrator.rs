use crate::lifecycle::engine::ExitTrigger;

pub struct ExitOrchestrator;

impl ExitOrchestrator {
    pub fn decide(trigger: ExitTrigger) -> &'static str {
        match trigger {
            ExitTrigger::AdverseMove => "exit.adverse_move",
            ExitTrigger::RsiNeutral => "exit.rsi_neutral",
            ExitTrigger::BollingerReentry => "exit.bollinger_reentry",
            ExitTrigger::SignalReversal => "exit.signal_reversal",
        }
    }
}
