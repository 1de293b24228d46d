use serde::Deserialize;

use crate::indicator::BandPosition;
use crate::model::order::OrderHandle;
use crate::model::signal::TradeIntent;

/// A confirmed intent whose order the executor accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub intent: TradeIntent,
    pub handle: OrderHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    AdverseMove,
    RsiNeutral,
    BollingerReentry,
    SignalReversal,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExitRules {
    /// Close when price moves past the entry price against the position.
    pub adverse_move: bool,
    /// Close when RSI comes back inside `[low, high]` from outside.
    pub rsi_neutral_band: Option<[f64; 2]>,
    /// Close when price comes back inside the Bollinger bands from outside.
    pub bollinger_reentry: bool,
}

impl Default for ExitRules {
    fn default() -> Self {
        Self {
            adverse_move: true,
            rsi_neutral_band: None,
            bollinger_reentry: false,
        }
    }
}

/// Readings for the current tick and the previous processed one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExitContext {
    pub price: f64,
    pub rsi: Option<f64>,
    pub prev_rsi: Option<f64>,
    pub band_position: Option<BandPosition>,
    pub prev_band_position: Option<BandPosition>,
}

impl ExitRules {
    pub fn evaluate(&self, intent: &TradeIntent, ctx: &ExitContext) -> Option<ExitTrigger> {
        if self.adverse_move && intent.side.is_adverse(ctx.price, intent.entry_price) {
            return Some(ExitTrigger::AdverseMove);
        }

        if let Some([low, high]) = self.rsi_neutral_band {
            let neutral = |v: f64| v >= low && v <= high;
            if let (Some(prev), Some(cur)) = (ctx.prev_rsi, ctx.rsi) {
                if !neutral(prev) && neutral(cur) {
                    return Some(ExitTrigger::RsiNeutral);
                }
            }
        }

        if self.bollinger_reentry {
            if let (Some(prev), Some(BandPosition::Inside)) =
                (ctx.prev_band_position, ctx.band_position)
            {
                if prev != BandPosition::Inside {
                    return Some(ExitTrigger::BollingerReentry);
                }
            }
        }

        None
    }
}
