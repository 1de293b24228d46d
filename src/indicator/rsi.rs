//! Relative Strength Index over a trailing price window.
//!
//! Averages the positive and negative deltas across the last `period + 1`
//! prices: RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! avg_loss == 0 gives exactly 100, so a flat or rising window never divides
//! by zero.

pub const DEFAULT_RSI_PERIOD: usize = 14;

pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }
    let tail = &values[values.len() - (period + 1)..];

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for pair in tail.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum -= delta;
        }
    }
    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss <= 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}
