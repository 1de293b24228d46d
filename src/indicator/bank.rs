use serde::Deserialize;

use super::bollinger::{bollinger, BollingerBands, DEFAULT_BOLLINGER_K, DEFAULT_BOLLINGER_PERIOD};
use super::rsi::{rsi, DEFAULT_RSI_PERIOD};
use super::sma::sma;
use super::window::RollingWindow;

/// Window lengths and periods for the per-instrument indicators.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_period: usize,
    pub smoothing_window: usize,
    pub history_len: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_period: 9,
            smoothing_window: 5,
            history_len: 100,
            rsi_period: DEFAULT_RSI_PERIOD,
            bollinger_period: DEFAULT_BOLLINGER_PERIOD,
            bollinger_k: DEFAULT_BOLLINGER_K,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorSnapshot {
    pub sma: Option<f64>,
    pub sma_of_sma: Option<f64>,
    pub rsi: Option<f64>,
    pub bollinger: Option<BollingerBands>,
}

/// Raw, smoothed and long-history windows for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorBank {
    cfg: IndicatorConfig,
    prices: RollingWindow<f64>,
    smoothed: RollingWindow<f64>,
    history: RollingWindow<f64>,
}

impl IndicatorBank {
    pub fn new(cfg: IndicatorConfig) -> Self {
        let history_len = cfg
            .history_len
            .max(cfg.rsi_period + 1)
            .max(cfg.bollinger_period);
        Self {
            prices: RollingWindow::new(cfg.sma_period),
            smoothed: RollingWindow::new(cfg.smoothing_window),
            history: RollingWindow::new(history_len),
            cfg,
        }
    }

    /// Record a price and recompute every indicator.
    ///
    /// Each fresh SMA is also pushed into the smoothed window, which is the
    /// series pattern detection runs on.
    pub fn push(&mut self, price: f64) -> IndicatorSnapshot {
        self.prices.push(price);
        self.history.push(price);

        let sma_value = sma(&self.prices.values(), self.cfg.sma_period);
        if let Some(v) = sma_value {
            self.smoothed.push(v);
        }
        let sma_of_sma = sma(&self.smoothed.values(), self.cfg.smoothing_window);

        let history = self.history.values();
        IndicatorSnapshot {
            sma: sma_value,
            sma_of_sma,
            rsi: rsi(&history, self.cfg.rsi_period),
            bollinger: bollinger(&history, self.cfg.bollinger_period, self.cfg.bollinger_k),
        }
    }

    pub fn raw_is_full(&self) -> bool {
        self.prices.is_full()
    }

    pub fn prices(&self) -> &RollingWindow<f64> {
        &self.prices
    }

    pub fn smoothed(&self) -> &RollingWindow<f64> {
        &self.smoothed
    }

    pub fn history(&self) -> &RollingWindow<f64> {
        &self.history
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.cfg
    }
}
