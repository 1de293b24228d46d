use serde::Deserialize;

use crate::indicator::sma::{mean, sample_std_dev};
use crate::indicator::student_t::two_sided_critical;

/// Band around the mean of post-cross prices that the live price must sit in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub std_dev: f64,
    pub std_err: f64,
    pub df: usize,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower && price <= self.upper
    }

    /// Half-width on the upper side.
    pub fn margin_of_error(&self) -> f64 {
        self.upper - self.mean
    }
}

/// Student-t gate with independent confidences for each side of the band.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfidenceGate {
    Symmetric { confidence: f64 },
    Asymmetric { lower: f64, upper: f64 },
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        ConfidenceGate::Symmetric { confidence: 0.95 }
    }
}

impl ConfidenceGate {
    pub fn asymmetric_default() -> Self {
        ConfidenceGate::Asymmetric {
            lower: 0.95,
            upper: 0.9999,
        }
    }

    pub fn confidences(&self) -> (f64, f64) {
        match *self {
            ConfidenceGate::Symmetric { confidence } => (confidence, confidence),
            ConfidenceGate::Asymmetric { lower, upper } => (lower, upper),
        }
    }

    /// Interval for the mean of `samples`; `None` below two samples.
    pub fn interval(&self, samples: &[f64]) -> Option<ConfidenceInterval> {
        let mean = mean(samples)?;
        let std_dev = sample_std_dev(samples)?;
        let n = samples.len();
        let df = n - 1;
        let std_err = std_dev / (n as f64).sqrt();

        let (lower_conf, upper_conf) = self.confidences();
        let t_lower = two_sided_critical(lower_conf, df as f64)?;
        let t_upper = two_sided_critical(upper_conf, df as f64)?;

        Some(ConfidenceInterval {
            mean,
            std_dev,
            std_err,
            df,
            lower: mean - t_lower * std_err,
            upper: mean + t_upper * std_err,
        })
    }

    pub fn admits(&self, samples: &[f64], price: f64) -> bool {
        self.interval(samples)
            .map(|ci| ci.contains(price))
            .unwrap_or(false)
    }
}
