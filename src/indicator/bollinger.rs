use super::sma::{mean, population_std_dev};

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_K: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub mid: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    Above,
    Inside,
    Below,
}

impl BollingerBands {
    /// Where `price` sits; touching a band counts as inside.
    pub fn position(&self, price: f64) -> BandPosition {
        if price > self.upper {
            BandPosition::Above
        } else if price < self.lower {
            BandPosition::Below
        } else {
            BandPosition::Inside
        }
    }
}

/// Mean +/- k population standard deviations over the last `period` values.
pub fn bollinger(values: &[f64], period: usize, k: f64) -> Option<BollingerBands> {
    if period == 0 || values.len() < period {
        return None;
    }
    let tail = &values[values.len() - period..];
    let mid = mean(tail)?;
    let sigma = population_std_dev(tail)?;
    Some(BollingerBands {
        upper: mid + k * sigma,
        mid,
        lower: mid - k * sigma,
    })
}
