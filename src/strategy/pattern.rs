use crate::model::signal::{Direction, PatternSignal};

pub const PATTERN_LEN: usize = 5;

/// Zig-zag reversal classifier over the last five smoothed values.
///
/// With v0..v4 oldest to newest:
/// - up: v1 is a trough below v0 and v2, v0 > v2, v3 > v2, v4 > v0
/// - down: the mirror image
///
/// The anchor is v2.
pub struct PatternDetector;

impl PatternDetector {
    pub fn detect(values: &[f64]) -> Option<PatternSignal> {
        if values.len() < PATTERN_LEN {
            return None;
        }
        let v = &values[values.len() - PATTERN_LEN..];
        let (v0, v1, v2, v3, v4) = (v[0], v[1], v[2], v[3], v[4]);

        let direction = if v1 < v0 && v1 < v2 && v0 > v2 && v3 > v2 && v4 > v0 {
            Direction::Up
        } else if v1 > v0 && v1 > v2 && v0 < v2 && v3 < v2 && v4 < v0 {
            Direction::Down
        } else {
            return None;
        };

        Some(PatternSignal {
            direction,
            anchor: v2,
        })
    }
}
