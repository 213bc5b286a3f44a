//! Sweep angles in hundredths of a degree
//!
//! Angles are kept as integers so a 0.01 degree step never drifts.

use serde::{Serialize, Serializer};
use std::fmt;

/// Hundredths of a degree in a full turn
pub const FULL_TURN: u32 = 36_000;

/// Widest sweep window; anything wider would never leave the window
pub const MAX_WINDOW: u32 = FULL_TURN / 2 - 1;

/// Rotation angle in `[0, 360)` degrees, stored as hundredths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Angle(u32);

impl Angle {
    pub const ZERO: Angle = Angle(0);

    /// Build an angle, wrapping into `[0, 360)`
    pub fn from_hundredths(hundredths: u32) -> Self {
        Angle(hundredths % FULL_TURN)
    }

    pub fn hundredths(self) -> u32 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!("{}.{:02}", self.0 / 100, self.0 % 100);
        f.pad(&text)
    }
}

impl Serialize for Angle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.degrees())
    }
}

/// Downward sweep from `+window` through 0 into the top of the turn,
/// ending once the angle leaves `[360 - window, window]`.
///
/// Positions are tracked as signed offsets from 0 so a coarse step cannot
/// jump over the exit and lap the turn.
#[derive(Debug, Clone)]
pub struct AngleSweep {
    offset: i64,
    floor: i64,
    step: i64,
}

impl AngleSweep {
    /// `window` and `step` are in hundredths; `step` is at least 1
    pub fn new(window: u32, step: u32) -> Self {
        let window = i64::from(window.min(MAX_WINDOW));
        Self {
            offset: window,
            floor: -window,
            step: i64::from(step.max(1)),
        }
    }
}

impl Iterator for AngleSweep {
    type Item = Angle;

    fn next(&mut self) -> Option<Angle> {
        if self.offset < self.floor {
            return None;
        }

        let current = self.offset.rem_euclid(i64::from(FULL_TURN));
        self.offset -= self.step;
        Some(Angle(current as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Angle::from_hundredths(100).to_string(), "1.00");
        assert_eq!(Angle::from_hundredths(5).to_string(), "0.05");
        assert_eq!(Angle::from_hundredths(35_999).to_string(), "359.99");
        assert_eq!(format!("{:>8}", Angle::ZERO), "    0.00");
    }

    #[test]
    fn test_from_hundredths_wraps() {
        assert_eq!(Angle::from_hundredths(36_000), Angle::ZERO);
        assert_eq!(Angle::from_hundredths(36_100).hundredths(), 100);
    }

    #[test]
    fn test_degrees_roundtrip() {
        assert_eq!(Angle::from_hundredths(35_900).degrees(), 359.0);
    }

    // TC-SWP-001: Default window visits 201 angles
    #[test]
    fn test_default_sweep_sequence() {
        let angles: Vec<u32> = AngleSweep::new(100, 1).map(Angle::hundredths).collect();

        assert_eq!(angles.len(), 201);
        assert_eq!(angles[0], 100);
        assert_eq!(angles[100], 0);
        assert_eq!(angles[101], 35_999);
        assert_eq!(*angles.last().unwrap(), 35_900);
        assert!(!angles.contains(&35_899));
        assert!(!angles.contains(&101));
    }

    #[test]
    fn test_sweep_is_strictly_decreasing_within_arcs() {
        let angles: Vec<u32> = AngleSweep::new(100, 1).map(Angle::hundredths).collect();
        assert!(angles[..=100].windows(2).all(|w| w[0] == w[1] + 1));
        assert!(angles[101..].windows(2).all(|w| w[0] == w[1] + 1));
    }

    #[test]
    fn test_zero_window_visits_only_zero() {
        let angles: Vec<Angle> = AngleSweep::new(0, 1).collect();
        assert_eq!(angles, vec![Angle::ZERO]);
    }

    #[test]
    fn test_coarse_step() {
        let angles: Vec<u32> = AngleSweep::new(100, 10).map(Angle::hundredths).collect();
        assert_eq!(angles.len(), 21);
        assert_eq!(angles[10], 0);
        assert_eq!(angles[11], 35_990);
        assert_eq!(*angles.last().unwrap(), 35_900);
    }

    #[test]
    fn test_oversized_window_terminates() {
        let count = AngleSweep::new(FULL_TURN, 100).count();
        assert_eq!(count, 360);
    }

    #[test]
    fn test_zero_step_is_promoted() {
        assert_eq!(AngleSweep::new(2, 0).count(), 5);
    }
}
