//! # Axis Calibration
//!
//! Flattens small trackpad readings around center to exactly zero so that
//! sensor jitter at rest produces bit-identical snapshots (and therefore no
//! axis events). Values outside the deadzone are rescaled to keep the full
//! `-1.0..=1.0` range.
//!
//! A zero deadzone is the identity, which leaves axis suppression at exact
//! equality.
//!
//! ## Usage
//!
//! ```
//! use daydream_controls::controller::calibration::Deadzone;
//!
//! let dz = Deadzone::new(0.05);
//!
//! // Jitter near center
//! assert_eq!(dz.apply(0.02), 0.0);
//!
//! // Full deflection preserved
//! assert!((dz.apply(1.0) - 1.0).abs() < 0.001);
//! ```

/// Largest accepted deadzone fraction.
pub const MAX_DEADZONE: f32 = 0.25;

/// Per-axis deadzone for normalized axis values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Deadzone {
    /// Deadzone as a fraction (0.0 to 0.25).
    threshold: f32,
}

impl Deadzone {
    /// Creates a deadzone. Values outside `0.0..=0.25` are clamped.
    ///
    /// # Examples
    ///
    /// ```
    /// use daydream_controls::controller::calibration::Deadzone;
    ///
    /// assert_eq!(Deadzone::new(0.5).threshold(), 0.25);
    /// assert_eq!(Deadzone::new(-1.0).threshold(), 0.0);
    /// ```
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.clamp(0.0, MAX_DEADZONE)
        } else {
            0.0
        };
        Self { threshold }
    }

    /// The identity deadzone.
    #[must_use]
    pub fn none() -> Self {
        Self { threshold: 0.0 }
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Applies the deadzone to a normalized value (-1.0 to 1.0).
    ///
    /// Inputs are passed through untouched when the threshold is zero, so
    /// non-finite readings are not masked.
    #[must_use]
    pub fn apply(&self, input: f32) -> f32 {
        if self.threshold == 0.0 {
            return input;
        }

        let abs_input = input.abs();
        if abs_input <= self.threshold {
            0.0
        } else {
            let scaled = (abs_input - self.threshold) / (1.0 - self.threshold);
            input.signum() * scaled.min(1.0)
        }
    }
}
