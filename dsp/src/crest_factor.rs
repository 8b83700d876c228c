//! Crest factor estimation of the incoming signal.
//!
//! The crest factor is the ratio between the momentary peak amplitude and
//! the RMS amplitude. Transient-heavy material scores high, dense material
//! approaches 1.

use libm::{expf, sqrtf};

/// Time constant in seconds of the underlying statistics tracking.
const TIME_CONSTANT: f32 = 0.1;

// Floor of the RMS divisor, so prolonged silence reads as crest factor 0
// instead of a division by zero.
const MIN_RMS_SQUARED: f32 = 1.0e-12;

#[derive(Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CrestFactor {
    sample_rate: f32,
    coefficient: f32,
    peak_squared: f32,
    rms_squared: f32,
}

impl CrestFactor {
    #[must_use]
    pub fn new(sample_rate: f32) -> Self {
        let mut crest_factor = Self {
            sample_rate,
            coefficient: 0.0,
            peak_squared: 0.0,
            rms_squared: 0.0,
        };
        crest_factor.set_time_constant(TIME_CONSTANT);
        crest_factor
    }

    /// Set the smoothing time constant in seconds. This tracks signal
    /// statistics, not gain, and is intentionally slower than typical
    /// attack times.
    pub fn set_time_constant(&mut self, time: f32) {
        self.coefficient = expf(-1.0 / (self.sample_rate * time));
    }

    pub fn tick(&mut self, x: f32) -> f32 {
        let x_squared = x * x;
        let input_factor = (1.0 - self.coefficient) * x_squared;

        self.peak_squared = f32::max(
            x_squared,
            self.coefficient * self.peak_squared + input_factor,
        );
        self.rms_squared = self.coefficient * self.rms_squared + input_factor;

        sqrtf(self.peak_squared / f32::max(self.rms_squared, MIN_RMS_SQUARED))
    }

    pub fn reset(&mut self) {
        self.peak_squared = 0.0;
        self.rms_squared = 0.0;
    }
}
