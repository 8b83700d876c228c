//! Peak activity readings for the surrounding diagnostics layers.

use libm::fabsf;

#[derive(Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Meter {
    peak_crest_factor: f32,
    peak_gain_adjustment: f32,
}

/// Peaks observed between two readings.
#[derive(Default, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Highest crest factor driving the detector.
    pub crest_factor: f32,
    /// Largest applied gain adjustment in decibels, sign preserved.
    pub gain_reduction: f32,
}

impl Meter {
    pub fn observe(&mut self, crest_factor: f32, gain_adjustment: f32) {
        if crest_factor > self.peak_crest_factor {
            self.peak_crest_factor = crest_factor;
        }
        if fabsf(gain_adjustment) > fabsf(self.peak_gain_adjustment) {
            self.peak_gain_adjustment = gain_adjustment;
        }
    }

    /// Hand out the peaks observed since the last reading and start over.
    pub fn take(&mut self) -> Reading {
        let reading = Reading {
            crest_factor: self.peak_crest_factor,
            gain_reduction: self.peak_gain_adjustment,
        };
        self.peak_crest_factor = 0.0;
        self.peak_gain_adjustment = 0.0;
        reading
    }
}
