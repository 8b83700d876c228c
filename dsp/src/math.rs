//! Conversion from the decibel scale to linear amplitude.

use libm::powf;

pub fn decibels_to_linear(decibels: f32) -> f32 {
    powf(10.0, decibels / 20.0)
}
