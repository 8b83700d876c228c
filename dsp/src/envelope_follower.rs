//! Asymmetric smoothing of a control signal.
//!
//! Two one-pole stages in series. The first stage holds onto rises
//! instantly and lets go of them with the release coefficient, the second
//! stage drags the already peak-held signal with the attack coefficient.
//! Rising gain-reduction demand is therefore never missed, while the attack
//! time still shapes the perceived onset.

use libm::{expf, fabsf};

#[derive(Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnvelopeFollower {
    sample_rate: f32,
    attack_coefficient: f32,
    release_coefficient: f32,
    peak: f32,
    output: f32,
}

impl EnvelopeFollower {
    #[must_use]
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            attack_coefficient: 0.0,
            release_coefficient: 0.0,
            peak: 0.0,
            output: 0.0,
        }
    }

    /// Recompute smoothing coefficients from attack and release times given
    /// in milliseconds. Cheap enough to be called before every block.
    pub fn set_coefficients(&mut self, attack: f32, release: f32) {
        self.attack_coefficient = expf(-1000.0 / (attack * self.sample_rate));
        self.release_coefficient = expf(-1000.0 / (release * self.sample_rate));
    }

    pub fn tick(&mut self, x: f32) -> f32 {
        let x_abs = fabsf(x);
        self.peak = f32::max(
            x_abs,
            self.release_coefficient * self.peak + (1.0 - self.release_coefficient) * x_abs,
        );
        self.output =
            self.attack_coefficient * self.output + (1.0 - self.attack_coefficient) * self.peak;
        self.output
    }

    pub fn reset(&mut self) {
        self.peak = 0.0;
        self.output = 0.0;
    }
}
