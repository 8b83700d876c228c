//! Main interface for the DSP loop.

use libm::sqrtf;

use crate::crest_factor::CrestFactor;
use crate::envelope_follower::EnvelopeFollower;
use crate::math;
use crate::metering::{Meter, Reading};

/// Crest factors above this value are treated as if they hit it.
pub const CREST_LIMIT: f32 = 50.0;

pub const ATTACK_RANGE: (f32, f32) = (0.01, 200.0);
pub const RELEASE_RANGE: (f32, f32) = (0.01, 200.0);
pub const RATIO_RANGE: (f32, f32) = (-24.0, 24.0);
pub const THRESHOLD_RANGE: (f32, f32) = (0.0, CREST_LIMIT);
pub const MIX_RANGE: (f32, f32) = (0.0, 1.0);
pub const VOLUME_RANGE: (f32, f32) = (-24.0, 24.0);

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Processor {
    left: Channel,
    right: Channel,
    control: Control,
    meter: Meter,
}

/// Snapshot of all control parameters for one processing block.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attributes {
    /// Time in milliseconds the gain adjustment needs to kick in.
    pub attack: f32,
    /// Time in milliseconds the gain adjustment needs to let go.
    pub release: f32,
    /// Strength of the applied gain adjustment. Positive values attenuate
    /// transient material, negative values amplify it.
    pub ratio: f32,
    /// Crest factor above which the processor engages.
    pub threshold: f32,
    /// Dry/wet blend between the input and the processed signal.
    pub mix: f32,
    /// Output volume in decibels.
    pub volume: f32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            attack: 10.0,
            release: 100.0,
            ratio: 0.0,
            threshold: CREST_LIMIT * 0.5,
            mix: 1.0,
            volume: 0.0,
        }
    }
}

/// Per-block constants derived from attributes, shared by both channels.
#[derive(Default, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Control {
    attenuation_factor: f32,
    threshold_normalized: f32,
    direction: f32,
    wet: f32,
    dry: f32,
    volume: f32,
}

/// Detection and smoothing state owned exclusively by one channel.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Channel {
    crest_factor: CrestFactor,
    envelope_follower: EnvelopeFollower,
}

impl Channel {
    fn new(sample_rate: f32) -> Self {
        Self {
            crest_factor: CrestFactor::new(sample_rate),
            envelope_follower: EnvelopeFollower::new(sample_rate),
        }
    }

    fn tick(&mut self, x: f32, control: &Control, meter: &mut Meter) -> f32 {
        let crest = self.crest_factor.tick(x);
        let crest_normalized = f32::min(crest / CREST_LIMIT, 1.0);
        let crest_skewed = sqrtf(crest_normalized);

        let excess = crest_skewed - control.threshold_normalized;
        let attenuation = if excess >= 0.0 {
            excess * control.attenuation_factor
        } else {
            0.0
        };

        let adjustment = control.direction * self.envelope_follower.tick(attenuation);
        meter.observe(crest_skewed * CREST_LIMIT, adjustment);

        let processed = x * math::decibels_to_linear(adjustment);
        control.volume * (control.wet * processed + control.dry * x)
    }

    fn reset(&mut self) {
        self.crest_factor.reset();
        self.envelope_follower.reset();
    }
}

impl Processor {
    /// # Panics
    ///
    /// Sample rate must be positive, otherwise the recursive filters would
    /// be seeded with non-finite coefficients and the initialization will
    /// panic.
    #[allow(clippy::let_and_return)]
    #[must_use]
    pub fn new(sample_rate: f32) -> Self {
        assert!(sample_rate > 0.0);

        let mut uninitialized_processor = Self {
            left: Channel::new(sample_rate),
            right: Channel::new(sample_rate),
            control: Control::default(),
            meter: Meter::default(),
        };

        uninitialized_processor.set_attributes(Attributes::default());
        let processor = uninitialized_processor;

        processor
    }

    /// Take a snapshot of control parameters for the upcoming block.
    ///
    /// Out of range values are clamped to their declared range. Cheap
    /// enough to be called before every block.
    pub fn set_attributes(&mut self, attributes: Attributes) {
        let attack = attributes.attack.clamp(ATTACK_RANGE.0, ATTACK_RANGE.1);
        let release = attributes.release.clamp(RELEASE_RANGE.0, RELEASE_RANGE.1);
        let ratio = attributes.ratio.clamp(RATIO_RANGE.0, RATIO_RANGE.1);
        let threshold = attributes
            .threshold
            .clamp(THRESHOLD_RANGE.0, THRESHOLD_RANGE.1);
        let mix = attributes.mix.clamp(MIX_RANGE.0, MIX_RANGE.1);
        let volume = attributes.volume.clamp(VOLUME_RANGE.0, VOLUME_RANGE.1);

        self.left.envelope_follower.set_coefficients(attack, release);
        self.right
            .envelope_follower
            .set_coefficients(attack, release);

        self.control = Control {
            attenuation_factor: ratio * 4.0,
            threshold_normalized: threshold / CREST_LIMIT,
            direction: if ratio > 0.0 { -1.0 } else { 1.0 },
            wet: mix,
            dry: 1.0 - mix,
            volume: math::decibels_to_linear(volume),
        };
    }

    pub fn process(&mut self, block: &mut [(f32, f32)]) {
        for (left, right) in block.iter_mut() {
            *left = self.left.tick(*left, &self.control, &mut self.meter);
            *right = self.right.tick(*right, &self.control, &mut self.meter);
        }
    }

    /// Hand out the peaks observed since the last reading and start over.
    pub fn take_reading(&mut self) -> Reading {
        self.meter.take()
    }

    /// Zero all filter memory while keeping the current attributes.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
