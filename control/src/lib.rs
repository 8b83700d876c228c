//! Translation of host control values into DSP attributes.
//!
//! The host (plugin shell, automation lane, test harness) deals in
//! normalized 0 to 1 positions. This crate reduces incoming position
//! changes into a cache and cooks a plain attributes snapshot from it
//! before every processing block, keeping the DSP decoupled from any
//! particular parameter storage.

#[cfg(test)]
#[macro_use]
extern crate approx;

#[allow(unused_imports)]
use micromath::F32Ext;

use kresta_dsp::processor::{
    Attributes, ATTACK_RANGE, MIX_RANGE, RATIO_RANGE, RELEASE_RANGE, THRESHOLD_RANGE,
    VOLUME_RANGE,
};

mod taper;

// Steps the cooked values snap to, one notch of the respective control.
const TIME_STEP: f32 = 0.01;
const RATIO_STEP: f32 = 1.0;
const THRESHOLD_STEP: f32 = 1.0;
const MIX_STEP: f32 = 0.05;
const VOLUME_STEP: f32 = 0.1;

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlAction {
    SetAttack(f32),
    SetRelease(f32),
    SetRatio(f32),
    SetThreshold(f32),
    SetMix(f32),
    SetVolume(f32),
}

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DSPReaction {
    pub attack: f32,
    pub release: f32,
    pub ratio: f32,
    pub threshold: f32,
    pub mix: f32,
    pub volume: f32,
}

impl From<DSPReaction> for Attributes {
    fn from(other: DSPReaction) -> Self {
        Attributes {
            attack: other.attack,
            release: other.release,
            ratio: other.ratio,
            threshold: other.threshold,
            mix: other.mix,
            volume: other.volume,
        }
    }
}

#[derive(Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cache {
    pub attack: f32,
    pub release: f32,
    pub ratio: f32,
    pub threshold: f32,
    pub mix: f32,
    pub volume: f32,
}

#[must_use]
pub fn reduce_control_action(action: ControlAction, cache: &mut Cache) -> DSPReaction {
    apply_control_action_in_cache(action, cache);
    cook_dsp_reaction_from_cache(cache)
}

#[must_use]
pub fn cook_dsp_reaction_from_cache(cache: &Cache) -> DSPReaction {
    DSPReaction {
        attack: calculate_attack(cache),
        release: calculate_release(cache),
        ratio: calculate_ratio(cache),
        threshold: calculate_threshold(cache),
        mix: calculate_mix(cache),
        volume: calculate_volume(cache),
    }
}

#[allow(clippy::let_and_return)]
fn calculate_attack(cache: &Cache) -> f32 {
    let attack_curved = taper::square(cache.attack);
    let attack_scaled = attack_curved * (ATTACK_RANGE.1 - ATTACK_RANGE.0) + ATTACK_RANGE.0;
    let attack_stepped = quantize(attack_scaled, TIME_STEP);
    attack_stepped
}

#[allow(clippy::let_and_return)]
fn calculate_release(cache: &Cache) -> f32 {
    let release_curved = taper::square(cache.release);
    let release_scaled = release_curved * (RELEASE_RANGE.1 - RELEASE_RANGE.0) + RELEASE_RANGE.0;
    let release_stepped = quantize(release_scaled, TIME_STEP);
    release_stepped
}

#[allow(clippy::let_and_return)]
fn calculate_ratio(cache: &Cache) -> f32 {
    let ratio_clamped = cache.ratio.clamp(0.0, 1.0);
    let ratio_scaled = ratio_clamped * (RATIO_RANGE.1 - RATIO_RANGE.0) + RATIO_RANGE.0;
    let ratio_stepped = quantize(ratio_scaled, RATIO_STEP);
    ratio_stepped
}

#[allow(clippy::let_and_return)]
fn calculate_threshold(cache: &Cache) -> f32 {
    let threshold_clamped = cache.threshold.clamp(0.0, 1.0);
    let threshold_scaled =
        threshold_clamped * (THRESHOLD_RANGE.1 - THRESHOLD_RANGE.0) + THRESHOLD_RANGE.0;
    let threshold_stepped = quantize(threshold_scaled, THRESHOLD_STEP);
    threshold_stepped
}

#[allow(clippy::let_and_return)]
fn calculate_mix(cache: &Cache) -> f32 {
    let mix_clamped = cache.mix.clamp(0.0, 1.0);
    let mix_scaled = mix_clamped * (MIX_RANGE.1 - MIX_RANGE.0) + MIX_RANGE.0;
    let mix_stepped = quantize(mix_scaled, MIX_STEP);
    mix_stepped
}

#[allow(clippy::let_and_return)]
fn calculate_volume(cache: &Cache) -> f32 {
    let volume_clamped = cache.volume.clamp(0.0, 1.0);
    let volume_scaled = volume_clamped * (VOLUME_RANGE.1 - VOLUME_RANGE.0) + VOLUME_RANGE.0;
    let volume_stepped = quantize(volume_scaled, VOLUME_STEP);
    volume_stepped
}

fn quantize(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

fn apply_control_action_in_cache(action: ControlAction, cache: &mut Cache) {
    #[allow(clippy::enum_glob_use)]
    use ControlAction::*;
    match action {
        SetAttack(x) => {
            cache.attack = x;
        }
        SetRelease(x) => {
            cache.release = x;
        }
        SetRatio(x) => {
            cache.ratio = x;
        }
        SetThreshold(x) => {
            cache.threshold = x;
        }
        SetMix(x) => {
            cache.mix = x;
        }
        SetVolume(x) => {
            cache.volume = x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooking_from_default_cache_yields_lowest_values() {
        let cache = Cache::default();
        let reaction = cook_dsp_reaction_from_cache(&cache);

        assert_relative_eq!(reaction.attack, ATTACK_RANGE.0, epsilon = 0.001);
        assert_relative_eq!(reaction.release, RELEASE_RANGE.0, epsilon = 0.001);
        assert_relative_eq!(reaction.ratio, RATIO_RANGE.0, epsilon = 0.001);
        assert_relative_eq!(reaction.threshold, THRESHOLD_RANGE.0, epsilon = 0.001);
        assert_relative_eq!(reaction.mix, MIX_RANGE.0, epsilon = 0.001);
        assert_relative_eq!(reaction.volume, VOLUME_RANGE.0, epsilon = 0.001);
    }

    #[test]
    fn cooking_from_saturated_cache_yields_highest_values() {
        let cache = Cache {
            attack: 1.0,
            release: 1.0,
            ratio: 1.0,
            threshold: 1.0,
            mix: 1.0,
            volume: 1.0,
        };
        let reaction = cook_dsp_reaction_from_cache(&cache);

        assert_relative_eq!(reaction.attack, ATTACK_RANGE.1, epsilon = 0.001);
        assert_relative_eq!(reaction.release, RELEASE_RANGE.1, epsilon = 0.001);
        assert_relative_eq!(reaction.ratio, RATIO_RANGE.1, epsilon = 0.001);
        assert_relative_eq!(reaction.threshold, THRESHOLD_RANGE.1, epsilon = 0.001);
        assert_relative_eq!(reaction.mix, MIX_RANGE.1, epsilon = 0.001);
        assert_relative_eq!(reaction.volume, VOLUME_RANGE.1, epsilon = 0.001);
    }

    #[test]
    fn positions_beyond_the_travel_are_clamped() {
        let cache = Cache {
            attack: 1.2,
            release: -0.1,
            ratio: 7.0,
            threshold: -3.0,
            mix: 2.0,
            volume: 100.0,
        };
        let reaction = cook_dsp_reaction_from_cache(&cache);

        assert_relative_eq!(reaction.attack, ATTACK_RANGE.1, epsilon = 0.001);
        assert_relative_eq!(reaction.release, RELEASE_RANGE.0, epsilon = 0.001);
        assert_relative_eq!(reaction.ratio, RATIO_RANGE.1, epsilon = 0.001);
        assert_relative_eq!(reaction.threshold, THRESHOLD_RANGE.0, epsilon = 0.001);
        assert_relative_eq!(reaction.mix, MIX_RANGE.1, epsilon = 0.001);
        assert_relative_eq!(reaction.volume, VOLUME_RANGE.1, epsilon = 0.001);
    }

    #[test]
    fn attack_travel_favors_short_times() {
        let cache = Cache {
            attack: 0.5,
            ..Cache::default()
        };
        let reaction = cook_dsp_reaction_from_cache(&cache);

        assert_relative_eq!(reaction.attack, 50.01, epsilon = 0.1);
        assert!(reaction.attack < 0.5 * (ATTACK_RANGE.1 - ATTACK_RANGE.0));
    }

    #[test]
    fn ratio_snaps_to_whole_steps() {
        let cache = Cache {
            ratio: 0.51,
            ..Cache::default()
        };
        let reaction = cook_dsp_reaction_from_cache(&cache);

        assert_relative_eq!(reaction.ratio, 0.0, epsilon = 0.001);
    }

    #[test]
    fn mix_snaps_to_its_step() {
        let cache = Cache {
            mix: 0.49,
            ..Cache::default()
        };
        let reaction = cook_dsp_reaction_from_cache(&cache);

        assert_relative_eq!(reaction.mix, 0.5, epsilon = 0.001);
    }

    #[test]
    fn reduced_action_lands_in_attributes() {
        let mut cache = Cache::default();
        let reaction = reduce_control_action(ControlAction::SetThreshold(0.5), &mut cache);
        let attributes: Attributes = reaction.into();

        assert_relative_eq!(attributes.threshold, 25.0, epsilon = 0.001);
        assert_relative_eq!(attributes.attack, ATTACK_RANGE.0, epsilon = 0.001);
    }
}
