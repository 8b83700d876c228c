//! Digital signal processing components that must run on the real-time
//! audio thread.

#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod crest_factor;
pub mod envelope_follower;
pub mod math;
pub mod metering;
pub mod processor;
