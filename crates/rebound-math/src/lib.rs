// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Math kernel for the rebound physics engine.
//!
//! Covers scalar utilities, 3-vectors, column-major 3×3 matrices,
//! quaternions, and the linear-congruential generator the solver uses to
//! shuffle constraint order.
//!
//! Every operation is value-returning (`&self -> Self`); nothing mutates a
//! shared scratch temporary, so an operand can never alias the accumulator.
#![forbid(unsafe_code)]

use std::f32::consts::TAU;

mod mat3;
mod prng;
mod quat;
mod vec3;

pub use mat3::Mat3;
pub use prng::Lcg;
pub use quat::Quat;
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Clamps `value` to the inclusive `[min, max]` range.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    debug_assert!(min <= max, "invalid clamp range: {min} > {max}");
    value.max(min).min(max)
}

/// Converts degrees to radians with float32 precision.
pub fn deg_to_rad(value: f32) -> f32 {
    value * (TAU / 360.0)
}

/// Converts radians to degrees with float32 precision.
pub fn rad_to_deg(value: f32) -> f32 {
    value * (360.0 / TAU)
}
