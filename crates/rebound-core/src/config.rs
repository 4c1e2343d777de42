// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World configuration.
//!
//! Every tuned constant the simulation uses lives here with its default
//! value, so a world is fully described by its `WorldConfig` plus the bodies,
//! shapes and joints added to it.

use rebound_math::{Lcg, Vec3};
use thiserror::Error;

/// Which broad phase a world builds for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BroadPhaseKind {
    /// All-pairs `O(n²)` baseline.
    BruteForce,
    /// Single-axis sweep-and-prune.
    #[default]
    SweepAndPrune,
}

/// Sequential-impulse solver constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Allowed penetration before position correction kicks in (metres).
    pub slop: f32,
    /// Fraction of the penetration error corrected per step.
    pub bias_factor: f32,
    /// Closing speeds below this never bounce (m/s).
    pub restitution_threshold: f32,
    /// Squared length below which the projected tangent is re-derived.
    pub tangent_degeneracy_sq: f32,
    /// Fraction of joint position error corrected per step.
    pub joint_bias_factor: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            slop: 0.005,
            bias_factor: 0.05,
            restitution_threshold: 1.0,
            tangent_degeneracy_sq: 0.04,
            joint_bias_factor: 0.2,
        }
    }
}

/// Contact manifold matching constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContactConfig {
    /// Squared local-frame distance under which a new point is the same
    /// point as a previous one.
    pub match_threshold_sq: f32,
    /// Matched distance under which a contact counts as `close`.
    pub close_threshold: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            match_threshold_sq: 0.0004,
            close_threshold: 0.001,
        }
    }
}

/// Sleep thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SleepConfig {
    /// Squared linear speed at or below which a body may sleep.
    pub linear_threshold_sq: f32,
    /// Squared angular speed at or below which a body may sleep.
    pub angular_threshold_sq: f32,
    /// Seconds of continuous eligibility before an island sleeps.
    pub time_to_sleep: f32,
    /// Velocity or pose drift beyond this wakes a sleeping body.
    pub wake_tolerance: f32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            linear_threshold_sq: 0.04,
            angular_threshold_sq: 0.25,
            time_to_sleep: 0.5,
            wake_tolerance: 1e-6,
        }
    }
}

/// Top-level world configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Fixed step length in seconds.
    pub time_step: f32,
    /// Solver sweeps per island per step.
    pub iterations: u32,
    /// World gravity (m/s²).
    pub gravity: Vec3,
    /// Shuffle island constraints before solving.
    pub enable_randomizer: bool,
    /// Seed of the shuffle generator.
    pub random_seed: u32,
    /// Broad phase built by [`crate::World::new`].
    pub broad_phase: BroadPhaseKind,
    /// Margin added around every shape AABB (metres).
    pub aabb_margin: f32,
    /// Solver constants.
    pub solver: SolverConfig,
    /// Manifold matching constants.
    pub contact: ContactConfig,
    /// Sleep thresholds.
    pub sleep: SleepConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            iterations: 16,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            enable_randomizer: true,
            random_seed: Lcg::DEFAULT_SEED,
            broad_phase: BroadPhaseKind::default(),
            aabb_margin: 0.005,
            solver: SolverConfig::default(),
            contact: ContactConfig::default(),
            sleep: SleepConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Checks the values a world cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(ConfigError::InvalidTimeStep(self.time_step));
        }
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity);
        }
        if !(self.aabb_margin.is_finite() && self.aabb_margin >= 0.0) {
            return Err(ConfigError::InvalidMargin(self.aabb_margin));
        }
        Ok(())
    }
}

/// Configuration values a world refuses.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Time step must be finite and positive.
    #[error("time step must be finite and > 0, got {0}")]
    InvalidTimeStep(f32),
    /// At least one solver iteration is required.
    #[error("solver iterations must be >= 1")]
    ZeroIterations,
    /// Gravity must be finite.
    #[error("gravity must be finite")]
    NonFiniteGravity,
    /// AABB margin must be finite and non-negative.
    #[error("aabb margin must be finite and >= 0, got {0}")]
    InvalidMargin(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_time_step_and_iterations() {
        let cfg = WorldConfig { time_step: 0.0, ..WorldConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidTimeStep(0.0)));
        let cfg = WorldConfig { iterations: 0, ..WorldConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroIterations));
        let cfg = WorldConfig {
            gravity: Vec3::new(0.0, f32::NAN, 0.0),
            ..WorldConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NonFiniteGravity));
    }
}
