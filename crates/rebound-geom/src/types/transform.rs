// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use rebound_math::{Mat3, Vec3};

/// Rigid transform: rotation followed by translation.
///
/// Conventions:
/// - `translation` in metres.
/// - `rotation` is an orthonormal column-major matrix; its transpose is its
///   inverse.
/// - `apply_point(p) = R·p + t`.
///
/// Shapes store one of these as their pose relative to the owning body and
/// compose it with the body pose to obtain their world pose.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Mat3,
}

impl Transform {
    /// Identity transform (no translation, no rotation).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
        }
    }

    /// Creates a transform from components.
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Mat3) -> Self {
        Self { translation, rotation }
    }

    /// Pure translation.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Mat3::IDENTITY)
    }

    /// Translation component.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation component.
    #[must_use]
    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    /// Replaces the translation.
    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    /// Maps a local point into the parent frame.
    #[must_use]
    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }

    /// Maps a local direction into the parent frame (no translation).
    #[must_use]
    pub fn apply_direction(&self, d: Vec3) -> Vec3 {
        self.rotation * d
    }

    /// Maps a parent-frame point back into the local frame.
    #[must_use]
    pub fn inverse_apply_point(&self, p: Vec3) -> Vec3 {
        self.rotation.transpose_mul_vec(p - self.translation)
    }

    /// Composition `self ∘ local`: first `local`, then `self`.
    #[must_use]
    pub fn compose(&self, local: &Self) -> Self {
        Self {
            translation: self.apply_point(local.translation),
            rotation: self.rotation * local.rotation,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
