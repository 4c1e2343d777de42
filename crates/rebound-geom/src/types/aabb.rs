// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use rebound_math::{Mat3, Vec3};

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Values are `f32` metres in world space. Infinite bounds are allowed
///   (planes are unbounded along every axis their normal does not isolate).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// # Panics
    /// Panics if any component of `min` is greater than its counterpart in `max`.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        assert!(
            min.x() <= max.x() && min.y() <= max.y() && min.z() <= max.z(),
            "invalid AABB: min > max"
        );
        Self { min, max }
    }

    /// Box spanning every point of space.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            min: Vec3::splat(f32::NEG_INFINITY),
            max: Vec3::splat(f32::INFINITY),
        }
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Builds an AABB centered at `center` with half-extents `hx, hy, hz`.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, hx: f32, hy: f32, hz: f32) -> Self {
        let he = Vec3::new(hx.abs(), hy.abs(), hz.abs());
        Self { min: center - he, max: center + he }
    }

    /// Tight bound of a box with half-extents `half` rotated by `rot` about
    /// `center`: the world half-extent along each axis is `|R| · half`.
    #[must_use]
    pub fn from_oriented_box(center: Vec3, rot: &Mat3, half: Vec3) -> Self {
        let he = Vec3::new(
            rot.row(0).abs().dot(&half.abs()),
            rot.row(1).abs().dot(&half.abs()),
            rot.row(2).abs().dot(&half.abs()),
        );
        Self { min: center - he, max: center + he }
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        // Inclusive to treat touching faces as overlap for broad-phase pairing.
        !(self.max.x() < other.min.x()
            || self.min.x() > other.max.x()
            || self.max.y() < other.min.y()
            || self.min.y() > other.max.y()
            || self.max.z() < other.min.z()
            || self.min.z() > other.max.z())
    }

    /// Returns `true` if `p` lies inside or on the box.
    #[must_use]
    pub fn contains_point(&self, p: Vec3) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    /// Returns the union of two AABBs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    /// Inflates the box by a uniform margin `m` in all directions.
    #[must_use]
    pub fn inflate(&self, m: f32) -> Self {
        let delta = Vec3::splat(m);
        Self { min: self.min - delta, max: self.max + delta }
    }

    /// Builds the minimal AABB that contains all `points`, or `None` if the
    /// slice is empty.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(mi, ma), p| (mi.min(p), ma.max(p)));
        Some(Self { min, max })
    }
}
