// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Narrow phase: per shape-type-pair contact generation.
//!
//! Each detector is a plain function taking its two shapes in a fixed type
//! order. The [`DetectorTable`] maps every ordered type pair onto one of
//! those functions plus a flip flag; flipped entries swap the arguments and
//! the [`ManifoldWriter`] negates the normals back.

mod closest;
mod plane;
mod polytope;
mod sphere;

pub use polytope::CYLINDER_SEGMENTS;

use crate::contact::manifold::ManifoldWriter;
use crate::shape::{Shape, ShapeType};

/// Contact generator for a pair of shapes.
pub type DetectFn = fn(&Shape, &Shape, &mut ManifoldWriter<'_>);

/// A detector function with its argument order.
#[derive(Clone, Copy)]
pub struct Detector {
    func: DetectFn,
    flip: bool,
}

impl core::fmt::Debug for Detector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Detector").field("flip", &self.flip).finish_non_exhaustive()
    }
}

impl Detector {
    /// Whether the underlying function expects `(shape2, shape1)`.
    pub fn flip(&self) -> bool {
        self.flip
    }

    /// Runs the detector on `(shape1, shape2)`; `out` must have been created
    /// with the same flip flag.
    pub fn detect(&self, shape1: &Shape, shape2: &Shape, out: &mut ManifoldWriter<'_>) {
        debug_assert_eq!(out.is_flipped(), self.flip);
        if self.flip {
            (self.func)(shape2, shape1, out);
        } else {
            (self.func)(shape1, shape2, out);
        }
    }
}

/// Detector lookup indexed by `(type1, type2)`.
#[derive(Debug, Clone)]
pub struct DetectorTable {
    cells: [[Option<Detector>; ShapeType::COUNT]; ShapeType::COUNT],
}

impl Default for DetectorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorTable {
    /// Table with every supported pair registered.
    ///
    /// Plane–plane and particle–particle have no detector.
    pub fn new() -> Self {
        use ShapeType::{Box, Cylinder, Particle, Plane, Sphere, Tetra};
        let mut table = Self { cells: [[None; ShapeType::COUNT]; ShapeType::COUNT] };
        table.register(Sphere, Sphere, sphere::sphere_sphere);
        table.register(Sphere, Particle, sphere::sphere_sphere);
        for round in [Sphere, Particle] {
            table.register(round, Box, sphere::sphere_box);
            table.register(round, Cylinder, sphere::sphere_cylinder);
            table.register(round, Plane, sphere::sphere_plane);
            table.register(round, Tetra, sphere::sphere_tetra);
        }
        for convex in [Box, Cylinder, Tetra] {
            table.register(convex, Plane, plane::convex_plane);
        }
        table.register(Box, Box, polytope::polytope_polytope);
        table.register(Box, Cylinder, polytope::polytope_polytope);
        table.register(Box, Tetra, polytope::polytope_polytope);
        table.register(Cylinder, Cylinder, polytope::polytope_polytope);
        table.register(Cylinder, Tetra, polytope::polytope_polytope);
        table.register(Tetra, Tetra, polytope::polytope_polytope);
        table
    }

    /// Registers `func` for `(a, b)` and its flipped twin for `(b, a)`.
    pub fn register(&mut self, a: ShapeType, b: ShapeType, func: DetectFn) {
        self.cells[a.index()][b.index()] = Some(Detector { func, flip: false });
        if a != b {
            self.cells[b.index()][a.index()] = Some(Detector { func, flip: true });
        }
    }

    /// Detector for the ordered pair, if any.
    pub fn get(&self, a: ShapeType, b: ShapeType) -> Option<Detector> {
        self.cells[a.index()][b.index()]
    }
}
