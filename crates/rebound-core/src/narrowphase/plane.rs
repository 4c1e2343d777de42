// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use super::polytope::{reduce_to_four, Polytope};
use crate::contact::manifold::ManifoldWriter;
use crate::shape::Shape;

/// Box, cylinder or tetrahedron against a half-space: every polytope vertex
/// below the plane is a candidate, reduced to four spread-out points.
pub(crate) fn convex_plane(convex: &Shape, plane: &Shape, out: &mut ManifoldWriter<'_>) {
    let (Some(poly), Some(n)) = (Polytope::from_shape(convex), plane.plane_normal()) else {
        return;
    };
    let origin = plane.position();
    let mut points: Vec<_> = poly
        .vertices()
        .iter()
        .filter_map(|&v| {
            let d = (v - origin).dot(&n);
            (d < 0.0).then(|| (v - n.scale(d * 0.5), d))
        })
        .collect();
    reduce_to_four(&mut points, n);
    let normal = -n;
    for (p, depth) in points {
        out.add_point(p, normal, depth);
    }
}
