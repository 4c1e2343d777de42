// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON scene description and the built-in demo scene.

use anyhow::{anyhow, Context, Result};
use rebound_core::{
    BodyDesc, CollisionFilter, JointDesc, JointKind, Material, ShapeDesc, ShapeKind, World,
    WorldConfig,
};
use rebound_math::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A whole scene: world configuration plus its contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// World configuration; missing fields take their defaults.
    pub config: WorldConfig,
    /// Bodies in insertion order.
    pub bodies: Vec<BodySpec>,
    /// Joints, added after every body exists.
    pub joints: Vec<JointSpec>,
}

/// A body and the shapes attached to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodySpec {
    /// Body fields, inlined.
    #[serde(flatten)]
    pub desc: BodyDesc,
    /// Attached shapes.
    #[serde(default)]
    pub shapes: Vec<ShapeSpec>,
}

/// A shape; `type` selects the kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeSpec {
    /// Geometry, tagged by `type`.
    #[serde(flatten)]
    pub kind: ShapeKind,
    /// Offset from the body origin.
    #[serde(default)]
    pub offset: Vec3,
    /// Surface and density.
    #[serde(default)]
    pub material: Material,
    /// Collision groups.
    #[serde(default)]
    pub filter: CollisionFilter,
}

/// Joint between two bodies named in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointSpec {
    /// Name of the first body.
    pub body1: String,
    /// Name of the second body.
    pub body2: String,
    /// Joint type, tagged by `type`.
    #[serde(flatten)]
    pub kind: JointKind,
    /// Anchor on the first body.
    #[serde(default)]
    pub anchor1: Vec3,
    /// Anchor on the second body.
    #[serde(default)]
    pub anchor2: Vec3,
    /// Keep collisions between the joined bodies.
    #[serde(default)]
    pub allow_collision: bool,
    /// Optional joint name.
    #[serde(default)]
    pub name: Option<String>,
}

impl ShapeSpec {
    fn to_desc(&self) -> ShapeDesc {
        ShapeDesc::new(self.kind)
            .with_material(self.material)
            .with_filter(self.filter)
            .with_offset(self.offset)
    }
}

impl Scene {
    /// Parses a scene from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parse scene json")
    }

    /// Builds a world from `config` holding this scene's contents.
    pub fn build(&self, config: WorldConfig) -> Result<World> {
        let mut world = World::new(config).context("create world")?;
        for spec in &self.bodies {
            let body = world.add_body(spec.desc.clone())?;
            for shape in &spec.shapes {
                world.add_shape(body, shape.to_desc())?;
            }
        }
        for joint in &self.joints {
            let resolve = |name: &str| {
                world
                    .body_by_name(name)
                    .ok_or_else(|| anyhow!("joint references unknown body `{name}`"))
            };
            let body1 = resolve(&joint.body1)?;
            let body2 = resolve(&joint.body2)?;
            let mut desc = JointDesc {
                kind: joint.kind,
                ..JointDesc::ball(body1, body2)
            }
            .with_anchors(joint.anchor1, joint.anchor2)
            .with_collision(joint.allow_collision);
            if let Some(name) = &joint.name {
                desc = desc.with_name(name.clone());
            }
            world.add_joint(desc)?;
        }
        info!(
            bodies = world.num_bodies(),
            shapes = world.num_shapes(),
            joints = world.num_joints(),
            "scene built"
        );
        Ok(world)
    }
}

fn body(desc: BodyDesc, shapes: Vec<ShapeSpec>) -> BodySpec {
    BodySpec { desc, shapes }
}

fn shape(kind: ShapeKind) -> ShapeSpec {
    ShapeSpec {
        kind,
        offset: Vec3::ZERO,
        material: Material::default(),
        filter: CollisionFilter::default(),
    }
}

/// Ground plane, a pyramid of boxes, a few mixed shapes dropped beside it
/// and a chain of spheres hung from a fixed anchor.
#[allow(clippy::cast_precision_loss)]
pub fn demo() -> Scene {
    let mut bodies = vec![body(
        BodyDesc::fixed().with_name("ground"),
        vec![shape(ShapeKind::Plane { normal: Vec3::UNIT_Y })],
    )];

    let unit_box = ShapeKind::Box { half_extents: Vec3::splat(0.5) };
    let rows = 5;
    for row in 0..rows {
        for col in 0..rows - row {
            let x = (col as f32 - (rows - row - 1) as f32 * 0.5) * 1.05;
            let y = 0.5 + row as f32 * 1.01;
            bodies.push(body(BodyDesc::dynamic().with_position(Vec3::new(x, y, 0.0)), vec![shape(unit_box)]));
        }
    }

    let tilted = Quat::from_axis_angle(Vec3::new(1.0, 0.0, 1.0), 0.6);
    bodies.push(body(
        BodyDesc::dynamic().with_position(Vec3::new(5.0, 4.0, 0.0)),
        vec![shape(ShapeKind::Sphere { radius: 0.6 })],
    ));
    bodies.push(body(
        BodyDesc::dynamic()
            .with_position(Vec3::new(5.2, 6.0, 0.2))
            .with_orientation(tilted),
        vec![shape(ShapeKind::Cylinder { radius: 0.5, half_height: 0.5 })],
    ));
    bodies.push(body(
        BodyDesc::dynamic().with_position(Vec3::new(4.8, 8.0, -0.1)),
        vec![shape(ShapeKind::Tetra {
            vertices: [
                Vec3::new(-0.5, -0.25, -0.5),
                Vec3::new(0.5, -0.25, -0.5),
                Vec3::new(0.0, -0.25, 0.5),
                Vec3::new(0.0, 0.75, 0.0),
            ],
        })],
    ));

    bodies.push(body(
        BodyDesc::fixed()
            .with_name("hook")
            .with_position(Vec3::new(-6.0, 8.0, 0.0)),
        Vec::new(),
    ));
    let mut joints = Vec::new();
    let mut previous = "hook".to_owned();
    for link in 0..4 {
        let name = format!("link-{link}");
        bodies.push(body(
            BodyDesc::dynamic()
                .with_name(name.clone())
                .with_position(Vec3::new(-6.0 + (link as f32 + 1.0), 8.0, 0.0)),
            vec![shape(ShapeKind::Sphere { radius: 0.3 })],
        ));
        joints.push(JointSpec {
            body1: previous.clone(),
            body2: name.clone(),
            kind: JointKind::Ball,
            anchor1: Vec3::new(0.5, 0.0, 0.0),
            anchor2: Vec3::new(-0.5, 0.0, 0.0),
            allow_collision: false,
            name: None,
        });
        previous = name;
    }

    Scene {
        config: WorldConfig::default(),
        bodies,
        joints,
    }
}
