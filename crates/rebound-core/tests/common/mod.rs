// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code, clippy::unwrap_used)]

use rebound_core::{BodyDesc, BodyHandle, ShapeDesc, ShapeHandle, World, WorldConfig};
use rebound_math::Vec3;

/// World with gravity switched off.
pub fn weightless() -> World {
    World::new(WorldConfig {
        gravity: Vec3::ZERO,
        ..WorldConfig::default()
    })
    .unwrap()
}

/// Static ground plane through the origin facing +Y.
pub fn ground(world: &mut World) -> (BodyHandle, ShapeHandle) {
    let body = world.add_body(BodyDesc::fixed()).unwrap();
    let shape = world.add_shape(body, ShapeDesc::plane(Vec3::UNIT_Y)).unwrap();
    (body, shape)
}

pub fn sphere_body(world: &mut World, at: Vec3, radius: f32) -> (BodyHandle, ShapeHandle) {
    body_with(world, BodyDesc::dynamic().with_position(at), ShapeDesc::sphere(radius))
}

pub fn body_with(world: &mut World, desc: BodyDesc, shape: ShapeDesc) -> (BodyHandle, ShapeHandle) {
    let body = world.add_body(desc).unwrap();
    let shape = world.add_shape(body, shape).unwrap();
    (body, shape)
}

pub fn run(world: &mut World, steps: usize) {
    for _ in 0..steps {
        world.step();
    }
}

pub fn position(world: &World, body: BodyHandle) -> Vec3 {
    world.body(body).unwrap().position()
}
