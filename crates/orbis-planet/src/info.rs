//! Planet metadata published alongside the generated mesh.

use glam::Vec3;
use orbis_terrain::PlanetDescriptor;
use serde::{Deserialize, Serialize};

/// World-space facts about a generated planet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetInfo {
    /// Planet center in world space.
    pub center: Vec3,
    /// Base radius before terrain displacement.
    pub radius: f32,
    /// Edge length of the sampled volume.
    pub world_size: f32,
    /// Suggested spawn point, above the highest possible terrain on the +Y pole.
    pub spawn_position: Vec3,
}

impl PlanetInfo {
    /// Spawn direction from the center.
    pub const UP: Vec3 = Vec3::Y;

    /// Derive the metadata for a descriptor.
    pub fn from_descriptor(descriptor: &PlanetDescriptor) -> Self {
        let clearance =
            descriptor.radius + descriptor.terrain_height_scale + descriptor.spawn_margin;
        Self {
            center: descriptor.world_center,
            radius: descriptor.radius,
            world_size: descriptor.world_size,
            spawn_position: descriptor.world_center + Self::UP * clearance,
        }
    }

    /// Local up direction at a world-space point. At the center itself this is [`Self::UP`].
    pub fn up_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).try_normalize().unwrap_or(Self::UP)
    }

    /// Height of a world-space point above the base sphere. Negative below it.
    pub fn altitude_of(&self, point: Vec3) -> f32 {
        point.distance(self.center) - self.radius
    }
}
