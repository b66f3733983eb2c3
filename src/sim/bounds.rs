//! World-space bounding boxes
//!
//! Entities carry a local box centred on their origin. The world box is the
//! axis-aligned hull of the eight local corners after rotation (X, then Z,
//! then Y, in degrees) and translation.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of the given half-extents centred on `center`
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Transform a local box by rotation (degrees) and translation
    pub fn from_local(half: Vec3, rotation_deg: Vec3, translation: Vec3) -> Self {
        let transform = model_matrix(rotation_deg, translation);
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 4 == 0 { -half.x } else { half.x },
                if i & 2 == 0 { -half.y } else { half.y },
                if i & 1 == 0 { -half.z } else { half.z },
            );
            let p = transform.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    /// Inclusive overlap on all three axes
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Rotation applied X first, then Z, then Y, followed by translation
pub fn model_matrix(rotation_deg: Vec3, translation: Vec3) -> Mat4 {
    Mat4::from_translation(translation)
        * Mat4::from_rotation_y(rotation_deg.y.to_radians())
        * Mat4::from_rotation_z(rotation_deg.z.to_radians())
        * Mat4::from_rotation_x(rotation_deg.x.to_radians())
}

/// Squared-distance circle overlap on the XZ plane
#[inline]
pub fn circles_overlap_xz(a: Vec3, ra: f32, b: Vec3, rb: f32) -> bool {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    let r = ra + rb;
    dx * dx + dz * dz <= r * r
}
