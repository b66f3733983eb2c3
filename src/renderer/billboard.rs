//! Billboard instance data
//!
//! The simulation never touches the GPU. Particle emitters fill a
//! `BillboardBatch` that the external renderer uploads as instance buffers,
//! one per blend mode.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Camera supplied by the host each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 80.0, 40.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl Camera {
    /// Right and up axes of a camera-facing quad
    pub fn billboard_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let right = if right == Vec3::ZERO { Vec3::X } else { right };
        let up = right.cross(forward).normalize_or_zero();
        (right, up)
    }
}

/// How a billboard is composited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Smoke
    Alpha,
    /// Fire, sparks, glow
    Additive,
}

/// One camera-facing quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BillboardInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub right: [f32; 3],
    /// Rotation around the view axis (degrees)
    pub rotation: f32,
    pub up: [f32; 3],
    pub _pad: f32,
    pub color: [f32; 4],
}

impl BillboardInstance {
    pub fn new(camera_axes: (Vec3, Vec3), position: Vec3, size: f32, rotation: f32, color: [u8; 4]) -> Self {
        let (right, up) = camera_axes;
        Self {
            position: position.to_array(),
            size,
            right: right.to_array(),
            rotation,
            up: up.to_array(),
            _pad: 0.0,
            color: color.map(|c| c as f32 / 255.0),
        }
    }
}

/// Billboards for one frame, grouped by blend mode
#[derive(Debug, Clone, Default)]
pub struct BillboardBatch {
    pub alpha: Vec<BillboardInstance>,
    pub additive: Vec<BillboardInstance>,
}

impl BillboardBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, blend: BlendMode, instance: BillboardInstance) {
        match blend {
            BlendMode::Alpha => self.alpha.push(instance),
            BlendMode::Additive => self.additive.push(instance),
        }
    }

    pub fn len(&self) -> usize {
        self.alpha.len() + self.additive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.alpha.clear();
        self.additive.clear();
    }

    /// Raw bytes of a group, ready for an instance buffer upload
    pub fn bytes(&self, blend: BlendMode) -> &[u8] {
        match blend {
            BlendMode::Alpha => bytemuck::cast_slice(&self.alpha),
            BlendMode::Additive => bytemuck::cast_slice(&self.additive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_face_camera() {
        let camera = Camera::default();
        let (right, up) = camera.billboard_axes();
        let forward = (camera.target - camera.position).normalize();
        assert!(right.dot(forward).abs() < 1e-5);
        assert!(up.dot(forward).abs() < 1e-5);
        assert!((right.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_up_falls_back() {
        let camera = Camera {
            position: Vec3::new(0.0, 10.0, 0.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        };
        let (right, _) = camera.billboard_axes();
        assert_eq!(right, Vec3::X);
    }

    #[test]
    fn test_batch_groups_and_bytes() {
        let axes = Camera::default().billboard_axes();
        let mut batch = BillboardBatch::new();
        batch.push(BlendMode::Alpha, BillboardInstance::new(axes, Vec3::ZERO, 1.0, 0.0, [255; 4]));
        batch.push(BlendMode::Additive, BillboardInstance::new(axes, Vec3::ONE, 2.0, 0.0, [0, 0, 0, 255]));
        batch.push(BlendMode::Additive, BillboardInstance::new(axes, Vec3::ONE, 2.0, 0.0, [0, 0, 0, 255]));
        assert_eq!(batch.alpha.len(), 1);
        assert_eq!(batch.additive.len(), 2);
        assert_eq!(
            batch.bytes(BlendMode::Additive).len(),
            2 * std::mem::size_of::<BillboardInstance>()
        );
        assert_eq!(batch.alpha[0].color, [1.0; 4]);
    }
}
