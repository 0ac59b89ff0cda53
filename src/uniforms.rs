//! Per-effect render parameters.
//!
//! Instead of writing into shared materials, each effect exposes the values
//! its shader needs as a read-only [`EffectUniforms`] block plus the
//! [`GroupTransform`] its mesh is drawn with. The render collaborator reads
//! both once per frame.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

/// Shader parameters shared by the water effects.
///
/// Not every effect uses every field; unused fields stay at their defaults.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct EffectUniforms {
    /// Camera orientation for billboarded particles.
    pub camera_billboard: Quat,
    /// Water surface height, used to clip particles below the surface.
    pub water_surface_pos: f32,
    /// Animation clock in seconds.
    pub time: f32,
    /// Effect-wide opacity.
    pub opacity: f32,
    /// Pads the block to a 16-byte multiple.
    pub _pad: f32,
}

impl Default for EffectUniforms {
    fn default() -> Self {
        Self {
            camera_billboard: Quat::IDENTITY,
            water_surface_pos: 0.0,
            time: 0.0,
            opacity: 1.0,
            _pad: 0.0,
        }
    }
}

impl EffectUniforms {
    /// Raw bytes for a uniform buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Transform of the group an effect's particles are positioned in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub visible: bool,
}

impl Default for GroupTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            visible: true,
        }
    }
}

impl GroupTransform {
    /// World-space group at the origin.
    pub const WORLD: GroupTransform = GroupTransform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        visible: true,
    };

    /// Map a group-local point to world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_is_16_byte_multiple() {
        assert_eq!(std::mem::size_of::<EffectUniforms>() % 16, 0);
        assert_eq!(EffectUniforms::default().as_bytes().len(), 32);
    }

    #[test]
    fn test_group_to_world() {
        let group = GroupTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(std::f32::consts::PI),
            visible: true,
        };
        let world = group.to_world(Vec3::X);
        assert!((world - Vec3::new(0.0, 2.0, 3.0)).length() < 1e-5);
    }
}
