//! Math utilities and types
//!
//! Provides the vector types used by the scene model and the [`Transform`]
//! that every entity owns. Rotations are stored as Euler angles in degrees
//! because that is what editor widgets display and edit; quaternions are only
//! used internally when composing transforms.

pub use nalgebra::{Unit, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Transform representing position, rotation (Euler degrees) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation as Euler angles in degrees (x, y, z)
    pub rotation: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from all three components
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Rotation as a unit quaternion
    pub fn to_quat(&self) -> Quat {
        euler_degrees_to_quat(self.rotation)
    }

    /// Compose a child transform expressed in this transform's space.
    ///
    /// The result is the child's transform in the space this transform lives
    /// in. Scale is applied component-wise, so shear from non-uniform parent
    /// scale combined with child rotation is not represented.
    pub fn combine(&self, child: &Transform) -> Transform {
        let rotation = self.to_quat();
        Transform {
            position: self.position + rotation * self.scale.component_mul(&child.position),
            rotation: quat_to_euler_degrees(&(rotation * child.to_quat())),
            scale: self.scale.component_mul(&child.scale),
        }
    }

    /// Express `self` (a transform in some space) relative to `parent`.
    ///
    /// Exact inverse of [`Transform::combine`]:
    /// `parent.combine(&world.relative_to(&parent)) == world`.
    pub fn relative_to(&self, parent: &Transform) -> Transform {
        let parent_rotation_inv = parent.to_quat().inverse();
        let local_position = parent_rotation_inv * (self.position - parent.position);
        Transform {
            position: safe_component_div(&local_position, &parent.scale),
            rotation: quat_to_euler_degrees(&(parent_rotation_inv * self.to_quat())),
            scale: safe_component_div(&self.scale, &parent.scale),
        }
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.to_quat() * self.scale.component_mul(&point)
    }
}

/// Convert Euler angles in degrees to a quaternion.
///
/// Angles are applied as roll about X, pitch about Y, then yaw about Z.
pub fn euler_degrees_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler_angles(
        utils::deg_to_rad(degrees.x),
        utils::deg_to_rad(degrees.y),
        utils::deg_to_rad(degrees.z),
    )
}

/// Convert a quaternion back to Euler angles in degrees
pub fn quat_to_euler_degrees(rotation: &Quat) -> Vec3 {
    let (roll, pitch, yaw) = rotation.euler_angles();
    Vec3::new(
        utils::rad_to_deg(roll),
        utils::rad_to_deg(pitch),
        utils::rad_to_deg(yaw),
    )
}

// A zero-scale axis cannot be inverted; the numerator passes through.
fn safe_component_div(value: &Vec3, divisor: &Vec3) -> Vec3 {
    Vec3::from_fn(|i, _| {
        if divisor[i].abs() <= f32::EPSILON {
            value[i]
        } else {
            value[i] / divisor[i]
        }
    })
}

/// Value accepted by the position/rotation/scale setters.
///
/// Editor widgets commonly edit two axes at a time, so a two-component value
/// replaces X and Y and leaves Z untouched, while a three-component value
/// replaces all three.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axes {
    /// Replace X and Y only
    Two(Vec2),
    /// Replace all three axes
    Three(Vec3),
}

impl Axes {
    /// Merge this value into `current`
    pub fn apply(self, current: Vec3) -> Vec3 {
        match self {
            Self::Two(v) => Vec3::new(v.x, v.y, current.z),
            Self::Three(v) => v,
        }
    }
}

impl From<Vec2> for Axes {
    fn from(v: Vec2) -> Self {
        Self::Two(v)
    }
}

impl From<Vec3> for Axes {
    fn from(v: Vec3) -> Self {
        Self::Three(v)
    }
}

impl From<[f32; 2]> for Axes {
    fn from(v: [f32; 2]) -> Self {
        Self::Two(Vec2::new(v[0], v[1]))
    }
}

impl From<[f32; 3]> for Axes {
    fn from(v: [f32; 3]) -> Self {
        Self::Three(Vec3::new(v[0], v[1], v[2]))
    }
}

impl From<(f32, f32)> for Axes {
    fn from((x, y): (f32, f32)) -> Self {
        Self::Two(Vec2::new(x, y))
    }
}

impl From<(f32, f32, f32)> for Axes {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::Three(Vec3::new(x, y, z))
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_transform_identity() {
        let transform = Transform::identity();

        assert_eq!(transform.position, Vec3::zeros());
        assert_eq!(transform.rotation, Vec3::zeros());
        assert_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_combine_translates_rotates_and_scales() {
        let parent = Transform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 90.0),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let child = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

        let combined = parent.combine(&child);

        // (1,0,0) scaled by 2, rotated 90 degrees about Z -> (0,2,0), then offset by (1,0,0)
        assert_relative_eq!(combined.position, Vec3::new(1.0, 2.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(combined.rotation, Vec3::new(0.0, 0.0, 90.0), epsilon = EPSILON);
        assert_relative_eq!(combined.scale, Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_relative_to_inverts_combine() {
        let parent = Transform::new(
            Vec3::new(2.0, -1.0, 4.0),
            Vec3::new(10.0, 30.0, -20.0),
            Vec3::new(1.5, 1.5, 1.5),
        );
        let world = Transform::new(
            Vec3::new(-3.0, 5.0, 1.0),
            Vec3::new(0.0, 45.0, 15.0),
            Vec3::new(3.0, 1.5, 0.75),
        );

        let local = world.relative_to(&parent);
        let back = parent.combine(&local);

        assert_relative_eq!(back.position, world.position, epsilon = EPSILON);
        assert_relative_eq!(back.scale, world.scale, epsilon = EPSILON);
        let dot = back.to_quat().coords.dot(&world.to_quat().coords);
        assert!(dot.abs() > 0.9999, "rotation mismatch: dot = {dot}");
    }

    #[test]
    fn test_relative_to_zero_scale_parent_passes_through() {
        let parent = Transform::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(0.0, 1.0, 1.0));
        let world = Transform::from_position(Vec3::new(4.0, 2.0, 0.0));

        let local = world.relative_to(&parent);

        assert_relative_eq!(local.position, Vec3::new(4.0, 2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_axes_two_components_keep_depth() {
        let current = Vec3::new(1.0, 2.0, 3.0);

        assert_eq!(Axes::from((5.0, 6.0)).apply(current), Vec3::new(5.0, 6.0, 3.0));
        assert_eq!(Axes::from([7.0, 8.0]).apply(current), Vec3::new(7.0, 8.0, 3.0));
        assert_eq!(Axes::from((9.0, 9.0, 9.0)).apply(current), Vec3::new(9.0, 9.0, 9.0));
    }

    #[test]
    fn test_euler_round_trip() {
        let degrees = Vec3::new(15.0, -40.0, 75.0);
        let back = quat_to_euler_degrees(&euler_degrees_to_quat(degrees));

        assert_relative_eq!(back, degrees, epsilon = EPSILON);
    }
}
