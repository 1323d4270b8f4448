//! Picking camera
//!
//! Only what picking needs from the active view: turning a normalized pointer
//! position into a world-space ray. Camera basis: right = +X, up = +Y,
//! forward = +Z, all rotated by the camera's Euler rotation.

use crate::foundation::math::{euler_degrees_to_quat, utils, Vec3};
use crate::physics::Ray;
use serde::{Deserialize, Serialize};

/// Projection used to build picking rays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Rays fan out from the camera position
    Perspective {
        /// Vertical field of view in degrees
        fov_y_degrees: f32,
    },
    /// Parallel rays; `height` is the visible world height
    Orthographic {
        /// Visible world-space height of the view
        height: f32,
    },
}

/// Active view used for picking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Euler rotation in degrees
    pub rotation: Vec3,
    /// Projection model
    pub projection: Projection,
    /// Viewport width / height
    pub aspect: f32,
}

impl Camera {
    /// Perspective camera at `position` looking down +Z
    pub fn perspective(position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation: Vec3::zeros(),
            projection: Projection::Perspective { fov_y_degrees },
            aspect,
        }
    }

    /// Orthographic camera at `position` looking down +Z
    pub fn orthographic(position: Vec3, height: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation: Vec3::zeros(),
            projection: Projection::Orthographic { height },
            aspect,
        }
    }

    /// Build the world-space ray through a point in normalized device
    /// coordinates (x right, y up, both in [-1, 1])
    pub fn screen_to_world_ray(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let rotation = euler_degrees_to_quat(self.rotation);
        let forward = rotation * Vec3::new(0.0, 0.0, 1.0);

        match self.projection {
            Projection::Perspective { fov_y_degrees } => {
                let tan_half_fovy = (utils::deg_to_rad(fov_y_degrees) * 0.5).tan();
                let local_direction = Vec3::new(
                    ndc_x * tan_half_fovy * self.aspect,
                    ndc_y * tan_half_fovy,
                    1.0,
                );
                Ray::new(self.position, rotation * local_direction)
            }
            Projection::Orthographic { height } => {
                let half_height = height * 0.5;
                let local_offset = Vec3::new(
                    ndc_x * half_height * self.aspect,
                    ndc_y * half_height,
                    0.0,
                );
                Ray::new(self.position + rotation * local_offset, forward)
            }
        }
    }
}

impl Default for Camera {
    /// Perspective camera 20 units behind the origin
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 0.0, -20.0), 40.0, 16.0 / 9.0)
    }
}
