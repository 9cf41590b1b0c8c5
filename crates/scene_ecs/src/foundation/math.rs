//! Math utilities and types
//!
//! Provides the nalgebra aliases used by the transform hierarchy plus the
//! small set of degree-based helpers that the scene code is written against.
//! The scene uses a right-handed, Z-up convention.

pub use nalgebra::{Matrix4, Quaternion, Rotation3, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// Scale applied to 8-bit color channels to map them into `[0, 1]`
    pub const BYTE_TO_FLOAT: f32 = 1.0 / 255.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Rotation3, Unit, Vec3};

    /// Convert degrees to radians
    #[must_use]
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    #[must_use]
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Wrap an angle in degrees into `[0, 360)`
    #[must_use]
    pub fn normalize_degrees(degrees: f32) -> f32 {
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    }

    /// Rotate `vector` about `axis` by `degrees` (right-handed)
    ///
    /// A degenerate axis leaves the vector unchanged.
    #[must_use]
    pub fn rotate_about(vector: &Vec3, axis: &Vec3, degrees: f32) -> Vec3 {
        Unit::try_new(*axis, f32::EPSILON).map_or(*vector, |axis| {
            Rotation3::from_axis_angle(&axis, deg_to_rad(degrees)) * vector
        })
    }

    /// Normalize a vector, keeping the fallback when it has no length
    #[must_use]
    pub fn normalize_or(vector: &Vec3, fallback: Vec3) -> Vec3 {
        vector.try_normalize(f32::EPSILON).unwrap_or(fallback)
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Transform a point (w = 1)
    fn apply_point(&self, point: &Vec3) -> Vec3;

    /// Transform a direction (w = 0)
    fn apply_vector(&self, vector: &Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn apply_point(&self, point: &Vec3) -> Vec3 {
        self.transform_point(&Point3::from(*point)).coords
    }

    fn apply_vector(&self, vector: &Vec3) -> Vec3 {
        self.transform_vector(vector)
    }
}
