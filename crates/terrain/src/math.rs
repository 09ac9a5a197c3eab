//! Matrix helpers for the geometry uniforms.

use glam::{Mat3, Mat4, Vec3};

/// Right-handed perspective projection, depth 0..1.
pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_radians, aspect, near, far)
}

/// Model-view for a terrain rotating about +Y in front of the camera.
pub fn model_view(rotation: f32, eye_offset: Vec3) -> Mat4 {
    Mat4::from_translation(eye_offset) * Mat4::from_rotation_y(rotation)
}

/// Inverse-transpose of the model-view's upper 3x3, as three 16-byte columns
/// ready for a device-side `mat3x3<f32>`.
pub fn normal_matrix_columns(model_view: Mat4) -> [[f32; 4]; 3] {
    let m = Mat3::from_mat4(model_view).inverse().transpose();
    [
        [m.x_axis.x, m.x_axis.y, m.x_axis.z, 0.0],
        [m.y_axis.x, m.y_axis.y, m.y_axis.z, 0.0],
        [m.z_axis.x, m.z_axis.y, m.z_axis.z, 0.0],
    ]
}
