//! 4D camera
//!
//! The camera is a [`Transform4`] whose basis is rebuilt every frame from
//! three accumulated angles: XZ (yaw) and YZ (pitch) drive a `look_at`
//! confined to the Y/W hyperplane, and a ZW angle rolls the view into the
//! fourth dimension on top of it. Movement stays in the horizontal 3D slice.

use tetra4d_core::{Plane4, Transform4};
use tetra4d_math::Vec4;

/// Per-frame movement and look axes, mapped from the windowing layer by the
/// application (the camera itself never touches input devices).
#[derive(Clone, Copy, Debug, Default)]
pub struct CameraInput {
    /// Rightward movement axis, -1..1
    pub move_right: f32,
    /// Forward movement axis, -1..1
    pub move_forward: f32,
    /// Mouse delta, in pixels
    pub look_dx: f32,
    pub look_dy: f32,
    /// ZW rotation axis, -1..1
    pub roll_zw: f32,
}

/// 4D camera with mouse-look and W-roll.
pub struct Camera4 {
    /// Camera-to-world transform; its inverse is the view transform.
    pub transform: Transform4,
    /// Movement speed in units/s
    pub speed: f32,
    /// Pixels of mouse travel per radian of rotation
    pub rotation_divisor: f32,
    /// ZW roll speed in rad/s
    pub zw_speed: f32,

    xz: f32,
    yz: f32,
    zw: f32,
}

impl Default for Camera4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera4 {
    pub fn new() -> Self {
        Self {
            transform: Transform4::IDENTITY,
            speed: 5.0,
            rotation_divisor: 400.0,
            zw_speed: 1.0,
            xz: 0.0,
            yz: 0.0,
            zw: 0.0,
        }
    }

    /// View transform of the scene: the inverse of the camera transform.
    pub fn view_transform(&self) -> Transform4 {
        self.transform.inverse()
    }

    /// Current look direction in world space.
    pub fn direction(&self) -> Vec4 {
        let (xz, yz) = (self.xz, self.yz);
        Vec4::new(-xz.sin() * yz.cos(), yz.sin(), xz.cos() * yz.cos(), 0.0)
    }

    /// Advances the camera state for this frame.
    pub fn update(&mut self, input: &CameraInput, dt: f32) {
        // Movement in the camera's horizontal slice; Y is locked so we don't
        // fly off when looking up.
        let local = Vec4::new(input.move_right, 0.0, input.move_forward, 0.0).normalized();
        let mut dr = self.transform.mat * (local * (self.speed * dt));
        dr.y = 0.0;
        self.transform.pos += dr;

        // Mouse look, pitch capped at head and feet
        self.xz += input.look_dx / self.rotation_divisor;
        self.yz = (self.yz + input.look_dy / self.rotation_divisor)
            .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);

        // ZW roll
        self.zw += self.zw_speed * dt * input.roll_zw;

        self.transform
            .look_at(self.direction(), Vec4::Y, Vec4::W)
            .rotate(Plane4::Zw, self.zw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_view_transform_inverts_camera() {
        let mut camera = Camera4::new();
        camera.transform.pos = Vec4::new(0.0, 1.5, 0.0, 0.0);
        camera.update(&CameraInput::default(), 0.016);

        let world = Vec4::new(1.0, 2.0, 3.0, 4.0);
        let view = camera.view_transform();
        let round = camera.transform.apply(view.apply(world));
        assert!((round - world).length() < EPSILON);
    }

    #[test]
    fn test_default_orientation_looks_down_z() {
        let mut camera = Camera4::new();
        camera.update(&CameraInput::default(), 0.016);
        assert!((camera.transform.mat.col(2) - Vec4::Z).length() < EPSILON);
    }

    #[test]
    fn test_movement_is_horizontal() {
        let mut camera = Camera4::new();
        // pitch the camera up, then walk forward: no vertical drift
        let look_up = CameraInput {
            look_dy: 200.0,
            ..Default::default()
        };
        camera.update(&look_up, 0.016);
        let walk = CameraInput {
            move_forward: 1.0,
            ..Default::default()
        };
        camera.update(&walk, 0.016);
        assert!(camera.transform.pos.y.abs() < EPSILON);
        assert!(camera.transform.pos.length() > 0.0);
    }

    #[test]
    fn test_zw_roll_keeps_basis_orthonormal() {
        let mut camera = Camera4::new();
        let input = CameraInput {
            roll_zw: 1.0,
            look_dx: 50.0,
            ..Default::default()
        };
        camera.update(&input, 0.5);
        let m = camera.transform.mat;
        for i in 0..4 {
            assert!((m.col(i).length() - 1.0).abs() < EPSILON);
            for j in (i + 1)..4 {
                assert!(m.col(i).dot(m.col(j)).abs() < EPSILON);
            }
        }
    }
}
