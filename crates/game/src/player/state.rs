use std::f32::consts::TAU;

use glam::{Mat2, Vec2};

use super::{CameraConfig, Keys};

/// Facing direction, projection plane and the inverse of the basis they form.
#[derive(Debug, Clone)]
pub struct Camera {
    direction: Vec2,
    plane: Vec2,
    inverse: Mat2,
    plane_half_width: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let half_fov = config.fov_degrees.to_radians() * 0.5;
        let mut camera = Self {
            direction: Vec2::X,
            plane: Vec2::Y,
            inverse: Mat2::IDENTITY,
            plane_half_width: half_fov.tan(),
        };
        camera.set_rotation(0.0);
        camera
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.direction = Vec2::from_angle(rotation);
        self.plane = self.direction.perp() * self.plane_half_width;
        self.inverse = Mat2::from_cols(self.plane, self.direction).inverse();
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    /// Ray through a screen column, `camera_x` in `[-1, 1]` from left to right.
    pub fn column_ray(&self, camera_x: f32) -> Vec2 {
        self.direction + self.plane * camera_x
    }

    /// World offset to camera space: `x` along the plane, `y` is depth.
    pub fn to_camera_space(&self, offset: Vec2) -> Vec2 {
        self.inverse * offset
    }
}

#[derive(Debug, Clone)]
pub struct LocalPlayer {
    /// Authoritative (predicted) position used for collision.
    pub position: Vec2,
    /// Smoothed position the renderer draws from.
    pub display_position: Vec2,
    pub health: i32,
    pub keys: Keys,
    rotation: f32,
    camera: Camera,
}

impl LocalPlayer {
    pub fn new(camera: &CameraConfig, max_health: i32) -> Self {
        Self {
            position: Vec2::ZERO,
            display_position: Vec2::ZERO,
            health: max_health,
            keys: Keys::empty(),
            rotation: 0.0,
            camera: Camera::new(camera),
        }
    }

    /// Moves both the authoritative and the display position.
    pub fn place(&mut self, position: Vec2) {
        self.position = position;
        self.display_position = position;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation.rem_euclid(TAU);
        self.camera.set_rotation(self.rotation);
    }

    pub fn rotate(&mut self, delta: f32) {
        self.set_rotation(self.rotation + delta);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn velocity(&self, run_speed: f32) -> Vec2 {
        self.keys.direction(self.camera.direction()) * run_speed
    }

    pub fn smooth_display(&mut self, weight: f32) {
        self.display_position = self.position * weight + self.display_position * (1.0 - weight);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_camera_basis_round_trip() {
        let mut camera = Camera::new(&CameraConfig::default());
        camera.set_rotation(1.1);

        let offset = Vec2::new(2.0, -0.5);
        let local = camera.to_camera_space(offset);
        let back = camera.plane() * local.x + camera.direction() * local.y;
        assert!(approx(back, offset));
    }

    #[test]
    fn test_point_ahead_projects_to_center() {
        let camera = Camera::new(&CameraConfig::default());
        let local = camera.to_camera_space(Vec2::new(3.0, 0.0));

        assert!(local.x.abs() < 1e-5);
        assert!((local.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_point_behind_has_negative_depth() {
        let mut camera = Camera::new(&CameraConfig::default());
        camera.set_rotation(std::f32::consts::FRAC_PI_2);

        assert!(camera.to_camera_space(Vec2::new(0.0, -2.0)).y < 0.0);
    }

    #[test]
    fn test_edge_columns_span_fov() {
        let config = CameraConfig {
            fov_degrees: 90.0,
            ..Default::default()
        };
        let camera = Camera::new(&config);
        let left = camera.column_ray(-1.0);
        let right = camera.column_ray(1.0);

        let angle = left.angle_to(right).abs();
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut player = LocalPlayer::new(&CameraConfig::default(), 100);
        player.set_rotation(-0.5);
        assert!((player.rotation() - (TAU - 0.5)).abs() < 1e-5);

        player.rotate(1.0);
        assert!((player.rotation() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_velocity_follows_facing() {
        let mut player = LocalPlayer::new(&CameraConfig::default(), 100);
        player.set_rotation(std::f32::consts::FRAC_PI_2);
        player.keys = Keys::FORWARD;

        assert!(approx(player.velocity(2.0), Vec2::new(0.0, 2.0)));
    }

    #[test]
    fn test_display_smoothing() {
        let mut player = LocalPlayer::new(&CameraConfig::default(), 100);
        player.place(Vec2::ZERO);
        player.position = Vec2::new(1.0, 0.0);
        player.smooth_display(0.66);

        assert!(approx(player.display_position, Vec2::new(0.66, 0.0)));
    }
}
