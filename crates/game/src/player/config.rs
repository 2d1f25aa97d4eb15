#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub run_speed: f32,
    /// Radians per unit of mouse movement, before the sensitivity multiplier.
    pub rotation_speed: f32,
    pub radius: f32,
    pub max_health: i32,
    /// Weight of the authoritative position when smoothing the camera.
    pub display_smoothing: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            run_speed: 3.5,
            rotation_speed: 0.01,
            radius: 0.15,
            max_health: 100,
            display_smoothing: 0.66,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    /// Cells a render ray may cross before it counts as a miss.
    pub depth_of_field: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            depth_of_field: 32,
        }
    }
}
