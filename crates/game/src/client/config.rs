use crate::net::DEFAULT_DROP_TOLERANCE;
use crate::player::{CameraConfig, PlayerConfig};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub mouse_sensitivity: f32,
    /// How far ahead of the expected sequence a packet may be.
    pub drop_tolerance: u32,
    pub framebuffer_width: u32,
    pub framebuffer_height: u32,
    pub loading_timeout_secs: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            camera: CameraConfig::default(),
            mouse_sensitivity: 1.0,
            drop_tolerance: DEFAULT_DROP_TOLERANCE,
            framebuffer_width: 640,
            framebuffer_height: 480,
            loading_timeout_secs: 15.0,
        }
    }
}
