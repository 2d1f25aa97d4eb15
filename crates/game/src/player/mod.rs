mod config;
mod input;
mod state;

pub use config::{CameraConfig, PlayerConfig};
pub use input::{Key, Keys};
pub use state::{Camera, LocalPlayer};
