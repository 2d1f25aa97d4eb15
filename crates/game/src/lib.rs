pub mod client;
pub mod map;
pub mod net;
pub mod physics;
pub mod platform;
pub mod player;
pub mod render;
pub mod session;
pub mod sprite;

pub use client::{Client, ClientConfig, View};
pub use map::{GridMap, MapError, TestingGround, TileWidth};
pub use net::{
    ClientPacket, Connection, ConnectionState, DropReason, InputLog, PacketError, SendError,
    SequenceWindow, ServerPacket, SessionStats,
};
pub use physics::{Axis, COLLISION_DEPTH, RayHit, move_and_collide, trace};
pub use platform::Platform;
pub use player::{Camera, CameraConfig, Key, Keys, LocalPlayer, PlayerConfig};
pub use render::{Framebuffer, Renderer};
pub use session::{BULLET_DAMAGE, Session, SessionEvent};
pub use sprite::{Sprite, SpriteDesc, SpriteInit, SpriteKind, SpriteSet, SpriteTransform};
