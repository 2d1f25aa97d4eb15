mod movement;
mod trace;

pub use movement::{COLLISION_DEPTH, move_and_collide};
pub use trace::{Axis, RayHit, trace};
