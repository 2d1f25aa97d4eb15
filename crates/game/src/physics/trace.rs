use glam::Vec2;

use crate::map::GridMap;

/// Axis the ray advanced along on its last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Stepped along X, so the ray crossed a vertical grid line.
    Horizontal,
    /// Stepped along Y.
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub axis: Axis,
    /// Tile that stopped the ray, 0 when it ran out of steps or left the map.
    pub tile: u8,
}

impl RayHit {
    #[inline]
    pub fn is_wall(&self) -> bool {
        self.tile != 0
    }
}

/// Marches a ray through `map` with DDA, visiting at most `max_steps` cells.
///
/// The returned distance is measured to the boundary of the last cell
/// entered, in units of `direction`'s length: the march advances into a
/// cell before testing it, so the final step is subtracted again. Depth
/// buffers and collision margins depend on this exact value.
///
/// A zero direction component never gets stepped. If the ray never moves
/// (the origin is already in a wall or outside the map) the distance is 0.
pub fn trace(map: &GridMap, origin: Vec2, direction: Vec2, max_steps: u32) -> RayHit {
    let mut cell_x = origin.x.floor() as i32;
    let mut cell_y = origin.y.floor() as i32;
    let frac_x = origin.x - cell_x as f32;
    let frac_y = origin.y - cell_y as f32;

    let delta_x = (1.0 / direction.x).abs();
    let delta_y = (1.0 / direction.y).abs();

    let step_x = if direction.x > 0.0 { 1 } else { -1 };
    let step_y = if direction.y > 0.0 { 1 } else { -1 };

    // `inf * 0.0` is NaN, so a zero component is pinned to infinity here
    // instead of relying on the product.
    let mut side_x = if direction.x == 0.0 {
        f32::INFINITY
    } else if direction.x > 0.0 {
        (1.0 - frac_x) * delta_x
    } else {
        frac_x * delta_x
    };
    let mut side_y = if direction.y == 0.0 {
        f32::INFINITY
    } else if direction.y > 0.0 {
        (1.0 - frac_y) * delta_y
    } else {
        frac_y * delta_y
    };

    let mut axis = Axis::Horizontal;
    let mut stepped = false;
    let mut tile = 0;

    for _ in 0..max_steps {
        match map.tile(cell_x, cell_y) {
            None => break,
            Some(0) => {}
            Some(t) => {
                tile = t;
                break;
            }
        }

        if side_x < side_y {
            side_x += delta_x;
            cell_x += step_x;
            axis = Axis::Horizontal;
        } else if side_y.is_finite() {
            side_y += delta_y;
            cell_y += step_y;
            axis = Axis::Vertical;
        } else {
            // both components are zero
            break;
        }
        stepped = true;
    }

    let distance = match (stepped, axis) {
        (false, _) => 0.0,
        (true, Axis::Horizontal) => side_x - delta_x,
        (true, Axis::Vertical) => side_y - delta_y,
    };

    RayHit {
        distance,
        axis,
        tile,
    }
}
