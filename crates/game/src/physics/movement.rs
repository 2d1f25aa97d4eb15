use glam::Vec2;

use crate::map::GridMap;

use super::trace::trace;

/// Cells a collision probe may cross. Per-tick displacements are far
/// shorter than this.
pub const COLLISION_DEPTH: u32 = 8;

/// Moves `position` by `displacement`, sliding along walls.
///
/// The Y axis is probed and applied first, then X is probed from there, so
/// motion along an open axis goes through even when the other one is
/// blocked, and the two moves together can never cut a wall corner.
/// A probe limits its axis to `distance - radius` (never negative) when the
/// boundary it reached is closer than `requested + radius`. That boundary
/// is a wall, the map edge, or the end of the probe's depth, so the actor
/// never ends up inside a cell a probe did not clear. Returns whether a
/// wall was hit.
///
/// Reads nothing but its arguments; live input, dead reckoning and
/// reconciliation replay all rely on that.
pub fn move_and_collide(
    map: &GridMap,
    position: &mut Vec2,
    displacement: Vec2,
    radius: f32,
) -> bool {
    let (dy, hit_y) = probe(map, *position, Vec2::Y, displacement.y, radius);
    position.y += dy;

    let (dx, hit_x) = probe(map, *position, Vec2::X, displacement.x, radius);
    position.x += dx;

    hit_x || hit_y
}

/// Signed movement allowed along `axis` for a requested signed `amount`.
fn probe(map: &GridMap, origin: Vec2, axis: Vec2, amount: f32, radius: f32) -> (f32, bool) {
    if amount == 0.0 {
        return (0.0, false);
    }

    let sign = amount.signum();
    let requested = amount.abs();
    let hit = trace(map, origin, axis * sign, COLLISION_DEPTH);

    if hit.distance < requested + radius {
        ((hit.distance - radius).max(0.0) * sign, hit.is_wall())
    } else {
        (amount, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIUS: f32 = 0.15;

    fn cell_is_wall(map: &GridMap, p: Vec2) -> bool {
        map.is_wall(p.x.floor() as i32, p.y.floor() as i32)
    }

    #[test]
    fn test_free_movement() {
        let map = GridMap::bordered(8, 8).unwrap();
        let mut pos = Vec2::new(3.5, 3.5);

        let collided = move_and_collide(&map, &mut pos, Vec2::new(0.25, -0.5), RADIUS);

        assert!(!collided);
        assert!((pos - Vec2::new(3.75, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_stops_at_radius_from_wall() {
        let map = GridMap::bordered(4, 4).unwrap();
        let mut pos = Vec2::new(2.5, 1.5);

        let collided = move_and_collide(&map, &mut pos, Vec2::new(2.0, 0.0), RADIUS);

        assert!(collided);
        assert!((pos.x - (3.0 - RADIUS)).abs() < 1e-5);
        assert_eq!(pos.y, 1.5);
    }

    #[test]
    fn test_wall_sliding() {
        let map = GridMap::bordered(6, 6).unwrap();
        let mut pos = Vec2::new(2.5, 1.2);

        // pushing diagonally into the north wall still moves east
        let collided = move_and_collide(&map, &mut pos, Vec2::new(0.4, -0.4), RADIUS);

        assert!(collided);
        assert!((pos.x - 2.9).abs() < 1e-5);
        assert!((pos.y - (1.0 + RADIUS)).abs() < 1e-5);
    }

    #[test]
    fn test_pressed_against_wall_does_not_push_back() {
        let map = GridMap::bordered(4, 4).unwrap();
        let mut pos = Vec2::new(1.05, 1.5);

        move_and_collide(&map, &mut pos, Vec2::new(-0.3, 0.0), RADIUS);

        assert_eq!(pos.x, 1.05);
    }

    #[test]
    fn test_no_tunneling_with_large_displacements() {
        let mut tiles = vec![0u8; 12 * 12];
        for y in 0..12 {
            for x in 0..12 {
                let border = x == 0 || y == 0 || x == 11 || y == 11;
                let pillar = (x == 5 || x == 6) && (3..9).contains(&y);
                if border || pillar {
                    tiles[x + y * 12] = 1;
                }
            }
        }
        let map = GridMap::new(12, 12, tiles).unwrap();

        let starts = [
            Vec2::new(2.5, 5.5),
            Vec2::new(9.3, 4.7),
            Vec2::new(4.2, 1.8),
            Vec2::new(4.5, 2.5),
        ];
        let moves = [
            Vec2::new(0.9, 0.0),
            Vec2::new(0.6, 0.6),
            Vec2::new(3.7, 0.2),
            Vec2::new(-7.5, 1.1),
            Vec2::new(0.3, 9.0),
            Vec2::new(-20.0, -20.0),
            Vec2::new(12.5, -0.01),
        ];

        for radius in [0.01, 0.15, 0.45] {
            for start in starts {
                for displacement in moves {
                    let mut pos = start;
                    for _ in 0..4 {
                        move_and_collide(&map, &mut pos, displacement, radius);
                        assert!(
                            !cell_is_wall(&map, pos),
                            "r={radius} start={start:?} d={displacement:?} ended in wall at {pos:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_cannot_leave_open_map() {
        let map = GridMap::new(3, 3, vec![0; 9]).unwrap();
        let mut pos = Vec2::new(1.5, 1.5);

        move_and_collide(&map, &mut pos, Vec2::new(10.0, 10.0), RADIUS);

        assert!(pos.x < 3.0 && pos.y < 3.0);
    }
}
