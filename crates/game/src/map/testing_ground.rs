use super::{GridMap, MapError};

/// Built-in arena for offline play.
pub struct TestingGround {
    width: u32,
    height: u32,
    tiles: Vec<u8>,
}

impl Default for TestingGround {
    fn default() -> Self {
        Self::new()
    }
}

impl TestingGround {
    const SIZE: u32 = 24;

    pub fn new() -> Self {
        let mut ground = Self {
            width: Self::SIZE,
            height: Self::SIZE,
            tiles: vec![0; (Self::SIZE * Self::SIZE) as usize],
        };

        ground.add_border();
        ground.add_pillars();
        ground.add_corridor();

        ground
    }

    /// Open cell to spawn in.
    pub fn spawn_point(&self) -> glam::Vec2 {
        glam::Vec2::new(2.5, 2.5)
    }

    pub fn build(self) -> Result<GridMap, MapError> {
        GridMap::new(self.width, self.height, self.tiles)
    }

    fn set(&mut self, x: u32, y: u32, tile: u8) {
        if x < self.width && y < self.height {
            self.tiles[(x + y * self.width) as usize] = tile;
        }
    }

    fn add_border(&mut self) {
        for i in 0..Self::SIZE {
            self.set(i, 0, 1);
            self.set(i, Self::SIZE - 1, 1);
            self.set(0, i, 1);
            self.set(Self::SIZE - 1, i, 1);
        }
    }

    fn add_pillars(&mut self) {
        for y in (5..Self::SIZE - 4).step_by(4) {
            for x in (5..Self::SIZE - 4).step_by(4) {
                self.set(x, y, 2);
                self.set(x + 1, y, 2);
                self.set(x, y + 1, 2);
                self.set(x + 1, y + 1, 2);
            }
        }
    }

    fn add_corridor(&mut self) {
        let mid = Self::SIZE / 2;
        for x in 3..Self::SIZE - 3 {
            if x != mid && x != mid + 1 {
                self.set(x, mid - 2, 3);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testing_ground_is_closed() {
        let ground = TestingGround::new();
        let spawn = ground.spawn_point();
        let map = ground.build().expect("map");

        assert!(!map.is_wall(spawn.x as i32, spawn.y as i32));
        for i in 0..map.width() as i32 {
            assert!(map.is_wall(i, 0));
            assert!(map.is_wall(0, i));
        }
    }
}
