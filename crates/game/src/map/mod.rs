mod packing;
mod testing_ground;

pub use packing::{TileWidth, pack_tiles, packed_len, unpack_tiles};
pub use testing_ground::TestingGround;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map dimensions {width}x{height} do not match {len} tiles")]
    DimensionMismatch { width: u32, height: u32, len: usize },
    #[error("map dimensions {width}x{height} are too large")]
    TooLarge { width: u32, height: u32 },
}

/// Static tile grid. 0 is empty, anything else is a wall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    width: u32,
    height: u32,
    tiles: Vec<u8>,
}

impl GridMap {
    pub fn new(width: u32, height: u32, tiles: Vec<u8>) -> Result<Self, MapError> {
        let expected = tile_count(width, height)?;
        if expected != tiles.len() {
            return Err(MapError::DimensionMismatch {
                width,
                height,
                len: tiles.len(),
            });
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Map with walls along every edge and nothing inside.
    pub fn bordered(width: u32, height: u32) -> Result<Self, MapError> {
        let count = tile_count(width, height)?;
        let mut tiles = vec![0u8; count];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    tiles[(x + y * width) as usize] = 1;
                }
            }
        }
        Self::new(width, height, tiles)
    }

    pub fn from_packed(
        width: u32,
        height: u32,
        data: &[u8],
        tile_width: TileWidth,
    ) -> Result<Self, MapError> {
        let count = tile_count(width, height)?;
        Self::new(width, height, unpack_tiles(data, count, tile_width))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    /// Tile at the given cell, `None` outside the grid.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(self.tiles[x as usize + y as usize * self.width as usize])
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_some_and(|t| t != 0)
    }

    pub fn pack(&self, tile_width: TileWidth) -> Vec<u8> {
        pack_tiles(&self.tiles, tile_width)
    }
}

fn tile_count(width: u32, height: u32) -> Result<usize, MapError> {
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&n| n <= i32::MAX as usize)
        .ok_or(MapError::TooLarge { width, height })
}
