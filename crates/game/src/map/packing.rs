//! Bit packing of tile grids, LSB-first and row-major.
//!
//! Tile values wider than the field are truncated on pack.

/// Bits stored per tile. Only widths that divide a byte exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TileWidth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl TileWidth {
    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    #[inline]
    fn mask(self) -> u8 {
        ((1u16 << self.bits()) - 1) as u8
    }

    #[inline]
    fn per_byte(self) -> usize {
        (8 / self.bits()) as usize
    }
}

/// Number of bytes needed for `tile_count` tiles.
pub fn packed_len(tile_count: usize, width: TileWidth) -> usize {
    (tile_count * width.bits() as usize).div_ceil(8)
}

pub fn pack_tiles(tiles: &[u8], width: TileWidth) -> Vec<u8> {
    let mask = width.mask();
    let per_byte = width.per_byte();
    let mut out = vec![0u8; packed_len(tiles.len(), width)];

    for (i, &tile) in tiles.iter().enumerate() {
        let shift = (i % per_byte) as u8 * width.bits();
        out[i / per_byte] |= (tile & mask) << shift;
    }

    out
}

/// Unpacks `tile_count` tiles. Missing trailing bytes read as empty.
pub fn unpack_tiles(data: &[u8], tile_count: usize, width: TileWidth) -> Vec<u8> {
    let mask = width.mask();
    let per_byte = width.per_byte();

    (0..tile_count)
        .map(|i| {
            let byte = data.get(i / per_byte).copied().unwrap_or(0);
            let shift = (i % per_byte) as u8 * width.bits();
            (byte >> shift) & mask
        })
        .collect()
}
