//! Row-major tile grid.

use glyph_chase_core::{Pair, TileSymbol};

/// One grid cell: a fixed position and a mutable symbol.
#[derive(Clone, Debug)]
pub struct Tile {
    pos: Pair,
    symbol: TileSymbol,
}

impl Tile {
    pub(crate) const fn new(pos: Pair) -> Self {
        Self {
            pos,
            symbol: TileSymbol::Blank,
        }
    }

    /// Position of the tile, fixed at creation.
    #[must_use]
    pub const fn pos(&self) -> Pair {
        self.pos
    }

    /// Symbol currently displayed on the tile.
    #[must_use]
    pub const fn symbol(&self) -> TileSymbol {
        self.symbol
    }

    pub(crate) fn set_symbol(&mut self, symbol: TileSymbol) {
        self.symbol = symbol;
    }
}

/// Square grid of `width²` tiles stored row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    pub(crate) fn new(width: u32) -> Self {
        let width = width as i32;
        let mut tiles = Vec::with_capacity((width * width) as usize);
        for y in 0..width {
            for x in 0..width {
                tiles.push(Tile::new(Pair::new(x, y)));
            }
        }
        Self { width, tiles }
    }

    /// Side length of the grid in tiles.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Tile at the provided position, or `None` outside bounds.
    #[must_use]
    pub fn tile_at(&self, pos: Pair) -> Option<&Tile> {
        self.index(pos).map(|index| &self.tiles[index])
    }

    pub(crate) fn tile_at_mut(&mut self, pos: Pair) -> Option<&mut Tile> {
        self.index(pos).map(move |index| &mut self.tiles[index])
    }

    /// In-bounds tiles within a Chebyshev `radius` ring, origin excluded.
    #[must_use]
    pub fn neighborhood(&self, pos: Pair, radius: i32) -> Vec<&Tile> {
        let mut tiles = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1) - 1) as usize);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some(tile) = self.tile_at(pos + Pair::new(dx, dy)) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub(crate) fn clear(&mut self) {
        for tile in &mut self.tiles {
            tile.set_symbol(TileSymbol::Blank);
        }
    }

    fn index(&self, pos: Pair) -> Option<usize> {
        if pos.in_range(self.width) {
            Some((self.width * pos.y() + pos.x()) as usize)
        } else {
            None
        }
    }
}
