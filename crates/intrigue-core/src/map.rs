//! Game map: square tile grid with ownership and terrain.

use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// Position of a tile on the map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl PartialOrd for TileCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TileCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl TileCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Real distance: the number of king moves between two tiles.
    pub fn distance(&self, other: &TileCoord) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// All coordinates within `radius` king moves, including self.
    pub fn square_around(&self, radius: u32) -> Vec<TileCoord> {
        let r = radius as i32;
        let mut result = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
        for dy in -r..=r {
            for dx in -r..=r {
                result.push(TileCoord::new(self.x + dx, self.y + dy));
            }
        }
        result
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Base terrain of a tile. Only movement cost matters to this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Grassland,
    Plains,
    Desert,
    Tundra,
    Forest,
    Jungle,
    Swamp,
    Hills,
    Mountains,
    Ocean,
}

impl Terrain {
    /// Movement cost in whole moves.
    pub const fn movement_cost(&self) -> u32 {
        match self {
            Terrain::Grassland | Terrain::Plains | Terrain::Desert | Terrain::Tundra => 1,
            Terrain::Forest | Terrain::Jungle | Terrain::Swamp | Terrain::Hills => 2,
            Terrain::Mountains => 3,
            Terrain::Ocean => 1,
        }
    }
}

/// A single tile on the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: TileCoord,
    pub terrain: Terrain,
    /// Player whose borders include this tile.
    pub owner: Option<PlayerId>,
}

impl Tile {
    pub fn new(coord: TileCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            owner: None,
        }
    }
}

/// The game map. Tiles are stored row-major.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Tile>,
}

impl Map {
    /// Create a map filled with a single terrain type.
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                tiles.push(Tile::new(TileCoord::new(x, y), terrain));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Check if a coordinate is within the map bounds.
    pub fn in_bounds(&self, coord: &TileCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    fn index(&self, coord: &TileCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, coord: &TileCoord) -> Option<&Tile> {
        self.index(coord).and_then(|i| self.tiles.get(i))
    }

    pub fn get_mut(&mut self, coord: &TileCoord) -> Option<&mut Tile> {
        let index = self.index(coord)?;
        self.tiles.get_mut(index)
    }

    /// Owner of the tile, `None` when unclaimed or off the map.
    pub fn owner(&self, coord: &TileCoord) -> Option<PlayerId> {
        self.get(coord).and_then(|t| t.owner)
    }

    /// Movement cost to enter the tile in movement fragments.
    pub fn move_cost(&self, coord: &TileCoord) -> u32 {
        let moves = self
            .get(coord)
            .map(|t| t.terrain.movement_cost())
            .unwrap_or(1);
        moves * crate::types::SINGLE_MOVE
    }

    /// On-map coordinates within `radius` of `center`.
    pub fn square_around(&self, center: &TileCoord, radius: u32) -> Vec<TileCoord> {
        center
            .square_around(radius)
            .into_iter()
            .filter(|c| self.in_bounds(c))
            .collect()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::filled(16, 16, Terrain::Grassland)
    }
}
