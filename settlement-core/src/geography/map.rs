// Rectangular tile grid

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::terrain::TerrainType;
use super::tile::Tile;
use crate::types::{Direction, TilePos};

/// Row-major grid of tiles. The map is the single owner of every tile.
#[derive(Debug, Clone)]
pub struct Map {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Map {
    /// A map of uniform terrain.
    pub fn new(width: i32, height: i32, terrain: TerrainType) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| Tile::new(TilePos::new(x, y), terrain)))
            .collect();
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Build a map from a character sketch, one string per row.
    ///
    /// Returns `None` for ragged rows or characters without a terrain (see
    /// [`TerrainType::from_char`]).
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as i32 != width {
                return None;
            }
            for (x, c) in row.chars().enumerate() {
                let terrain = TerrainType::from_char(c)?;
                tiles.push(Tile::new(TilePos::new(x as i32, y as i32), terrain));
            }
        }
        Some(Self {
            width,
            height,
            tiles,
        })
    }

    /// Seeded random continent: water along the border, mixed land inside,
    /// with roughly `water_ratio` of the interior turned into lakes.
    pub fn random(width: i32, height: i32, seed: u64, water_ratio: f64) -> Self {
        const LAND: [TerrainType; 11] = [
            TerrainType::Plains,
            TerrainType::Grassland,
            TerrainType::Prairie,
            TerrainType::Savannah,
            TerrainType::Marsh,
            TerrainType::Swamp,
            TerrainType::Desert,
            TerrainType::Tundra,
            TerrainType::Forest,
            TerrainType::Hills,
            TerrainType::Mountains,
        ];
        let mut rng = StdRng::seed_from_u64(seed);
        let mut map = Self::new(width, height, TerrainType::Ocean);
        let ratio = water_ratio.clamp(0.0, 1.0);
        for tile in &mut map.tiles {
            let TilePos { x, y } = tile.pos;
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                continue;
            }
            tile.terrain = if rng.random_bool(ratio) {
                TerrainType::Lake
            } else {
                LAND[rng.random_range(0..LAND.len())]
            };
        }
        map
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index(pos).map(move |i| &mut self.tiles[i])
    }

    /// Overwrite the terrain of one tile (map editing, scenario setup).
    pub fn set_terrain(&mut self, pos: TilePos, terrain: TerrainType) -> bool {
        match self.tile_mut(pos) {
            Some(tile) => {
                tile.terrain = terrain;
                true
            }
            None => false,
        }
    }

    pub fn neighbor_or_null(&self, pos: TilePos, direction: Direction) -> Option<TilePos> {
        let next = pos.step(direction);
        self.contains(next).then_some(next)
    }

    /// Every on-map tile within `radius` of `center`, excluding the centre,
    /// in row-major order.
    pub fn surrounding_tiles(&self, center: TilePos, radius: u32) -> Vec<TilePos> {
        // No tile lies further away than the longer side
        let r = radius.min(self.width.max(self.height).max(0) as u32) as i32;
        let x0 = center.x.saturating_sub(r).max(0);
        let x1 = center.x.saturating_add(r).min(self.width - 1);
        let y0 = center.y.saturating_sub(r).max(0);
        let y1 = center.y.saturating_add(r).min(self.height - 1);
        let mut out = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let pos = TilePos::new(x, y);
                if pos != center && self.contains(pos) {
                    out.push(pos);
                }
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrounding_tiles_excludes_center_and_clips() {
        let map = Map::new(5, 5, TerrainType::Plains);

        let inner = map.surrounding_tiles(TilePos::new(2, 2), 1);
        assert_eq!(inner.len(), 8);
        assert!(!inner.contains(&TilePos::new(2, 2)));

        let corner = map.surrounding_tiles(TilePos::new(0, 0), 1);
        assert_eq!(corner.len(), 3);

        let wide = map.surrounding_tiles(TilePos::new(2, 2), 2);
        assert_eq!(wide.len(), 24);
    }

    #[test]
    fn test_huge_radius_covers_the_map() {
        let map = Map::new(4, 3, TerrainType::Plains);
        let all = map.surrounding_tiles(TilePos::new(1, 1), u32::MAX);
        assert_eq!(all.len(), 11);
        assert_eq!(all.first(), Some(&TilePos::new(0, 0)));
        assert_eq!(all.last(), Some(&TilePos::new(3, 2)));
    }

    #[test]
    fn test_from_rows_reads_terrain() {
        let map = Map::from_rows(&["..~", ".f.", "^.."]).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
        assert_eq!(map.tile(TilePos::new(2, 0)).unwrap().terrain, TerrainType::Ocean);
        assert_eq!(map.tile(TilePos::new(1, 1)).unwrap().terrain, TerrainType::Forest);
        assert_eq!(map.tile(TilePos::new(0, 2)).unwrap().terrain, TerrainType::Mountains);
    }

    #[test]
    fn test_from_rows_rejects_ragged_or_unknown() {
        assert!(Map::from_rows(&["...", ".."]).is_none());
        assert!(Map::from_rows(&["..?"]).is_none());
    }

    #[test]
    fn test_neighbor_or_null_at_edge() {
        let map = Map::new(3, 3, TerrainType::Plains);
        assert_eq!(map.neighbor_or_null(TilePos::new(0, 0), Direction::N), None);
        assert_eq!(
            map.neighbor_or_null(TilePos::new(0, 0), Direction::SE),
            Some(TilePos::new(1, 1))
        );
    }

    #[test]
    fn test_random_map_is_seeded() {
        let a = Map::random(12, 10, 42, 0.1);
        let b = Map::random(12, 10, 42, 0.1);
        let terrain_a: Vec<_> = a.iter().map(|t| t.terrain).collect();
        let terrain_b: Vec<_> = b.iter().map(|t| t.terrain).collect();
        assert_eq!(terrain_a, terrain_b);
        assert!(a.iter().filter(|t| t.pos.x == 0).all(|t| !t.is_land()));
    }
}
