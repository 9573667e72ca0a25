use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::resources::{ResourceBundle, ResourceKind};

pub const MAP_WIDTH: usize = 8;
pub const MAP_HEIGHT: usize = 8;

pub const BOSS_STRENGTH: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Trees,
    Meadow,
    Stone,
    Iron,
    Herbs,
    Monster,
    Boss,
    Empty,
}

impl TileKind {
    pub fn is_hostile(&self) -> bool {
        matches!(self, TileKind::Monster | TileKind::Boss)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TileKind::Trees => "Dense Forest",
            TileKind::Meadow => "Fertile Meadow",
            TileKind::Stone => "Rocky Outcrop",
            TileKind::Iron => "Iron Vein",
            TileKind::Herbs => "Herb Grove",
            TileKind::Monster => "Monster Den",
            TileKind::Boss => "Dragon's Lair",
            TileKind::Empty => "Barren Land",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    #[serde(default)]
    pub explored: bool,
    #[serde(default)]
    pub defeated: bool,
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub yields: ResourceBundle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMap {
    pub width: usize,
    pub height: usize,
    /// Row-major, `tiles[y][x]`.
    pub tiles: Vec<Vec<Tile>>,
    #[serde(default)]
    pub explored_tiles: u32,
}

impl WorldMap {
    /// Expeditions set out from the bottom-right corner; tiles get richer
    /// and monsters meaner the further the crow flies from it. The dragon
    /// waits in the far corner.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let max_distance =
            (((MAP_WIDTH - 1).pow(2) + (MAP_HEIGHT - 1).pow(2)) as f64).sqrt();
        let mut tiles = Vec::with_capacity(MAP_HEIGHT);
        for y in 0..MAP_HEIGHT {
            let mut row = Vec::with_capacity(MAP_WIDTH);
            for x in 0..MAP_WIDTH {
                if x == 0 && y == 0 {
                    row.push(boss_tile());
                    continue;
                }
                let dx = (MAP_WIDTH - 1 - x) as f64;
                let dy = (MAP_HEIGHT - 1 - y) as f64;
                let difficulty = (dx * dx + dy * dy).sqrt() / max_distance;
                row.push(roll_tile(rng, difficulty));
            }
            tiles.push(row);
        }
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            tiles,
            explored_tiles: 0,
        }
    }

    pub fn tile(&self, x: usize, y: usize) -> &Tile {
        &self.tiles[y][x]
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut Tile {
        &mut self.tiles[y][x]
    }

    /// The next tile an expedition will visit: bottom-right to top-left,
    /// skipping explored ground but returning to undefeated lairs.
    pub fn next_target(&self) -> Option<(usize, usize)> {
        for y in (0..self.height).rev() {
            for x in (0..self.width).rev() {
                let tile = &self.tiles[y][x];
                if !tile.explored || (tile.kind.is_hostile() && !tile.defeated) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    pub fn boss_defeated(&self) -> bool {
        self.tiles[0][0].defeated
    }
}

fn boss_tile() -> Tile {
    let mut yields = ResourceBundle::new();
    yields.insert(ResourceKind::Wood, 200.0);
    yields.insert(ResourceKind::Food, 200.0);
    yields.insert(ResourceKind::Stone, 100.0);
    yields.insert(ResourceKind::Knowledge, 50.0);
    yields.insert(ResourceKind::Gold, 100.0);
    Tile {
        kind: TileKind::Boss,
        explored: false,
        defeated: false,
        strength: BOSS_STRENGTH,
        yields,
    }
}

fn roll_tile(rng: &mut impl Rng, difficulty: f64) -> Tile {
    let roll: f64 = rng.gen();
    let mut yields = ResourceBundle::new();
    let (kind, strength) = if roll < 0.35 {
        let amount: f64 = rng.gen();
        yields.insert(
            ResourceKind::Wood,
            (20.0 + amount * 40.0 + difficulty * 30.0).floor(),
        );
        (TileKind::Trees, 0)
    } else if roll < 0.50 {
        let amount: f64 = rng.gen();
        yields.insert(
            ResourceKind::Food,
            (15.0 + amount * 30.0 + difficulty * 20.0).floor(),
        );
        (TileKind::Meadow, 0)
    } else if roll < 0.60 {
        let amount: f64 = rng.gen();
        yields.insert(
            ResourceKind::Stone,
            (10.0 + amount * 20.0 + difficulty * 15.0).floor(),
        );
        (TileKind::Stone, 0)
    } else if roll < 0.65 {
        let amount: f64 = rng.gen();
        yields.insert(
            ResourceKind::Iron,
            (5.0 + amount * 15.0 + difficulty * 10.0).floor(),
        );
        (TileKind::Iron, 0)
    } else if roll < 0.70 {
        let amount: f64 = rng.gen();
        yields.insert(ResourceKind::Herbs, (10.0 + amount * 20.0).floor());
        (TileKind::Herbs, 0)
    } else if roll < 0.90 {
        let spread: f64 = rng.gen();
        let strength = (20.0 + difficulty * 80.0 + spread * 30.0).floor() as u32;
        let loot_scale = 1.0 + difficulty;
        yields.insert(ResourceKind::Wood, (10.0 * loot_scale).floor());
        yields.insert(ResourceKind::Food, (15.0 * loot_scale).floor());
        yields.insert(ResourceKind::Gold, (5.0 * loot_scale).floor());
        (TileKind::Monster, strength)
    } else {
        (TileKind::Empty, 0)
    };
    Tile {
        kind,
        explored: false,
        defeated: false,
        strength,
        yields,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn generation_is_seed_deterministic() {
        let mut a = ChaCha8Rng::seed_from_u64(11);
        let mut b = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(WorldMap::generate(&mut a), WorldMap::generate(&mut b));
    }

    #[test]
    fn dragon_guards_the_far_corner() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let map = WorldMap::generate(&mut rng);
        let lair = map.tile(0, 0);
        assert_eq!(lair.kind, TileKind::Boss);
        assert_eq!(lair.strength, BOSS_STRENGTH);
        assert_eq!(map.tiles.len(), MAP_HEIGHT);
        assert!(map.tiles.iter().all(|row| row.len() == MAP_WIDTH));
    }

    #[test]
    fn scan_starts_at_the_expedition_corner() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let map = WorldMap::generate(&mut rng);
        assert_eq!(map.next_target(), Some((MAP_WIDTH - 1, MAP_HEIGHT - 1)));
    }

    #[test]
    fn undefeated_lairs_are_revisited() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut map = WorldMap::generate(&mut rng);
        for row in &mut map.tiles {
            for tile in row {
                tile.explored = true;
            }
        }
        // Everything explored but the dragon still stands.
        assert_eq!(map.next_target(), Some((0, 0)));
        map.tile_mut(0, 0).defeated = true;
        let remaining = map.next_target();
        // Only undefeated monster dens remain eligible now.
        if let Some((x, y)) = remaining {
            assert!(map.tile(x, y).kind.is_hostile());
        }
    }
}
