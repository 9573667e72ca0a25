use anyhow::Result;

use crate::{
    buildings::BuildingKind,
    engine::{System, SystemContext},
    events::GameEvent,
    map::TileKind,
    resources::ResourceKind,
    rng::StreamRng,
    state::GameState,
};

/// Expedition progress. Once launched, the party walks the map from the
/// village corner toward the dragon, one tile per filled accumulator.
pub struct ExplorationSystem;

impl ExplorationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExplorationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ExplorationSystem {
    fn name(&self) -> &str {
        "exploration"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        _rng: &mut StreamRng<'_>,
    ) -> Result<()> {
        if !state.global.expedition_active || state.global.expedition_party == 0 {
            return Ok(());
        }

        let work_efficiency = state.global.work_time / 100.0;
        let morale_efficiency = state.global.morale / 100.0;
        let rate = state.global.expedition_party as f64
            * 0.1
            * work_efficiency
            * morale_efficiency
            * (1.0 + state.bonuses.exploration_speed)
            * (1.0 + state.prestige.bonuses().exploration_speed)
            / ctx.speed;

        state.global.exploration_acc += rate;
        if state.global.exploration_acc >= 1.0 {
            if let Some((x, y)) = state.map.next_target() {
                resolve_tile(state, x, y);
            }
            state.global.exploration_acc -= 1.0;
        }
        Ok(())
    }
}

/// Visits one tile: marks it explored, then either fights or loots.
/// Public so action-level tests can drive single encounters directly.
pub fn resolve_tile(state: &mut GameState, x: usize, y: usize) {
    let kind = state.map.tile(x, y).kind;
    let first_visit = !state.map.tile(x, y).explored;
    state.map.tile_mut(x, y).explored = true;
    if first_visit {
        state.map.explored_tiles += 1;
    }
    state.push_event(GameEvent::TileExplored { x, y, kind });

    if kind.is_hostile() {
        resolve_combat(state, x, y);
    } else {
        collect_loot(state, x, y);
    }
}

fn resolve_combat(state: &mut GameState, x: usize, y: usize) {
    if !state.global.monsters_discovered {
        state.global.monsters_discovered = true;
        state.push_event(GameEvent::MonstersDiscovered);
        state.unlock_building(BuildingKind::Barracks);
    }

    let tile = state.map.tile(x, y);
    if tile.defeated {
        return;
    }
    let tile_strength = tile.strength;
    let is_boss = tile.kind == TileKind::Boss;

    if state.combat_strength() >= tile_strength {
        state.map.tile_mut(x, y).defeated = true;
        state.global.monsters_defeated += 1;
        if is_boss {
            state.global.boss_defeated = true;
            state.push_event(GameEvent::BossDefeated);
            if !state.prestige.unlocked {
                state.prestige.unlocked = true;
                state.push_event(GameEvent::PrestigeUnlocked);
            }
            state.prestige.dragons_slain += 1;
        } else {
            state.push_event(GameEvent::CombatVictory { x, y });
        }
        collect_loot(state, x, y);
    } else {
        let explorer_lost = state.global.expedition_party > 0;
        if explorer_lost {
            state.global.expedition_party -= 1;
            state.resources.add(ResourceKind::Peasants, -1.0);
        }
        state.push_event(GameEvent::CombatDefeat {
            x,
            y,
            explorer_lost,
        });
    }
}

fn collect_loot(state: &mut GameState, x: usize, y: usize) {
    let yields = state.map.tile(x, y).yields.clone();
    if yields.is_empty() {
        return;
    }
    let reward_scale = 1.0 + state.bonuses.exploration_rewards;
    let mut any = false;
    for (kind, amount) in yields {
        let gained = (amount * reward_scale).floor();
        if gained > 0.0 {
            state.resources.add(kind, gained);
            any = true;
        }
    }
    if any {
        state.push_event(GameEvent::LootCollected { x, y });
    }
}
