use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hamlet::{
    actions::{self, ActionError},
    buildings::BuildingKind,
    engine::{Engine, EngineBuilder, EngineSettings},
    events::GameEvent,
    jobs::JobKind,
    map::{Tile, TileKind},
    resources::{bundle, ResourceKind},
    state::GameState,
    systems::{resolve_tile, DemographicsSystem, ExplorationSystem, ProductionSystem},
};

fn new_state(seed: u64) -> GameState {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    GameState::new(&mut rng)
}

fn build_engine(seed: u64, speed: f64) -> Engine {
    let settings = EngineSettings {
        seed,
        speed,
        autosave_interval_ticks: 0,
        save_path: PathBuf::from("unused.save"),
    };
    EngineBuilder::new(settings)
        .with_system(ProductionSystem::new())
        .with_system(DemographicsSystem::new())
        .with_system(ExplorationSystem::new())
        .build()
}

fn plant_tile(state: &mut GameState, x: usize, y: usize, kind: TileKind, strength: u32) {
    *state.map.tile_mut(x, y) = Tile {
        kind,
        explored: false,
        defeated: false,
        strength,
        yields: bundle(&[(ResourceKind::Food, 30.0)]),
    };
}

#[test]
fn parties_assemble_launch_and_stay_launched() {
    let mut state = new_state(1);
    state.resources.pool_mut(ResourceKind::Peasants).max = 40.0;
    state.resources.add(ResourceKind::Peasants, 30.0);
    state.check_milestones();
    assert!(state.global.expedition_unlocked);
    assert!(state.jobs.slot(JobKind::Explorer).unlocked);

    actions::assign_job(&mut state, JobKind::Explorer).unwrap();
    actions::join_expedition(&mut state).unwrap();
    assert_eq!(state.global.expedition_party, 1);
    assert_eq!(state.jobs.count(JobKind::Explorer), 0);

    // Party size starts at one.
    assert_eq!(actions::join_expedition(&mut state), Err(ActionError::PartyFull));

    actions::launch_expedition(&mut state).unwrap();
    assert!(state.global.expedition_active);
    assert!(state.events().contains(&GameEvent::ExpeditionLaunched));
    assert_eq!(
        actions::launch_expedition(&mut state),
        Err(ActionError::ExpeditionAlreadyLaunched)
    );

    // Members can still be recalled; the expedition itself cannot.
    actions::leave_expedition(&mut state).unwrap();
    assert_eq!(state.jobs.count(JobKind::Explorer), 1);
    assert_eq!(actions::leave_expedition(&mut state), Err(ActionError::EmptyParty));
}

#[test]
fn expeditions_need_explorers() {
    let mut state = new_state(2);
    assert_eq!(actions::join_expedition(&mut state), Err(ActionError::ExpeditionLocked));
    state.resources.pool_mut(ResourceKind::Peasants).max = 40.0;
    state.resources.add(ResourceKind::Peasants, 30.0);
    state.check_milestones();
    assert_eq!(actions::join_expedition(&mut state), Err(ActionError::NoExplorers));
}

#[test]
fn peaceful_tiles_yield_their_loot() {
    let mut state = new_state(3);
    plant_tile(&mut state, 7, 7, TileKind::Meadow, 0);

    resolve_tile(&mut state, 7, 7);
    assert!(state.map.tile(7, 7).explored);
    assert_eq!(state.map.explored_tiles, 1);
    assert_eq!(state.resources.amount(ResourceKind::Food), 30.0);
    assert!(state.events().contains(&GameEvent::TileExplored {
        x: 7,
        y: 7,
        kind: TileKind::Meadow,
    }));
    assert!(state.events().contains(&GameEvent::LootCollected { x: 7, y: 7 }));
}

#[test]
fn strong_garrisons_clear_monster_dens() {
    let mut state = new_state(4);
    plant_tile(&mut state, 7, 7, TileKind::Monster, 40);
    state.unlock_job(JobKind::Soldier);
    state.jobs.slot_mut(JobKind::Soldier).count = 5;
    assert_eq!(state.combat_strength(), 50);

    resolve_tile(&mut state, 7, 7);
    assert!(state.map.tile(7, 7).defeated);
    assert_eq!(state.global.monsters_defeated, 1);
    assert!(state.global.monsters_discovered);
    // First monster sighting reveals the barracks.
    assert!(state.buildings.state(BuildingKind::Barracks).unlocked);
    assert!(state.events().contains(&GameEvent::MonstersDiscovered));
    assert!(state.events().contains(&GameEvent::CombatVictory { x: 7, y: 7 }));
    assert_eq!(state.resources.amount(ResourceKind::Food), 30.0);
}

#[test]
fn lost_battles_cost_an_explorer() {
    let mut state = new_state(5);
    plant_tile(&mut state, 7, 7, TileKind::Monster, 40);
    state.resources.pool_mut(ResourceKind::Peasants).max = 40.0;
    state.resources.add(ResourceKind::Peasants, 20.0);
    state.unlock_job(JobKind::Soldier);
    state.jobs.slot_mut(JobKind::Soldier).count = 3;
    state.global.expedition_party = 1;

    resolve_tile(&mut state, 7, 7);
    assert!(!state.map.tile(7, 7).defeated);
    assert_eq!(state.global.expedition_party, 0);
    assert_eq!(state.population(), 19);
    assert!(state.events().contains(&GameEvent::CombatDefeat {
        x: 7,
        y: 7,
        explorer_lost: true,
    }));
}

#[test]
fn slaying_the_dragon_opens_the_legacy() {
    let mut state = new_state(6);
    state.unlock_job(JobKind::Soldier);
    state.jobs.slot_mut(JobKind::Soldier).count = 50;
    assert_eq!(state.combat_strength(), 500);

    resolve_tile(&mut state, 0, 0);
    assert!(state.map.boss_defeated());
    assert!(state.global.boss_defeated);
    assert!(state.prestige.unlocked);
    assert_eq!(state.prestige.dragons_slain, 1);
    assert!(state.events().contains(&GameEvent::BossDefeated));
    assert!(state.events().contains(&GameEvent::PrestigeUnlocked));
}

#[test]
fn launched_parties_explore_on_schedule() {
    let mut state = new_state(7);
    plant_tile(&mut state, 7, 7, TileKind::Meadow, 0);
    state.global.expedition_unlocked = true;
    state.global.expedition_party = 1;
    actions::launch_expedition(&mut state).unwrap();

    // One scout covers a tile roughly every 10 seconds.
    let mut engine = build_engine(7, 1.0);
    engine.run(&mut state, 12).unwrap();
    assert_eq!(state.map.explored_tiles, 1);
    assert!(state.map.tile(7, 7).explored);
    assert!(state
        .events()
        .iter()
        .any(|event| matches!(event, GameEvent::TileExplored { x: 7, y: 7, .. })));
}
