use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    buildings::{BuildingKind, Buildings},
    events::GameEvent,
    jobs::{JobKind, Jobs},
    map::WorldMap,
    prestige::{LegacyKind, PrestigeState},
    research::{BonusPool, Research},
    resources::{Ledger, ResourceKind},
};

/// Base chance of death per peasant per second once the village is large
/// enough for mortality to kick in.
pub const DEATH_RATE_PER_PEASANT: f64 = 0.001;

/// Population at which deaths start occurring.
pub const DEATH_POPULATION_THRESHOLD: u32 = 20;

/// Food eaten per peasant per second.
pub const FOOD_UPKEEP_PER_PEASANT: f64 = 0.5;

/// Wood burned per campfire per second.
pub const CAMPFIRE_WOOD_PER_SECOND: f64 = 0.5;

/// New arrivals attracted per campfire per second.
pub const IMMIGRATION_PER_CAMPFIRE: f64 = 0.1;

/// Births per second at full free time when idle peasants exist.
pub const BIRTH_RATE_BASE: f64 = 0.1;

/// Production bonus per workshop.
pub const WORKSHOP_BONUS_PER_BUILDING: f64 = 0.10;

/// Morale points per temple.
pub const TEMPLE_MORALE_PER_BUILDING: f64 = 15.0;

/// Combat strength per soldier.
pub const STRENGTH_PER_SOLDIER: f64 = 10.0;

fn default_work_time() -> f64 {
    100.0
}

fn default_morale() -> f64 {
    100.0
}

fn default_campfire_active() -> bool {
    true
}

/// Scalars, flags and fractional accumulators that do not belong to any
/// one registry. Every field carries a serde default so partial saves
/// merge cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Percentage of the day spent working; the remainder is free time.
    #[serde(default = "default_work_time")]
    pub work_time: f64,
    /// 0 to 200. Derived, but persisted so a freshly loaded game shows the
    /// same number it was saved with.
    #[serde(default = "default_morale")]
    pub morale: f64,
    /// Resource the player is gathering by hand, if any.
    #[serde(default)]
    pub gathering: Option<ResourceKind>,
    #[serde(default = "default_campfire_active")]
    pub campfire_active: bool,

    // Fractional event accumulators. Invariant: 0.0 <= acc < 1.0 between
    // ticks; an accumulator crossing 1.0 fires one event and keeps the
    // remainder.
    #[serde(default)]
    pub campfire_acc: f64,
    #[serde(default)]
    pub birth_acc: f64,
    #[serde(default)]
    pub death_acc: f64,
    #[serde(default)]
    pub exploration_acc: f64,

    #[serde(default)]
    pub death_count: u32,
    #[serde(default)]
    pub monsters_defeated: u32,

    #[serde(default)]
    pub expedition_unlocked: bool,
    #[serde(default)]
    pub expedition_party: u32,
    #[serde(default)]
    pub expedition_active: bool,
    #[serde(default)]
    pub max_expedition_party: u32,

    #[serde(default)]
    pub jobs_unlocked: bool,
    #[serde(default)]
    pub research_unlocked: bool,
    #[serde(default)]
    pub monsters_discovered: bool,
    #[serde(default)]
    pub boss_defeated: bool,
    #[serde(default)]
    pub first_death: bool,
    #[serde(default)]
    pub first_child: bool,
}

impl GlobalState {
    pub fn starting() -> Self {
        Self {
            work_time: default_work_time(),
            morale: default_morale(),
            gathering: None,
            campfire_active: default_campfire_active(),
            campfire_acc: 0.0,
            birth_acc: 0.0,
            death_acc: 0.0,
            exploration_acc: 0.0,
            death_count: 0,
            monsters_defeated: 0,
            expedition_unlocked: false,
            expedition_party: 0,
            expedition_active: false,
            max_expedition_party: 1,
            jobs_unlocked: false,
            research_unlocked: false,
            monsters_discovered: false,
            boss_defeated: false,
            first_death: false,
            first_child: false,
        }
    }
}

impl Default for GlobalState {
    fn default() -> Self {
        Self::starting()
    }
}

/// The whole village. Owned by the caller and passed to the engine each
/// run, mirroring how scenarios own their world elsewhere in this family
/// of simulators.
#[derive(Debug)]
pub struct GameState {
    pub resources: Ledger,
    pub buildings: Buildings,
    pub jobs: Jobs,
    pub research: Research,
    pub prestige: PrestigeState,
    pub map: WorldMap,
    pub global: GlobalState,
    /// Rebuilt from the purchased research set; never saved.
    pub bonuses: BonusPool,
    events: Vec<GameEvent>,
    tick: u64,
}

impl GameState {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self::new_run(PrestigeState::starting(), rng)
    }

    /// Fresh run carrying over an existing legacy. Prestige resets route
    /// through here so the run-start bonuses land on clean state.
    pub fn new_run(prestige: PrestigeState, rng: &mut impl Rng) -> Self {
        let mut state = Self {
            resources: Ledger::starting(),
            buildings: Buildings::starting(),
            jobs: Jobs::starting(),
            research: Research::starting(),
            prestige,
            map: WorldMap::generate(rng),
            global: GlobalState::starting(),
            bonuses: BonusPool::default(),
            events: Vec::new(),
            tick: 0,
        };
        state.apply_legacy_start();
        state
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn population(&self) -> u32 {
        self.resources.population()
    }

    pub fn population_cap(&self) -> f64 {
        self.resources.population_cap()
    }

    /// Peasants with a job, counting those away with the expedition.
    pub fn employed(&self) -> u32 {
        self.jobs.total_assigned() + self.global.expedition_party
    }

    pub fn unemployed(&self) -> u32 {
        self.population().saturating_sub(self.employed())
    }

    pub fn workshop_bonus(&self) -> f64 {
        self.buildings.owned(BuildingKind::Workshop) as f64 * WORKSHOP_BONUS_PER_BUILDING
    }

    pub fn temple_bonus(&self) -> f64 {
        self.buildings.owned(BuildingKind::Temple) as f64 * TEMPLE_MORALE_PER_BUILDING
    }

    /// Morale: crowding drags it down past 30 peasants, free time and
    /// temples lift it, capped at 200.
    pub fn update_morale(&mut self) {
        let population = self.population() as f64;
        let crowding_base = if population > 30.0 {
            (100.0 - 2.0 * (population - 30.0)).max(0.0)
        } else {
            100.0
        };
        let free_time_bonus = (100.0 - self.global.work_time) * 0.5;
        let morale = crowding_base + free_time_bonus + self.temple_bonus();
        self.global.morale = morale.min(200.0);
    }

    pub fn recompute_bonuses(&mut self) {
        self.bonuses = self.research.recompute_bonuses();
    }

    /// Output per second for one job type, all multipliers applied.
    pub fn job_production_rate(&self, kind: JobKind) -> f64 {
        let Some((_, per_worker)) = kind.output() else {
            return 0.0;
        };
        let workers = self.jobs.count(kind) as f64;
        let work_efficiency = self.global.work_time / 100.0;
        let morale_efficiency = self.global.morale / 100.0;
        workers
            * per_worker
            * work_efficiency
            * morale_efficiency
            * (1.0 + self.workshop_bonus())
            * (1.0 + self.bonuses.all_production)
            * (1.0 + self.bonuses.job_production(kind))
            * (1.0 + self.prestige.bonuses().production)
    }

    /// Hand-gathering output per second.
    pub fn gathering_rate(&self) -> f64 {
        (1.0 + self.bonuses.gathering_speed) * (1.0 + self.prestige.bonuses().production)
    }

    /// New arrivals per second while the campfire burns.
    pub fn immigration_rate(&self) -> f64 {
        let campfires = self.buildings.owned(BuildingKind::Campfire) as f64;
        if campfires == 0.0 || !self.global.campfire_active {
            return 0.0;
        }
        IMMIGRATION_PER_CAMPFIRE
            * campfires
            * (1.0 + self.bonuses.immigration_rate)
            * (1.0 + self.prestige.bonuses().immigration)
    }

    /// Births per second given current free time, ignoring gating.
    pub fn birth_rate(&self) -> f64 {
        BIRTH_RATE_BASE * (100.0 - self.global.work_time) / 100.0
    }

    /// Deaths per second, herb stores and medicine counted.
    pub fn death_rate(&self) -> f64 {
        let population = self.population();
        if population < DEATH_POPULATION_THRESHOLD {
            return 0.0;
        }
        let base = population as f64 * DEATH_RATE_PER_PEASANT;
        let herb_relief = self.resources.amount(ResourceKind::Herbs) * 0.001;
        (base - herb_relief).max(0.0) * (1.0 - self.bonuses.death_rate_reduction)
    }

    pub fn combat_strength(&self) -> u32 {
        let soldiers = self.jobs.count(JobKind::Soldier) as f64;
        (soldiers
            * STRENGTH_PER_SOLDIER
            * (1.0 + self.bonuses.combat_strength)
            * (1.0 + self.prestige.bonuses().combat_strength))
            .floor() as u32
    }

    /// Population and stockpile milestones. Safe to call every tick; each
    /// unlock fires once because the unlocked flags latch.
    pub fn check_milestones(&mut self) {
        let population = self.population();

        if population >= 1 && !self.global.jobs_unlocked {
            self.global.jobs_unlocked = true;
            self.unlock_job(JobKind::Farmer);
            self.unlock_job(JobKind::Woodcutter);
        }
        if population >= 10 {
            self.unlock_building(BuildingKind::WoodenHut);
        }
        if population >= 30 && !self.global.expedition_unlocked {
            self.global.expedition_unlocked = true;
            self.unlock_job(JobKind::Explorer);
        }
        if population >= 40 && self.unlock_building(BuildingKind::Quarry) {
            self.push_event(GameEvent::ResourceRevealed(ResourceKind::Stone));
        }
        if population >= 50 {
            self.unlock_building(BuildingKind::Workshop);
        }
        if population >= 75 && self.unlock_building(BuildingKind::Library) {
            self.push_event(GameEvent::ResourceRevealed(ResourceKind::Knowledge));
        }
        if population >= 100 && self.unlock_building(BuildingKind::Market) {
            self.push_event(GameEvent::ResourceRevealed(ResourceKind::Gold));
        }
        if population >= 150 {
            self.unlock_building(BuildingKind::Temple);
        }

        if self.resources.amount(ResourceKind::Food) >= 100.0 {
            self.unlock_building(BuildingKind::Granary);
        }
        if self.resources.amount(ResourceKind::Wood) >= 100.0 {
            self.unlock_building(BuildingKind::Lumberyard);
        }
        if self.resources.amount(ResourceKind::Herbs) >= 50.0 {
            self.unlock_building(BuildingKind::HerbGarden);
        }
    }

    /// Returns true when this call performed the unlock.
    pub fn unlock_building(&mut self, kind: BuildingKind) -> bool {
        if self.buildings.unlock(kind) {
            self.push_event(GameEvent::BuildingUnlocked(kind));
            true
        } else {
            false
        }
    }

    pub fn unlock_job(&mut self, kind: JobKind) -> bool {
        let slot = self.jobs.slot_mut(kind);
        if slot.unlocked {
            false
        } else {
            slot.unlocked = true;
            self.push_event(GameEvent::JobUnlocked(kind));
            true
        }
    }

    /// Applies run-start legacy bonuses. A no-op until levels are bought.
    pub fn apply_legacy_start(&mut self) {
        let bonuses = self.prestige.bonuses();
        if bonuses.starting_resources > 0.0 {
            self.resources.pool_mut(ResourceKind::Food).owned = bonuses.starting_resources;
            self.resources.pool_mut(ResourceKind::Wood).owned = bonuses.starting_resources;
        }
        if bonuses.population_cap > 0.0 {
            self.resources.pool_mut(ResourceKind::Peasants).max += bonuses.population_cap;
        }
        if self.prestige.level(LegacyKind::DragonslayerLegacy) > 0 {
            for kind in [
                ResourceKind::Food,
                ResourceKind::Wood,
                ResourceKind::Stone,
                ResourceKind::Herbs,
                ResourceKind::Iron,
            ] {
                self.resources.pool_mut(kind).owned += 100.0;
            }
            self.resources.pool_mut(ResourceKind::Peasants).max += 20.0;
        }
        let ancient = self.prestige.level(LegacyKind::AncientKnowledge);
        if ancient > 0 {
            use crate::research::ResearchKind;
            for kind in ResearchKind::TIER_ONE.iter().take(ancient as usize) {
                self.research.node_mut(*kind).unlocked = true;
            }
        }
    }
}
