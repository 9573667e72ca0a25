//! Player-facing operations. Each one validates against current state,
//! applies its effects synchronously and queues any story events; nothing
//! here advances time.

use rand::Rng;
use thiserror::Error;

use crate::{
    buildings::{discounted_cost, BuildingKind},
    events::GameEvent,
    jobs::JobKind,
    prestige::LegacyKind,
    research::ResearchKind,
    resources::{ResourceBundle, ResourceKind},
    state::GameState,
};

#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("{} is not unlocked yet", .0.label())]
    BuildingLocked(BuildingKind),
    #[error("{} is already at its build limit", .0.label())]
    BuildingMaxed(BuildingKind),
    #[error("not enough resources")]
    InsufficientResources,
    #[error("the {} job is not unlocked yet", .0.label())]
    JobLocked(JobKind),
    #[error("no idle peasants available")]
    NoIdlePeasants,
    #[error("no {} to remove", .0.label())]
    NoWorkers(JobKind),
    #[error("work time must be between 0 and 100, got {0}")]
    InvalidWorkTime(f64),
    #[error("research is not available yet")]
    ResearchUnavailable,
    #[error("{0:?} has not been unlocked")]
    ResearchLocked(ResearchKind),
    #[error("{0:?} is already complete")]
    ResearchAlreadyComplete(ResearchKind),
    #[error("expeditions are not available yet")]
    ExpeditionLocked,
    #[error("the expedition party is full")]
    PartyFull,
    #[error("no explorers available to assign")]
    NoExplorers,
    #[error("the expedition party is empty")]
    EmptyParty,
    #[error("the expedition has already set out")]
    ExpeditionAlreadyLaunched,
    #[error("the legacy of the dragonslayer has not been earned")]
    PrestigeLocked,
    #[error("{0:?} is already at max level")]
    LegacyMaxed(LegacyKind),
    #[error("need {need} legacy points, have {have}")]
    NotEnoughLegacyPoints { need: u64, have: u64 },
    #[error("the dragon still lives")]
    DragonNotSlain,
    #[error("this run has earned no legacy points")]
    NoLegacyToClaim,
}

/// Cost of the next copy of a building, all discounts applied.
pub fn building_price(state: &GameState, kind: BuildingKind) -> ResourceBundle {
    discounted_cost(
        &state.buildings.state(kind).cost,
        state.bonuses.building_cost_reduction,
        state.prestige.bonuses().cost_reduction,
    )
}

pub fn purchase_building(state: &mut GameState, kind: BuildingKind) -> Result<(), ActionError> {
    let entry = state.buildings.state(kind);
    if !entry.unlocked {
        return Err(ActionError::BuildingLocked(kind));
    }
    if entry.owned >= kind.max_owned() {
        return Err(ActionError::BuildingMaxed(kind));
    }
    let price = building_price(state, kind);
    if !state.resources.can_afford(&price) {
        return Err(ActionError::InsufficientResources);
    }

    state.resources.spend(&price);
    let entry = state.buildings.state_mut(kind);
    entry.owned += 1;
    let first = entry.owned == 1;
    state.buildings.grow_cost(kind);
    state.push_event(GameEvent::BuildingConstructed { kind, first });

    apply_building_effects(state, kind, first);
    Ok(())
}

fn apply_building_effects(state: &mut GameState, kind: BuildingKind, first: bool) {
    match kind {
        BuildingKind::Campfire => {}
        BuildingKind::WoodenHut => {
            state.resources.pool_mut(ResourceKind::Peasants).max += 10.0;
        }
        BuildingKind::Granary => {
            state.resources.pool_mut(ResourceKind::Food).max += 50.0;
        }
        BuildingKind::Lumberyard => {
            state.resources.pool_mut(ResourceKind::Wood).max += 100.0;
        }
        BuildingKind::HerbGarden => {
            state.resources.pool_mut(ResourceKind::Herbs).max += 75.0;
        }
        BuildingKind::Quarry => {
            state.resources.pool_mut(ResourceKind::Stone).max += 100.0;
            if first {
                state.unlock_job(JobKind::Miner);
            }
        }
        BuildingKind::Workshop => {
            // Bonus is derived from the owned count.
        }
        BuildingKind::Library => {
            if first {
                state.unlock_job(JobKind::Scholar);
                state.global.research_unlocked = true;
                state.research.unlock_tier_one();
                state.push_event(GameEvent::ResearchTierUnlocked(1));
            }
        }
        BuildingKind::Market => {
            if first {
                state.unlock_job(JobKind::Merchant);
            }
        }
        BuildingKind::Temple => {
            state.update_morale();
        }
        BuildingKind::Barracks => {
            if first {
                state.unlock_job(JobKind::Soldier);
            }
        }
    }
}

pub fn assign_job(state: &mut GameState, kind: JobKind) -> Result<(), ActionError> {
    if !state.jobs.slot(kind).unlocked {
        return Err(ActionError::JobLocked(kind));
    }
    if state.unemployed() == 0 {
        return Err(ActionError::NoIdlePeasants);
    }
    state.jobs.slot_mut(kind).count += 1;
    Ok(())
}

pub fn unassign_job(state: &mut GameState, kind: JobKind) -> Result<(), ActionError> {
    let slot = state.jobs.slot_mut(kind);
    if slot.count == 0 {
        return Err(ActionError::NoWorkers(kind));
    }
    slot.count -= 1;
    Ok(())
}

pub fn set_work_time(state: &mut GameState, percentage: f64) -> Result<(), ActionError> {
    if !(0.0..=100.0).contains(&percentage) || !percentage.is_finite() {
        return Err(ActionError::InvalidWorkTime(percentage));
    }
    state.global.work_time = percentage;
    state.update_morale();
    Ok(())
}

/// Start (or stop, with `None`) gathering a resource by hand. Any ledger
/// entry is a valid target; pointing it at peasants recruits them, capped
/// by housing like every arrival.
pub fn set_gathering(state: &mut GameState, target: Option<ResourceKind>) {
    state.global.gathering = target;
}

/// Cost of a research node with discounts applied.
pub fn research_price(state: &GameState, kind: ResearchKind) -> ResourceBundle {
    discounted_cost(
        &kind.cost(),
        state.bonuses.research_cost_reduction,
        state.prestige.bonuses().cost_reduction,
    )
}

pub fn purchase_research(state: &mut GameState, kind: ResearchKind) -> Result<(), ActionError> {
    if !state.global.research_unlocked {
        return Err(ActionError::ResearchUnavailable);
    }
    let node = state.research.node(kind);
    if node.purchased {
        return Err(ActionError::ResearchAlreadyComplete(kind));
    }
    if !node.unlocked {
        return Err(ActionError::ResearchLocked(kind));
    }
    let price = research_price(state, kind);
    if !state.resources.can_afford(&price) {
        return Err(ActionError::InsufficientResources);
    }

    state.resources.spend(&price);
    state.research.node_mut(kind).purchased = true;
    state.recompute_bonuses();
    state.research.refresh_unlocks();
    state.push_event(GameEvent::ResearchCompleted(kind));
    Ok(())
}

pub fn join_expedition(state: &mut GameState) -> Result<(), ActionError> {
    if !state.global.expedition_unlocked {
        return Err(ActionError::ExpeditionLocked);
    }
    if state.global.expedition_party >= state.global.max_expedition_party {
        return Err(ActionError::PartyFull);
    }
    if state.jobs.count(JobKind::Explorer) == 0 {
        return Err(ActionError::NoExplorers);
    }
    state.jobs.slot_mut(JobKind::Explorer).count -= 1;
    state.global.expedition_party += 1;
    Ok(())
}

pub fn leave_expedition(state: &mut GameState) -> Result<(), ActionError> {
    if state.global.expedition_party == 0 {
        return Err(ActionError::EmptyParty);
    }
    state.global.expedition_party -= 1;
    state.jobs.slot_mut(JobKind::Explorer).count += 1;
    Ok(())
}

/// One-way per run: once the party sets out it keeps exploring until the
/// run ends.
pub fn launch_expedition(state: &mut GameState) -> Result<(), ActionError> {
    if state.global.expedition_party == 0 {
        return Err(ActionError::EmptyParty);
    }
    if state.global.expedition_active {
        return Err(ActionError::ExpeditionAlreadyLaunched);
    }
    state.global.expedition_active = true;
    state.push_event(GameEvent::ExpeditionLaunched);
    Ok(())
}

pub fn purchase_legacy_upgrade(state: &mut GameState, kind: LegacyKind) -> Result<(), ActionError> {
    if !state.prestige.unlocked {
        return Err(ActionError::PrestigeLocked);
    }
    if state.prestige.is_maxed(kind) {
        return Err(ActionError::LegacyMaxed(kind));
    }
    let cost = state.prestige.next_level_cost(kind);
    if state.prestige.legacy_points < cost {
        return Err(ActionError::NotEnoughLegacyPoints {
            need: cost,
            have: state.prestige.legacy_points,
        });
    }
    state.prestige.legacy_points -= cost;
    let level = state.prestige.levels.entry(kind).or_insert(0);
    *level += 1;
    Ok(())
}

/// Legacy points the current run would award on reset.
pub fn legacy_points_earned(state: &GameState) -> u64 {
    let mut points = (state.population() / 10) as u64;
    points += state.buildings.total_owned() as u64;
    points += 2 * state.research.purchased_count() as u64;
    points += (state.global.monsters_defeated / 5) as u64;
    if state.global.boss_defeated {
        points += 10;
    }
    points += (state.map.explored_tiles / 10) as u64;
    points
}

/// Resets the run, banking legacy points and regenerating the map. The
/// legacy itself (points, levels, slain dragons) survives.
pub fn perform_prestige(state: &mut GameState, rng: &mut impl Rng) -> Result<u64, ActionError> {
    if !state.global.boss_defeated {
        return Err(ActionError::DragonNotSlain);
    }
    let points = legacy_points_earned(state);
    if points == 0 {
        return Err(ActionError::NoLegacyToClaim);
    }

    let mut prestige = state.prestige.clone();
    prestige.legacy_points += points;
    prestige.total_legacy_points += points;
    prestige.times_prestiged += 1;

    *state = GameState::new_run(prestige, rng);
    state.push_event(GameEvent::PrestigeCompleted { points });
    Ok(points)
}
