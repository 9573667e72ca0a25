use anyhow::Result;
use rand::Rng;

use crate::{
    buildings::BuildingKind,
    engine::{System, SystemContext},
    events::GameEvent,
    jobs::JobKind,
    resources::ResourceKind,
    rng::StreamRng,
    state::{GameState, DEATH_POPULATION_THRESHOLD},
};

/// Population flows: campfire immigration, births and deaths, each driven
/// by a fractional accumulator that fires one whole-peasant event when it
/// crosses 1.0 and keeps the remainder.
pub struct DemographicsSystem;

impl DemographicsSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DemographicsSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DemographicsSystem {
    fn name(&self) -> &str {
        "demographics"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        rng: &mut StreamRng<'_>,
    ) -> Result<()> {
        state.update_morale();
        handle_immigration(state, ctx.speed);
        handle_births(state, ctx.speed);
        handle_deaths(state, ctx.speed, rng);
        state.check_milestones();
        Ok(())
    }
}

fn handle_immigration(state: &mut GameState, speed: f64) {
    if state.buildings.owned(BuildingKind::Campfire) == 0 || !state.global.campfire_active {
        return;
    }
    let cap = state.population_cap();
    if cap >= 0.0 && state.population() as f64 >= cap {
        state.global.campfire_acc = 0.0;
        return;
    }

    state.global.campfire_acc += state.immigration_rate() / speed;
    if state.global.campfire_acc < 1.0 {
        return;
    }

    // No food: the stranger moves on and the progress resets to zero
    // rather than keeping a remainder.
    if state.resources.amount(ResourceKind::Food) <= 0.0 {
        state.global.campfire_acc = 0.0;
        state.push_event(GameEvent::PeasantTurnedAway);
        return;
    }

    state.global.campfire_acc -= 1.0;
    state.resources.add(ResourceKind::Peasants, 1.0);
    state.push_event(GameEvent::PeasantArrived);
    state.update_morale();
}

fn handle_births(state: &mut GameState, speed: f64) {
    let population = state.population();
    let below_cap = (population as f64) < state.population_cap();
    if state.unemployed() == 0 || !below_cap {
        state.global.birth_acc = 0.0;
        return;
    }

    state.global.birth_acc += state.birth_rate() / speed;
    if state.global.birth_acc < 1.0 {
        return;
    }

    state.global.birth_acc -= 1.0;
    state.resources.add(ResourceKind::Peasants, 1.0);
    let first = !state.global.first_child;
    state.global.first_child = true;
    state.push_event(GameEvent::ChildBorn { first });
    state.update_morale();
}

fn handle_deaths(state: &mut GameState, speed: f64, rng: &mut impl Rng) {
    let population = state.population();
    if population < DEATH_POPULATION_THRESHOLD {
        state.global.death_acc = 0.0;
        return;
    }

    state.global.death_acc += state.death_rate() / speed;
    if state.global.death_acc < 1.0 {
        return;
    }
    state.global.death_acc -= 1.0;

    state.resources.add(ResourceKind::Peasants, -1.0);
    state.global.death_count += 1;

    if !state.global.first_death {
        state.global.first_death = true;
    }
    if state.global.death_count == 10 && state.unlock_job(JobKind::Herbalist) {
        state.push_event(GameEvent::ResourceRevealed(ResourceKind::Herbs));
    }

    let job = pick_victim_job(state, population, rng);
    if let Some(kind) = job {
        state.jobs.slot_mut(kind).count -= 1;
    }
    state.push_event(GameEvent::PeasantDied { job });
    state.update_morale();
}

/// Decides whether the death strikes the workforce and, if so, which job
/// loses a worker. The employed/unemployed split is weighted by headcount;
/// the job pick among occupied rosters is uniform.
fn pick_victim_job(state: &GameState, population: u32, rng: &mut impl Rng) -> Option<JobKind> {
    let employed = state.employed();
    let unemployed = population.saturating_sub(employed);

    let affects_employed = if employed > 0 && unemployed > 0 {
        rng.gen_bool((employed as f64 / population as f64).min(1.0))
    } else {
        employed > 0
    };
    if !affects_employed {
        return None;
    }

    let occupied = state.jobs.occupied();
    if occupied.is_empty() {
        // Every employed peasant is away with the expedition; nobody on
        // the roster can be removed.
        return None;
    }
    Some(occupied[rng.gen_range(0..occupied.len())])
}
