use anyhow::Result;

use crate::{
    buildings::BuildingKind,
    engine::{System, SystemContext},
    events::GameEvent,
    jobs::JobKind,
    resources::ResourceKind,
    rng::StreamRng,
    state::{GameState, CAMPFIRE_WOOD_PER_SECOND, FOOD_UPKEEP_PER_PEASANT},
};

/// Per-tick resource flows: hand gathering, job output, campfire fuel and
/// food upkeep. Runs before demographics so arrivals and deaths see the
/// tick's updated stockpiles.
pub struct ProductionSystem;

impl ProductionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProductionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProductionSystem {
    fn name(&self) -> &str {
        "production"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        _rng: &mut StreamRng<'_>,
    ) -> Result<()> {
        let speed = ctx.speed;

        if let Some(target) = state.global.gathering {
            let amount = state.gathering_rate() / speed;
            state.resources.add(target, amount);
        }

        for kind in JobKind::ALL {
            let Some((resource, _)) = kind.output() else {
                continue;
            };
            if state.jobs.count(kind) == 0 {
                continue;
            }
            let amount = state.job_production_rate(kind) / speed;
            state.resources.add(resource, amount);
        }

        tend_campfire(state, speed);

        // Upkeep tracks the raw pool, so hand-recruited fractions eat too.
        let peasants = state.resources.amount(ResourceKind::Peasants);
        if peasants > 0.0 {
            let upkeep = peasants * FOOD_UPKEEP_PER_PEASANT / speed;
            state.resources.pool_mut(ResourceKind::Food).add(-upkeep);
        }

        state.check_milestones();
        Ok(())
    }
}

/// Campfires burn wood while any is left; the flame dies with the stock
/// and relights as soon as wood comes back.
fn tend_campfire(state: &mut GameState, speed: f64) {
    let campfires = state.buildings.owned(BuildingKind::Campfire);
    if campfires == 0 {
        return;
    }
    let wood = state.resources.amount(ResourceKind::Wood);
    if wood > 0.0 {
        if !state.global.campfire_active {
            state.global.campfire_active = true;
            state.push_event(GameEvent::CampfireLit);
        }
        let burn = campfires as f64 * CAMPFIRE_WOOD_PER_SECOND / speed;
        state.resources.pool_mut(ResourceKind::Wood).add(-burn);
    } else if state.global.campfire_active {
        state.global.campfire_active = false;
        state.push_event(GameEvent::CampfireDied);
    }
}
