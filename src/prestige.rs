use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Legacy upgrades bought with the points earned by resetting a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyKind {
    ResourceHeadstart,
    VeteranWorkers,
    ExperiencedExplorers,
    BattleHardened,
    ExpandedSettlement,
    EfficientDesigns,
    FamousVillage,
    DragonslayerLegacy,
    AncientKnowledge,
}

pub struct LegacyDef {
    pub base_cost: u64,
    pub cost_scale: f64,
    pub max_level: u32,
    pub effect_value: f64,
}

impl LegacyKind {
    pub const ALL: [LegacyKind; 9] = [
        LegacyKind::ResourceHeadstart,
        LegacyKind::VeteranWorkers,
        LegacyKind::ExperiencedExplorers,
        LegacyKind::BattleHardened,
        LegacyKind::ExpandedSettlement,
        LegacyKind::EfficientDesigns,
        LegacyKind::FamousVillage,
        LegacyKind::DragonslayerLegacy,
        LegacyKind::AncientKnowledge,
    ];

    pub fn def(&self) -> LegacyDef {
        match self {
            LegacyKind::ResourceHeadstart => LegacyDef {
                base_cost: 5,
                cost_scale: 1.5,
                max_level: 5,
                effect_value: 50.0,
            },
            LegacyKind::VeteranWorkers => LegacyDef {
                base_cost: 10,
                cost_scale: 1.6,
                max_level: 10,
                effect_value: 0.10,
            },
            LegacyKind::ExperiencedExplorers => LegacyDef {
                base_cost: 8,
                cost_scale: 1.5,
                max_level: 10,
                effect_value: 0.10,
            },
            LegacyKind::BattleHardened => LegacyDef {
                base_cost: 8,
                cost_scale: 1.5,
                max_level: 10,
                effect_value: 0.10,
            },
            LegacyKind::ExpandedSettlement => LegacyDef {
                base_cost: 10,
                cost_scale: 1.5,
                max_level: 10,
                effect_value: 5.0,
            },
            LegacyKind::EfficientDesigns => LegacyDef {
                base_cost: 15,
                cost_scale: 1.8,
                max_level: 5,
                effect_value: 0.05,
            },
            LegacyKind::FamousVillage => LegacyDef {
                base_cost: 8,
                cost_scale: 1.5,
                max_level: 10,
                effect_value: 0.10,
            },
            LegacyKind::DragonslayerLegacy => LegacyDef {
                base_cost: 50,
                cost_scale: 1.0,
                max_level: 1,
                effect_value: 0.0,
            },
            LegacyKind::AncientKnowledge => LegacyDef {
                base_cost: 20,
                cost_scale: 2.0,
                max_level: 4,
                effect_value: 1.0,
            },
        }
    }
}

/// Run-start bonuses derived from legacy levels. Derived on demand so a
/// load or reset can never leave them stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyBonuses {
    pub starting_resources: f64,
    pub production: f64,
    pub exploration_speed: f64,
    pub combat_strength: f64,
    pub population_cap: f64,
    pub cost_reduction: f64,
    pub immigration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestigeState {
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub legacy_points: u64,
    #[serde(default)]
    pub total_legacy_points: u64,
    #[serde(default)]
    pub times_prestiged: u32,
    #[serde(default)]
    pub dragons_slain: u32,
    #[serde(default)]
    pub levels: BTreeMap<LegacyKind, u32>,
}

impl PrestigeState {
    pub fn starting() -> Self {
        Self {
            unlocked: false,
            legacy_points: 0,
            total_legacy_points: 0,
            times_prestiged: 0,
            dragons_slain: 0,
            levels: LegacyKind::ALL.iter().map(|kind| (*kind, 0)).collect(),
        }
    }

    pub fn level(&self, kind: LegacyKind) -> u32 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }

    pub fn next_level_cost(&self, kind: LegacyKind) -> u64 {
        let def = kind.def();
        (def.base_cost as f64 * def.cost_scale.powi(self.level(kind) as i32)).ceil() as u64
    }

    pub fn is_maxed(&self, kind: LegacyKind) -> bool {
        self.level(kind) >= kind.def().max_level
    }

    pub fn bonuses(&self) -> LegacyBonuses {
        let scaled = |kind: LegacyKind| self.level(kind) as f64 * kind.def().effect_value;
        LegacyBonuses {
            starting_resources: scaled(LegacyKind::ResourceHeadstart),
            production: scaled(LegacyKind::VeteranWorkers),
            exploration_speed: scaled(LegacyKind::ExperiencedExplorers),
            combat_strength: scaled(LegacyKind::BattleHardened),
            population_cap: scaled(LegacyKind::ExpandedSettlement),
            cost_reduction: scaled(LegacyKind::EfficientDesigns),
            immigration: scaled(LegacyKind::FamousVillage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_costs_follow_a_geometric_curve() {
        let mut state = PrestigeState::starting();
        assert_eq!(state.next_level_cost(LegacyKind::VeteranWorkers), 10);
        state.levels.insert(LegacyKind::VeteranWorkers, 2);
        // ceil(10 * 1.6^2) = ceil(25.6)
        assert_eq!(state.next_level_cost(LegacyKind::VeteranWorkers), 26);
    }

    #[test]
    fn bonuses_scale_with_level() {
        let mut state = PrestigeState::starting();
        state.levels.insert(LegacyKind::ResourceHeadstart, 3);
        state.levels.insert(LegacyKind::ExpandedSettlement, 2);
        let bonuses = state.bonuses();
        assert_eq!(bonuses.starting_resources, 150.0);
        assert_eq!(bonuses.population_cap, 10.0);
    }
}
