use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resources::{bundle, ResourceBundle, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Campfire,
    WoodenHut,
    Granary,
    Lumberyard,
    HerbGarden,
    Quarry,
    Workshop,
    Library,
    Market,
    Temple,
    Barracks,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 11] = [
        BuildingKind::Campfire,
        BuildingKind::WoodenHut,
        BuildingKind::Granary,
        BuildingKind::Lumberyard,
        BuildingKind::HerbGarden,
        BuildingKind::Quarry,
        BuildingKind::Workshop,
        BuildingKind::Library,
        BuildingKind::Market,
        BuildingKind::Temple,
        BuildingKind::Barracks,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BuildingKind::Campfire => "Campfire",
            BuildingKind::WoodenHut => "Wooden Hut",
            BuildingKind::Granary => "Granary",
            BuildingKind::Lumberyard => "Lumberyard",
            BuildingKind::HerbGarden => "Herb Garden",
            BuildingKind::Quarry => "Quarry",
            BuildingKind::Workshop => "Workshop",
            BuildingKind::Library => "Library",
            BuildingKind::Market => "Market",
            BuildingKind::Temple => "Temple",
            BuildingKind::Barracks => "Barracks",
        }
    }

    pub fn base_cost(&self) -> ResourceBundle {
        match self {
            BuildingKind::Campfire => bundle(&[(ResourceKind::Wood, 10.0)]),
            BuildingKind::WoodenHut => bundle(&[(ResourceKind::Wood, 100.0)]),
            BuildingKind::Granary => {
                bundle(&[(ResourceKind::Wood, 50.0), (ResourceKind::Food, 25.0)])
            }
            BuildingKind::Lumberyard => bundle(&[(ResourceKind::Wood, 75.0)]),
            BuildingKind::HerbGarden => {
                bundle(&[(ResourceKind::Wood, 40.0), (ResourceKind::Herbs, 10.0)])
            }
            BuildingKind::Quarry => {
                bundle(&[(ResourceKind::Wood, 150.0), (ResourceKind::Food, 50.0)])
            }
            BuildingKind::Workshop => {
                bundle(&[(ResourceKind::Wood, 200.0), (ResourceKind::Stone, 25.0)])
            }
            BuildingKind::Library => {
                bundle(&[(ResourceKind::Wood, 300.0), (ResourceKind::Stone, 50.0)])
            }
            BuildingKind::Market => bundle(&[
                (ResourceKind::Wood, 400.0),
                (ResourceKind::Food, 100.0),
                (ResourceKind::Stone, 50.0),
            ]),
            BuildingKind::Temple => bundle(&[
                (ResourceKind::Wood, 500.0),
                (ResourceKind::Stone, 100.0),
                (ResourceKind::Knowledge, 25.0),
            ]),
            BuildingKind::Barracks => bundle(&[
                (ResourceKind::Wood, 250.0),
                (ResourceKind::Stone, 75.0),
                (ResourceKind::Iron, 25.0),
            ]),
        }
    }

    pub fn max_owned(&self) -> u32 {
        10
    }
}

/// Cost inflation per copy built. Applied to the stored (undiscounted)
/// cost and rounded per resource, matching the display numbers players see.
pub const COST_GROWTH: f64 = 1.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingState {
    #[serde(default)]
    pub owned: u32,
    #[serde(default)]
    pub cost: ResourceBundle,
    #[serde(default)]
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Buildings {
    entries: BTreeMap<BuildingKind, BuildingState>,
}

impl Buildings {
    /// Only the campfire is available at the start of a run; everything
    /// else unlocks through milestones or discoveries.
    pub fn starting() -> Self {
        let entries = BuildingKind::ALL
            .iter()
            .map(|kind| {
                (
                    *kind,
                    BuildingState {
                        owned: 0,
                        cost: kind.base_cost(),
                        unlocked: *kind == BuildingKind::Campfire,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn state(&self, kind: BuildingKind) -> &BuildingState {
        &self.entries[&kind]
    }

    pub fn state_mut(&mut self, kind: BuildingKind) -> &mut BuildingState {
        self.entries
            .get_mut(&kind)
            .expect("building table holds every kind")
    }

    pub fn owned(&self, kind: BuildingKind) -> u32 {
        self.state(kind).owned
    }

    pub fn total_owned(&self) -> u32 {
        self.entries.values().map(|state| state.owned).sum()
    }

    pub fn unlock(&mut self, kind: BuildingKind) -> bool {
        let state = self.state_mut(kind);
        if state.unlocked {
            false
        } else {
            state.unlocked = true;
            true
        }
    }

    /// Inflates the stored cost after a purchase.
    pub fn grow_cost(&mut self, kind: BuildingKind) {
        let state = self.state_mut(kind);
        for amount in state.cost.values_mut() {
            *amount = (*amount * COST_GROWTH).round();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BuildingKind, &BuildingState)> {
        self.entries.iter()
    }
}

/// Cost after construction and legacy discounts, rounded up per resource.
/// Discounts stack multiplicatively and never push a price below zero.
pub fn discounted_cost(
    cost: &ResourceBundle,
    research_reduction: f64,
    legacy_reduction: f64,
) -> ResourceBundle {
    let factor = (1.0 - research_reduction).max(0.0) * (1.0 - legacy_reduction).max(0.0);
    cost.iter()
        .map(|(kind, amount)| (*kind, (amount * factor).ceil()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_growth_rounds_per_resource() {
        let mut buildings = Buildings::starting();
        buildings.grow_cost(BuildingKind::Campfire);
        assert_eq!(
            buildings.state(BuildingKind::Campfire).cost[&ResourceKind::Wood],
            11.0
        );
        buildings.grow_cost(BuildingKind::Campfire);
        assert_eq!(
            buildings.state(BuildingKind::Campfire).cost[&ResourceKind::Wood],
            12.0
        );
    }

    #[test]
    fn discounts_stack_and_round_up() {
        let cost = bundle(&[(ResourceKind::Wood, 100.0)]);
        let discounted = discounted_cost(&cost, 0.15, 0.05);
        // 100 * 0.85 * 0.95 = 80.75, rounded up.
        assert_eq!(discounted[&ResourceKind::Wood], 81.0);
    }
}
