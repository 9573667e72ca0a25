use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Everything a village can stockpile. Peasants live in the ledger too,
/// as a pooled resource with a housing cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Food,
    Wood,
    Stone,
    Knowledge,
    Gold,
    Herbs,
    Iron,
    Peasants,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Food,
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Knowledge,
        ResourceKind::Gold,
        ResourceKind::Herbs,
        ResourceKind::Iron,
        ResourceKind::Peasants,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Food => "Food",
            ResourceKind::Wood => "Wood",
            ResourceKind::Stone => "Stone",
            ResourceKind::Knowledge => "Knowledge",
            ResourceKind::Gold => "Gold",
            ResourceKind::Herbs => "Herbs",
            ResourceKind::Iron => "Iron",
            ResourceKind::Peasants => "Peasants",
        }
    }
}

/// A stockpile entry. `max < 0` means unbounded storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    #[serde(default)]
    pub owned: f64,
    #[serde(default = "unbounded_max")]
    pub max: f64,
}

fn unbounded_max() -> f64 {
    -1.0
}

impl ResourcePool {
    pub fn capped(max: f64) -> Self {
        Self { owned: 0.0, max }
    }

    pub fn unbounded() -> Self {
        Self {
            owned: 0.0,
            max: -1.0,
        }
    }

    pub fn is_capped(&self) -> bool {
        self.max >= 0.0
    }

    /// Adds and clamps against the cap. Negative amounts are allowed and
    /// clamp at zero instead.
    pub fn add(&mut self, amount: f64) {
        self.owned += amount;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        if self.owned < 0.0 {
            self.owned = 0.0;
        }
        if self.is_capped() && self.owned > self.max {
            self.owned = self.max;
        }
    }
}

/// A bundle of resource amounts, used for building costs, research costs
/// and exploration loot.
pub type ResourceBundle = BTreeMap<ResourceKind, f64>;

pub fn bundle(entries: &[(ResourceKind, f64)]) -> ResourceBundle {
    entries.iter().copied().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<ResourceKind, ResourcePool>,
}

impl Ledger {
    /// Fresh-run stockpiles: everything empty, base caps in place,
    /// knowledge and gold uncapped.
    pub fn starting() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(ResourceKind::Food, ResourcePool::capped(100.0));
        entries.insert(ResourceKind::Wood, ResourcePool::capped(100.0));
        entries.insert(ResourceKind::Stone, ResourcePool::capped(100.0));
        entries.insert(ResourceKind::Knowledge, ResourcePool::unbounded());
        entries.insert(ResourceKind::Gold, ResourcePool::unbounded());
        entries.insert(ResourceKind::Herbs, ResourcePool::capped(50.0));
        entries.insert(ResourceKind::Iron, ResourcePool::capped(100.0));
        entries.insert(ResourceKind::Peasants, ResourcePool::capped(10.0));
        Self { entries }
    }

    pub fn pool(&self, kind: ResourceKind) -> &ResourcePool {
        &self.entries[&kind]
    }

    pub fn pool_mut(&mut self, kind: ResourceKind) -> &mut ResourcePool {
        self.entries
            .get_mut(&kind)
            .expect("ledger holds every resource kind")
    }

    pub fn amount(&self, kind: ResourceKind) -> f64 {
        self.pool(kind).owned
    }

    pub fn add(&mut self, kind: ResourceKind, amount: f64) {
        self.pool_mut(kind).add(amount);
    }

    /// Integer population, which is what every population threshold and
    /// upkeep formula works with.
    pub fn population(&self) -> u32 {
        self.amount(ResourceKind::Peasants).floor().max(0.0) as u32
    }

    pub fn population_cap(&self) -> f64 {
        self.pool(ResourceKind::Peasants).max
    }

    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        cost.iter().all(|(kind, amount)| self.amount(*kind) >= *amount)
    }

    /// Deducts a bundle. Callers check affordability first; this clamps at
    /// zero rather than going negative if they did not.
    pub fn spend(&mut self, cost: &ResourceBundle) {
        for (kind, amount) in cost {
            self.pool_mut(*kind).add(-amount);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, &ResourcePool)> {
        self.entries.iter()
    }
}
