use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resources::{bundle, ResourceBundle, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchKind {
    // Tier 1
    BetterTools,
    EfficientGathering,
    BasicMedicine,
    Cartography,
    // Tier 2
    IronTools,
    Agriculture,
    Forestry,
    Geology,
    AdvancedMedicine,
    Navigation,
    // Tier 3
    SteelForging,
    CropRotation,
    MilitaryTactics,
    TradeRoutes,
    Philosophy,
    Architecture,
    // Tier 4
    Industrialization,
    Diplomacy,
    WarMachines,
    Enlightenment,
    MasterBuilders,
}

/// Additive bonus targets. Research effects and display formulas address
/// these instead of string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusKind {
    FarmerProduction,
    WoodcutterProduction,
    HerbalistProduction,
    MinerProduction,
    ScholarProduction,
    MerchantProduction,
    AllProduction,
    GatheringSpeed,
    ExplorationSpeed,
    ExplorationRewards,
    CombatStrength,
    DeathRateReduction,
    BuildingCostReduction,
    ResearchCostReduction,
    ImmigrationRate,
}

impl ResearchKind {
    pub const ALL: [ResearchKind; 21] = [
        ResearchKind::BetterTools,
        ResearchKind::EfficientGathering,
        ResearchKind::BasicMedicine,
        ResearchKind::Cartography,
        ResearchKind::IronTools,
        ResearchKind::Agriculture,
        ResearchKind::Forestry,
        ResearchKind::Geology,
        ResearchKind::AdvancedMedicine,
        ResearchKind::Navigation,
        ResearchKind::SteelForging,
        ResearchKind::CropRotation,
        ResearchKind::MilitaryTactics,
        ResearchKind::TradeRoutes,
        ResearchKind::Philosophy,
        ResearchKind::Architecture,
        ResearchKind::Industrialization,
        ResearchKind::Diplomacy,
        ResearchKind::WarMachines,
        ResearchKind::Enlightenment,
        ResearchKind::MasterBuilders,
    ];

    pub const TIER_ONE: [ResearchKind; 4] = [
        ResearchKind::BetterTools,
        ResearchKind::EfficientGathering,
        ResearchKind::BasicMedicine,
        ResearchKind::Cartography,
    ];

    pub fn tier(&self) -> u8 {
        use ResearchKind::*;
        match self {
            BetterTools | EfficientGathering | BasicMedicine | Cartography => 1,
            IronTools | Agriculture | Forestry | Geology | AdvancedMedicine | Navigation => 2,
            SteelForging | CropRotation | MilitaryTactics | TradeRoutes | Philosophy
            | Architecture => 3,
            Industrialization | Diplomacy | WarMachines | Enlightenment | MasterBuilders => 4,
        }
    }

    pub fn effects(&self) -> &'static [(BonusKind, f64)] {
        use BonusKind::*;
        use ResearchKind::*;
        match self {
            BetterTools => &[(FarmerProduction, 0.25), (WoodcutterProduction, 0.25)],
            EfficientGathering => &[(GatheringSpeed, 0.5)],
            BasicMedicine => &[(HerbalistProduction, 0.25)],
            Cartography => &[(ExplorationSpeed, 0.25)],
            IronTools => &[(AllProduction, 0.1)],
            Agriculture => &[(FarmerProduction, 0.5)],
            Forestry => &[(WoodcutterProduction, 0.5)],
            Geology => &[(MinerProduction, 0.5)],
            AdvancedMedicine => &[(DeathRateReduction, 0.25)],
            Navigation => &[(ExplorationRewards, 0.5)],
            SteelForging => &[(AllProduction, 0.15)],
            CropRotation => &[(FarmerProduction, 1.0)],
            MilitaryTactics => &[(CombatStrength, 0.25)],
            TradeRoutes => &[(MerchantProduction, 0.5)],
            Philosophy => &[(ScholarProduction, 0.5)],
            Architecture => &[(BuildingCostReduction, 0.15)],
            Industrialization => &[(AllProduction, 0.25)],
            Diplomacy => &[(ImmigrationRate, 0.5)],
            WarMachines => &[(CombatStrength, 0.5)],
            Enlightenment => &[(ResearchCostReduction, 0.25)],
            MasterBuilders => &[(BuildingCostReduction, 0.25)],
        }
    }

    /// Upgrades that must be purchased before this one becomes available.
    /// Tier-one entries instead unlock with the first library.
    pub fn requires(&self) -> &'static [ResearchKind] {
        use ResearchKind::*;
        match self {
            BetterTools | EfficientGathering | BasicMedicine | Cartography => &[],
            IronTools => &[BetterTools],
            Agriculture => &[BetterTools],
            Forestry => &[BetterTools],
            Geology => &[EfficientGathering],
            AdvancedMedicine => &[BasicMedicine],
            Navigation => &[Cartography],
            SteelForging => &[IronTools],
            CropRotation => &[Agriculture],
            MilitaryTactics => &[IronTools],
            TradeRoutes => &[Navigation],
            Philosophy => &[AdvancedMedicine],
            Architecture => &[Geology],
            Industrialization => &[SteelForging],
            Diplomacy => &[TradeRoutes],
            WarMachines => &[MilitaryTactics],
            Enlightenment => &[Philosophy],
            MasterBuilders => &[Architecture],
        }
    }

    pub fn cost(&self) -> ResourceBundle {
        use ResearchKind::*;
        use ResourceKind::*;
        match self {
            BetterTools => bundle(&[(Knowledge, 25.0), (Wood, 50.0)]),
            EfficientGathering => bundle(&[(Knowledge, 25.0)]),
            BasicMedicine => bundle(&[(Knowledge, 25.0), (Herbs, 20.0)]),
            Cartography => bundle(&[(Knowledge, 25.0), (Wood, 30.0)]),
            IronTools => bundle(&[(Knowledge, 75.0), (Iron, 25.0)]),
            Agriculture => bundle(&[(Knowledge, 75.0), (Food, 100.0)]),
            Forestry => bundle(&[(Knowledge, 75.0), (Wood, 150.0)]),
            Geology => bundle(&[(Knowledge, 75.0), (Stone, 50.0)]),
            AdvancedMedicine => bundle(&[(Knowledge, 75.0), (Herbs, 40.0)]),
            Navigation => bundle(&[(Knowledge, 75.0), (Gold, 25.0)]),
            SteelForging => bundle(&[(Knowledge, 200.0), (Iron, 75.0)]),
            CropRotation => bundle(&[(Knowledge, 200.0), (Food, 200.0)]),
            MilitaryTactics => bundle(&[(Knowledge, 200.0), (Iron, 50.0)]),
            TradeRoutes => bundle(&[(Knowledge, 200.0), (Gold, 100.0)]),
            Philosophy => bundle(&[(Knowledge, 200.0)]),
            Architecture => bundle(&[(Knowledge, 200.0), (Stone, 150.0)]),
            Industrialization => bundle(&[(Knowledge, 500.0), (Iron, 150.0)]),
            Diplomacy => bundle(&[(Knowledge, 500.0), (Gold, 200.0)]),
            WarMachines => bundle(&[(Knowledge, 500.0), (Iron, 200.0)]),
            Enlightenment => bundle(&[(Knowledge, 500.0)]),
            MasterBuilders => bundle(&[(Knowledge, 500.0), (Stone, 300.0)]),
        }
    }
}

/// Sum of every purchased research effect. Never persisted; rebuilt from
/// the purchased set after loads and resets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BonusPool {
    pub farmer_production: f64,
    pub woodcutter_production: f64,
    pub herbalist_production: f64,
    pub miner_production: f64,
    pub scholar_production: f64,
    pub merchant_production: f64,
    pub all_production: f64,
    pub gathering_speed: f64,
    pub exploration_speed: f64,
    pub exploration_rewards: f64,
    pub combat_strength: f64,
    pub death_rate_reduction: f64,
    pub building_cost_reduction: f64,
    pub research_cost_reduction: f64,
    pub immigration_rate: f64,
}

impl BonusPool {
    fn apply(&mut self, kind: BonusKind, value: f64) {
        let slot = match kind {
            BonusKind::FarmerProduction => &mut self.farmer_production,
            BonusKind::WoodcutterProduction => &mut self.woodcutter_production,
            BonusKind::HerbalistProduction => &mut self.herbalist_production,
            BonusKind::MinerProduction => &mut self.miner_production,
            BonusKind::ScholarProduction => &mut self.scholar_production,
            BonusKind::MerchantProduction => &mut self.merchant_production,
            BonusKind::AllProduction => &mut self.all_production,
            BonusKind::GatheringSpeed => &mut self.gathering_speed,
            BonusKind::ExplorationSpeed => &mut self.exploration_speed,
            BonusKind::ExplorationRewards => &mut self.exploration_rewards,
            BonusKind::CombatStrength => &mut self.combat_strength,
            BonusKind::DeathRateReduction => &mut self.death_rate_reduction,
            BonusKind::BuildingCostReduction => &mut self.building_cost_reduction,
            BonusKind::ResearchCostReduction => &mut self.research_cost_reduction,
            BonusKind::ImmigrationRate => &mut self.immigration_rate,
        };
        *slot += value;
    }

    pub fn job_production(&self, kind: crate::jobs::JobKind) -> f64 {
        use crate::jobs::JobKind;
        match kind {
            JobKind::Farmer => self.farmer_production,
            JobKind::Woodcutter => self.woodcutter_production,
            JobKind::Herbalist => self.herbalist_production,
            JobKind::Miner => self.miner_production,
            JobKind::Scholar => self.scholar_production,
            JobKind::Merchant => self.merchant_production,
            JobKind::Explorer | JobKind::Soldier => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchNode {
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Research {
    nodes: BTreeMap<ResearchKind, ResearchNode>,
}

impl Research {
    pub fn starting() -> Self {
        let nodes = ResearchKind::ALL
            .iter()
            .map(|kind| {
                (
                    *kind,
                    ResearchNode {
                        purchased: false,
                        unlocked: false,
                    },
                )
            })
            .collect();
        Self { nodes }
    }

    pub fn node(&self, kind: ResearchKind) -> &ResearchNode {
        &self.nodes[&kind]
    }

    pub fn node_mut(&mut self, kind: ResearchKind) -> &mut ResearchNode {
        self.nodes
            .get_mut(&kind)
            .expect("research table holds every kind")
    }

    pub fn is_purchased(&self, kind: ResearchKind) -> bool {
        self.node(kind).purchased
    }

    pub fn purchased_count(&self) -> u32 {
        self.nodes.values().filter(|node| node.purchased).count() as u32
    }

    /// Opens the first tier. Called when the first library is built and by
    /// the AncientKnowledge legacy bonus (which unlocks a prefix of it).
    pub fn unlock_tier_one(&mut self) {
        for kind in ResearchKind::TIER_ONE {
            self.node_mut(kind).unlocked = true;
        }
    }

    /// Unlocks every node whose prerequisites are all purchased. Returns
    /// the nodes that flipped this call.
    pub fn refresh_unlocks(&mut self) -> Vec<ResearchKind> {
        let mut newly = Vec::new();
        for kind in ResearchKind::ALL {
            if kind.tier() == 1 {
                continue;
            }
            if self.node(kind).unlocked {
                continue;
            }
            let ready = kind
                .requires()
                .iter()
                .all(|req| self.node(*req).purchased);
            if ready {
                self.node_mut(kind).unlocked = true;
                newly.push(kind);
            }
        }
        newly
    }

    pub fn recompute_bonuses(&self) -> BonusPool {
        let mut pool = BonusPool::default();
        for (kind, node) in &self.nodes {
            if node.purchased {
                for (bonus, value) in kind.effects() {
                    pool.apply(*bonus, *value);
                }
            }
        }
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prerequisites_gate_later_tiers() {
        let mut research = Research::starting();
        research.unlock_tier_one();
        assert!(!research.node(ResearchKind::IronTools).unlocked);
        research.node_mut(ResearchKind::BetterTools).purchased = true;
        let newly = research.refresh_unlocks();
        assert!(newly.contains(&ResearchKind::IronTools));
        assert!(newly.contains(&ResearchKind::Agriculture));
        assert!(!research.node(ResearchKind::SteelForging).unlocked);
    }

    #[test]
    fn bonuses_sum_across_purchases() {
        let mut research = Research::starting();
        research.node_mut(ResearchKind::IronTools).purchased = true;
        research.node_mut(ResearchKind::SteelForging).purchased = true;
        let pool = research.recompute_bonuses();
        assert!((pool.all_production - 0.25).abs() < 1e-9);
    }

    #[test]
    fn better_tools_boosts_both_gathering_jobs() {
        let mut research = Research::starting();
        research.node_mut(ResearchKind::BetterTools).purchased = true;
        let pool = research.recompute_bonuses();
        assert!((pool.farmer_production - 0.25).abs() < 1e-9);
        assert!((pool.woodcutter_production - 0.25).abs() < 1e-9);
    }
}
