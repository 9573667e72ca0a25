use crate::{
    buildings::BuildingKind, jobs::JobKind, map::TileKind, research::ResearchKind,
    resources::ResourceKind,
};

/// Things the simulation wants the presentation layer to know about.
/// The core never renders anything; it queues these and the caller drains
/// them after each batch of ticks or actions.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BuildingUnlocked(BuildingKind),
    /// `first` marks a building's debut purchase so the caller can show
    /// its one-time story beat.
    BuildingConstructed { kind: BuildingKind, first: bool },
    JobUnlocked(JobKind),
    ResearchTierUnlocked(u8),
    ResearchCompleted(ResearchKind),
    CampfireLit,
    CampfireDied,
    PeasantArrived,
    PeasantTurnedAway,
    ChildBorn { first: bool },
    PeasantDied { job: Option<JobKind> },
    ExpeditionLaunched,
    TileExplored { x: usize, y: usize, kind: TileKind },
    LootCollected { x: usize, y: usize },
    MonstersDiscovered,
    CombatVictory { x: usize, y: usize },
    CombatDefeat { x: usize, y: usize, explorer_lost: bool },
    BossDefeated,
    PrestigeUnlocked,
    PrestigeCompleted { points: u64 },
    ResourceRevealed(ResourceKind),
}
