use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resources::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Farmer,
    Woodcutter,
    Herbalist,
    Explorer,
    Miner,
    Scholar,
    Merchant,
    Soldier,
}

impl JobKind {
    pub const ALL: [JobKind; 8] = [
        JobKind::Farmer,
        JobKind::Woodcutter,
        JobKind::Herbalist,
        JobKind::Explorer,
        JobKind::Miner,
        JobKind::Scholar,
        JobKind::Merchant,
        JobKind::Soldier,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            JobKind::Farmer => "Farmer",
            JobKind::Woodcutter => "Woodcutter",
            JobKind::Herbalist => "Herbalist",
            JobKind::Explorer => "Explorer",
            JobKind::Miner => "Miner",
            JobKind::Scholar => "Scholar",
            JobKind::Merchant => "Merchant",
            JobKind::Soldier => "Soldier",
        }
    }

    /// Resource output per worker per second of game time. Explorers and
    /// soldiers contribute to expeditions and combat instead.
    pub fn output(&self) -> Option<(ResourceKind, f64)> {
        match self {
            JobKind::Farmer => Some((ResourceKind::Food, 1.0)),
            JobKind::Woodcutter => Some((ResourceKind::Wood, 1.0)),
            JobKind::Herbalist => Some((ResourceKind::Herbs, 1.0)),
            JobKind::Miner => Some((ResourceKind::Stone, 1.0)),
            JobKind::Scholar => Some((ResourceKind::Knowledge, 0.5)),
            JobKind::Merchant => Some((ResourceKind::Gold, 0.25)),
            JobKind::Explorer | JobKind::Soldier => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSlot {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub unlocked: bool,
}

impl JobSlot {
    fn locked() -> Self {
        Self {
            count: 0,
            unlocked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jobs {
    slots: BTreeMap<JobKind, JobSlot>,
}

impl Jobs {
    /// All jobs start locked; Farmer and Woodcutter open up when the first
    /// peasant arrives.
    pub fn starting() -> Self {
        let slots = JobKind::ALL
            .iter()
            .map(|kind| (*kind, JobSlot::locked()))
            .collect();
        Self { slots }
    }

    pub fn slot(&self, kind: JobKind) -> &JobSlot {
        &self.slots[&kind]
    }

    pub fn slot_mut(&mut self, kind: JobKind) -> &mut JobSlot {
        self.slots
            .get_mut(&kind)
            .expect("job table holds every kind")
    }

    pub fn count(&self, kind: JobKind) -> u32 {
        self.slot(kind).count
    }

    /// Workers on the job roster. Expedition party members are counted by
    /// the caller on top of this.
    pub fn total_assigned(&self) -> u32 {
        self.slots.values().map(|slot| slot.count).sum()
    }

    /// Jobs that currently have at least one worker.
    pub fn occupied(&self) -> Vec<JobKind> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.count > 0)
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobKind, &JobSlot)> {
        self.slots.iter()
    }
}
