//! Save-slot codec: the whole game is one base64 blob wrapping a JSON
//! document. Loading is tolerant so blobs written by older releases still
//! open: sections merge key by key over fresh defaults and unknown keys
//! are skipped rather than rejected.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
    buildings::BuildingKind,
    jobs::JobKind,
    prestige::LegacyKind,
    research::ResearchKind,
    resources::ResourceKind,
    state::{GameState, GlobalState},
};

pub const SAVE_VERSION: u64 = 3;

/// Oldest blob layout still accepted.
pub const OLDEST_SUPPORTED_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save blob is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("save blob does not contain valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save data has no version field")]
    MissingVersion,
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct SaveData<'a> {
    version: u64,
    timestamp: DateTime<Utc>,
    resources: &'a crate::resources::Ledger,
    buildings: &'a crate::buildings::Buildings,
    jobs: &'a crate::jobs::Jobs,
    research: &'a crate::research::Research,
    prestige: &'a crate::prestige::PrestigeState,
    global: &'a GlobalState,
    map: &'a crate::map::WorldMap,
}

pub fn encode_state(state: &GameState) -> Result<String, SaveError> {
    let data = SaveData {
        version: SAVE_VERSION,
        timestamp: Utc::now(),
        resources: &state.resources,
        buildings: &state.buildings,
        jobs: &state.jobs,
        research: &state.research,
        prestige: &state.prestige,
        global: &state.global,
        map: &state.map,
    };
    let json = serde_json::to_vec(&data)?;
    Ok(BASE64.encode(json))
}

/// Rebuilds a game from a blob. The RNG only matters when the blob
/// predates map persistence; a fresh map is generated in that case.
pub fn decode_state(blob: &str, rng: &mut impl Rng) -> Result<GameState, SaveError> {
    let bytes = BASE64.decode(blob.trim())?;
    let doc: Value = serde_json::from_slice(&bytes)?;

    let version = doc
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(SaveError::MissingVersion)?;
    if !(OLDEST_SUPPORTED_VERSION..=SAVE_VERSION).contains(&version) {
        return Err(SaveError::UnsupportedVersion(version));
    }

    let mut state = GameState::new(rng);

    if let Some(section) = doc.get("resources").and_then(Value::as_object) {
        for (key, value) in section {
            let Some(kind) = parse_key::<ResourceKind>(key) else {
                continue;
            };
            if let Ok(pool) = serde_json::from_value(value.clone()) {
                *state.resources.pool_mut(kind) = pool;
            }
        }
    }

    if let Some(section) = doc.get("buildings").and_then(Value::as_object) {
        for (key, value) in section {
            let Some(kind) = parse_key::<BuildingKind>(key) else {
                continue;
            };
            if let Ok(entry) = serde_json::from_value::<crate::buildings::BuildingState>(
                value.clone(),
            ) {
                let slot = state.buildings.state_mut(kind);
                *slot = entry;
                if slot.cost.is_empty() {
                    slot.cost = kind.base_cost();
                }
            }
        }
    }

    if let Some(section) = doc.get("jobs").and_then(Value::as_object) {
        for (key, value) in section {
            let Some(kind) = parse_key::<JobKind>(key) else {
                continue;
            };
            if let Ok(slot) = serde_json::from_value(value.clone()) {
                *state.jobs.slot_mut(kind) = slot;
            }
        }
    }

    if let Some(section) = doc.get("research").and_then(Value::as_object) {
        for (key, value) in section {
            let Some(kind) = parse_key::<ResearchKind>(key) else {
                continue;
            };
            if let Ok(node) = serde_json::from_value(value.clone()) {
                *state.research.node_mut(kind) = node;
            }
        }
    }

    if let Some(section) = doc.get("global") {
        if let Ok(global) = serde_json::from_value::<GlobalState>(section.clone()) {
            state.global = global;
        }
    }

    if let Some(section) = doc.get("prestige").and_then(Value::as_object) {
        merge_prestige(&mut state.prestige, section);
    }

    if let Some(section) = doc.get("map") {
        if let Ok(map) = serde_json::from_value::<crate::map::WorldMap>(section.clone()) {
            if map.tiles.len() == map.height && map.tiles.iter().all(|row| row.len() == map.width)
            {
                state.map = map;
            }
        }
    }
    state.map.explored_tiles = state
        .map
        .tiles
        .iter()
        .flatten()
        .filter(|tile| tile.explored)
        .count() as u32;

    // Derived values are never trusted from the blob.
    state.recompute_bonuses();
    state.research.refresh_unlocks();
    state.update_morale();
    Ok(state)
}

fn parse_key<K: DeserializeOwned>(key: &str) -> Option<K> {
    serde_json::from_value(Value::String(key.to_string())).ok()
}

fn merge_prestige(prestige: &mut crate::prestige::PrestigeState, section: &serde_json::Map<String, Value>) {
    if let Some(v) = section.get("unlocked").and_then(Value::as_bool) {
        prestige.unlocked = v;
    }
    if let Some(v) = section.get("legacy_points").and_then(Value::as_u64) {
        prestige.legacy_points = v;
    }
    if let Some(v) = section.get("total_legacy_points").and_then(Value::as_u64) {
        prestige.total_legacy_points = v;
    }
    if let Some(v) = section.get("times_prestiged").and_then(Value::as_u64) {
        prestige.times_prestiged = v as u32;
    }
    if let Some(v) = section.get("dragons_slain").and_then(Value::as_u64) {
        prestige.dragons_slain = v as u32;
    }
    if let Some(levels) = section.get("levels").and_then(Value::as_object) {
        for (key, value) in levels {
            let Some(kind) = parse_key::<LegacyKind>(key) else {
                continue;
            };
            if let Some(level) = value.as_u64() {
                prestige.levels.insert(kind, level as u32);
            }
        }
    }
}

pub fn write_save(path: &Path, state: &GameState) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let blob = encode_state(state)?;
    fs::write(path, blob)?;
    Ok(())
}

pub fn read_save(path: &Path, rng: &mut impl Rng) -> Result<GameState, SaveError> {
    let blob = fs::read_to_string(path)?;
    decode_state(&blob, rng)
}

/// Writes the save slot on a fixed tick interval during engine runs.
pub struct SaveWriter {
    path: PathBuf,
    interval_ticks: u64,
}

impl SaveWriter {
    pub fn new(path: &Path, interval_ticks: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            interval_ticks,
        }
    }

    pub fn maybe_write(&self, state: &GameState) -> Result<Option<PathBuf>, SaveError> {
        if self.interval_ticks == 0 {
            return Ok(None);
        }
        if state.tick() % self.interval_ticks != 0 {
            return Ok(None);
        }
        write_save(&self.path, state)?;
        Ok(Some(self.path.clone()))
    }
}
