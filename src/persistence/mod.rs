//! Persisted state: one file-backed implementation per consumed interface in
//! spec §6.3/§6.6. The zone core depends on the trait, not the JSON mechanics,
//! so a future deployment can swap in a different backing store without
//! touching simulation code.

pub mod npc_repo;
pub mod session;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::game::player::{PrimaryStats, Vec3};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Character {
    pub character_id: u32,
    pub account_id: u32,
    pub name: String,
    pub race: String,
    pub character_class: String,
    pub level: u32,
    pub xp: u64,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub strength: i32,
    pub stamina: i32,
    pub agility: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
    pub home_world_id: u32,
    pub last_world_id: u32,
    pub last_zone_id: u32,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    pub heading: f64,
    /// -1 means unset, matching the upstream convention.
    pub bind_world_id: i32,
    pub bind_zone_id: i32,
    pub bind_x: f64,
    pub bind_y: f64,
    pub bind_z: f64,
    #[serde(default)]
    pub inventory_slots: Vec<String>,
}

impl Character {
    pub fn position(&self) -> Vec3 {
        Vec3 {
            x: self.position_x,
            y: self.position_y,
            z: self.position_z,
        }
    }

    pub fn stats(&self) -> PrimaryStats {
        PrimaryStats {
            strength: self.strength,
            stamina: self.stamina,
            agility: self.agility,
            dexterity: self.dexterity,
            intelligence: self.intelligence,
            wisdom: self.wisdom,
            charisma: self.charisma,
        }
    }

    pub fn has_bind_in(&self, world_id: u32, zone_id: u32) -> bool {
        self.bind_world_id >= 0
            && self.bind_zone_id >= 0
            && self.bind_world_id as u32 == world_id
            && self.bind_zone_id as u32 == zone_id
    }
}

/// Load/save by character id. Failures are surfaced as `None`/`false`, never
/// as panics — every call site treats this the same as the upstream
/// try/catch-log-and-swallow persistence boundary (spec §7).
pub trait CharacterRepository: Send {
    fn load_by_id(&self, character_id: u32) -> Option<Character>;
    fn save(&self, character: &Character) -> bool;
}

pub struct FileCharacterRepository {
    dir: PathBuf,
}

impl FileCharacterRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, character_id: u32) -> PathBuf {
        self.dir.join(format!("{character_id}.json"))
    }
}

impl CharacterRepository for FileCharacterRepository {
    fn load_by_id(&self, character_id: u32) -> Option<Character> {
        let path = self.path_for(character_id);
        let text = fs::read_to_string(&path)
            .map_err(|e| error!("[SAVE] failed to read {}: {e}", path.display()))
            .ok()?;
        serde_json::from_str(&text)
            .map_err(|e| error!("[SAVE] failed to parse {}: {e}", path.display()))
            .ok()
    }

    fn save(&self, character: &Character) -> bool {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            error!("[SAVE] failed to create {}: {e}", self.dir.display());
            return false;
        }
        let path = self.path_for(character.character_id);
        let text = match serde_json::to_string_pretty(character) {
            Ok(t) => t,
            Err(e) => {
                error!("[SAVE] failed to serialize character {}: {e}", character.character_id);
                return false;
            }
        };
        match fs::write(&path, text) {
            Ok(()) => true,
            Err(e) => {
                error!("[SAVE] failed to write {}: {e}", path.display());
                false
            }
        }
    }
}

pub fn characters_dir(data_root: &Path) -> PathBuf {
    data_root.join("characters")
}
