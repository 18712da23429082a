//! NPC Template & Spawn Repository (spec §6.3, §6.5). Templates and spawn
//! points are immutable once loaded; a missing spawn file for a zone is
//! explicitly not fatal — the zone simply has no NPCs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NpcTemplate {
    pub npc_id: i32,
    pub name: String,
    pub level: i32,
    pub archetype: String,
    pub hp: i32,
    pub ac: i32,
    pub min_damage: i32,
    pub max_damage: i32,
    #[serde(default)]
    pub faction_id: i32,
    #[serde(default)]
    pub loot_table_id: i32,
    #[serde(default)]
    pub visual_id: String,
    #[serde(default)]
    pub is_social: bool,
    #[serde(default)]
    pub can_flee: bool,
    #[serde(default)]
    pub is_roamer: bool,
    #[serde(default = "default_aggro_radius")]
    pub aggro_radius: f64,
    #[serde(default = "default_assist_radius")]
    pub assist_radius: f64,
}

fn default_aggro_radius() -> f64 {
    10.0
}
fn default_assist_radius() -> f64 {
    15.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NpcSpawnPoint {
    pub spawn_id: i32,
    pub npc_id: i32,
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,
    #[serde(default)]
    pub heading: f64,
    #[serde(default = "default_respawn_seconds")]
    pub respawn_seconds: i32,
    #[serde(default)]
    pub respawn_variance_seconds: i32,
    #[serde(default)]
    pub spawn_group: String,
}

fn default_respawn_seconds() -> i32 {
    120
}

pub trait NpcDataRepository: Send {
    fn load_templates(&mut self, path: &Path) -> bool;
    fn load_zone_spawns(&mut self, path: &Path) -> bool;
    fn template_by_id(&self, npc_id: i32) -> Option<&NpcTemplate>;
    fn all_spawns(&self) -> &[NpcSpawnPoint];
    fn spawn_by_id(&self, spawn_id: i32) -> Option<&NpcSpawnPoint>;
    fn template_count(&self) -> usize;
    fn spawn_count(&self) -> usize;
}

#[derive(Debug, Deserialize)]
struct TemplatesDoc {
    templates: Vec<NpcTemplate>,
}

#[derive(Debug, Deserialize)]
struct SpawnsDoc {
    spawns: Vec<NpcSpawnPoint>,
}

#[derive(Default)]
pub struct FileNpcDataRepository {
    templates: HashMap<i32, NpcTemplate>,
    spawns: Vec<NpcSpawnPoint>,
}

impl FileNpcDataRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NpcDataRepository for FileNpcDataRepository {
    fn load_templates(&mut self, path: &Path) -> bool {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                warn!("[NPC] failed to read templates {}: {e}", path.display());
                return false;
            }
        };
        match serde_json::from_str::<TemplatesDoc>(&text) {
            Ok(doc) => {
                for t in doc.templates {
                    self.templates.insert(t.npc_id, t);
                }
                true
            }
            Err(e) => {
                warn!("[NPC] failed to parse templates {}: {e}", path.display());
                false
            }
        }
    }

    fn load_zone_spawns(&mut self, path: &Path) -> bool {
        if !path.exists() {
            warn!(
                "[NPC] no spawn file at {} — zone will have zero NPCs",
                path.display()
            );
            return false;
        }
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                warn!("[NPC] failed to read spawns {}: {e}", path.display());
                return false;
            }
        };
        match serde_json::from_str::<SpawnsDoc>(&text) {
            Ok(doc) => {
                self.spawns = doc.spawns;
                true
            }
            Err(e) => {
                warn!("[NPC] failed to parse spawns {}: {e}", path.display());
                false
            }
        }
    }

    fn template_by_id(&self, npc_id: i32) -> Option<&NpcTemplate> {
        self.templates.get(&npc_id)
    }

    fn all_spawns(&self) -> &[NpcSpawnPoint] {
        &self.spawns
    }

    fn spawn_by_id(&self, spawn_id: i32) -> Option<&NpcSpawnPoint> {
        self.spawns.iter().find(|s| s.spawn_id == spawn_id)
    }

    fn template_count(&self) -> usize {
        self.templates.len()
    }

    fn spawn_count(&self) -> usize {
        self.spawns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    // 1. Loading templates populates template_by_id lookups.
    #[test]
    fn load_templates_populates_lookup() {
        let path = write_temp(
            "req-zoneserver-templates-test.json",
            r#"{"templates":[{"npc_id":1,"name":"Rat","level":1,"archetype":"vermin","hp":10,"ac":0,"min_damage":1,"max_damage":2}]}"#,
        );
        let mut repo = FileNpcDataRepository::new();
        assert!(repo.load_templates(&path));
        assert_eq!(repo.template_count(), 1);
        assert_eq!(repo.template_by_id(1).unwrap().name, "Rat");
    }

    // 2. A missing spawn file is not fatal — repository is left with zero spawns.
    #[test]
    fn missing_spawn_file_is_not_fatal() {
        let mut repo = FileNpcDataRepository::new();
        let ok = repo.load_zone_spawns(Path::new("/nonexistent/spawns.json"));
        assert!(!ok);
        assert_eq!(repo.spawn_count(), 0);
    }
}
