use std::collections::HashMap;

use crate::game::npc::Npc;
use crate::game::player::{Player, Vec3};
use crate::rules::ZoneConfig;

pub struct Corpse {
    pub corpse_id: u32,
    pub owner_character_id: u32,
    pub world_id: u32,
    pub zone_id: u32,
    pub position: Vec3,
    pub created_at: f64,
    pub expires_at: f64,
}

/// Owns every piece of authoritative state for one zone: players, NPCs, and
/// corpses. Exclusively mutated from the zone task (spec §5).
pub struct ZoneState {
    pub config: ZoneConfig,
    pub players: HashMap<u32, Player>,
    pub npcs: HashMap<u32, Npc>,
    pub corpses: HashMap<u32, Corpse>,
    next_npc_id: u32,
    next_corpse_id: u32,
}

impl ZoneState {
    pub fn new(config: ZoneConfig) -> Self {
        Self {
            config,
            players: HashMap::new(),
            npcs: HashMap::new(),
            corpses: HashMap::new(),
            next_npc_id: 1,
            next_corpse_id: 1,
        }
    }

    pub fn alloc_npc_id(&mut self) -> u32 {
        let id = self.next_npc_id;
        self.next_npc_id += 1;
        id
    }

    pub fn alloc_corpse_id(&mut self) -> u32 {
        let id = self.next_corpse_id;
        self.next_corpse_id += 1;
        id
    }

    /// Removes a player and every trace of them from NPC hate tables (spec §4.10,
    /// steps 2-4; the save itself is the caller's responsibility since it is
    /// fallible and must be attempted even if this call is a no-op).
    pub fn remove_player(&mut self, character_id: u32) -> Option<Player> {
        let player = self.players.remove(&character_id);
        for npc in self.npcs.values_mut() {
            npc.hate.remove(&character_id);
            if npc.target == Some(character_id) {
                npc.target = None;
            }
        }
        player
    }

    pub fn sweep_expired_corpses(&mut self, now: f64) -> Vec<u32> {
        let expired: Vec<u32> = self
            .corpses
            .iter()
            .filter(|(_, c)| now >= c.expires_at)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.corpses.remove(id);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_zone() -> ZoneState {
        ZoneState::new(ZoneConfig::new(1, "Test".to_string()))
    }

    // 1. Removing a player purges it from every NPC's hate table (invariant backing §4.10).
    #[test]
    fn remove_player_purges_hate_tables() {
        let mut zone = test_zone();
        zone.players.insert(1, Player::new(1, 1, 1));
        let mut npc = Npc::spawn(
            1,
            &crate::persistence::npc_repo::NpcTemplate {
                npc_id: 1,
                name: "x".to_string(),
                level: 1,
                archetype: "x".to_string(),
                hp: 10,
                ac: 0,
                min_damage: 1,
                max_damage: 1,
                faction_id: 0,
                loot_table_id: 0,
                visual_id: String::new(),
                is_social: false,
                can_flee: false,
                is_roamer: false,
                aggro_radius: 1.0,
                assist_radius: 1.0,
            },
            &crate::persistence::npc_repo::NpcSpawnPoint {
                spawn_id: 1,
                npc_id: 1,
                pos_x: 0.0,
                pos_y: 0.0,
                pos_z: 0.0,
                heading: 0.0,
                respawn_seconds: 1,
                respawn_variance_seconds: 0,
                spawn_group: String::new(),
            },
        );
        npc.add_hate(1, 5);
        npc.target = Some(1);
        zone.npcs.insert(1, npc);

        zone.remove_player(1);

        let npc = zone.npcs.get(&1).unwrap();
        assert!(!npc.hate.contains_key(&1));
        assert_eq!(npc.target, None);
    }

    // 2. Corpse sweep removes exactly the expired corpses (invariant I6).
    #[test]
    fn sweep_removes_only_expired_corpses() {
        let mut zone = test_zone();
        zone.corpses.insert(
            1,
            Corpse {
                corpse_id: 1,
                owner_character_id: 1,
                world_id: 1,
                zone_id: 1,
                position: Vec3::default(),
                created_at: 0.0,
                expires_at: 100.0,
            },
        );
        zone.corpses.insert(
            2,
            Corpse {
                corpse_id: 2,
                owner_character_id: 2,
                world_id: 1,
                zone_id: 1,
                position: Vec3::default(),
                created_at: 0.0,
                expires_at: 200.0,
            },
        );
        let removed = zone.sweep_expired_corpses(150.0);
        assert_eq!(removed, vec![1]);
        assert!(zone.corpses.contains_key(&2));
    }
}
