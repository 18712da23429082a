use tracing::info;

use crate::game::player::{Player, Vec3};
use crate::game::zone::{Corpse, ZoneState};
use crate::persistence::{Character, CharacterRepository};
use crate::rules::{WorldRules, XpTable};
use crate::systems::progression;

/// Applies death consequences to a player: XP loss/de-level, corpse creation,
/// and an immediate save (spec §4.7). Swallows a save failure — death still
/// takes effect even if the write fails, matching the catch-log-continue
/// persistence boundary used everywhere else.
pub fn handle_player_death(
    zone: &mut ZoneState,
    character_id: u32,
    world_id: u32,
    repo: &dyn CharacterRepository,
    world_rules: &WorldRules,
    xp_table: &XpTable,
    now: f64,
) {
    info!("[DEATH] ========== PLAYER DEATH BEGIN ({character_id}) ==========");

    let Some(mut character) = repo.load_by_id(character_id) else {
        tracing::error!("[DEATH] character {character_id} not found, cannot process death");
        return;
    };

    progression::apply_death_xp_loss(&mut character.level, &mut character.xp, xp_table, world_rules);

    if world_rules.death.corpse_run_enabled {
        let corpse_id = zone.alloc_corpse_id();
        let position = if let Some(p) = zone.players.get(&character_id) {
            p.position
        } else {
            character.position()
        };
        zone.corpses.insert(
            corpse_id,
            Corpse {
                corpse_id,
                owner_character_id: character_id,
                world_id,
                zone_id: zone.config.zone_id,
                position,
                created_at: now,
                expires_at: now + (world_rules.death.corpse_decay_minutes * 60) as f64,
            },
        );
    }

    character.hp = 0;

    if let Some(player) = zone.players.get_mut(&character_id) {
        player.dead = true;
        player.hp = 0;
        player.level = character.level;
        player.xp = character.xp;
        player.combat_stats_dirty = true;
    }

    if !repo.save(&character) {
        tracing::error!("[DEATH] failed to save character {character_id} after death");
    }

    info!("[DEATH] ========== PLAYER DEATH END ({character_id}) ==========");
}

/// Respawns a dead player at their bind point if it is in this zone, else at
/// the zone's safe spawn (spec §4.7). Cross-zone bind is out of scope.
pub fn respawn_player(
    zone: &mut ZoneState,
    character_id: u32,
    world_id: u32,
    repo: &dyn CharacterRepository,
) {
    let Some(character) = repo.load_by_id(character_id) else {
        tracing::error!("[RESPAWN] character {character_id} not found");
        return;
    };

    let (position, yaw) = if character.has_bind_in(world_id, zone.config.zone_id) {
        (
            Vec3 {
                x: character.bind_x,
                y: character.bind_y,
                z: character.bind_z,
            },
            0.0,
        )
    } else {
        (
            Vec3 {
                x: zone.config.safe_x,
                y: zone.config.safe_y,
                z: zone.config.safe_z,
            },
            zone.config.safe_yaw,
        )
    };

    let Some(player) = zone.players.get_mut(&character_id) else {
        return;
    };
    player.spawn_at(position, yaw);
    player.hp = character.max_hp;
    player.max_hp = character.max_hp;
    player.mana = character.max_mana;
    player.max_mana = character.max_mana;
    player.dead = false;
    player.dirty = true;

    info!("[RESPAWN] character {character_id} respawned at ({:.1},{:.1},{:.1})", position.x, position.y, position.z);
}

/// Once-per-second corpse sweep (spec §4.7, invariant I6).
pub fn sweep_corpses(zone: &mut ZoneState, now: f64) {
    let removed = zone.sweep_expired_corpses(now);
    for id in removed {
        info!("[CORPSE] corpse {id} expired and was removed");
    }
}

pub fn player_snapshot_for_save(player: &Player) -> (Vec3, f64) {
    (player.position, player.yaw_degrees)
}

/// Applies the (position, combat-stat) fields a save needs onto a freshly
/// loaded character record, matching the upstream's "position always updates,
/// combat stats only if dirty" rule (spec's Persistence Gate, §2).
pub fn merge_into_character(character: &mut Character, player: &Player, world_id: u32, zone_id: u32) {
    character.last_world_id = world_id;
    character.last_zone_id = zone_id;
    character.position_x = player.position.x;
    character.position_y = player.position.y;
    character.position_z = player.position.z;
    character.heading = player.yaw_degrees;
    if player.combat_stats_dirty {
        character.level = player.level;
        character.xp = player.xp;
        character.hp = player.hp;
        character.max_hp = player.max_hp;
        character.mana = player.mana;
        character.max_mana = player.max_mana;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::FileCharacterRepository;
    use crate::rules::ZoneConfig;

    fn test_character(id: u32, level: u32, xp: u64) -> Character {
        Character {
            character_id: id,
            account_id: 1,
            name: "Test".to_string(),
            race: "Human".to_string(),
            character_class: "Warrior".to_string(),
            level,
            xp,
            hp: 100,
            max_hp: 100,
            mana: 50,
            max_mana: 50,
            strength: 75,
            stamina: 75,
            agility: 75,
            dexterity: 75,
            intelligence: 75,
            wisdom: 75,
            charisma: 75,
            home_world_id: 1,
            last_world_id: 1,
            last_zone_id: 10,
            position_x: 5.0,
            position_y: 5.0,
            position_z: 0.0,
            heading: 0.0,
            bind_world_id: -1,
            bind_zone_id: -1,
            bind_x: 0.0,
            bind_y: 0.0,
            bind_z: 0.0,
            inventory_slots: Vec::new(),
        }
    }

    fn table() -> XpTable {
        crate::rules::load_xp_table_from_str(
            r#"{"levels":[{"level":1,"total_xp":0},{"level":2,"total_xp":100},{"level":3,"total_xp":300}]}"#,
        )
        .unwrap()
    }

    // 1. Death with corpse_run_enabled creates exactly one corpse with the configured lifetime.
    #[test]
    fn death_creates_corpse_with_configured_decay() {
        let dir = std::env::temp_dir().join(format!("req-zoneserver-death-test-{}", std::process::id()));
        let repo = FileCharacterRepository::new(&dir);
        repo.save(&test_character(1, 3, 450));

        let mut zone = ZoneState::new(ZoneConfig::new(10, "Test".to_string()));
        zone.players.insert(1, Player::new(1, 1, 1));

        let mut rules = WorldRules::default();
        rules.death.xp_loss_min_level = 3;
        rules.death.xp_loss_multiplier = 0.5;
        rules.death.corpse_decay_minutes = 30;

        handle_player_death(&mut zone, 1, 1, &repo, &rules, &table(), 1000.0);

        assert_eq!(zone.corpses.len(), 1);
        let corpse = zone.corpses.values().next().unwrap();
        assert_eq!(corpse.expires_at - corpse.created_at, 1800.0);

        let saved = repo.load_by_id(1).unwrap();
        assert_eq!(saved.xp, 375);
        let _ = std::fs::remove_dir_all(&dir);
    }

    // 2. Respawn without a matching bind point goes to zone safe spawn.
    #[test]
    fn respawn_without_bind_uses_safe_spawn() {
        let dir = std::env::temp_dir().join(format!("req-zoneserver-respawn-test-{}", std::process::id()));
        let repo = FileCharacterRepository::new(&dir);
        repo.save(&test_character(2, 1, 0));

        let mut config = ZoneConfig::new(10, "Test".to_string());
        config.safe_x = 7.0;
        config.safe_y = 8.0;
        let mut zone = ZoneState::new(config);
        let mut player = Player::new(2, 1, 1);
        player.dead = true;
        zone.players.insert(2, player);

        respawn_player(&mut zone, 2, 1, &repo);

        let player = zone.players.get(&2).unwrap();
        assert!(!player.dead);
        assert_eq!(player.position.x, 7.0);
        assert_eq!(player.position.y, 8.0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    // 3. Respawn with a matching bind point uses the bind position instead.
    #[test]
    fn respawn_with_matching_bind_uses_bind_point() {
        let dir = std::env::temp_dir().join(format!("req-zoneserver-respawn-bind-test-{}", std::process::id()));
        let repo = FileCharacterRepository::new(&dir);
        let mut character = test_character(3, 1, 0);
        character.bind_world_id = 1;
        character.bind_zone_id = 10;
        character.bind_x = 99.0;
        repo.save(&character);

        let zone_config = ZoneConfig::new(10, "Test".to_string());
        let mut zone = ZoneState::new(zone_config);
        zone.players.insert(3, Player::new(3, 1, 1));

        respawn_player(&mut zone, 3, 1, &repo);

        let player = zone.players.get(&3).unwrap();
        assert_eq!(player.position.x, 99.0);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
