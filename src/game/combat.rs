use rand::Rng;

use crate::game::npc::Npc;
use crate::game::player::Player;
use crate::msg::types::AttackResult;
use crate::rules::ZoneConfig;

const BASE_DAMAGE: i32 = 5;
const DAMAGE_PER_LEVEL: i32 = 2;
const HIT_CHANCE_PERCENT: i32 = 95;
const VARIANCE_MIN: i32 = -2;
const VARIANCE_MAX: i32 = 5;

pub const RESULT_SUCCESS: u8 = 0;
pub const RESULT_OUT_OF_RANGE: u8 = 1;
pub const RESULT_NOT_OWNER: u8 = 2;
pub const RESULT_TARGET_DEAD: u8 = 5;

/// Resolves one attack against an NPC target (spec §4.6). Returns the result
/// and whether the target died, so the caller can chain death handling.
pub fn resolve_attack(
    attacker: &Player,
    target: &mut Npc,
    target_name: &str,
    zone: &ZoneConfig,
) -> (AttackResult, bool) {
    if !target.is_alive {
        return (
            AttackResult {
                attacker_id: attacker.character_id,
                target_id: target.npc_id,
                damage: 0,
                was_hit: false,
                remaining_hp: 0,
                result_code: RESULT_TARGET_DEAD,
                message: format!("{target_name} is already dead"),
            },
            false,
        );
    }

    let distance = attacker.position.distance(target.position);
    if distance > zone.max_attack_range {
        return (
            AttackResult {
                attacker_id: attacker.character_id,
                target_id: target.npc_id,
                damage: 0,
                was_hit: false,
                remaining_hp: target.current_hp,
                result_code: RESULT_OUT_OF_RANGE,
                message: "Target out of range".to_string(),
            },
            false,
        );
    }

    let mut rng = rand::thread_rng();
    let hit_roll = rng.gen_range(1..=100);
    if hit_roll > HIT_CHANCE_PERCENT {
        return (
            AttackResult {
                attacker_id: attacker.character_id,
                target_id: target.npc_id,
                damage: 0,
                was_hit: false,
                remaining_hp: target.current_hp,
                result_code: RESULT_SUCCESS,
                message: format!("You miss {target_name}"),
            },
            false,
        );
    }

    let base_damage = BASE_DAMAGE + DAMAGE_PER_LEVEL * attacker.level as i32;
    let strength_bonus = attacker.stats.strength / 10;
    let variance = rng.gen_range(VARIANCE_MIN..=VARIANCE_MAX);
    let damage = (base_damage + strength_bonus + variance).max(1);

    target.current_hp -= damage;
    let mut died = false;
    let mut message = format!("You hit {target_name} for {damage} damage");
    if target.current_hp <= 0 {
        target.current_hp = 0;
        died = true;
        message.push_str(&format!(" — {target_name} has been slain!"));
    }

    (
        AttackResult {
            attacker_id: attacker.character_id,
            target_id: target.npc_id,
            damage,
            was_hit: true,
            remaining_hp: target.current_hp,
            result_code: RESULT_SUCCESS,
            message,
        },
        died,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::Vec3;
    use crate::persistence::npc_repo::{NpcSpawnPoint, NpcTemplate};

    fn test_npc(hp: i32) -> Npc {
        let template = NpcTemplate {
            npc_id: 1,
            name: "Rat".to_string(),
            level: 1,
            archetype: "vermin".to_string(),
            hp,
            ac: 0,
            min_damage: 1,
            max_damage: 2,
            faction_id: 0,
            loot_table_id: 0,
            visual_id: String::new(),
            is_social: false,
            can_flee: false,
            is_roamer: false,
            aggro_radius: 10.0,
            assist_radius: 10.0,
        };
        let point = NpcSpawnPoint {
            spawn_id: 1,
            npc_id: 1,
            pos_x: 10.0,
            pos_y: 0.0,
            pos_z: 0.0,
            heading: 0.0,
            respawn_seconds: 120,
            respawn_variance_seconds: 0,
            spawn_group: String::new(),
        };
        Npc::spawn(1, &template, &point)
    }

    // 1. Attacking an NPC already dead always returns result code 5.
    #[test]
    fn attacking_dead_npc_returns_target_dead() {
        let attacker = Player::new(1, 1, 1);
        let mut npc = test_npc(50);
        npc.is_alive = false;
        let (result, died) = resolve_attack(&attacker, &mut npc, "Rat", &ZoneConfig::new(1, "z".to_string()));
        assert_eq!(result.result_code, RESULT_TARGET_DEAD);
        assert!(!died);
    }

    // 2. An out-of-range target returns code 1 with zero damage.
    #[test]
    fn out_of_range_returns_code_one() {
        let mut attacker = Player::new(1, 1, 1);
        attacker.position = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
        let mut npc = test_npc(50);
        npc.position = Vec3 { x: 300.0, y: 0.0, z: 0.0 };
        let (result, died) =
            resolve_attack(&attacker, &mut npc, "Rat", &ZoneConfig::new(1, "z".to_string()));
        assert_eq!(result.result_code, RESULT_OUT_OF_RANGE);
        assert_eq!(result.damage, 0);
        assert!(!died);
    }

    // 3. Lethal damage clamps hp to zero and reports death.
    #[test]
    fn lethal_hit_clamps_hp_to_zero() {
        let mut attacker = Player::new(1, 1, 1);
        attacker.level = 50;
        attacker.stats.strength = 100;
        attacker.position = Vec3 { x: 10.0, y: 0.0, z: 0.0 };
        let mut npc = test_npc(1);
        // Force a guaranteed hit by running many trials is unnecessary here —
        // damage floor at level 50/str 100 is 5+100+10-2=113, far above hp=1,
        // so any hit (95% of trials) kills; run until one hits.
        let mut died_once = false;
        for _ in 0..200 {
            npc.current_hp = 1;
            npc.is_alive = true;
            let (result, died) =
                resolve_attack(&attacker, &mut npc, "Rat", &ZoneConfig::new(1, "z".to_string()));
            if died {
                assert_eq!(result.remaining_hp, 0);
                assert!(result.message.contains("slain"));
                died_once = true;
                break;
            }
        }
        assert!(died_once, "expected at least one hit in 200 trials at 95% hit chance");
    }

    // 4. Damage is always at least 1 even with a minimal attacker.
    #[test]
    fn damage_floor_is_one() {
        let mut attacker = Player::new(1, 1, 1);
        attacker.level = 1;
        attacker.stats.strength = 0;
        attacker.position = Vec3 { x: 10.0, y: 0.0, z: 0.0 };
        let mut npc = test_npc(1000);
        for _ in 0..50 {
            let (result, _) =
                resolve_attack(&attacker, &mut npc, "Rat", &ZoneConfig::new(1, "z".to_string()));
            if result.was_hit {
                assert!(result.damage >= 1);
            }
        }
    }
}
