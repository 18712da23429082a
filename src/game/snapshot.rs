//! Interest filter and snapshot/entity-event construction (spec §4.9). Pure
//! functions over the zone's current state; the caller owns dispatch to
//! connections and the `snapshot_id` counter.

use crate::game::npc::Npc;
use crate::game::player::Player;
use crate::game::zone::ZoneState;
use crate::msg::types::{EntityUpdate, PlayerSnapshotEntry, PlayerStateSnapshot};

/// Builds the snapshot a given recipient should receive this tick. When
/// `broadcast_full_state` is on, every player is always included; otherwise
/// only players within `interest_radius` (2D) of the recipient are, with the
/// recipient itself always included regardless of distance.
pub fn build_snapshot_for_recipient(
    zone: &ZoneState,
    snapshot_id: u64,
    recipient_character_id: u32,
) -> PlayerStateSnapshot {
    let recipient_pos = zone
        .players
        .get(&recipient_character_id)
        .map(|p| p.position);

    let entries = zone
        .players
        .values()
        .filter(|p| p.initialized)
        .filter(|p| {
            if p.character_id == recipient_character_id {
                return true;
            }
            if zone.config.broadcast_full_state {
                return true;
            }
            match recipient_pos {
                Some(rp) => p.position.distance_xy(rp) <= zone.config.interest_radius,
                None => false,
            }
        })
        .map(player_to_entry)
        .collect();

    PlayerStateSnapshot {
        snapshot_id,
        entries,
    }
}

/// Builds one full-broadcast snapshot shared by every connection — used when
/// `broadcast_full_state` is on, avoiding rebuilding the same list per recipient.
pub fn build_full_snapshot(zone: &ZoneState, snapshot_id: u64) -> PlayerStateSnapshot {
    let entries = zone
        .players
        .values()
        .filter(|p| p.initialized)
        .map(player_to_entry)
        .collect();
    PlayerStateSnapshot {
        snapshot_id,
        entries,
    }
}

fn player_to_entry(p: &Player) -> PlayerSnapshotEntry {
    PlayerSnapshotEntry {
        character_id: p.character_id,
        x: p.position.x,
        y: p.position.y,
        z: p.position.z,
        vx: p.velocity.x,
        vy: p.velocity.y,
        vz: p.velocity.z,
        yaw: p.yaw_degrees,
    }
}

/// Whether `npc` is visible to a recipient at `recipient_pos`, per the same
/// distance rule the player snapshot uses (spec §4.9).
pub fn npc_visible_to(zone: &ZoneState, npc: &Npc, recipient_pos: crate::game::player::Vec3) -> bool {
    zone.config.broadcast_full_state
        || npc.position.distance_xy(recipient_pos) <= zone.config.interest_radius
}

pub fn npc_update_event(npc: &Npc) -> EntityUpdate {
    EntityUpdate {
        entity_id: npc.npc_id,
        x: npc.position.x,
        y: npc.position.y,
        z: npc.position.z,
        hp: npc.current_hp,
        state: npc.ai_state.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ZoneConfig;

    fn zone_with(broadcast_full: bool, radius: f64) -> ZoneState {
        let mut config = ZoneConfig::new(1, "Test".to_string());
        config.broadcast_full_state = broadcast_full;
        config.interest_radius = radius;
        ZoneState::new(config)
    }

    fn player_at(id: u32, x: f64) -> Player {
        let mut p = Player::new(id, id, id as u64);
        p.initialized = true;
        p.position.x = x;
        p
    }

    // 1. Full broadcast mode includes every player regardless of distance.
    #[test]
    fn full_broadcast_includes_everyone() {
        let mut zone = zone_with(true, 10.0);
        zone.players.insert(1, player_at(1, 0.0));
        zone.players.insert(2, player_at(2, 5000.0));
        let snap = build_snapshot_for_recipient(&zone, 1, 1);
        assert_eq!(snap.entries.len(), 2);
    }

    // 2. Per-recipient mode excludes players outside interest_radius.
    #[test]
    fn per_recipient_filters_by_distance() {
        let mut zone = zone_with(false, 100.0);
        zone.players.insert(1, player_at(1, 0.0));
        zone.players.insert(2, player_at(2, 50.0));
        zone.players.insert(3, player_at(3, 500.0));
        let snap = build_snapshot_for_recipient(&zone, 1, 1);
        let ids: Vec<u32> = snap.entries.iter().map(|e| e.character_id).collect();
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(!ids.contains(&3));
    }

    // 3. The recipient itself is always included even if far from its own position (trivially true, but also when marked dead/edge cases).
    #[test]
    fn recipient_always_included() {
        let mut zone = zone_with(false, 1.0);
        zone.players.insert(1, player_at(1, 0.0));
        let snap = build_snapshot_for_recipient(&zone, 1, 1);
        assert_eq!(snap.entries.len(), 1);
        assert_eq!(snap.entries[0].character_id, 1);
    }
}
