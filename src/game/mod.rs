pub mod combat;
pub mod death;
pub mod npc;
pub mod player;
pub mod snapshot;
pub mod zone;

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::ZoneCliConfig;
use crate::config;
use crate::msg::kind;
use crate::msg::types::{
    AttackRequest, AttackResult, DespawnReason, DevCommand, DevCommandResponse, EntityDespawn,
    EntitySpawn, MovementIntent, ZoneAuthRequest, ZoneAuthResponse,
};
use crate::net::protocol::{decode_payload, encode_frame, MessageHeader, HEADER_LEN};
use crate::persistence::npc_repo::NpcDataRepository;
use crate::persistence::session::SessionService;
use crate::persistence::CharacterRepository;
use crate::rules::{WorldRules, XpTable};
use crate::systems::progression;

use self::npc::{Npc, NpcAiState};
use self::player::{InputState, Player, Vec3};
use self::zone::ZoneState;

pub struct ClientMessage {
    pub conn_id: u64,
    pub data: Vec<u8>,
}

pub struct ServerMessage {
    pub data: Vec<u8>,
}

pub type GameTx = mpsc::UnboundedSender<ClientMessage>;
pub type ConnTx = mpsc::UnboundedSender<ServerMessage>;

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

fn npc_spawn_event(npc: &Npc) -> EntitySpawn {
    EntitySpawn {
        entity_id: npc.npc_id,
        entity_type: "npc".to_string(),
        name: format!("npc-{}", npc.template_id),
        level: npc.level as u32,
        x: npc.position.x,
        y: npc.position.y,
        z: npc.position.z,
        hp: npc.current_hp,
        max_hp: npc.max_hp,
    }
}

/// Owns every mutable piece of zone state and runs the fixed-step tick loop.
/// Exclusively driven from one dedicated task (spec §5).
pub struct GameServer {
    zone: ZoneState,
    world_id: u32,

    connections: HashMap<u64, ConnTx>,
    conn_to_character: HashMap<u64, u32>,
    character_to_conn: HashMap<u32, u64>,
    /// NPC ids each connection currently believes are spawned, so
    /// `broadcast_npc_events` can diff interest-range transitions instead of
    /// resending `EntityUpdate` unconditionally (spec §4.9).
    visible_npcs: HashMap<u64, HashSet<u32>>,

    character_repo: Box<dyn CharacterRepository>,
    npc_repo: Box<dyn NpcDataRepository>,
    session_service: Box<dyn SessionService>,
    world_rules: WorldRules,
    xp_table: XpTable,

    rx: mpsc::UnboundedReceiver<ClientMessage>,

    tick: u64,
    snapshot_id: u64,
    last_autosave: Instant,
    last_movement_parse_warn: Instant,
}

impl GameServer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cli: &ZoneCliConfig,
        zone_config: crate::rules::ZoneConfig,
        character_repo: Box<dyn CharacterRepository>,
        npc_repo: Box<dyn NpcDataRepository>,
        session_service: Box<dyn SessionService>,
        world_rules: WorldRules,
        xp_table: XpTable,
        rx: mpsc::UnboundedReceiver<ClientMessage>,
    ) -> Self {
        let mut zone = ZoneState::new(zone_config);

        let spawns = npc_repo.all_spawns().to_vec();
        for point in &spawns {
            if let Some(template) = npc_repo.template_by_id(point.npc_id).cloned() {
                let npc_id = zone.alloc_npc_id();
                zone.npcs
                    .insert(npc_id, Npc::spawn(npc_id, &template, point));
            } else {
                warn!(
                    "[NPC] spawn point {} references unknown template {}",
                    point.spawn_id, point.npc_id
                );
            }
        }
        info!(
            "[NPC] {} NPCs spawned from {} spawn points",
            zone.npcs.len(),
            spawns.len()
        );

        Self {
            zone,
            world_id: cli.world_id,
            connections: HashMap::new(),
            conn_to_character: HashMap::new(),
            character_to_conn: HashMap::new(),
            visible_npcs: HashMap::new(),
            character_repo,
            npc_repo,
            session_service,
            world_rules,
            xp_table,
            rx,
            tick: 0,
            snapshot_id: 0,
            last_autosave: Instant::now(),
            last_movement_parse_warn: Instant::now()
                - Duration::from_secs(config::MOVEMENT_PARSE_LOG_INTERVAL_SECS),
        }
    }

    pub fn add_connection(&mut self, conn_id: u64, tx: ConnTx) {
        self.connections.insert(conn_id, tx);
    }

    fn send_to_conn(&self, conn_id: u64, kind: u16, payload: &str) {
        if let Some(tx) = self.connections.get(&conn_id) {
            let frame = encode_frame(kind, payload);
            if tx.send(ServerMessage { data: frame }).is_err() {
                warn!("conn {conn_id}: failed to enqueue outbound frame (closed)");
            }
        }
    }

    fn broadcast(&self, kind: u16, payload: &str) {
        let frame = encode_frame(kind, payload);
        for (&conn_id, tx) in &self.connections {
            if tx
                .send(ServerMessage {
                    data: frame.clone(),
                })
                .is_err()
            {
                warn!("conn {conn_id}: failed to enqueue broadcast frame (closed)");
            }
        }
    }

    /// Player removal (spec §4.10): save, purge from hate tables, erase mappings.
    pub fn handle_disconnect(&mut self, conn_id: u64) {
        self.connections.remove(&conn_id);
        self.visible_npcs.remove(&conn_id);
        let Some(character_id) = self.conn_to_character.remove(&conn_id) else {
            return;
        };
        self.character_to_conn.remove(&character_id);

        if let Some(player) = self.zone.players.get(&character_id) {
            if let Some(mut character) = self.character_repo.load_by_id(character_id) {
                death::merge_into_character(
                    &mut character,
                    player,
                    self.world_id,
                    self.zone.config.zone_id,
                );
                if !self.character_repo.save(&character) {
                    tracing::error!("[SAVE] failed to save character {character_id} on disconnect");
                }
            }
        }
        self.zone.remove_player(character_id);
        info!("conn {conn_id}: character {character_id} removed from zone");
    }

    pub fn run_tick(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg);
        }

        self.tick += 1;
        let dt = config::TICK_DT;

        for player in self.zone.players.values_mut() {
            player.step(&self.zone.config, dt);
        }

        let move_speed = self.zone.config.move_speed;
        for npc in self.zone.npcs.values_mut() {
            npc.tick(move_speed, dt, &self.zone.players);
        }

        self.respawn_dead_npcs();

        if self.tick % config::TICKS_PER_SECOND == 0 {
            death::sweep_corpses(&mut self.zone, unix_now());
        }

        self.broadcast_npc_events();
        self.broadcast_snapshots();

        if self.last_autosave.elapsed().as_secs_f64() >= self.zone.config.autosave_interval_sec {
            self.save_all_players();
            self.last_autosave = Instant::now();
        }
    }

    fn respawn_dead_npcs(&mut self) {
        let now = unix_now();
        let due: Vec<u32> = self
            .zone
            .npcs
            .iter()
            .filter_map(|(id, n)| {
                if n.ai_state == NpcAiState::Dead && n.respawn_at.map(|t| now >= t).unwrap_or(false)
                {
                    Some(*id)
                } else {
                    None
                }
            })
            .collect();
        for npc_id in due {
            let template_hp = self
                .zone
                .npcs
                .get(&npc_id)
                .and_then(|n| self.npc_repo.template_by_id(n.template_id))
                .map(|t| t.hp);
            if let Some(npc) = self.zone.npcs.get_mut(&npc_id) {
                npc.max_hp = template_hp.unwrap_or(npc.max_hp);
                npc.current_hp = npc.max_hp;
                npc.position = npc.home;
                npc.is_alive = true;
                npc.ai_state = NpcAiState::Idle;
                npc.respawn_at = None;
                npc.hate.clear();
                info!("[NPC] {npc_id} respawned at its spawn point");
            }
        }
    }

    /// Diffs each connection's previously-visible NPC set against this
    /// tick's set: `EntitySpawn` on not-visible→visible, `EntityDespawn`
    /// (reason `LeftInterestRange`) on visible→not-visible, `EntityUpdate`
    /// while it stays visible (spec §4.9).
    fn broadcast_npc_events(&mut self) {
        let full = self.zone.config.broadcast_full_state;
        let recipients: Vec<(u64, Vec3)> = self
            .zone
            .players
            .values()
            .filter(|p| p.initialized)
            .map(|p| (p.conn_id, p.position))
            .collect();

        for (conn_id, recipient_pos) in recipients {
            let new_visible: HashSet<u32> = self
                .zone
                .npcs
                .values()
                .filter(|n| n.ai_state != NpcAiState::Dead)
                .filter(|n| full || snapshot::npc_visible_to(&self.zone, n, recipient_pos))
                .map(|n| n.npc_id)
                .collect();

            let old_visible = self.visible_npcs.remove(&conn_id).unwrap_or_default();

            for npc_id in old_visible.difference(&new_visible) {
                self.send_to_conn(
                    conn_id,
                    kind::ENTITY_DESPAWN,
                    &EntityDespawn {
                        entity_id: *npc_id,
                        reason: DespawnReason::LeftInterestRange,
                    }
                    .to_payload(),
                );
            }
            for npc_id in new_visible.difference(&old_visible) {
                if let Some(npc) = self.zone.npcs.get(npc_id) {
                    self.send_to_conn(conn_id, kind::ENTITY_SPAWN, &npc_spawn_event(npc).to_payload());
                }
            }
            for npc_id in new_visible.intersection(&old_visible) {
                if let Some(npc) = self.zone.npcs.get(npc_id) {
                    self.send_to_conn(
                        conn_id,
                        kind::ENTITY_UPDATE,
                        &snapshot::npc_update_event(npc).to_payload(),
                    );
                }
            }

            self.visible_npcs.insert(conn_id, new_visible);
        }
    }

    fn broadcast_snapshots(&mut self) {
        self.snapshot_id += 1;
        if self.zone.config.broadcast_full_state {
            let snap = snapshot::build_full_snapshot(&self.zone, self.snapshot_id);
            let payload = snap.to_payload();
            self.broadcast(kind::PLAYER_STATE_SNAPSHOT, &payload);
        } else {
            let recipients: Vec<(u32, u64)> = self
                .zone
                .players
                .values()
                .filter(|p| p.initialized)
                .map(|p| (p.character_id, p.conn_id))
                .collect();
            for (character_id, conn_id) in recipients {
                let snap =
                    snapshot::build_snapshot_for_recipient(&self.zone, self.snapshot_id, character_id);
                self.send_to_conn(conn_id, kind::PLAYER_STATE_SNAPSHOT, &snap.to_payload());
            }
        }
    }

    pub fn save_all_players(&self) {
        for player in self.zone.players.values() {
            if !player.initialized || (!player.dirty && !player.combat_stats_dirty) {
                continue;
            }
            let Some(mut character) = self.character_repo.load_by_id(player.character_id) else {
                tracing::error!(
                    "[AUTOSAVE] character {} not loadable, skipping",
                    player.character_id
                );
                continue;
            };
            death::merge_into_character(
                &mut character,
                player,
                self.world_id,
                self.zone.config.zone_id,
            );
            if !self.character_repo.save(&character) {
                tracing::error!("[AUTOSAVE] failed to save character {}", player.character_id);
            }
        }
    }

    fn handle_message(&mut self, msg: ClientMessage) {
        if msg.data.is_empty() {
            self.handle_disconnect(msg.conn_id);
            return;
        }
        if msg.data.len() < HEADER_LEN {
            warn!("conn {}: frame shorter than header", msg.conn_id);
            return;
        }
        let header = match MessageHeader::from_bytes(&msg.data) {
            Ok(h) => h,
            Err(e) => {
                warn!("conn {}: bad header: {e}", msg.conn_id);
                return;
            }
        };
        let payload = match decode_payload(&msg.data[HEADER_LEN..]) {
            Ok(p) => p,
            Err(e) => {
                warn!("conn {}: payload not utf-8: {e}", msg.conn_id);
                return;
            }
        };

        match header.kind {
            kind::ZONE_AUTH_REQUEST => self.handle_zone_auth(msg.conn_id, payload),
            kind::MOVEMENT_INTENT => self.handle_movement(msg.conn_id, payload),
            kind::ATTACK_REQUEST => self.handle_attack(msg.conn_id, payload),
            kind::DEV_COMMAND => self.handle_dev_command(msg.conn_id, payload),
            other => {
                warn!("conn {}: unrecognized message kind {other}", msg.conn_id);
            }
        }
    }

    /// Session handshake (spec §4.1).
    fn handle_zone_auth(&mut self, conn_id: u64, payload: &str) {
        info!("[ZONEAUTH] conn {conn_id} payload: {payload}");
        let req = match ZoneAuthRequest::parse(payload) {
            Ok(r) => r,
            Err(e) => {
                let resp = ZoneAuthResponse::Err {
                    code: "PARSE_ERROR".to_string(),
                    message: e.0,
                };
                self.send_to_conn(conn_id, kind::ZONE_AUTH_RESPONSE, &resp.to_payload());
                return;
            }
        };

        if req.handoff_token == 0 {
            let resp = ZoneAuthResponse::Err {
                code: "INVALID_HANDOFF".to_string(),
                message: "handoff token is zero".to_string(),
            };
            self.send_to_conn(conn_id, kind::ZONE_AUTH_RESPONSE, &resp.to_payload());
            return;
        }
        // Full cross-zone token-expiry/single-use enforcement against the session
        // cache is a known upstream gap (spec §9), not something to invent here.
        let _ = self.session_service.validate(req.handoff_token);

        let Some(character) = self.character_repo.load_by_id(req.character_id) else {
            let resp = ZoneAuthResponse::Err {
                code: "CHARACTER_NOT_FOUND".to_string(),
                message: format!("no character with id {}", req.character_id),
            };
            self.send_to_conn(conn_id, kind::ZONE_AUTH_RESPONSE, &resp.to_payload());
            return;
        };

        if self.zone.players.contains_key(&req.character_id) {
            self.zone.remove_player(req.character_id);
        }

        let mut player = Player::new(req.character_id, character.account_id, conn_id);
        player.level = character.level;
        player.xp = character.xp;
        player.hp = character.hp;
        player.max_hp = character.max_hp;
        player.mana = character.mana;
        player.max_mana = character.max_mana;
        player.stats = character.stats();

        let has_position = character.position_x != 0.0
            || character.position_y != 0.0
            || character.position_z != 0.0;
        if character.last_zone_id == self.zone.config.zone_id && has_position {
            player.spawn_at(character.position(), character.heading);
        } else {
            let spawn = Vec3 {
                x: self.zone.config.safe_x,
                y: self.zone.config.safe_y,
                z: self.zone.config.safe_z,
            };
            player.spawn_at(spawn, self.zone.config.safe_yaw);
            let mut updated = character.clone();
            updated.last_world_id = self.world_id;
            updated.last_zone_id = self.zone.config.zone_id;
            updated.position_x = spawn.x;
            updated.position_y = spawn.y;
            updated.position_z = spawn.z;
            updated.heading = self.zone.config.safe_yaw;
            if !self.character_repo.save(&updated) {
                tracing::error!(
                    "[ZONEAUTH] failed to save spawn position for character {}",
                    req.character_id
                );
            }
        }
        player.initialized = true;

        self.conn_to_character.insert(conn_id, req.character_id);
        self.character_to_conn.insert(req.character_id, conn_id);
        self.zone.players.insert(req.character_id, player);

        let welcome = format!(
            "Welcome to {} (zone {} on world {})",
            self.zone.config.zone_name, self.zone.config.zone_id, self.world_id
        );
        let resp = ZoneAuthResponse::Ok {
            welcome_message: welcome,
        };
        info!(
            "[ZONEAUTH] conn {conn_id}: character {} authenticated",
            req.character_id
        );
        self.send_to_conn(conn_id, kind::ZONE_AUTH_RESPONSE, &resp.to_payload());

        self.send_existing_entities_to(conn_id, req.character_id);
    }

    /// Initial `EntitySpawn` burst for whatever is already visible to a
    /// freshly-authenticated character, seeding its entry in `visible_npcs`
    /// so the next `broadcast_npc_events` diffs against a known baseline.
    fn send_existing_entities_to(&mut self, conn_id: u64, character_id: u32) {
        let full = self.zone.config.broadcast_full_state;
        let recipient_pos = self.zone.players.get(&character_id).map(|p| p.position);

        let mut visible = HashSet::new();
        for npc in self.zone.npcs.values() {
            if npc.ai_state == NpcAiState::Dead {
                continue;
            }
            let is_visible = full
                || recipient_pos
                    .map(|pos| snapshot::npc_visible_to(&self.zone, npc, pos))
                    .unwrap_or(false);
            if !is_visible {
                continue;
            }
            visible.insert(npc.npc_id);
            self.send_to_conn(conn_id, kind::ENTITY_SPAWN, &npc_spawn_event(npc).to_payload());
        }
        self.visible_npcs.insert(conn_id, visible);
    }

    /// Movement input (spec §4.3, §4.4): dropped silently unless the sender
    /// owns the character and the sequence number is fresh.
    fn handle_movement(&mut self, conn_id: u64, payload: &str) {
        let intent = match MovementIntent::parse(payload) {
            Ok(m) => m,
            Err(e) => {
                if self.last_movement_parse_warn.elapsed().as_secs()
                    >= config::MOVEMENT_PARSE_LOG_INTERVAL_SECS
                {
                    warn!("[Movement] conn {conn_id}: parse error: {e}");
                    self.last_movement_parse_warn = Instant::now();
                }
                return;
            }
        };

        let Some(&owner_conn) = self.character_to_conn.get(&intent.character_id) else {
            return;
        };
        if owner_conn != conn_id {
            return;
        }
        let Some(player) = self.zone.players.get_mut(&intent.character_id) else {
            return;
        };
        player.apply_input(InputState {
            input_x: intent.input_x,
            input_y: intent.input_y,
            yaw_degrees: intent.yaw_degrees,
            jump_pressed: intent.jump_pressed,
            sequence_number: intent.sequence_number,
        });
    }

    /// Combat resolution dispatch (spec §4.6).
    fn handle_attack(&mut self, conn_id: u64, payload: &str) {
        let req = match AttackRequest::parse(payload) {
            Ok(r) => r,
            Err(e) => {
                warn!("[COMBAT] conn {conn_id}: parse error: {e}");
                return;
            }
        };

        let Some(&owner_conn) = self.character_to_conn.get(&req.attacker_character_id) else {
            self.reply_attack_error(conn_id, &req, combat::RESULT_NOT_OWNER, "unknown attacker");
            return;
        };
        if owner_conn != conn_id {
            self.reply_attack_error(conn_id, &req, combat::RESULT_NOT_OWNER, "not your character");
            return;
        }

        if !self.zone.npcs.contains_key(&req.target_id) {
            self.reply_attack_error(conn_id, &req, combat::RESULT_OUT_OF_RANGE, "invalid target");
            return;
        }

        let (result, died) = {
            let zone = &mut self.zone;
            let Some(attacker) = zone.players.get(&req.attacker_character_id) else {
                return;
            };
            let npc = zone.npcs.get_mut(&req.target_id).unwrap();
            let target_name = format!("npc-{}", npc.template_id);
            combat::resolve_attack(attacker, npc, &target_name, &zone.config)
        };

        if result.was_hit {
            if let Some(npc) = self.zone.npcs.get_mut(&req.target_id) {
                npc.add_hate(req.attacker_character_id, result.damage);
            }
        }

        info!(
            "[COMBAT] attacker {} vs target {}: {}",
            req.attacker_character_id, req.target_id, result.message
        );
        self.broadcast(kind::ATTACK_RESULT, &result.to_payload());

        if died {
            let respawn_at = unix_now()
                + self
                    .zone
                    .npcs
                    .get(&req.target_id)
                    .and_then(|n| self.npc_repo.spawn_by_id(n.spawn_point_id))
                    .map(|p| respawn_delay_secs(p.respawn_seconds, p.respawn_variance_seconds))
                    .unwrap_or(120.0);
            if let Some(npc) = self.zone.npcs.get_mut(&req.target_id) {
                npc.mark_dead(respawn_at);
            }
            // Drop it from every connection's visibility baseline so the next
            // broadcast_npc_events diff doesn't also emit a LeftInterestRange
            // despawn for an entity that's already gone.
            for visible in self.visible_npcs.values_mut() {
                visible.remove(&req.target_id);
            }
            self.broadcast(
                kind::ENTITY_DESPAWN,
                &EntityDespawn {
                    entity_id: req.target_id,
                    reason: DespawnReason::Died,
                }
                .to_payload(),
            );
        }
    }

    fn reply_attack_error(&self, conn_id: u64, req: &AttackRequest, code: u8, message: &str) {
        let result = AttackResult {
            attacker_id: req.attacker_character_id,
            target_id: req.target_id,
            damage: 0,
            was_hit: false,
            remaining_hp: 0,
            result_code: code,
            message: message.to_string(),
        };
        self.send_to_conn(conn_id, kind::ATTACK_RESULT, &result.to_payload());
    }

    /// Dev command dispatch (spec §4.11).
    fn handle_dev_command(&mut self, conn_id: u64, payload: &str) {
        let cmd = match DevCommand::parse(payload) {
            Ok(c) => c,
            Err(e) => {
                let resp = DevCommandResponse::fail(format!("parse error: {e}"));
                self.send_to_conn(conn_id, kind::DEV_COMMAND_RESPONSE, &resp.to_payload());
                return;
            }
        };
        info!(
            "[DEV] conn {conn_id}: {} {} {} {}",
            cmd.character_id, cmd.command, cmd.param1, cmd.param2
        );

        let response = match cmd.command.as_str() {
            "suicide" => self.dev_suicide(cmd.character_id),
            "givexp" => self.dev_give_xp(cmd.character_id, &cmd.param1),
            "setlevel" => self.dev_set_level(cmd.character_id, &cmd.param1),
            "respawn" => self.dev_respawn(cmd.character_id),
            "damage_self" => self.dev_damage_self(cmd.character_id, &cmd.param1),
            other => DevCommandResponse::fail(format!("unknown command: {other}")),
        };
        self.send_to_conn(conn_id, kind::DEV_COMMAND_RESPONSE, &response.to_payload());
    }

    fn dev_suicide(&mut self, character_id: u32) -> DevCommandResponse {
        if let Some(player) = self.zone.players.get_mut(&character_id) {
            player.hp = 0;
        } else {
            return DevCommandResponse::fail("character not in zone");
        }
        death::handle_player_death(
            &mut self.zone,
            character_id,
            self.world_id,
            self.character_repo.as_ref(),
            &self.world_rules,
            &self.xp_table,
            unix_now(),
        );
        DevCommandResponse::ok("suicide applied")
    }

    fn dev_give_xp(&mut self, character_id: u32, amount_str: &str) -> DevCommandResponse {
        let Ok(amount) = amount_str.parse::<u64>() else {
            return DevCommandResponse::fail(format!("invalid amount: {amount_str}"));
        };
        let Some(mut character) = self.character_repo.load_by_id(character_id) else {
            return DevCommandResponse::fail("character not found");
        };
        progression::add_xp(
            &mut character.level,
            &mut character.xp,
            amount,
            &self.xp_table,
            &self.world_rules,
        );
        if let Some(player) = self.zone.players.get_mut(&character_id) {
            player.level = character.level;
            player.xp = character.xp;
            player.combat_stats_dirty = true;
        }
        if !self.character_repo.save(&character) {
            return DevCommandResponse::fail("save failed");
        }
        DevCommandResponse::ok(format!("granted {amount} xp, now level {}", character.level))
    }

    fn dev_set_level(&mut self, character_id: u32, level_str: &str) -> DevCommandResponse {
        let Ok(requested) = level_str.parse::<u32>() else {
            return DevCommandResponse::fail(format!("invalid level: {level_str}"));
        };
        let Some(mut character) = self.character_repo.load_by_id(character_id) else {
            return DevCommandResponse::fail("character not found");
        };
        progression::set_level(&mut character.level, &mut character.xp, requested, &self.xp_table);
        if let Some(player) = self.zone.players.get_mut(&character_id) {
            player.level = character.level;
            player.xp = character.xp;
            player.combat_stats_dirty = true;
        }
        if !self.character_repo.save(&character) {
            return DevCommandResponse::fail("save failed");
        }
        DevCommandResponse::ok(format!("level set to {}", character.level))
    }

    fn dev_respawn(&mut self, character_id: u32) -> DevCommandResponse {
        if !self.zone.players.contains_key(&character_id) {
            return DevCommandResponse::fail("character not in zone");
        }
        death::respawn_player(&mut self.zone, character_id, self.world_id, self.character_repo.as_ref());
        DevCommandResponse::ok("respawned")
    }

    fn dev_damage_self(&mut self, character_id: u32, amount_str: &str) -> DevCommandResponse {
        let Ok(amount) = amount_str.parse::<i32>() else {
            return DevCommandResponse::fail(format!("invalid amount: {amount_str}"));
        };
        let died = {
            let Some(player) = self.zone.players.get_mut(&character_id) else {
                return DevCommandResponse::fail("character not in zone");
            };
            player.hp = (player.hp - amount).max(0);
            player.hp == 0
        };
        if died {
            death::handle_player_death(
                &mut self.zone,
                character_id,
                self.world_id,
                self.character_repo.as_ref(),
                &self.world_rules,
                &self.xp_table,
                unix_now(),
            );
        }
        DevCommandResponse::ok(format!("damaged self for {amount}"))
    }
}

/// Respawn delay with uniform jitter floored at 1 second (SPEC_FULL.md §9.1).
fn respawn_delay_secs(base: i32, variance: i32) -> f64 {
    if variance <= 0 {
        return base.max(1) as f64;
    }
    let jitter = rand::thread_rng().gen_range(-variance..=variance);
    (base + jitter).max(1) as f64
}
