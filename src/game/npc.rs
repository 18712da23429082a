use std::collections::HashMap;

use crate::game::player::{Player, Vec3};
use crate::persistence::npc_repo::{NpcSpawnPoint, NpcTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcAiState {
    Idle,
    Alert,
    Engaged,
    Leashing,
    Fleeing,
    Dead,
}

impl NpcAiState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Alert => "Alert",
            Self::Engaged => "Engaged",
            Self::Leashing => "Leashing",
            Self::Fleeing => "Fleeing",
            Self::Dead => "Dead",
        }
    }
}

/// A live NPC instance. Created by a spawn point, destroyed (or recycled) on death.
pub struct Npc {
    pub npc_id: u32,
    pub template_id: i32,
    pub spawn_point_id: i32,

    pub position: Vec3,
    pub home: Vec3,
    pub heading: f64,

    pub current_hp: i32,
    pub max_hp: i32,
    pub level: i32,
    pub min_damage: i32,
    pub max_damage: i32,
    pub ac: i32,
    pub aggro_radius: f64,
    pub assist_radius: f64,
    pub leash_radius: f64,

    pub is_social: bool,
    pub can_flee: bool,
    pub is_roamer: bool,
    pub is_alive: bool,

    pub ai_state: NpcAiState,
    pub target: Option<u32>,
    pub hate: HashMap<u32, u32>,

    pub respawn_at: Option<f64>,
}

const FLEE_HP_FRACTION: f64 = 0.2;
const DEFAULT_LEASH_RADIUS: f64 = 400.0;
const LEASH_SPEED: f64 = 120.0;

impl Npc {
    pub fn spawn(npc_id: u32, template: &NpcTemplate, point: &NpcSpawnPoint) -> Self {
        let home = Vec3 {
            x: point.pos_x,
            y: point.pos_y,
            z: point.pos_z,
        };
        Self {
            npc_id,
            template_id: template.npc_id,
            spawn_point_id: point.spawn_id,
            position: home,
            home,
            heading: point.heading,
            current_hp: template.hp,
            max_hp: template.hp,
            level: template.level,
            min_damage: template.min_damage,
            max_damage: template.max_damage,
            ac: template.ac,
            aggro_radius: template.aggro_radius,
            assist_radius: template.assist_radius,
            leash_radius: DEFAULT_LEASH_RADIUS,
            is_social: template.is_social,
            can_flee: template.can_flee,
            is_roamer: template.is_roamer,
            is_alive: true,
            ai_state: NpcAiState::Idle,
            target: None,
            hate: HashMap::new(),
            respawn_at: None,
        }
    }

    pub fn add_hate(&mut self, character_id: u32, amount: i32) {
        if amount <= 0 {
            return;
        }
        *self.hate.entry(character_id).or_insert(0) += amount as u32;
    }

    fn highest_hate_target(&self) -> Option<u32> {
        self.hate
            .iter()
            .max_by_key(|(_, hate)| **hate)
            .map(|(id, _)| *id)
    }

    /// Advances one simulation tick. `players` is the zone's live player set used
    /// to find aggro candidates and step toward/away from the current target.
    pub fn tick(&mut self, move_speed: f64, dt: f64, players: &HashMap<u32, Player>) {
        if self.ai_state == NpcAiState::Dead {
            return;
        }

        match self.ai_state {
            NpcAiState::Idle => {
                if let Some(candidate) = self.find_aggro_candidate(players) {
                    self.target = Some(candidate);
                    self.ai_state = NpcAiState::Alert;
                }
            }
            NpcAiState::Alert => {
                if self.target.and_then(|id| players.get(&id)).is_some() {
                    self.ai_state = NpcAiState::Engaged;
                } else {
                    self.target = None;
                    self.ai_state = NpcAiState::Idle;
                }
            }
            NpcAiState::Engaged => {
                self.target = self.highest_hate_target().or(self.target);
                let Some(target_player) = self.target.and_then(|id| players.get(&id)) else {
                    self.target = self.find_aggro_candidate(players);
                    if self.target.is_none() {
                        self.ai_state = NpcAiState::Leashing;
                    }
                    return;
                };

                if self.can_flee
                    && self.current_hp as f64 <= self.max_hp as f64 * FLEE_HP_FRACTION
                {
                    self.ai_state = NpcAiState::Fleeing;
                    return;
                }

                if self.home.distance(self.position) > self.leash_radius {
                    self.ai_state = NpcAiState::Leashing;
                    return;
                }

                move_toward(&mut self.position, target_player.position, move_speed, dt);
            }
            NpcAiState::Leashing => {
                move_toward(&mut self.position, self.home, LEASH_SPEED, dt);
                if self.home.distance(self.position) < 1.0 {
                    self.position = self.home;
                    self.current_hp = self.max_hp;
                    self.hate.clear();
                    self.target = None;
                    self.ai_state = NpcAiState::Idle;
                }
            }
            NpcAiState::Fleeing => {
                if let Some(target_player) = self.target.and_then(|id| players.get(&id)) {
                    move_away(&mut self.position, target_player.position, move_speed, dt);
                    let recovered = self.current_hp as f64 > self.max_hp as f64 * FLEE_HP_FRACTION;
                    if recovered {
                        self.ai_state = NpcAiState::Engaged;
                    }
                } else {
                    self.ai_state = NpcAiState::Leashing;
                }
            }
            NpcAiState::Dead => {}
        }
    }

    fn find_aggro_candidate(&self, players: &HashMap<u32, Player>) -> Option<u32> {
        players
            .values()
            .filter(|p| p.initialized && !p.dead)
            .find(|p| p.position.distance(self.position) <= self.aggro_radius)
            .map(|p| p.character_id)
    }

    pub fn mark_dead(&mut self, respawn_at: f64) {
        self.current_hp = 0;
        self.is_alive = false;
        self.ai_state = NpcAiState::Dead;
        self.target = None;
        self.respawn_at = Some(respawn_at);
    }
}

fn move_toward(pos: &mut Vec3, target: Vec3, speed: f64, dt: f64) {
    let (dx, dy) = (target.x - pos.x, target.y - pos.y);
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < 0.01 {
        return;
    }
    let step = speed * dt;
    let frac = (step / dist).min(1.0);
    pos.x += dx * frac;
    pos.y += dy * frac;
}

fn move_away(pos: &mut Vec3, from: Vec3, speed: f64, dt: f64) {
    let (dx, dy) = (pos.x - from.x, pos.y - from.y);
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < 0.01 {
        pos.x += speed * dt;
        return;
    }
    let step = speed * dt;
    pos.x += dx / dist * step;
    pos.y += dy / dist * step;
}
