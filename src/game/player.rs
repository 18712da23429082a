use crate::config;
use crate::rules::ZoneConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn distance(self, other: Vec3) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn distance_xy(self, other: Vec3) -> f64 {
        let (dx, dy) = (self.x - other.x, self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PrimaryStats {
    pub strength: i32,
    pub stamina: i32,
    pub agility: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for PrimaryStats {
    fn default() -> Self {
        Self {
            strength: 75,
            stamina: 75,
            agility: 75,
            dexterity: 75,
            intelligence: 75,
            wisdom: 75,
            charisma: 75,
        }
    }
}

/// A player's last received movement input.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub input_x: f64,
    pub input_y: f64,
    pub yaw_degrees: f64,
    pub jump_pressed: bool,
    pub sequence_number: u32,
}

/// Authoritative in-zone state for a single connected player, owned exclusively
/// by the zone task for the lifetime of the session.
pub struct Player {
    pub character_id: u32,
    pub account_id: u32,
    pub conn_id: u64,

    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw_degrees: f64,
    pub last_valid_position: Vec3,

    pub input: InputState,

    pub level: u32,
    pub xp: u64,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub stats: PrimaryStats,

    pub initialized: bool,
    pub dirty: bool,
    pub combat_stats_dirty: bool,
    pub dead: bool,
}

impl Player {
    pub fn new(character_id: u32, account_id: u32, conn_id: u64) -> Self {
        Self {
            character_id,
            account_id,
            conn_id,
            position: Vec3::default(),
            velocity: Vec3::default(),
            yaw_degrees: 0.0,
            last_valid_position: Vec3::default(),
            input: InputState::default(),
            level: 1,
            xp: 0,
            hp: 100,
            max_hp: 100,
            mana: 100,
            max_mana: 100,
            stats: PrimaryStats::default(),
            initialized: false,
            dirty: false,
            combat_stats_dirty: false,
            dead: false,
        }
    }

    pub fn spawn_at(&mut self, pos: Vec3, yaw_degrees: f64) {
        self.position = pos;
        self.last_valid_position = pos;
        self.velocity = Vec3::default();
        self.yaw_degrees = yaw_degrees;
    }

    pub fn apply_input(&mut self, input: InputState) -> bool {
        if input.sequence_number <= self.input.sequence_number && self.input.sequence_number != 0
        {
            return false;
        }
        self.input = input;
        true
    }

    /// Advances one simulation tick. Dead players keep their stored input for
    /// reconnect UX but do not move (spec invariant I5).
    pub fn step(&mut self, zone: &ZoneConfig, dt: f64) {
        if self.dead {
            return;
        }

        let mut dir_x = self.input.input_x;
        let mut dir_y = self.input.input_y;
        let mag = (dir_x * dir_x + dir_y * dir_y).sqrt();
        if mag > 1.0 {
            dir_x /= mag;
            dir_y /= mag;
        }

        self.velocity.x = dir_x * zone.move_speed;
        self.velocity.y = dir_y * zone.move_speed;

        if self.position.z <= config::GROUND_LEVEL {
            self.velocity.z = if self.input.jump_pressed {
                config::JUMP_VELOCITY
            } else {
                0.0
            };
        } else {
            self.velocity.z += config::GRAVITY * dt;
        }

        let mut candidate = Vec3 {
            x: self.position.x + self.velocity.x * dt,
            y: self.position.y + self.velocity.y * dt,
            z: self.position.z + self.velocity.z * dt,
        };
        if candidate.z <= config::GROUND_LEVEL {
            candidate.z = config::GROUND_LEVEL;
            self.velocity.z = 0.0;
        }

        let max_allowed =
            zone.move_speed * dt * config::MAX_ALLOWED_MOVE_MULTIPLIER;
        let suspicious = max_allowed * config::SUSPICIOUS_MOVE_MULTIPLIER;
        let distance = candidate.distance(self.last_valid_position);

        if distance > suspicious {
            tracing::warn!(
                character_id = self.character_id,
                distance,
                suspicious,
                "anti-cheat: snapping player back to last valid position"
            );
            self.position = self.last_valid_position;
            self.velocity = Vec3::default();
        } else {
            self.position = candidate;
            self.last_valid_position = candidate;
            if distance > 0.01 {
                self.dirty = true;
            }
        }

        self.yaw_degrees = self.input.yaw_degrees;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_zone() -> ZoneConfig {
        ZoneConfig::new(1, "Test".to_string())
    }

    // 1. A dead player does not move even with input set.
    #[test]
    fn dead_player_does_not_move() {
        let mut p = Player::new(1, 1, 1);
        p.dead = true;
        p.input.input_x = 1.0;
        let before = p.position;
        p.step(&test_zone(), config::TICK_DT);
        assert_eq!(p.position.x, before.x);
    }

    // 2. Full-speed forward input moves by move_speed*dt in one tick.
    #[test]
    fn accepted_move_matches_move_speed() {
        let mut p = Player::new(1, 1, 1);
        p.initialized = true;
        p.input.input_x = 1.0;
        p.step(&test_zone(), config::TICK_DT);
        let expected = test_zone().move_speed * config::TICK_DT;
        assert!((p.position.x - expected).abs() < 1e-9);
        assert_eq!(p.last_valid_position.x, p.position.x);
    }

    // 3. Landing on the ground zeroes vertical velocity.
    #[test]
    fn ground_contact_zeroes_vertical_velocity() {
        let mut p = Player::new(1, 1, 1);
        p.step(&test_zone(), config::TICK_DT);
        assert_eq!(p.velocity.z, 0.0);
        assert_eq!(p.position.z, config::GROUND_LEVEL);
    }

    // 4. Jump from the ground sets upward velocity for that tick.
    #[test]
    fn jump_sets_upward_velocity() {
        let mut p = Player::new(1, 1, 1);
        p.input.jump_pressed = true;
        p.step(&test_zone(), config::TICK_DT);
        assert!(p.position.z > 0.0);
    }
}
