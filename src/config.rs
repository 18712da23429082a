#![allow(dead_code)]
/// Fixed simulation constants. Per-zone tunables live in [`crate::rules::ZoneConfig`].

pub const TICK_RATE_HZ: u32 = 20;
pub const TICK_INTERVAL_MS: u64 = 1000 / TICK_RATE_HZ as u64;
pub const TICK_DT: f64 = 1.0 / TICK_RATE_HZ as f64;

pub const PROTOCOL_VERSION: u16 = 1;

pub const GRAVITY: f64 = -30.0;
pub const JUMP_VELOCITY: f64 = 10.0;
pub const GROUND_LEVEL: f64 = 0.0;

/// A move past `move_speed * dt * MAX_ALLOWED_MOVE_MULTIPLIER` is still accepted
/// (client-side prediction jitter); past `* SUSPICIOUS_MOVE_MULTIPLIER` it is rejected.
pub const MAX_ALLOWED_MOVE_MULTIPLIER: f64 = 1.5;
pub const SUSPICIOUS_MOVE_MULTIPLIER: f64 = 5.0;

/// Corpse sweep and NPC-state summary logging both run once per second of ticks.
pub const TICKS_PER_SECOND: u64 = TICK_RATE_HZ as u64;

/// Movement-parse-failure logging is rate-limited to this interval.
pub const MOVEMENT_PARSE_LOG_INTERVAL_SECS: u64 = 5;
