//! Immutable-at-runtime tuning data: per-zone config, shared world rules, and the XP table.
//! All three are loaded once at startup from JSON and never mutated afterward.

use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug)]
pub enum RulesError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for RulesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::Invalid(msg) => write!(f, "invalid: {msg}"),
        }
    }
}

impl std::error::Error for RulesError {}

/// Per-zone tunables. Defaults mirror the values a freshly-installed zone ships with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ZoneConfig {
    pub zone_id: u32,
    #[serde(default = "default_zone_name")]
    pub zone_name: String,
    #[serde(default)]
    pub safe_x: f64,
    #[serde(default)]
    pub safe_y: f64,
    #[serde(default)]
    pub safe_z: f64,
    #[serde(default)]
    pub safe_yaw: f64,
    #[serde(default = "default_move_speed")]
    pub move_speed: f64,
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_sec: f64,
    #[serde(default = "default_true")]
    pub broadcast_full_state: bool,
    #[serde(default = "default_interest_radius")]
    pub interest_radius: f64,
    #[serde(default)]
    pub debug_interest: bool,
    #[serde(default = "default_attack_range")]
    pub max_attack_range: f64,
}

fn default_zone_name() -> String {
    "UnknownZone".to_string()
}
fn default_move_speed() -> f64 {
    70.0
}
fn default_autosave_interval() -> f64 {
    30.0
}
fn default_true() -> bool {
    true
}
fn default_interest_radius() -> f64 {
    2000.0
}
fn default_attack_range() -> f64 {
    200.0
}

impl ZoneConfig {
    pub fn new(zone_id: u32, zone_name: String) -> Self {
        Self {
            zone_id,
            zone_name,
            safe_x: 0.0,
            safe_y: 0.0,
            safe_z: 0.0,
            safe_yaw: 0.0,
            move_speed: default_move_speed(),
            autosave_interval_sec: default_autosave_interval(),
            broadcast_full_state: true,
            interest_radius: default_interest_radius(),
            debug_interest: false,
            max_attack_range: default_attack_range(),
        }
    }

    /// Loads overrides for this zone from the shared world-config file, if present.
    /// A missing or zone-absent entry is not an error — the caller-supplied defaults stand.
    pub fn load_overrides(mut self, path: &Path) -> Result<Self, RulesError> {
        if !path.exists() {
            return Ok(self);
        }
        let text = fs::read_to_string(path).map_err(RulesError::Io)?;
        let doc: WorldConfigDoc = serde_json::from_str(&text).map_err(RulesError::Parse)?;
        if let Some(zc) = doc.zones.into_iter().find(|z| z.zone_id == self.zone_id) {
            self = zc;
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
struct WorldConfigDoc {
    #[serde(default)]
    zones: Vec<ZoneConfig>,
}

/// Death and XP rules shared by every zone under one ruleset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorldRules {
    pub xp: XpRules,
    pub death: DeathRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct XpRules {
    #[serde(default = "default_base_rate")]
    pub base_rate: f64,
    #[serde(default)]
    pub group_bonus_per_member: f64,
}

fn default_base_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeathRules {
    #[serde(default = "default_xp_loss_multiplier")]
    pub xp_loss_multiplier: f64,
    #[serde(default = "default_true")]
    pub corpse_run_enabled: bool,
    #[serde(default = "default_corpse_decay_minutes")]
    pub corpse_decay_minutes: u64,
    #[serde(default = "default_xp_loss_min_level")]
    pub xp_loss_min_level: u32,
}

fn default_xp_loss_multiplier() -> f64 {
    0.5
}
fn default_corpse_decay_minutes() -> u64 {
    30
}
fn default_xp_loss_min_level() -> u32 {
    6
}

impl Default for WorldRules {
    fn default() -> Self {
        Self {
            xp: XpRules {
                base_rate: default_base_rate(),
                group_bonus_per_member: 0.0,
            },
            death: DeathRules {
                xp_loss_multiplier: default_xp_loss_multiplier(),
                corpse_run_enabled: true,
                corpse_decay_minutes: default_corpse_decay_minutes(),
                xp_loss_min_level: default_xp_loss_min_level(),
            },
        }
    }
}

pub fn load_world_rules(path: &Path) -> Result<WorldRules, RulesError> {
    let text = fs::read_to_string(path).map_err(RulesError::Io)?;
    serde_json::from_str(&text).map_err(RulesError::Parse)
}

/// Ordered, contiguous, monotonically non-decreasing level -> total-xp-required table.
#[derive(Debug, Clone)]
pub struct XpTable {
    /// index 0 is level 1.
    totals: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct XpTableEntry {
    level: u32,
    total_xp: u64,
}

#[derive(Debug, Deserialize)]
struct XpTableDoc {
    levels: Vec<XpTableEntry>,
}

impl XpTable {
    pub fn max_level(&self) -> u32 {
        self.totals.len() as u32
    }

    /// Total XP required to reach `level`. Out-of-range levels clamp to the endpoints.
    pub fn xp_total(&self, level: u32) -> u64 {
        if level == 0 {
            return 0;
        }
        let idx = (level - 1) as usize;
        if idx >= self.totals.len() {
            *self.totals.last().unwrap_or(&0)
        } else {
            self.totals[idx]
        }
    }
}

pub fn load_xp_table(path: &Path) -> Result<XpTable, RulesError> {
    let text = fs::read_to_string(path).map_err(RulesError::Io)?;
    load_xp_table_from_str(&text)
}

pub fn load_xp_table_from_str(text: &str) -> Result<XpTable, RulesError> {
    let doc: XpTableDoc = serde_json::from_str(text).map_err(RulesError::Parse)?;
    if doc.levels.is_empty() {
        return Err(RulesError::Invalid("xp table has no levels".to_string()));
    }
    let mut sorted = doc.levels;
    sorted.sort_by_key(|e| e.level);
    for (i, entry) in sorted.iter().enumerate() {
        if entry.level != (i + 1) as u32 {
            return Err(RulesError::Invalid(format!(
                "xp table must be contiguous from level 1, found gap at level {}",
                entry.level
            )));
        }
    }
    for w in sorted.windows(2) {
        if w[1].total_xp < w[0].total_xp {
            return Err(RulesError::Invalid(
                "xp table total_xp must be non-decreasing".to_string(),
            ));
        }
    }
    Ok(XpTable {
        totals: sorted.into_iter().map(|e| e.total_xp).collect(),
    })
}
