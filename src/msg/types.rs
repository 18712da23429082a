//! One struct per message kind plus its pipe-delimited text codec. Parsing is
//! deliberately permissive about trailing whitespace but strict about field
//! count and numeric validity — a malformed payload is a `ParseError`, not a
//! panic.

use std::fmt;

#[derive(Debug)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

fn field<'a, I: Iterator<Item = &'a str>>(parts: &mut I, name: &str) -> Result<&'a str, ParseError> {
    parts
        .next()
        .ok_or_else(|| ParseError(format!("missing field: {name}")))
}

fn parse_num<T: std::str::FromStr>(s: &str, name: &str) -> Result<T, ParseError> {
    s.parse()
        .map_err(|_| ParseError(format!("invalid {name}: {s:?}")))
}

fn parse_bool(s: &str, name: &str) -> Result<bool, ParseError> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ParseError(format!("invalid {name} (expected 0/1): {s:?}"))),
    }
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// ─── ZoneAuthRequest / ZoneAuthResponse ────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneAuthRequest {
    pub handoff_token: u64,
    pub character_id: u32,
}

impl ZoneAuthRequest {
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let mut parts = payload.split('|');
        let handoff_token = parse_num(field(&mut parts, "handoffToken")?, "handoffToken")?;
        let character_id = parse_num(field(&mut parts, "characterId")?, "characterId")?;
        Ok(Self {
            handoff_token,
            character_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneAuthResponse {
    Ok { welcome_message: String },
    Err { code: String, message: String },
}

impl ZoneAuthResponse {
    pub fn to_payload(&self) -> String {
        match self {
            Self::Ok { welcome_message } => format!("OK|{welcome_message}"),
            Self::Err { code, message } => format!("ERR|{code}|{message}"),
        }
    }
}

// ─── MovementIntent ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MovementIntent {
    pub character_id: u32,
    pub sequence_number: u32,
    pub input_x: f64,
    pub input_y: f64,
    pub yaw_degrees: f64,
    pub jump_pressed: bool,
    pub client_time_ms: u64,
}

impl MovementIntent {
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let mut parts = payload.split('|');
        Ok(Self {
            character_id: parse_num(field(&mut parts, "characterId")?, "characterId")?,
            sequence_number: parse_num(field(&mut parts, "sequenceNumber")?, "sequenceNumber")?,
            input_x: parse_num(field(&mut parts, "inputX")?, "inputX")?,
            input_y: parse_num(field(&mut parts, "inputY")?, "inputY")?,
            yaw_degrees: parse_num(field(&mut parts, "yawDegrees")?, "yawDegrees")?,
            jump_pressed: parse_bool(field(&mut parts, "isJumpPressed")?, "isJumpPressed")?,
            client_time_ms: parse_num(field(&mut parts, "clientTimeMs")?, "clientTimeMs")?,
        })
    }
}

// ─── PlayerStateSnapshot ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshotEntry {
    pub character_id: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub yaw: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStateSnapshot {
    pub snapshot_id: u64,
    pub entries: Vec<PlayerSnapshotEntry>,
}

impl PlayerStateSnapshot {
    pub fn to_payload(&self) -> String {
        let mut out = format!("{}|{}", self.snapshot_id, self.entries.len());
        for e in &self.entries {
            out.push('|');
            out.push_str(&format!(
                "{}|{}|{}|{}|{}|{}|{}|{}",
                e.character_id, e.x, e.y, e.z, e.vx, e.vy, e.vz, e.yaw
            ));
        }
        out
    }
}

// ─── AttackRequest / AttackResult ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AttackRequest {
    pub attacker_character_id: u32,
    pub target_id: u32,
    pub ability_id: u32,
    pub is_basic_attack: bool,
}

impl AttackRequest {
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let mut parts = payload.split('|');
        Ok(Self {
            attacker_character_id: parse_num(
                field(&mut parts, "attackerCharacterId")?,
                "attackerCharacterId",
            )?,
            target_id: parse_num(field(&mut parts, "targetId")?, "targetId")?,
            ability_id: parse_num(field(&mut parts, "abilityId")?, "abilityId")?,
            is_basic_attack: parse_bool(
                field(&mut parts, "isBasicAttack")?,
                "isBasicAttack",
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackResult {
    pub attacker_id: u32,
    pub target_id: u32,
    pub damage: i32,
    pub was_hit: bool,
    pub remaining_hp: i32,
    pub result_code: u8,
    pub message: String,
}

impl AttackResult {
    pub fn to_payload(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.attacker_id,
            self.target_id,
            self.damage,
            bool_str(self.was_hit),
            self.remaining_hp,
            self.result_code,
            self.message
        )
    }
}

// ─── EntitySpawn / EntityUpdate / EntityDespawn ─────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpawn {
    pub entity_id: u32,
    pub entity_type: String,
    pub name: String,
    pub level: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub hp: i32,
    pub max_hp: i32,
}

impl EntitySpawn {
    pub fn to_payload(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.entity_id,
            self.entity_type,
            self.name,
            self.level,
            self.x,
            self.y,
            self.z,
            self.hp,
            self.max_hp
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate {
    pub entity_id: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub hp: i32,
    pub state: String,
}

impl EntityUpdate {
    pub fn to_payload(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.entity_id, self.x, self.y, self.z, self.hp, self.state
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnReason {
    Died,
    LeftInterestRange,
    Removed,
}

impl DespawnReason {
    fn code(self) -> u8 {
        match self {
            Self::Died => 0,
            Self::LeftInterestRange => 1,
            Self::Removed => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDespawn {
    pub entity_id: u32,
    pub reason: DespawnReason,
}

impl EntityDespawn {
    pub fn to_payload(&self) -> String {
        format!("{}|{}", self.entity_id, self.reason.code())
    }
}

// ─── DevCommand / DevCommandResponse ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DevCommand {
    pub character_id: u32,
    pub command: String,
    pub param1: String,
    pub param2: String,
}

impl DevCommand {
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let mut parts = payload.splitn(4, '|');
        let character_id = parse_num(field(&mut parts, "characterId")?, "characterId")?;
        let command = field(&mut parts, "command")?.to_string();
        let param1 = parts.next().unwrap_or("").to_string();
        let param2 = parts.next().unwrap_or("").to_string();
        Ok(Self {
            character_id,
            command,
            param1,
            param2,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DevCommandResponse {
    pub success: bool,
    pub message: String,
}

impl DevCommandResponse {
    pub fn to_payload(&self) -> String {
        format!("{}|{}", bool_str(self.success), self.message)
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1. ZoneAuthRequest parses the handshake payload from the happy-path scenario.
    #[test]
    fn zone_auth_request_parses() {
        let req = ZoneAuthRequest::parse("999|42").unwrap();
        assert_eq!(req.handoff_token, 999);
        assert_eq!(req.character_id, 42);
    }

    // 2. Missing fields are a ParseError, not a panic.
    #[test]
    fn zone_auth_request_missing_field_errs() {
        assert!(ZoneAuthRequest::parse("999").is_err());
    }

    // 3. MovementIntent round-trips all seven fields.
    #[test]
    fn movement_intent_parses_all_fields() {
        let m = MovementIntent::parse("42|7|1|-0.5|90|1|12345").unwrap();
        assert_eq!(m.character_id, 42);
        assert_eq!(m.sequence_number, 7);
        assert_eq!(m.input_x, 1.0);
        assert_eq!(m.input_y, -0.5);
        assert_eq!(m.yaw_degrees, 90.0);
        assert!(m.jump_pressed);
        assert_eq!(m.client_time_ms, 12345);
    }

    // 4. PlayerStateSnapshot serializes N entries inline.
    #[test]
    fn snapshot_serializes_entries() {
        let snap = PlayerStateSnapshot {
            snapshot_id: 3,
            entries: vec![PlayerSnapshotEntry {
                character_id: 1,
                x: 1.0,
                y: 2.0,
                z: 0.0,
                vx: 0.0,
                vy: 0.0,
                vz: 0.0,
                yaw: 0.0,
            }],
        };
        assert_eq!(snap.to_payload(), "3|1|1|1|2|0|0|0|0|0");
    }

    // 5. DevCommand keeps param1/param2 even when a command carries no args.
    #[test]
    fn dev_command_parses_bare_command() {
        let cmd = DevCommand::parse("42|suicide").unwrap();
        assert_eq!(cmd.command, "suicide");
        assert_eq!(cmd.param1, "");
    }

    // 6. DevCommand with one argument.
    #[test]
    fn dev_command_parses_with_param() {
        let cmd = DevCommand::parse("42|givexp|500").unwrap();
        assert_eq!(cmd.command, "givexp");
        assert_eq!(cmd.param1, "500");
        assert_eq!(cmd.param2, "");
    }

    // 7. AttackResult round-trips the out-of-range scenario payload shape.
    #[test]
    fn attack_result_out_of_range_payload() {
        let r = AttackResult {
            attacker_id: 1,
            target_id: 2,
            damage: 0,
            was_hit: false,
            remaining_hp: 50,
            result_code: 1,
            message: "Target out of range".to_string(),
        };
        assert_eq!(r.to_payload(), "1|2|0|0|50|1|Target out of range");
    }
}
