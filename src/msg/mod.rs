pub mod types;

/// Numeric type codes carried in the frame header (`net::protocol::MessageHeader::kind`).
/// No authoritative full numbering survives in the retrieved original source (its own
/// `MessageType` enum only covers an earlier, overlapping-but-different 11-value subset);
/// this continues that scheme's numbering into the 40s/50s/60s/70s ranges by message family.
pub mod kind {
    pub const ZONE_AUTH_REQUEST: u16 = 30;
    pub const ZONE_AUTH_RESPONSE: u16 = 31;
    pub const MOVEMENT_INTENT: u16 = 40;
    pub const PLAYER_STATE_SNAPSHOT: u16 = 41;
    pub const ATTACK_REQUEST: u16 = 50;
    pub const ATTACK_RESULT: u16 = 51;
    pub const ENTITY_SPAWN: u16 = 60;
    pub const ENTITY_UPDATE: u16 = 61;
    pub const ENTITY_DESPAWN: u16 = 62;
    pub const DEV_COMMAND: u16 = 70;
    pub const DEV_COMMAND_RESPONSE: u16 = 71;
}
