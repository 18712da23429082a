//! Session Service (spec §6.3): validates handoff/session tokens issued by the
//! login/world tier. Modeled as a trait with one passed-in implementation
//! rather than the upstream's process-wide singleton, per the design note in
//! SPEC_FULL.md §9.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionRecord {
    pub token: u64,
    pub account_id: u32,
    pub character_id: u32,
    pub zone_id: u32,
    pub expires_at: u64,
}

pub trait SessionService: Send {
    fn validate(&self, token: u64) -> Option<SessionRecord>;
    fn reload_from_file(&mut self) -> bool;
}

#[derive(Debug, Deserialize)]
struct SessionsDoc {
    #[serde(default)]
    sessions: Vec<SessionRecord>,
}

pub struct FileSessionService {
    path: PathBuf,
    sessions: HashMap<u64, SessionRecord>,
}

impl FileSessionService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sessions: HashMap::new(),
        }
    }
}

impl SessionService for FileSessionService {
    fn validate(&self, token: u64) -> Option<SessionRecord> {
        self.sessions.get(&token).cloned()
    }

    fn reload_from_file(&mut self) -> bool {
        if !self.path.exists() {
            warn!("[ZONEAUTH] no session cache at {}", self.path.display());
            return false;
        }
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                warn!("[ZONEAUTH] failed to read sessions: {e}");
                return false;
            }
        };
        match serde_json::from_str::<SessionsDoc>(&text) {
            Ok(doc) => {
                self.sessions = doc.sessions.into_iter().map(|s| (s.token, s)).collect();
                true
            }
            Err(e) => {
                warn!("[ZONEAUTH] failed to parse sessions: {e}");
                false
            }
        }
    }
}

pub fn sessions_path(data_root: &Path) -> PathBuf {
    data_root.join("sessions.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // 1. A token not present in the loaded cache fails validation.
    #[test]
    fn unknown_token_fails_validation() {
        let svc = FileSessionService::new("/nonexistent/sessions.json");
        assert!(svc.validate(123).is_none());
    }

    // 2. Reloading from a real file makes its tokens validate.
    #[test]
    fn reload_then_validate_known_token() {
        let path = std::env::temp_dir().join("req-zoneserver-sessions-test.json");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(br#"{"sessions":[{"token":999,"account_id":1,"character_id":42,"zone_id":10,"expires_at":9999999999}]}"#)
            .unwrap();
        let mut svc = FileSessionService::new(&path);
        assert!(svc.reload_from_file());
        assert_eq!(svc.validate(999).unwrap().character_id, 42);
        let _ = fs::remove_file(&path);
    }
}
