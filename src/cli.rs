//! Hand-rolled `--key=value` argv scanning. Five independent scalars don't
//! warrant a declarative parser; this mirrors the flag set the zone process
//! has always accepted.

use tracing::warn;

#[derive(Debug, Clone)]
pub struct ZoneCliConfig {
    pub world_id: u32,
    pub zone_id: u32,
    pub zone_name: String,
    pub address: String,
    pub port: u16,
}

impl Default for ZoneCliConfig {
    fn default() -> Self {
        Self {
            world_id: 1,
            zone_id: 1,
            zone_name: "UnknownZone".to_string(),
            address: "0.0.0.0".to_string(),
            port: 7779,
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    InvalidValue { flag: String, value: String },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => {
                write!(f, "invalid value for {flag}: {value:?}")
            }
        }
    }
}

/// Parses `args` (excluding argv[0]) into a [`ZoneCliConfig`]. Unset flags keep
/// their default and log a warning naming the default in effect. Unrecognized
/// flags are logged and ignored rather than rejected.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ZoneCliConfig, CliError> {
    let mut cfg = ZoneCliConfig::default();
    let mut seen_world_id = false;
    let mut seen_zone_id = false;
    let mut seen_zone_name = false;
    let mut seen_address = false;
    let mut seen_port = false;

    for arg in args {
        let Some(rest) = arg.strip_prefix("--") else {
            warn!("ignoring unrecognized argument: {arg}");
            continue;
        };
        let Some((key, value)) = rest.split_once('=') else {
            warn!("ignoring malformed flag (expected --key=value): {arg}");
            continue;
        };
        match key {
            "world_id" => {
                cfg.world_id = value.parse().map_err(|_| CliError::InvalidValue {
                    flag: "world_id".to_string(),
                    value: value.to_string(),
                })?;
                seen_world_id = true;
            }
            "zone_id" => {
                cfg.zone_id = value.parse().map_err(|_| CliError::InvalidValue {
                    flag: "zone_id".to_string(),
                    value: value.to_string(),
                })?;
                seen_zone_id = true;
            }
            "zone_name" => {
                cfg.zone_name = value.to_string();
                seen_zone_name = true;
            }
            "address" => {
                cfg.address = value.to_string();
                seen_address = true;
            }
            "port" => {
                let port: u32 = value.parse().map_err(|_| CliError::InvalidValue {
                    flag: "port".to_string(),
                    value: value.to_string(),
                })?;
                if port == 0 || port > 65535 {
                    return Err(CliError::InvalidValue {
                        flag: "port".to_string(),
                        value: value.to_string(),
                    });
                }
                cfg.port = port as u16;
                seen_port = true;
            }
            other => {
                warn!("ignoring unrecognized flag: --{other}");
            }
        }
    }

    if !seen_world_id {
        warn!("--world_id not set, defaulting to {}", cfg.world_id);
    }
    if !seen_zone_id {
        warn!("--zone_id not set, defaulting to {}", cfg.zone_id);
    }
    if !seen_zone_name {
        warn!("--zone_name not set, defaulting to {:?}", cfg.zone_name);
    }
    if !seen_address {
        warn!("--address not set, defaulting to {:?}", cfg.address);
    }
    if !seen_port {
        warn!("--port not set, defaulting to {}", cfg.port);
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    // 1. All flags supplied are applied verbatim.
    #[test]
    fn parses_all_recognized_flags() {
        let cfg = parse_args(args(&[
            "--world_id=2",
            "--zone_id=10",
            "--zone_name=Crossroads",
            "--address=127.0.0.1",
            "--port=9000",
        ]))
        .unwrap();
        assert_eq!(cfg.world_id, 2);
        assert_eq!(cfg.zone_id, 10);
        assert_eq!(cfg.zone_name, "Crossroads");
        assert_eq!(cfg.address, "127.0.0.1");
        assert_eq!(cfg.port, 9000);
    }

    // 2. No flags supplied yields documented defaults.
    #[test]
    fn defaults_when_no_flags_given() {
        let cfg = parse_args(args(&[])).unwrap();
        assert_eq!(cfg.world_id, 1);
        assert_eq!(cfg.zone_id, 1);
        assert_eq!(cfg.zone_name, "UnknownZone");
        assert_eq!(cfg.address, "0.0.0.0");
        assert_eq!(cfg.port, 7779);
    }

    // 3. Out-of-range port is rejected.
    #[test]
    fn rejects_out_of_range_port() {
        assert!(parse_args(args(&["--port=70000"])).is_err());
        assert!(parse_args(args(&["--port=0"])).is_err());
    }

    // 4. Non-numeric value for a numeric flag is rejected.
    #[test]
    fn rejects_non_numeric_world_id() {
        assert!(parse_args(args(&["--world_id=abc"])).is_err());
    }

    // 5. Unrecognized flags are ignored, not fatal.
    #[test]
    fn ignores_unrecognized_flags() {
        let cfg = parse_args(args(&["--bogus=1", "--zone_id=5"])).unwrap();
        assert_eq!(cfg.zone_id, 5);
    }
}
