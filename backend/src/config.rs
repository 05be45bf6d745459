use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const ADDR_ENV: &str = "MATHVIZ_ADDR";
pub const ASSETS_DIR_ENV: &str = "MATHVIZ_ASSETS_DIR";
// Idle time after which a browser session and its parameters are dropped.
pub const SESSION_TTL_ENV: &str = "MATHVIZ_SESSION_TTL_SECS";

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3_600;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}: invalid socket address {value:?}")]
    InvalidAddr { var: &'static str, value: String },
    #[error("{var}: expected a positive number of seconds, got {value:?}")]
    InvalidTtl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub addr: SocketAddr,
    pub assets_dir: PathBuf,
    pub session_ttl: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset or blank variables take their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_addr = get(ADDR_ENV).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr {
                var: ADDR_ENV,
                value: raw_addr.clone(),
            })?;

        let assets_dir = get(ASSETS_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));

        let ttl_secs = match get(SESSION_TTL_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidTtl {
                        var: SESSION_TTL_ENV,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Self {
            addr,
            assets_dir,
            session_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.addr, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(s.assets_dir, PathBuf::from("assets"));
        assert_eq!(s.session_ttl, Duration::from_secs(3_600));
    }

    #[test]
    fn overrides_are_read() {
        let s = settings(&[
            (ADDR_ENV, "127.0.0.1:9000"),
            (ASSETS_DIR_ENV, "/srv/mathviz"),
            (SESSION_TTL_ENV, " 60 "),
        ])
        .unwrap();
        assert_eq!(s.addr.port(), 9000);
        assert_eq!(s.assets_dir, PathBuf::from("/srv/mathviz"));
        assert_eq!(s.session_ttl, Duration::from_secs(60));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let s = settings(&[(ADDR_ENV, "  "), (SESSION_TTL_ENV, "")]).unwrap();
        assert_eq!(s.addr.port(), 8080);
        assert_eq!(s.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            settings(&[(ADDR_ENV, "localhost")]),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert_eq!(
            settings(&[(SESSION_TTL_ENV, "0")]),
            Err(ConfigError::InvalidTtl {
                var: SESSION_TTL_ENV,
                value: "0".into()
            })
        );
        assert!(settings(&[(SESSION_TTL_ENV, "-5")]).is_err());
    }
}
