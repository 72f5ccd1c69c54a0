//! Server configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! through `dotenvy`) and can be overridden by command-line flags.
//!
//! | Variable                    | Default        |
//! |-----------------------------|----------------|
//! | `CODELIST_PORT`             | `3000`         |
//! | `CODELIST_DATA_DIR`         | unset (memory) |
//! | `CODELIST_MAX_UPLOAD_BYTES` | `10485760`     |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;

/// 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Directory of the filesystem store; `None` keeps files in memory.
    pub data_dir: Option<PathBuf>,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`; unparsable values fall back to
    /// the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_or(&lookup, "CODELIST_PORT", defaults.port),
            data_dir: lookup("CODELIST_DATA_DIR")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            max_upload_bytes: parse_or(&lookup, "CODELIST_MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 3000);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_reads_values() {
        let config = Config::from_lookup(lookup(&[
            ("CODELIST_PORT", "8081"),
            ("CODELIST_DATA_DIR", "/var/lib/codelist"),
            ("CODELIST_MAX_UPLOAD_BYTES", "1024"),
        ]));
        assert_eq!(config.port, 8081);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/codelist")));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("CODELIST_PORT", "eighty"),
            ("CODELIST_DATA_DIR", "  "),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.data_dir.is_none());
    }
}
