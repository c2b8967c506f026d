use crate::analysis::roster::{DEFAULT_MIN_PICK_RATE, DEFAULT_MIN_ROLE_ASSIGNMENT_RATE};
use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_POOL_SIZE: u32 = 5;
pub const DEFAULT_STALE_HOURS: u64 = 24;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub patches: Vec<String>,
    pub min_pick_rate: f64,
    pub min_role_assignment_rate: f64,
    pub pool_size: u32,
    pub stale_after_hours: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let data_dir = match lookup("DRAFT_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .map(|home| home.join(".draft_insight"))
                .ok_or_else(|| {
                    AppError::ConfigError("DRAFT_DATA_DIR not set and no home directory found".to_string())
                })?,
        };

        let patches = lookup("DRAFT_PATCHES")
            .map(|list| parse_patch_list(&list))
            .unwrap_or_else(|| vec!["30".to_string()]);

        Ok(Config {
            data_dir,
            patches,
            min_pick_rate: parse_var(&lookup, "DRAFT_MIN_PICK_RATE", DEFAULT_MIN_PICK_RATE)?,
            min_role_assignment_rate: parse_var(&lookup, "DRAFT_MIN_ROLE_RATE", DEFAULT_MIN_ROLE_ASSIGNMENT_RATE)?,
            pool_size: parse_var(&lookup, "DRAFT_POOL_SIZE", DEFAULT_POOL_SIZE)?,
            stale_after_hours: parse_var(&lookup, "DRAFT_STALE_HOURS", DEFAULT_STALE_HOURS)?,
        })
    }
}

fn parse_patch_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|patch| !patch.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::ConfigError(format!("{} has an invalid value: {}", key, value))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DRAFT_DATA_DIR", "/tmp/draft")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/draft"));
        assert_eq!(config.patches, vec!["30".to_string()]);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.min_pick_rate, DEFAULT_MIN_PICK_RATE);
        assert_eq!(config.stale_after_hours, DEFAULT_STALE_HOURS);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DRAFT_DATA_DIR", "/data"),
            ("DRAFT_PATCHES", "14.1, 14.2,"),
            ("DRAFT_MIN_PICK_RATE", "0.01"),
            ("DRAFT_POOL_SIZE", "3"),
        ])
        .unwrap();
        assert_eq!(config.patches, vec!["14.1".to_string(), "14.2".to_string()]);
        assert_eq!(config.min_pick_rate, 0.01);
        assert_eq!(config.pool_size, 3);
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let result = config_from(&[("DRAFT_DATA_DIR", "/data"), ("DRAFT_POOL_SIZE", "five")]);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
