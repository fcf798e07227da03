use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any present env var has an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if any present env var has an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The core parsing logic is decoupled from the actual environment so it can
/// be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let data_dir = PathBuf::from(or_default("SWEEP_DATA_DIR", "./data"));
    let platforms_path = PathBuf::from(or_default(
        "SWEEP_PLATFORMS_PATH",
        "./config/platforms.json",
    ));
    let export_dir = PathBuf::from(or_default("SWEEP_EXPORT_DIR", "./exports"));
    let log_level = or_default("SWEEP_LOG_LEVEL", "info");
    let http_timeout_secs = parse_u64("SWEEP_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SWEEP_USER_AGENT", "sweep/0.1 (post-collection)");
    let failure_cooldown_secs = parse_u64("SWEEP_FAILURE_COOLDOWN_SECS", "300")?;

    Ok(AppConfig {
        data_dir,
        platforms_path,
        export_dir,
        log_level,
        http_timeout_secs,
        user_agent,
        failure_cooldown_secs,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should apply");
        assert_eq!(cfg.data_dir, PathBuf::from("./data"));
        assert_eq!(cfg.platforms_path, PathBuf::from("./config/platforms.json"));
        assert_eq!(cfg.export_dir, PathBuf::from("./exports"));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.http_timeout_secs, 30);
        assert_eq!(cfg.user_agent, "sweep/0.1 (post-collection)");
        assert_eq!(cfg.failure_cooldown_secs, 300);
    }

    #[test]
    fn build_app_config_honors_overrides() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SWEEP_DATA_DIR", "/var/lib/sweep");
        map.insert("SWEEP_HTTP_TIMEOUT_SECS", "5");
        map.insert("SWEEP_FAILURE_COOLDOWN_SECS", "60");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/sweep"));
        assert_eq!(cfg.http_timeout_secs, 5);
        assert_eq!(cfg.failure_cooldown_secs, 60);
    }

    #[test]
    fn build_app_config_rejects_non_numeric_timeout() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SWEEP_HTTP_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SWEEP_HTTP_TIMEOUT_SECS"),
            "expected InvalidEnvVar(SWEEP_HTTP_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn db_path_is_under_data_dir() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.db_path(), PathBuf::from("./data/posts.db"));
    }
}
