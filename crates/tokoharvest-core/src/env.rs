use crate::fetch_config::FetchConfig;
use crate::ConfigError;

/// Load fetch configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are unparsable or out of range.
pub fn load_fetch_config() -> Result<FetchConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_fetch_config_from_env()
}

/// Load fetch configuration from environment variables already in the process.
///
/// Unlike [`load_fetch_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are unparsable or out of range.
pub fn load_fetch_config_from_env() -> Result<FetchConfig, ConfigError> {
    build_fetch_config(|key| std::env::var(key))
}

/// Build fetch configuration using the provided env-var lookup function.
///
/// Absent variables fall back to [`FetchConfig::default`]. The result is
/// validated before it is returned, so callers never see an out-of-range
/// config. Decoupled from the actual environment so it can be tested with a
/// pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_fetch_config<F>(lookup: F) -> Result<FetchConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let defaults = FetchConfig::default();

    // Absent means "paginate to exhaustion", so there is no numeric default.
    let max_pages = match lookup("TOKOHARVEST_MAX_PAGES") {
        Ok(raw) => Some(raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: "TOKOHARVEST_MAX_PAGES".to_string(),
            reason: e.to_string(),
        })?),
        Err(_) => None,
    };

    let config = FetchConfig {
        batch_size: parse_usize("TOKOHARVEST_BATCH_SIZE", defaults.batch_size)?,
        max_workers: parse_usize("TOKOHARVEST_MAX_WORKERS", defaults.max_workers)?,
        page_size: parse_u32("TOKOHARVEST_PAGE_SIZE", defaults.page_size)?,
        batch_delay_ms: parse_u64("TOKOHARVEST_BATCH_DELAY_MS", defaults.batch_delay_ms)?,
        request_timeout_secs: parse_u64(
            "TOKOHARVEST_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        )?,
        retry_total: parse_u32("TOKOHARVEST_RETRY_TOTAL", defaults.retry_total)?,
        backoff_base_ms: parse_u64("TOKOHARVEST_BACKOFF_BASE_MS", defaults.backoff_base_ms)?,
        pool_connections: parse_usize("TOKOHARVEST_POOL_CONNECTIONS", defaults.pool_connections)?,
        pool_max_size: parse_usize("TOKOHARVEST_POOL_MAX_SIZE", defaults.pool_max_size)?,
        max_pages,
        user_agent: lookup("TOKOHARVEST_USER_AGENT").unwrap_or(defaults.user_agent),
    };

    config.validate()?;

    Ok(config)
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
    fn build_fetch_config_empty_env_yields_defaults() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_fetch_config(lookup_from_map(&map)).expect("defaults should validate");
        assert_eq!(cfg.batch_size, 25);
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.batch_delay_ms, 2000);
        assert_eq!(cfg.request_timeout_secs, 20);
        assert_eq!(cfg.retry_total, 5);
        assert_eq!(cfg.backoff_base_ms, 500);
        assert_eq!(cfg.pool_connections, 50);
        assert_eq!(cfg.pool_max_size, 50);
        assert_eq!(cfg.max_pages, None);
    }

    #[test]
    fn build_fetch_config_batch_size_override() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_BATCH_SIZE", "50");
        let cfg = build_fetch_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.batch_size, 50);
    }

    #[test]
    fn build_fetch_config_batch_size_invalid() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_BATCH_SIZE", "not-a-number");
        let result = build_fetch_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TOKOHARVEST_BATCH_SIZE"),
            "expected InvalidEnvVar(TOKOHARVEST_BATCH_SIZE), got: {result:?}"
        );
    }

    #[test]
    fn build_fetch_config_max_workers_override() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_MAX_WORKERS", "4");
        let cfg = build_fetch_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_workers, 4);
    }

    #[test]
    fn build_fetch_config_zero_max_workers_fails_validation() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_MAX_WORKERS", "0");
        let result = build_fetch_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("max_workers")),
            "expected Validation(max_workers), got: {result:?}"
        );
    }

    #[test]
    fn build_fetch_config_backoff_base_override() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_BACKOFF_BASE_MS", "250");
        let cfg = build_fetch_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.backoff_base_ms, 250);
    }

    #[test]
    fn build_fetch_config_retry_total_invalid() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_RETRY_TOTAL", "-1");
        let result = build_fetch_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TOKOHARVEST_RETRY_TOTAL"),
            "expected InvalidEnvVar(TOKOHARVEST_RETRY_TOTAL), got: {result:?}"
        );
    }

    #[test]
    fn build_fetch_config_max_pages_absent_is_none() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_fetch_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_pages, None);
    }

    #[test]
    fn build_fetch_config_max_pages_override() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_MAX_PAGES", "100");
        let cfg = build_fetch_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_pages, Some(100));
    }

    #[test]
    fn build_fetch_config_max_pages_zero_fails_validation() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_MAX_PAGES", "0");
        let result = build_fetch_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("max_pages")),
            "expected Validation(max_pages), got: {result:?}"
        );
    }

    #[test]
    fn build_fetch_config_user_agent_override() {
        let mut map = HashMap::new();
        map.insert("TOKOHARVEST_USER_AGENT", "custom-agent/2.0");
        let cfg = build_fetch_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.user_agent, "custom-agent/2.0");
    }
}
