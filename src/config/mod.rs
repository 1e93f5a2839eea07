use std::env;

/// Config holds all library configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            db_path: get_env("DB_PATH", "/data/topology.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_has_usable_defaults() {
        let cfg = Config::load();
        assert!(!cfg.db_path.is_empty());
        assert!(cfg.db_max_connections >= 1);
    }
}
