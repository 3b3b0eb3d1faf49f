use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_ttl_minutes")]
    pub seat_lock_ttl_minutes: u64,
    #[serde(default = "default_sweep_interval")]
    pub lock_sweep_interval_seconds: u64,
    /// Upper bound on waiting for the store's write lock; past it the caller
    /// loses the race instead of blocking.
    #[serde(default = "default_lock_wait")]
    pub lock_wait_seconds: u64,
    #[serde(default = "default_premium_multiplier")]
    pub premium_price_multiplier: f64,
    #[serde(default = "default_vip_multiplier")]
    pub vip_price_multiplier: f64,
}

fn default_ttl_minutes() -> u64 {
    10
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_lock_wait() -> u64 {
    5
}

fn default_premium_multiplier() -> f64 {
    1.25
}

fn default_vip_multiplier() -> f64 {
    1.5
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            seat_lock_ttl_minutes: default_ttl_minutes(),
            lock_sweep_interval_seconds: default_sweep_interval(),
            lock_wait_seconds: default_lock_wait(),
            premium_price_multiplier: default_premium_multiplier(),
            vip_price_multiplier: default_vip_multiplier(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("MARQUEE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_defaults() {
        let rules = BusinessRules::default();
        assert_eq!(rules.seat_lock_ttl_minutes, 10);
        assert_eq!(rules.lock_sweep_interval_seconds, 60);
        assert_eq!(rules.lock_wait_seconds, 5);
        assert!((rules.premium_price_multiplier - 1.25).abs() < f64::EPSILON);
        assert!((rules.vip_price_multiplier - 1.5).abs() < f64::EPSILON);
    }
}
