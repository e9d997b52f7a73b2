use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub business_rules: BusinessRules,
    pub demo_show: DemoShowConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Hold TTL in seconds. Expiry is enforced at validate/promote time and
    /// reclaimed by the sweeper, never by cancelling a request.
    pub hold_ttl_seconds: u64,
    /// Sweep interval; defaults to a tenth of the TTL.
    #[serde(default)]
    pub sweep_interval_seconds: Option<u64>,
}

impl BusinessRules {
    pub fn sweep_interval_seconds(&self) -> u64 {
        self.sweep_interval_seconds
            .unwrap_or_else(|| (self.hold_ttl_seconds / 10).max(1))
    }
}

/// Seed data for the demo screening. Show provisioning proper lives outside
/// the engine; this stands in for it at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct DemoShowConfig {
    pub title: String,
    pub rows: u32,
    pub seats_per_row: u32,
    pub base_price: i64,
    pub premium_price: i64,
    pub starts_in_minutes: i64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file (not checked in)
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of MARQUEE)
            // Eg.. `MARQUEE__SERVER__PORT=8080` would set the server port
            .add_source(config::Environment::with_prefix("MARQUEE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_interval_defaults_to_tenth_of_ttl() {
        let rules = BusinessRules {
            hold_ttl_seconds: 300,
            sweep_interval_seconds: None,
        };
        assert_eq!(rules.sweep_interval_seconds(), 30);

        let explicit = BusinessRules {
            hold_ttl_seconds: 300,
            sweep_interval_seconds: Some(5),
        };
        assert_eq!(explicit.sweep_interval_seconds(), 5);

        // Never a zero interval for tiny TTLs
        let tiny = BusinessRules {
            hold_ttl_seconds: 2,
            sweep_interval_seconds: None,
        };
        assert_eq!(tiny.sweep_interval_seconds(), 1);
    }
}
