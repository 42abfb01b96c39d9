// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HealthConfig, HttpConfig, LoggingConfig, LogosConfig, PerformanceConfig, ServerConfig,
};

/// Prefix for environment overrides, e.g. `TICKER_LOGOS_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "TICKER_LOGOS";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "Ticker-Logos/0.1")?
            .set_default("http.enable_cors", true)?
            .set_default("http.cache_max_age", 86_400)?
            .set_default("logos.root_dir", "logos")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.logos.root_dir, "logos");
        assert!(cfg.http.enable_cors);
        assert_eq!(cfg.http.cache_max_age, 86_400);
        assert!(cfg.health.enabled);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logos.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9100

[logos]
root_dir = "/srv/logos"
extension_preference = [".svg", ".png"]
"#,
        )
        .unwrap();

        let base = dir.path().join("logos");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.logos.root_dir, "/srv/logos");
        assert_eq!(cfg.logos.extension_preference, vec![".svg", ".png"]);
        assert_eq!(cfg.logos.subdir_preference.len(), 4);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8000".parse::<SocketAddr>().unwrap()
        );
    }
}
