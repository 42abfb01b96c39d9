// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

use crate::logos::{RankPolicy, DEFAULT_EXTENSION_PREFERENCE, DEFAULT_SUBDIR_PREFERENCE};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub logos: LogosConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Listen backlog passed to `listen(2)`
    #[serde(default = "default_backlog")]
    pub backlog: i32,
}

#[allow(clippy::missing_const_for_fn)]
fn default_backlog() -> i32 {
    128
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    /// `Cache-Control` max-age for logo responses, in seconds
    pub cache_max_age: u32,
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Logos directory and selection preferences
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogosConfig {
    /// Root of the logos tree
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    /// Category directories, most preferred first
    #[serde(default = "default_subdir_preference")]
    pub subdir_preference: Vec<String>,
    /// File extensions, most preferred first
    #[serde(default = "default_extension_preference")]
    pub extension_preference: Vec<String>,
}

fn default_root_dir() -> String {
    "logos".to_string()
}

fn default_subdir_preference() -> Vec<String> {
    DEFAULT_SUBDIR_PREFERENCE.iter().map(ToString::to_string).collect()
}

fn default_extension_preference() -> Vec<String> {
    DEFAULT_EXTENSION_PREFERENCE
        .iter()
        .map(|e| format!(".{e}"))
        .collect()
}

impl Default for LogosConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            subdir_preference: default_subdir_preference(),
            extension_preference: default_extension_preference(),
        }
    }
}

impl LogosConfig {
    /// Ranking policy described by this section
    pub fn rank_policy(&self) -> RankPolicy {
        RankPolicy::new(
            self.subdir_preference.iter().cloned(),
            &self.extension_preference,
        )
    }
}
