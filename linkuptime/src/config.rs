use crate::render::RenderOptions;

use linkuptime_client::{ConnectParams, Registration};
use std::collections::HashMap;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing_core::LevelFilter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinLogTarget {
    Stdout,
    Stderr,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum LogTarget {
    File { filename: PathBuf },
    Builtin(BuiltinLogTarget),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct LogEntry {
    pub target: LogTarget,
    #[serde(default)]
    pub modules: Vec<String>,
    pub level: Option<LogLevel>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Directory for file targets
    pub dir: PathBuf,
    pub default_level: Option<LogLevel>,
    pub module_levels: HashMap<String, LogLevel>,
    pub targets: Vec<LogEntry>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            default_level: None,
            module_levels: HashMap::new(),
            targets: vec![LogEntry {
                target: LogTarget::Builtin(BuiltinLogTarget::Stderr),
                modules: Vec::new(),
                level: Some(LogLevel::Info),
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct OperCredentials {
    pub name: String,
    pub password: String,
}

/// Everything about a run except the host to connect to.
///
/// Loaded from an optional JSON file; command-line flags are applied on top.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub nick: String,
    pub username: String,
    pub realname: String,
    pub port: u16,
    pub tls: bool,
    /// Used to prefix the protocol trace and to name the graph
    pub session_name: String,
    /// Hold off querying until RPL_YOUREOPER
    pub wait_oper: bool,
    pub oper: Option<OperCredentials>,
    pub render: RenderOptions,
    pub log: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nick: "linkuptime".to_string(),
            username: "linkuptime".to_string(),
            realname: "linkuptime".to_string(),
            port: 6697,
            tls: true,
            session_name: "uppies".to_string(),
            wait_oper: false,
            oper: None,
            render: RenderOptions::default(),
            log: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load_file(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(filename)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn connect_params(&self, host: &str) -> ConnectParams {
        ConnectParams {
            host: host.to_string(),
            port: self.port,
            tls: self.tls,
        }
    }

    pub fn registration(&self) -> Registration {
        Registration {
            nick: self.nick.clone(),
            username: self.username.clone(),
            realname: self.realname.clone(),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(arg: LogLevel) -> LevelFilter {
        match arg {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}
