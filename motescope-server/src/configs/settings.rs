use std::env;

use config::{Config, ConfigError, Environment, File};
use motescope_api::message::DEFAULT_INTERVAL;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Serial forwarder the base station talks to the motes through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bridge {
    pub host: String,
    pub port: u16,
    /// Link address stamped on outgoing packets
    pub source: u16,
    pub group: u8,
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "default_interval")]
    pub default_interval: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultLog {
    /// No file is written when unset
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub bridge: Bridge,
    pub session: Session,
    #[serde(default)]
    pub result_log: ResultLog,
}

fn default_interval() -> u16 {
    DEFAULT_INTERVAL
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("MOTESCOPE").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if settings.session.default_interval == 0 {
            return Err(ConfigError::Message(
                "session.default_interval must be at least 1".into(),
            ));
        }

        Ok(settings)
    }
}
