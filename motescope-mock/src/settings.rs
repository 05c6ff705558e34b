use std::error::Error;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Where the simulated serial forwarder listens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forwarder {
    pub host: String,
    pub port: u16,
    pub group: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swarm {
    pub motes: Vec<u8>,
    pub boot_interval: u16,
    pub boot_version: u16,
    pub dropout: f64,
    pub day_length: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub forwarder: Forwarder,
    pub swarm: Swarm,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/mock.toml"
        )))?;

        if !(0.0..=1.0).contains(&settings.swarm.dropout) {
            return Err("swarm.dropout must lie within 0..=1".into());
        }
        if settings.swarm.day_length == 0 {
            return Err("swarm.day_length must be positive".into());
        }

        Ok(settings)
    }
}
