use motescope_api::message::{MoteId, SampleMsg};
use serde::{Deserialize, Serialize};

/// Sensor channel a mote reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Light,
    Temperature,
    Humidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub mote_id: MoteId,
    /// Counter assigned by the mote, basis of the buffer index
    pub logical_time: u16,
    pub light: Option<u16>,
    pub temperature: Option<u16>,
    pub humidity: Option<u16>,
}

impl Sample {
    pub fn reading(&self, channel: Channel) -> Option<u16> {
        match channel {
            Channel::Light => self.light,
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
        }
    }
}

impl From<SampleMsg> for Sample {
    fn from(msg: SampleMsg) -> Self {
        Self {
            mote_id: MoteId::from(msg.node_id),
            logical_time: msg.time,
            light: msg.light,
            temperature: msg.temperature,
            humidity: msg.humidity,
        }
    }
}
