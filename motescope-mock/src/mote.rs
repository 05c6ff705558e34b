use motescope_api::message::{ControlMsg, MoteMessage, SampleMsg};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::simulate::{light_lux, relative_humidity, temperature_celsius};

/// One simulated sensor node
#[derive(Debug, Clone)]
pub struct Mote {
    pub node_id: u8,
    pub version: u16,
    pub interval: u16,
    counter: u16,
    dropout: f64,
    day_length: u32,
}

impl Mote {
    pub fn new(node_id: u8, version: u16, interval: u16) -> Self {
        Self {
            node_id,
            version,
            interval,
            counter: 0,
            dropout: 0.0,
            day_length: 1800,
        }
    }

    /// Chance of each reading being reported as missing
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Samples per simulated day
    pub fn with_day_length(mut self, day_length: u32) -> Self {
        self.day_length = day_length.max(1);
        self
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Takes the next reading and advances the sample counter
    pub fn next_sample<R: Rng>(&mut self, rng: &mut R) -> SampleMsg {
        let day_fraction = (u32::from(self.counter) % self.day_length) as f64 / self.day_length as f64;
        let noise = Normal::new(0.0, 1.0).ok();
        let mut jitter = |scale: f64| noise.map_or(0.0, |n| n.sample(&mut *rng) * scale);

        let light = light_lux(day_fraction) + jitter(5.0);
        // Reported in hundredths of a degree
        let temperature = (temperature_celsius(day_fraction) + jitter(0.2)) * 100.0;
        let humidity = relative_humidity(day_fraction) + jitter(1.0);

        let sample = SampleMsg {
            node_id: self.node_id,
            version: self.version,
            interval: self.interval,
            time: self.counter,
            temperature: self.reading(rng, temperature),
            humidity: self.reading(rng, humidity),
            light: self.reading(rng, light),
        };

        self.counter = self.counter.wrapping_add(1);

        sample
    }

    /// Follows whatever the radio carries when it announces a newer version.
    /// Returns whether the interval was taken over.
    pub fn overhear(&mut self, message: &MoteMessage) -> bool {
        let (version, interval) = message.announcement();

        if version > self.version {
            self.version = version;
            self.interval = interval;
            true
        } else {
            false
        }
    }

    pub fn apply(&mut self, control: ControlMsg) -> bool {
        self.overhear(&MoteMessage::Control(control))
    }

    fn reading<R: Rng>(&self, rng: &mut R, value: f64) -> Option<u16> {
        if self.dropout > 0.0 && rng.random_bool(self.dropout) {
            return None;
        }

        // Stay clear of the missing sentinel
        Some(value.round().clamp(0.0, f64::from(u16::MAX - 1)) as u16)
    }
}
