use std::collections::BTreeMap;
use std::ops::Range;

use motescope_api::message::MoteId;

use super::sample::{Channel, Sample};

/// Samples received from one mote. `samples[0]` holds logical time
/// `start_time`; slots never reported stay `None`.
#[derive(Debug, Clone)]
struct SampleBuffer {
    start_time: u16,
    samples: Vec<Option<Sample>>,
}

impl SampleBuffer {
    fn new(start_time: u16) -> Self {
        Self {
            start_time,
            samples: Vec::new(),
        }
    }

    fn place(&mut self, sample: Sample) -> Option<usize> {
        let index = i32::from(sample.logical_time) - i32::from(self.start_time);
        if index < 0 {
            return None;
        }

        let index = index as usize;
        if self.samples.len() <= index {
            self.samples.resize(index + 1, None);
        }
        self.samples[index] = Some(sample);

        Some(index)
    }

    fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index).and_then(Option::as_ref)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// Sample stored at `index`; `new_mote` is set for the first sample of a mote
    Placed { index: usize, new_mote: bool },
    /// Sample predates the mote's first observed logical time
    TooOld,
}

/// Per-mote sample buffers keyed by mote id
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: BTreeMap<MoteId, SampleBuffer>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, sample: Sample) -> Upsert {
        let mut new_mote = false;
        let buffer = self.nodes.entry(sample.mote_id).or_insert_with(|| {
            new_mote = true;
            SampleBuffer::new(sample.logical_time)
        });

        match buffer.place(sample) {
            Some(index) => Upsert::Placed { index, new_mote },
            None => Upsert::TooOld,
        }
    }

    /// Reading of `channel` at `index`, or `None` when the mote is unknown,
    /// the index is out of range, or the slot holds no data.
    pub fn get(&self, mote_id: MoteId, index: usize, channel: Channel) -> Option<u16> {
        self.sample(mote_id, index)
            .and_then(|sample| sample.reading(channel))
    }

    pub fn sample(&self, mote_id: MoteId, index: usize) -> Option<&Sample> {
        self.nodes.get(&mote_id).and_then(|buffer| buffer.get(index))
    }

    /// One past the highest index ever written for the mote, 0 if unknown
    pub fn max_index(&self, mote_id: MoteId) -> usize {
        self.nodes
            .get(&mote_id)
            .map_or(0, |buffer| buffer.samples.len())
    }

    /// Logical time stored at index 0 for the mote
    pub fn start_time(&self, mote_id: MoteId) -> Option<u16> {
        self.nodes.get(&mote_id).map(|buffer| buffer.start_time)
    }

    /// Readings of `channel` for every index in `range`, clamped to the buffer
    pub fn series(&self, mote_id: MoteId, channel: Channel, range: Range<usize>) -> Vec<Option<u16>> {
        let end = range.end.min(self.max_index(mote_id));

        (range.start..end)
            .map(|index| self.get(mote_id, index, channel))
            .collect()
    }

    pub fn motes(&self) -> Vec<MoteId> {
        self.nodes.keys().copied().collect()
    }

    pub fn contains(&self, mote_id: MoteId) -> bool {
        self.nodes.contains_key(&mote_id)
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
    }
}
