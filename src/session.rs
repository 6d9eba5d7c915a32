use crate::{
    config::{Config, DEFAULT_DEVICE_WEIGHT},
    error::RecordError,
    record::parse_line,
    time::{
        calc::TimestampExchange,
        fuse::{DeviceSample, DeviceSummary, DeviceTracker},
    },
};
use std::{collections::BTreeMap, fmt};
use tracing::debug;

/// Result of one accepted exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub device_id: u32,
    pub alias: Option<String>,
    pub sample: DeviceSample,
    pub smoothed_offset: f64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "device={} offset={} rtt={} jitter={} smoothed={}",
            self.device_id,
            self.sample.offset,
            self.sample.rtt,
            self.sample.jitter,
            self.smoothed_offset
        )
    }
}

pub struct CalibrationSession {
    cfg: Config,
    trackers: BTreeMap<u32, DeviceTracker>,
}

impl CalibrationSession {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            trackers: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn ingest_line(&mut self, line: &str) -> Result<Option<Report>, RecordError> {
        let Some(record) = parse_line(line)? else {
            return Ok(None);
        };
        self.ingest(record.device_id, &record.timestamps).map(Some)
    }

    pub fn ingest(&mut self, device_id: u32, timestamps: &[f64]) -> Result<Report, RecordError> {
        let exchange = TimestampExchange::try_from(timestamps)?;
        let entry = self.cfg.device(device_id);
        if entry.is_none() && !self.cfg.session.accept_unknown_devices {
            return Err(RecordError::UnknownDevice(device_id));
        }
        let alias = entry.and_then(|d| d.alias.clone());
        let weight = entry
            .and_then(|d| d.weight)
            .unwrap_or(DEFAULT_DEVICE_WEIGHT);

        let filter = &self.cfg.filter;
        let tracker = self.trackers.entry(device_id).or_insert_with(|| {
            debug!("tracking device {} (weight {})", device_id, weight);
            DeviceTracker::new(device_id, weight, filter)
        });
        let sample = tracker.push(&exchange);
        let smoothed_offset = tracker.smoothed_offset().unwrap_or(sample.offset);

        Ok(Report {
            device_id,
            alias,
            sample,
            smoothed_offset,
        })
    }

    pub fn tracker(&self, device_id: u32) -> Option<&DeviceTracker> {
        self.trackers.get(&device_id)
    }

    /// Summaries of every device seen so far, ordered by device id.
    pub fn summaries(&self) -> Vec<DeviceSummary> {
        self.trackers.values().filter_map(|t| t.summary()).collect()
    }
}
