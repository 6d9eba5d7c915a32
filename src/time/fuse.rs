use crate::{
    config::FilterCfg,
    time::{calc::TimestampExchange, drift::linreg_slope_ppm},
};
use std::{cmp::Ordering, collections::VecDeque};

#[derive(Clone, Default)]
pub struct WeightedEwma {
    lambda: f64,
    state: f64,
    init: bool,
}

/// One accepted exchange with a device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceSample {
    /// Requester receive time of the exchange.
    pub at: f64,
    pub offset: f64,
    pub rtt: f64,
    pub jitter: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeviceSummary {
    pub device_id: u32,
    pub samples: usize,
    pub last_offset: f64,
    pub median_offset: f64,
    pub smoothed_offset: f64,
    pub median_rtt: f64,
    pub jitter: f64,
    pub drift_ppm: f64,
}

/// Rolling offset state for a single device.
#[derive(Clone)]
pub struct DeviceTracker {
    device_id: u32,
    weight: f64,
    capacity: usize,
    window: VecDeque<DeviceSample>,
    evicted: bool,
    ewma: WeightedEwma,
}

impl WeightedEwma {
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda: lambda.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    pub fn push(&mut self, value: f64, weight: f64) -> f64 {
        let alpha = (self.lambda * (1.0 + weight / 4.0)).clamp(0.0, 1.0);
        if !self.init {
            self.state = value;
            self.init = true;
        } else {
            self.state = alpha * value + (1.0 - alpha) * self.state;
        }
        self.state
    }

    pub fn value(&self) -> Option<f64> {
        self.init.then_some(self.state)
    }
}

impl DeviceTracker {
    pub fn new(device_id: u32, weight: f64, filter: &FilterCfg) -> Self {
        let capacity = filter.window.max(1);
        Self {
            device_id,
            weight: weight.max(0.01),
            capacity,
            window: VecDeque::new(),
            evicted: false,
            ewma: WeightedEwma::new(filter.lambda),
        }
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn push(&mut self, exchange: &TimestampExchange) -> DeviceSample {
        let est = exchange.estimate();
        let jitter = self
            .window
            .back()
            .map(|prev| (est.rtt - prev.rtt).abs())
            .unwrap_or(0.0);
        let sample = DeviceSample {
            at: exchange.t4(),
            offset: est.offset,
            rtt: est.rtt,
            jitter,
        };
        if self.window.len() == self.capacity {
            self.window.pop_front();
            self.evicted = true;
        }
        self.window.push_back(sample);
        self.ewma.push(sample.offset, self.weight);
        sample
    }

    pub fn smoothed_offset(&self) -> Option<f64> {
        self.ewma.value()
    }

    pub fn summary(&self) -> Option<DeviceSummary> {
        let last = self.window.back()?;
        let offsets: Vec<f64> = self.window.iter().map(|s| s.offset).collect();
        let rtts: Vec<f64> = self.window.iter().map(|s| s.rtt).collect();
        // the device's very first sample has no predecessor to measure against
        let first_kept = usize::from(!self.evicted);
        let jitters: Vec<f64> = self
            .window
            .iter()
            .skip(first_kept)
            .map(|s| s.jitter)
            .collect();
        let series: Vec<(f64, f64)> = self.window.iter().map(|s| (s.at, s.offset)).collect();

        Some(DeviceSummary {
            device_id: self.device_id,
            samples: self.window.len(),
            last_offset: last.offset,
            median_offset: robust_median(&offsets).unwrap_or(last.offset),
            smoothed_offset: self.ewma.value().unwrap_or(last.offset),
            median_rtt: robust_median(&rtts).unwrap_or(last.rtt),
            jitter: robust_median(&jitters).unwrap_or(0.0),
            drift_ppm: linreg_slope_ppm(&series),
        })
    }
}

fn robust_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
