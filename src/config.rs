use anyhow::Context;
use serde::Deserialize;
use std::{fs, io, path::Path};

pub const DEFAULT_LAMBDA: f64 = 0.2;
pub const DEFAULT_WINDOW: usize = 32;
pub const MAX_WINDOW: usize = 65_536;
pub const DEFAULT_DEVICE_WEIGHT: f64 = 1.0;

#[derive(Clone, Debug, Deserialize)]
pub struct DeviceEntry {
    pub id: u32,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// EWMA smoothing factor.
    pub lambda: f64,
    /// Number of recent exchanges kept per device.
    pub window: usize,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
    /// Accept records from devices missing in `devices`.
    pub accept_unknown_devices: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterCfg,
    #[serde(default)]
    pub session: SessionCfg,
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            window: DEFAULT_WINDOW,
        }
    }
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            accept_unknown_devices: true,
        }
    }
}

impl Config {
    pub fn device(&self, id: u32) -> Option<&DeviceEntry> {
        self.devices.iter().find(|d| d.id == id)
    }
}

pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let buf = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&buf).with_context(|| format!("failed to parse config {}", path.display()))
}

/// Loads `path`, or returns defaults when the file is absent and the path was
/// not asked for explicitly.
pub fn load_or_default(path: impl AsRef<Path>, required: bool) -> anyhow::Result<Config> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(buf) => {
            parse(&buf).with_context(|| format!("failed to parse config {}", path.display()))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            tracing::info!("config {} not found; using defaults", path.display());
            Ok(Config::default())
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    }
}

pub fn parse(buf: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str::<Config>(buf)?)
}

pub fn ensure_defaults(cfg: &mut Config) {
    if !(0.0..=1.0).contains(&cfg.filter.lambda) {
        tracing::warn!(
            "filter.lambda {} out of range; using {}",
            cfg.filter.lambda,
            DEFAULT_LAMBDA
        );
        cfg.filter.lambda = DEFAULT_LAMBDA;
    }
    if cfg.filter.window == 0 {
        tracing::warn!("filter.window must be positive; using {}", DEFAULT_WINDOW);
        cfg.filter.window = DEFAULT_WINDOW;
    } else if cfg.filter.window > MAX_WINDOW {
        tracing::warn!(
            "filter.window {} too large; capping at {}",
            cfg.filter.window,
            MAX_WINDOW
        );
        cfg.filter.window = MAX_WINDOW;
    }
    for device in &mut cfg.devices {
        if let Some(w) = device.weight {
            if !(w.is_finite() && w > 0.0) {
                tracing::warn!(
                    "device {} weight {} invalid; using {}",
                    device.id,
                    w,
                    DEFAULT_DEVICE_WEIGHT
                );
                device.weight = Some(DEFAULT_DEVICE_WEIGHT);
            }
        }
    }
    if cfg.devices.is_empty() && !cfg.session.accept_unknown_devices {
        tracing::info!("no devices configured and unknown devices rejected; every record will fail");
    }
}
