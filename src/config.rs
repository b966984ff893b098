use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::PinError;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub unix_socket: Option<String>,
    pub host: Option<String>,
    pub path: String,
    pub timeout: u64,
}

/// Operational role assigned to a physical pin.
#[derive(Debug, Hash, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PinMode {
    Input,
    Output,
    Pwm,
    Clock,
}

/// Internal resistor biasing an undriven input pin.
#[derive(Debug, Hash, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PullMode {
    Off,
    PullDown,
    PullUp,
}

/// Pin addressing convention used by the underlying library. Must be
/// selected exactly once at process start, before any pin operation.
///
/// `BroadcomSys` drives pins through the /sys interface and does not
/// support PWM or clock output.
#[derive(Debug, Hash, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NumberingScheme {
    WiringPi,
    BroadcomGpio,
    BroadcomSys,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ButtonConfig {
    pub pins: Vec<u8>,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    pub pull: Option<PullMode>,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            pins: Vec::new(),
            sample_interval_ms: default_sample_interval_ms(),
            pull: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PulseConfig {
    #[serde(default = "default_pulse_duration_ms")]
    pub default_duration_ms: u64,
    #[serde(default = "default_max_pulse_duration_ms")]
    pub max_duration_ms: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: default_pulse_duration_ms(),
            max_duration_ms: default_max_pulse_duration_ms(),
        }
    }
}

fn default_sample_interval_ms() -> u64 {
    1000
}

fn default_pulse_duration_ms() -> u64 {
    500
}

fn default_max_pulse_duration_ms() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub numbering: NumberingScheme,
    #[serde(default)]
    pub buttons: ButtonConfig,
    #[serde(default)]
    pub pulse: PulseConfig,
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PinError> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| PinError::Config(format!("Failed to read config: {e}")))?;
        serde_json::from_str(&contents)
            .map_err(|e| PinError::Config(format!("Invalid config json: {e}")))
    }
}
