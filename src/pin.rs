use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockUpgradableReadGuard};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::{NumberingScheme, PinMode, PullMode};
use crate::error::PinError;

/// Number of addressable pin indices. Board dependent; 64 covers every
/// expansion header the underlying library can drive.
pub const PIN_COUNT: u8 = 64;

/// Upper bound of the PWM register range. Writes are clamped to
/// `0..=PWM_RANGE_MAX`, matching the hardware register width.
pub const PWM_RANGE_MAX: i32 = 1024;

impl NumberingScheme {
    /// The /sys interface cannot drive the PWM or clock peripherals.
    pub fn supports_pwm(&self) -> bool {
        !matches!(self, NumberingScheme::BroadcomSys)
    }
}

/// Raw pin operations as exposed by the hardware library. All unsafe
/// entry points live behind implementations of this trait; nothing else
/// in the crate touches them.
///
/// `digital_read` implementations must report any nonzero raw level as
/// `true` (the hardware convention: any nonzero electrical signal is
/// logic HIGH).
pub trait PinBackend: Send + Sync {
    fn setup(&self, scheme: NumberingScheme) -> Result<(), PinError>;
    fn set_mode(&self, pin: u8, mode: PinMode) -> Result<(), PinError>;
    fn set_pull(&self, pin: u8, pull: PullMode) -> Result<(), PinError>;
    fn digital_write(&self, pin: u8, level: bool) -> Result<(), PinError>;
    fn digital_read(&self, pin: u8) -> Result<bool, PinError>;
    fn pwm_write(&self, pin: u8, value: i32) -> Result<(), PinError>;
    fn analog_write(&self, pin: u8, value: i32) -> Result<(), PinError>;
    fn analog_read(&self, pin: u8) -> Result<i32, PinError>;
    fn write_byte(&self, value: u8) -> Result<(), PinError>;
}

#[derive(Debug, Clone)]
struct PinRecord {
    mode: PinMode,
    pull: PullMode,
    // last written level, Output pins only; hardware read-back is not
    // guaranteed so this is the only source of truth
    last_level: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PinDescriptor {
    pub mode: PinMode,
    pub pull: PullMode,
    pub last_level: Option<bool>,
}

impl From<&PinRecord> for PinDescriptor {
    fn from(record: &PinRecord) -> Self {
        Self {
            mode: record.mode,
            pull: record.pull,
            last_level: record.last_level,
        }
    }
}

/// Owns all pin mode state and serializes hardware access per pin.
///
/// Operations on the same pin are mutually exclusive; operations on
/// different pins proceed independently. Every operation requires the
/// numbering scheme to have been initialized first.
pub struct PinController<B: PinBackend> {
    backend: Arc<B>,
    scheme: RwLock<Option<NumberingScheme>>,
    pins: RwLock<FxHashMap<u8, Mutex<PinRecord>>>,
}

impl<B: PinBackend> PinController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            scheme: RwLock::new(None),
            pins: RwLock::new(FxHashMap::default()),
        }
    }

    /// Selects the pin numbering scheme and initializes the hardware
    /// library. Must be called exactly once before any pin operation.
    /// Repeating with the same scheme is a no-op; the scheme cannot be
    /// changed once chosen.
    pub fn initialize(&self, scheme: NumberingScheme) -> Result<(), PinError> {
        let mut current = self.scheme.write();
        match *current {
            Some(active) if active == scheme => Ok(()),
            Some(active) => Err(PinError::InvalidPinState(format!(
                "numbering scheme already initialized as {active:?}"
            ))),
            None => {
                self.backend.setup(scheme)?;
                *current = Some(scheme);
                Ok(())
            }
        }
    }

    pub fn scheme(&self) -> Result<NumberingScheme, PinError> {
        (*self.scheme.read()).ok_or(PinError::NotInitialized)
    }

    fn check_pin(pin: u8) -> Result<(), PinError> {
        if pin >= PIN_COUNT {
            return Err(PinError::InvalidPin(pin));
        }
        Ok(())
    }

    /// Runs `op` with the pin's record locked, serializing all access to
    /// that physical pin.
    fn with_pin<R>(
        &self,
        pin: u8,
        op: impl FnOnce(&mut PinRecord) -> Result<R, PinError>,
    ) -> Result<R, PinError> {
        self.scheme()?;
        Self::check_pin(pin)?;

        let pins = self.pins.read();
        let record = pins.get(&pin).ok_or_else(|| {
            PinError::InvalidPinState(format!("pin {pin} mode has not been set"))
        })?;
        let mut record = record.lock();
        op(&mut record)
    }

    /// Idempotent. Creates the pin's record on first use.
    pub fn set_mode(&self, pin: u8, mode: PinMode) -> Result<(), PinError> {
        let scheme = self.scheme()?;
        Self::check_pin(pin)?;

        if matches!(mode, PinMode::Pwm | PinMode::Clock) && !scheme.supports_pwm() {
            return Err(PinError::UnsupportedOperation(format!(
                "{mode:?} mode is unavailable under the sys interface"
            )));
        }

        let pins = self.pins.upgradable_read();
        match pins.get(&pin) {
            Some(record) => {
                let mut record = record.lock();
                self.backend.set_mode(pin, mode)?;
                record.mode = mode;
                if mode != PinMode::Output {
                    record.last_level = None;
                }
                Ok(())
            }
            None => {
                self.backend.set_mode(pin, mode)?;
                let mut pins = RwLockUpgradableReadGuard::upgrade(pins);
                pins.insert(
                    pin,
                    Mutex::new(PinRecord {
                        mode,
                        pull: PullMode::Off,
                        last_level: None,
                    }),
                );
                Ok(())
            }
        }
    }

    /// Fire-and-forget: the level is not verified by reading back.
    pub fn write_digital(&self, pin: u8, level: bool) -> Result<(), PinError> {
        self.with_pin(pin, |record| {
            if record.mode != PinMode::Output {
                return Err(PinError::InvalidPinState(format!(
                    "pin {pin} must be in output mode to write"
                )));
            }
            self.backend.digital_write(pin, level)?;
            record.last_level = Some(level);
            Ok(())
        })
    }

    /// Reading an output pin is rejected: hardware read-back is not
    /// guaranteed for driven pins.
    pub fn read_digital(&self, pin: u8) -> Result<bool, PinError> {
        self.with_pin(pin, |record| {
            if record.mode != PinMode::Input {
                return Err(PinError::InvalidPinState(format!(
                    "pin {pin} must be in input mode to read"
                )));
            }
            self.backend.digital_read(pin)
        })
    }

    /// Values outside `0..=1024` are silently clamped, not rejected.
    /// Callers relying on rejection must range-check themselves.
    pub fn write_pwm(&self, pin: u8, value: i32) -> Result<(), PinError> {
        let scheme = self.scheme()?;
        if !scheme.supports_pwm() {
            return Err(PinError::UnsupportedOperation(
                "PWM is unavailable under the sys interface".into(),
            ));
        }

        self.with_pin(pin, |record| {
            if record.mode != PinMode::Pwm {
                return Err(PinError::InvalidPinState(format!(
                    "pin {pin} must be in pwm mode to write the pwm register"
                )));
            }
            self.backend.pwm_write(pin, value.clamp(0, PWM_RANGE_MAX))
        })
    }

    pub fn set_pull(&self, pin: u8, pull: PullMode) -> Result<(), PinError> {
        self.with_pin(pin, |record| {
            if record.mode != PinMode::Input {
                return Err(PinError::InvalidPinState(format!(
                    "pin {pin} must be in input mode to bias a pull resistor"
                )));
            }
            self.backend.set_pull(pin, pull)?;
            record.pull = pull;
            Ok(())
        })
    }

    pub fn write_analog(&self, pin: u8, value: i32) -> Result<(), PinError> {
        self.with_pin(pin, |record| {
            if record.mode != PinMode::Output {
                return Err(PinError::InvalidPinState(format!(
                    "pin {pin} must be in output mode to write an analog value"
                )));
            }
            self.backend.analog_write(pin, value)
        })
    }

    pub fn read_analog(&self, pin: u8) -> Result<i32, PinError> {
        self.with_pin(pin, |record| {
            if record.mode != PinMode::Input {
                return Err(PinError::InvalidPinState(format!(
                    "pin {pin} must be in input mode to read an analog value"
                )));
            }
            self.backend.analog_read(pin)
        })
    }

    /// Byte-wide write across pins 0-7. The hardware call has no per-pin
    /// granularity: the caller must have set pins 0-7 to output mode, and
    /// per-pin `last_level` records are not updated.
    pub fn write_byte(&self, value: u8) -> Result<(), PinError> {
        self.scheme()?;
        self.backend.write_byte(value)
    }

    pub fn descriptor(&self, pin: u8) -> Result<PinDescriptor, PinError> {
        Self::check_pin(pin)?;
        let pins = self.pins.read();
        let record = pins.get(&pin).ok_or(PinError::UnknownPin(pin))?;
        let record = record.lock();
        Ok(PinDescriptor::from(&*record))
    }

    /// Point-in-time snapshot of every pin a mode has been set for.
    pub fn list_pins(&self) -> HashMap<u8, PinDescriptor> {
        self.pins
            .read()
            .iter()
            .map(|(pin, record)| (*pin, PinDescriptor::from(&*record.lock())))
            .collect()
    }
}
