use std::collections::HashSet;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::config::{NumberingScheme, PinMode, PullMode};
use crate::error::PinError;
use crate::pin::PinBackend;

/// In-memory backend for tests and `mock-gpio` builds.
///
/// Behaves like the real hardware library: pin calls are recorded
/// blindly without mode validation (that is `PinController`'s job), and
/// input levels rest HIGH until a test drives them LOW.
#[derive(Default)]
pub struct MockPinBackend {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    scheme: Option<NumberingScheme>,
    pins: FxHashMap<u8, MockPin>,
    failing_reads: HashSet<u8>,
    last_byte: Option<u8>,
}

struct MockPin {
    mode: Option<PinMode>,
    pull: Option<PullMode>,
    level: bool,
    pwm: Option<i32>,
    analog: i32,
}

impl Default for MockPin {
    fn default() -> Self {
        Self {
            mode: None,
            pull: None,
            // undriven inputs rest HIGH, as with a pull-up wired button
            level: true,
            pwm: None,
            analog: 0,
        }
    }
}

impl MockPinBackend {
    /// Drives the level a subsequent `digital_read` observes.
    pub fn set_input_level(&self, pin: u8, level: bool) {
        self.state.lock().pins.entry(pin).or_default().level = level;
    }

    pub fn set_analog_input(&self, pin: u8, value: i32) {
        self.state.lock().pins.entry(pin).or_default().analog = value;
    }

    /// Makes `digital_read` on `pin` return a hardware fault until
    /// cleared.
    pub fn fail_reads(&self, pin: u8, failing: bool) {
        let mut state = self.state.lock();
        if failing {
            state.failing_reads.insert(pin);
        } else {
            state.failing_reads.remove(&pin);
        }
    }

    pub fn scheme(&self) -> Option<NumberingScheme> {
        self.state.lock().scheme
    }

    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.state.lock().pins.get(&pin).and_then(|p| p.mode)
    }

    pub fn pull(&self, pin: u8) -> Option<PullMode> {
        self.state.lock().pins.get(&pin).and_then(|p| p.pull)
    }

    /// Last driven digital level, or the resting level if never written.
    pub fn level(&self, pin: u8) -> bool {
        self.state
            .lock()
            .pins
            .get(&pin)
            .map(|p| p.level)
            .unwrap_or(true)
    }

    pub fn pwm_value(&self, pin: u8) -> Option<i32> {
        self.state.lock().pins.get(&pin).and_then(|p| p.pwm)
    }

    pub fn last_byte(&self) -> Option<u8> {
        self.state.lock().last_byte
    }
}

impl PinBackend for MockPinBackend {
    fn setup(&self, scheme: NumberingScheme) -> Result<(), PinError> {
        self.state.lock().scheme = Some(scheme);
        Ok(())
    }

    fn set_mode(&self, pin: u8, mode: PinMode) -> Result<(), PinError> {
        self.state.lock().pins.entry(pin).or_default().mode = Some(mode);
        Ok(())
    }

    fn set_pull(&self, pin: u8, pull: PullMode) -> Result<(), PinError> {
        self.state.lock().pins.entry(pin).or_default().pull = Some(pull);
        Ok(())
    }

    fn digital_write(&self, pin: u8, level: bool) -> Result<(), PinError> {
        self.state.lock().pins.entry(pin).or_default().level = level;
        Ok(())
    }

    fn digital_read(&self, pin: u8) -> Result<bool, PinError> {
        let state = self.state.lock();
        if state.failing_reads.contains(&pin) {
            return Err(PinError::HardwareFault(format!(
                "injected read fault on pin {pin}"
            )));
        }
        Ok(state.pins.get(&pin).map(|p| p.level).unwrap_or(true))
    }

    fn pwm_write(&self, pin: u8, value: i32) -> Result<(), PinError> {
        self.state.lock().pins.entry(pin).or_default().pwm = Some(value);
        Ok(())
    }

    fn analog_write(&self, pin: u8, value: i32) -> Result<(), PinError> {
        self.state.lock().pins.entry(pin).or_default().analog = value;
        Ok(())
    }

    fn analog_read(&self, pin: u8) -> Result<i32, PinError> {
        Ok(self
            .state
            .lock()
            .pins
            .get(&pin)
            .map(|p| p.analog)
            .unwrap_or(0))
    }

    fn write_byte(&self, value: u8) -> Result<(), PinError> {
        self.state.lock().last_byte = Some(value);
        Ok(())
    }
}
