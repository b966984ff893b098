use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::config::{PinMode, PulseConfig};
use crate::error::PinError;
use crate::pin::{PinBackend, PinController};

/// Drives a bounded-duration HIGH pulse on an output pin: set HIGH,
/// sleep, set LOW. Used to trigger external actuators (camera shutters,
/// relays).
///
/// The pin never stays HIGH past the pulse: LOW is restored on normal
/// completion, on write failure, and when the pulse future is dropped
/// mid-wait.
pub struct PulseActuator<B: PinBackend> {
    controller: Arc<PinController<B>>,
    config: PulseConfig,
}

impl<B: PinBackend> PulseActuator<B> {
    pub fn new(controller: Arc<PinController<B>>, config: PulseConfig) -> Self {
        Self { controller, config }
    }

    pub fn default_duration_ms(&self) -> u64 {
        self.config.default_duration_ms
    }

    /// Pulses `pin` HIGH for `duration_ms`. The wait suspends on the
    /// timer; operations on other pins and the sampler proceed
    /// concurrently.
    pub async fn pulse(&self, pin: u8, duration_ms: u64) -> Result<(), PinError> {
        if duration_ms == 0 {
            return Err(PinError::InvalidValue(
                "pulse duration must be greater than zero".into(),
            ));
        }
        if duration_ms > self.config.max_duration_ms {
            return Err(PinError::InvalidValue(format!(
                "pulse duration {duration_ms}ms exceeds the {}ms maximum",
                self.config.max_duration_ms
            )));
        }

        self.controller.set_mode(pin, PinMode::Output)?;

        // armed before the HIGH write: a failed write or a cancelled
        // wait both end with a best-effort LOW restore
        let mut restore = LowOnDrop {
            controller: &self.controller,
            pin,
            armed: true,
        };

        self.controller.write_digital(pin, true)?;

        tokio::time::sleep(Duration::from_millis(duration_ms)).await;

        restore.armed = false;
        self.controller.write_digital(pin, false)
    }
}

struct LowOnDrop<'a, B: PinBackend> {
    controller: &'a PinController<B>,
    pin: u8,
    armed: bool,
}

impl<B: PinBackend> Drop for LowOnDrop<'_, B> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.controller.write_digital(self.pin, false) {
            warn!(
                "failed to restore pin {} low after interrupted pulse: {e}",
                self.pin
            );
        }
    }
}
