use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::warn;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::PinError;
use crate::pin::{PinBackend, PinController};

/// Per-pin press accumulator. `count` never decreases; it resets only
/// with the process.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ButtonCounter {
    pub count: u64,
    pub last_level: bool,
}

/// Polls configured input pins on a fixed cadence and accumulates press
/// counts. LOW is the pressed level, as with a pull-up wired button.
///
/// Counting is level-sampled, not edge-triggered: a pin held LOW across
/// N ticks adds N to its counter.
///
/// The counter map is owned here; readers get point-in-time copies,
/// never a live reference.
pub struct ButtonSampler<B: PinBackend> {
    controller: Arc<PinController<B>>,
    pins: Vec<u8>,
    interval: Duration,
    counters: RwLock<FxHashMap<u8, ButtonCounter>>,
}

impl<B: PinBackend> ButtonSampler<B> {
    pub fn new(controller: Arc<PinController<B>>, pins: Vec<u8>, interval: Duration) -> Self {
        Self {
            controller,
            pins,
            interval,
            counters: RwLock::new(FxHashMap::default()),
        }
    }

    /// Samples forever. Spawn on the runtime; there is no terminal state
    /// short of process shutdown.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            self.sample_once();
        }
    }

    /// One polling pass over every monitored pin. A read failure skips
    /// that pin for this tick only; the remaining pins still sample and
    /// the loop never stops.
    pub fn sample_once(&self) {
        for &pin in &self.pins {
            let level = match self.controller.read_digital(pin) {
                Ok(level) => level,
                Err(e) => {
                    warn!("button sample failed for pin {pin}: {e}");
                    continue;
                }
            };

            let mut counters = self.counters.write();
            let counter = counters.entry(pin).or_insert(ButtonCounter {
                count: 0,
                last_level: level,
            });
            if !level {
                counter.count += 1;
            }
            counter.last_level = level;
        }
    }

    /// Fails with `UnknownPin` until the pin has been sampled at least
    /// once.
    pub fn count(&self, pin: u8) -> Result<u64, PinError> {
        self.counters
            .read()
            .get(&pin)
            .map(|counter| counter.count)
            .ok_or(PinError::UnknownPin(pin))
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> HashMap<u8, ButtonCounter> {
        self.counters
            .read()
            .iter()
            .map(|(pin, counter)| (*pin, *counter))
            .collect()
    }
}
