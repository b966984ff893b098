use std::ffi::c_int;

use crate::config::{NumberingScheme, PinMode, PullMode};
use crate::error::PinError;
use crate::pin::PinBackend;

/// Raw entry points of libwiringPi. Everything here is process-global
/// state on the hardware side; callers must hold the per-pin locks in
/// `PinController` before touching a pin.
mod ffi {
    use std::ffi::c_int;

    #[link(name = "wiringPi")]
    unsafe extern "C" {
        pub fn wiringPiSetup() -> c_int;
        pub fn wiringPiSetupGpio() -> c_int;
        pub fn wiringPiSetupSys() -> c_int;
        pub fn pinMode(pin: c_int, mode: c_int);
        pub fn pullUpDnControl(pin: c_int, pud: c_int);
        pub fn digitalWrite(pin: c_int, value: c_int);
        pub fn digitalRead(pin: c_int) -> c_int;
        pub fn digitalWriteByte(value: c_int);
        pub fn pwmWrite(pin: c_int, value: c_int);
        pub fn analogWrite(pin: c_int, value: c_int);
        pub fn analogRead(pin: c_int) -> c_int;
    }
}

fn mode_value(mode: PinMode) -> c_int {
    match mode {
        PinMode::Input => 0,
        PinMode::Output => 1,
        PinMode::Pwm => 2,
        PinMode::Clock => 3,
    }
}

fn pull_value(pull: PullMode) -> c_int {
    match pull {
        PullMode::Off => 0,
        PullMode::PullDown => 1,
        PullMode::PullUp => 2,
    }
}

/// Hardware backend over libwiringPi.
///
/// The library's pin operations are void calls with no failure channel;
/// only the setup functions report errors. Writes are fire-and-forget,
/// matching the physical behavior.
pub struct WiringPiBackend;

impl WiringPiBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WiringPiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBackend for WiringPiBackend {
    fn setup(&self, scheme: NumberingScheme) -> Result<(), PinError> {
        let rc = unsafe {
            match scheme {
                NumberingScheme::WiringPi => ffi::wiringPiSetup(),
                NumberingScheme::BroadcomGpio => ffi::wiringPiSetupGpio(),
                NumberingScheme::BroadcomSys => ffi::wiringPiSetupSys(),
            }
        };
        if rc < 0 {
            return Err(PinError::HardwareFault(format!(
                "wiringPi setup for {scheme:?} returned {rc}"
            )));
        }
        Ok(())
    }

    fn set_mode(&self, pin: u8, mode: PinMode) -> Result<(), PinError> {
        unsafe { ffi::pinMode(pin.into(), mode_value(mode)) };
        Ok(())
    }

    fn set_pull(&self, pin: u8, pull: PullMode) -> Result<(), PinError> {
        unsafe { ffi::pullUpDnControl(pin.into(), pull_value(pull)) };
        Ok(())
    }

    fn digital_write(&self, pin: u8, level: bool) -> Result<(), PinError> {
        unsafe { ffi::digitalWrite(pin.into(), c_int::from(level)) };
        Ok(())
    }

    fn digital_read(&self, pin: u8) -> Result<bool, PinError> {
        // any nonzero raw level is logic HIGH
        Ok(unsafe { ffi::digitalRead(pin.into()) } != 0)
    }

    fn pwm_write(&self, pin: u8, value: i32) -> Result<(), PinError> {
        unsafe { ffi::pwmWrite(pin.into(), value) };
        Ok(())
    }

    fn analog_write(&self, pin: u8, value: i32) -> Result<(), PinError> {
        unsafe { ffi::analogWrite(pin.into(), value) };
        Ok(())
    }

    fn analog_read(&self, pin: u8) -> Result<i32, PinError> {
        Ok(unsafe { ffi::analogRead(pin.into()) })
    }

    fn write_byte(&self, value: u8) -> Result<(), PinError> {
        unsafe { ffi::digitalWriteByte(value.into()) };
        Ok(())
    }
}
