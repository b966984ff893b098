#[cfg(feature = "hardware-gpio")]
pub mod wiringpi;
pub mod mock;

#[cfg(feature = "hardware-gpio")]
pub use wiringpi::WiringPiBackend;
pub use mock::MockPinBackend;
