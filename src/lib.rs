mod backend;
mod config;
mod error;
mod pin;
mod pulse;
mod routes;
mod sampler;

pub use config::{
    AppConfig, ButtonConfig, HttpConfig, NumberingScheme, PinMode, PullMode, PulseConfig,
};
pub use error::PinError;
pub use pin::{PIN_COUNT, PWM_RANGE_MAX, PinBackend, PinController, PinDescriptor};
pub use pulse::PulseActuator;
pub use routes::AppState;
pub use sampler::{ButtonCounter, ButtonSampler};

#[cfg(feature = "hardware-gpio")]
pub use backend::WiringPiBackend;
pub use backend::MockPinBackend;
