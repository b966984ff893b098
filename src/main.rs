use log::info;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};

use wirepi::{AppConfig, AppState, ButtonSampler, PinController, PinMode, PulseActuator};

#[cfg(feature = "hardware-gpio")]
use wirepi::WiringPiBackend;
#[cfg(not(feature = "hardware-gpio"))]
use wirepi::MockPinBackend;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WIREPI_CONFIG").ok())
        .unwrap_or_else(|| "config.json".to_string());
    let config = AppConfig::load_from_file(&config_path)
        .unwrap_or_else(|e| panic!("Failed to load config: {e}"));

    let backend = {
        #[cfg(feature = "hardware-gpio")]
        {
            Arc::new(WiringPiBackend::new())
        }
        #[cfg(not(feature = "hardware-gpio"))]
        {
            Arc::new(MockPinBackend::default())
        }
    };

    let controller = Arc::new(PinController::new(backend));
    controller
        .initialize(config.numbering)
        .unwrap_or_else(|e| panic!("Failed to initialize numbering scheme: {e}"));

    for &pin in &config.buttons.pins {
        controller
            .set_mode(pin, PinMode::Input)
            .unwrap_or_else(|e| panic!("Failed to configure button pin {pin}: {e}"));
        if let Some(pull) = config.buttons.pull {
            controller
                .set_pull(pin, pull)
                .unwrap_or_else(|e| panic!("Failed to bias button pin {pin}: {e}"));
        }
    }

    let sampler = Arc::new(ButtonSampler::new(
        Arc::clone(&controller),
        config.buttons.pins.clone(),
        Duration::from_millis(config.buttons.sample_interval_ms),
    ));
    actix_web::rt::spawn(Arc::clone(&sampler).run());

    let actuator = Arc::new(PulseActuator::new(
        Arc::clone(&controller),
        config.pulse.clone(),
    ));
    let app_state = AppState {
        controller,
        actuator,
        sampler,
    };

    let http_cfg = config.http.clone();
    let server = HttpServer::new(move || {
        let scope_path = http_cfg.path.clone();
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .service(app_state.api_scope(&scope_path))
    });

    let bind_addrs: String;
    let http_cfg = config.http.clone();
    let server = match (&http_cfg.unix_socket, &http_cfg.host) {
        (Some(socket_path), Some(host)) => {
            if Path::new(socket_path).exists() {
                fs::remove_file(socket_path)?;
            }
            bind_addrs = format!("{} and {}", socket_path, host);

            server.bind_uds(socket_path)?.bind_auto_h2c(host)?
        }
        (Some(socket_path), None) => {
            if Path::new(socket_path).exists() {
                fs::remove_file(socket_path)?;
            }
            bind_addrs = socket_path.clone();

            server.bind_uds(socket_path)?
        }
        (None, Some(host)) => {
            bind_addrs = host.clone();

            server.bind_auto_h2c(host)?
        }
        _ => {
            panic!("Config error: either 'unix_socket' or 'host' must be specified")
        }
    };

    info!("Starting server on {}...", bind_addrs);

    server.run().await
}
