use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, guard, http::Method, web};
use serde::Deserialize;
use serde_json::json;

use crate::config::{PinMode, PullMode};
use crate::error::PinError;
use crate::pin::{PinBackend, PinController};
use crate::pulse::PulseActuator;
use crate::sampler::ButtonSampler;

pub struct AppState<B: PinBackend> {
    pub controller: Arc<PinController<B>>,
    pub actuator: Arc<PulseActuator<B>>,
    pub sampler: Arc<ButtonSampler<B>>,
}

impl<B: PinBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            actuator: Arc::clone(&self.actuator),
            sampler: Arc::clone(&self.sampler),
        }
    }
}

#[derive(Deserialize)]
struct ModePayload {
    mode: PinMode,
}

#[derive(Deserialize)]
struct PullPayload {
    pull: PullMode,
}

#[derive(Deserialize)]
struct RegisterPayload {
    value: i32,
}

#[derive(Deserialize)]
struct BytePayload {
    value: u8,
}

#[derive(Deserialize, Default)]
struct PulsePayload {
    duration_ms: Option<u64>,
}

impl<B: PinBackend + 'static> AppState<B> {
    pub fn api_scope(&self, base_path: &str) -> actix_web::Scope {
        web::scope(base_path)
            .service(
                web::resource("/pins")
                    .route(web::get().to(list_pins::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins/byte")
                    .route(web::post().to(write_byte::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/buttons")
                    .route(web::get().to(button_snapshot::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pin/{pin}")
                    .route(web::get().to(pin_descriptor::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pin/{pin}/mode")
                    .route(web::post().to(set_mode::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pin/{pin}/pull")
                    .route(web::post().to(set_pull::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pin/{pin}/value")
                    .route(web::get().to(read_value::<B>))
                    .route(web::post().to(write_value::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET, Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pin/{pin}/pwm")
                    .route(web::post().to(write_pwm::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pin/{pin}/analog")
                    .route(web::get().to(read_analog::<B>))
                    .route(web::post().to(write_analog::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET, Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pin/{pin}/pulse")
                    .route(web::post().to(pulse_pin::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pin/{pin}/button")
                    .route(web::get().to(button_count::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
    }
}

async fn list_pins<B: PinBackend + 'static>(
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pins = state.controller.list_pins();

    Ok(web::Json(pins))
}

async fn pin_descriptor<B: PinBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let descriptor = state.controller.descriptor(pin)?;

    Ok(web::Json(descriptor))
}

async fn set_mode<B: PinBackend + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let payload: ModePayload = parse_json_payload(&body)?;

    state.controller.set_mode(pin, payload.mode)?;

    Ok(web::Json(state.controller.descriptor(pin)?))
}

async fn set_pull<B: PinBackend + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let payload: PullPayload = parse_json_payload(&body)?;

    state.controller.set_pull(pin, payload.pull)?;

    Ok(web::Json(state.controller.descriptor(pin)?))
}

async fn read_value<B: PinBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let level = state.controller.read_digital(pin)?;

    Ok(web::Json(u8::from(level)))
}

async fn write_value<B: PinBackend + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let level = parse_level_payload(&body)?;

    state.controller.write_digital(pin, level)?;

    Ok(HttpResponse::Ok())
}

async fn write_pwm<B: PinBackend + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let payload: RegisterPayload = parse_json_payload(&body)?;

    state.controller.write_pwm(pin, payload.value)?;

    Ok(HttpResponse::Ok())
}

async fn read_analog<B: PinBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let value = state.controller.read_analog(pin)?;

    Ok(web::Json(value))
}

async fn write_analog<B: PinBackend + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let payload: RegisterPayload = parse_json_payload(&body)?;

    state.controller.write_analog(pin, payload.value)?;

    Ok(HttpResponse::Ok())
}

async fn write_byte<B: PinBackend + 'static>(
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let payload: BytePayload = parse_json_payload(&body)?;

    state.controller.write_byte(payload.value)?;

    Ok(HttpResponse::Ok())
}

async fn pulse_pin<B: PinBackend + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let payload: PulsePayload = if body.is_empty() {
        PulsePayload::default()
    } else {
        parse_json_payload(&body)?
    };
    let duration_ms = payload
        .duration_ms
        .unwrap_or_else(|| state.actuator.default_duration_ms());

    state.actuator.pulse(pin, duration_ms).await?;

    Ok(web::Json(json!({ "pin": pin, "duration_ms": duration_ms })))
}

async fn button_count<B: PinBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let pin = parse_pin(&req)?;
    let count = state.sampler.count(pin)?;

    Ok(web::Json(json!({ "count": count })))
}

async fn button_snapshot<B: PinBackend + 'static>(
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, PinError> {
    let counters = state.sampler.snapshot();

    Ok(web::Json(counters))
}

fn parse_pin(req: &HttpRequest) -> Result<u8, PinError> {
    let pin = req
        .match_info()
        .get("pin")
        .ok_or_else(|| PinError::InvalidValue("Missing pin".into()))?;
    let pin = pin
        .parse::<u8>()
        .map_err(|_| PinError::InvalidValue("Invalid pin".into()))?;

    Ok(pin)
}

fn parse_level_payload(body: &[u8]) -> Result<bool, PinError> {
    if body.is_empty() {
        return Err(PinError::InvalidValue("Empty value payload".into()));
    }

    let value = match std::str::from_utf8(body) {
        Ok(text) => text
            .trim()
            .parse::<u8>()
            .map_err(|_| PinError::InvalidValue("Value must be an integer".into()))?,
        _ => {
            return Err(PinError::InvalidValue(
                "Value payload must be valid UTF-8".into(),
            ));
        }
    };
    if value > 1 {
        return Err(PinError::InvalidValue("Value must be 0 or 1".into()));
    }

    Ok(value == 1)
}

fn parse_json_payload<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, PinError> {
    if body.is_empty() {
        return Err(PinError::InvalidValue("Empty payload".into()));
    }

    serde_json::from_slice(body).map_err(|e| PinError::InvalidValue(format!("Invalid payload: {e}")))
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().finish()
}

fn guard_not_methods(methods: &[Method]) -> impl guard::Guard {
    let allowed: Vec<Method> = methods.to_vec();
    guard::fn_guard(move |ctx| !allowed.iter().any(|m| m == ctx.head().method))
}
