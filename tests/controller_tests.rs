use std::sync::Arc;

use wirepi::{
    MockPinBackend, NumberingScheme, PIN_COUNT, PinController, PinError, PinMode, PullMode,
};

fn controller() -> (Arc<MockPinBackend>, PinController<MockPinBackend>) {
    let backend = Arc::new(MockPinBackend::default());
    let controller = PinController::new(Arc::clone(&backend));
    (backend, controller)
}

fn initialized() -> (Arc<MockPinBackend>, PinController<MockPinBackend>) {
    let (backend, controller) = controller();
    controller
        .initialize(NumberingScheme::BroadcomGpio)
        .expect("initialize");
    (backend, controller)
}

#[test]
fn operations_before_initialize_fail_fast() {
    let (_backend, controller) = controller();

    assert!(matches!(
        controller.set_mode(5, PinMode::Output),
        Err(PinError::NotInitialized)
    ));
    assert!(matches!(
        controller.write_digital(5, true),
        Err(PinError::NotInitialized)
    ));
    assert!(matches!(
        controller.write_byte(0xff),
        Err(PinError::NotInitialized)
    ));
}

#[test]
fn repeat_initialize_same_scheme_is_noop() {
    let (backend, controller) = initialized();

    assert!(controller.initialize(NumberingScheme::BroadcomGpio).is_ok());
    assert_eq!(backend.scheme(), Some(NumberingScheme::BroadcomGpio));
}

#[test]
fn initialize_with_different_scheme_rejected() {
    let (_backend, controller) = initialized();

    assert!(matches!(
        controller.initialize(NumberingScheme::WiringPi),
        Err(PinError::InvalidPinState(_))
    ));
}

#[test]
fn out_of_range_pin_rejected() {
    let (_backend, controller) = initialized();

    assert!(matches!(
        controller.set_mode(PIN_COUNT, PinMode::Output),
        Err(PinError::InvalidPin(p)) if p == PIN_COUNT
    ));
}

#[test]
fn output_write_sequence_never_errors() {
    let (backend, controller) = initialized();

    for pin in [0, 17, PIN_COUNT - 1] {
        controller.set_mode(pin, PinMode::Output).expect("set mode");
        controller.write_digital(pin, true).expect("write high");
        controller.write_digital(pin, false).expect("write low");
        assert!(!backend.level(pin));
    }
}

#[test]
fn write_requires_output_mode() {
    let (_backend, controller) = initialized();

    controller.set_mode(5, PinMode::Input).expect("set mode");
    assert!(matches!(
        controller.write_digital(5, true),
        Err(PinError::InvalidPinState(_))
    ));
}

#[test]
fn write_requires_mode_to_have_been_set() {
    let (_backend, controller) = initialized();

    assert!(matches!(
        controller.write_digital(5, true),
        Err(PinError::InvalidPinState(_))
    ));
}

#[test]
fn read_rejected_on_output_pin() {
    let (_backend, controller) = initialized();

    controller.set_mode(5, PinMode::Output).expect("set mode");
    controller.write_digital(5, true).expect("write");
    assert!(matches!(
        controller.read_digital(5),
        Err(PinError::InvalidPinState(_))
    ));
}

#[test]
fn read_reports_driven_level() {
    let (backend, controller) = initialized();

    controller.set_mode(26, PinMode::Input).expect("set mode");
    backend.set_input_level(26, false);
    assert!(!controller.read_digital(26).expect("read"));
    backend.set_input_level(26, true);
    assert!(controller.read_digital(26).expect("read"));
}

#[test]
fn pwm_values_clamped_to_register_range() {
    let (backend, controller) = initialized();

    controller.set_mode(1, PinMode::Pwm).expect("set mode");

    controller.write_pwm(1, -10).expect("write");
    assert_eq!(backend.pwm_value(1), Some(0));

    controller.write_pwm(1, 2000).expect("write");
    assert_eq!(backend.pwm_value(1), Some(1024));

    controller.write_pwm(1, 512).expect("write");
    assert_eq!(backend.pwm_value(1), Some(512));
}

#[test]
fn pwm_requires_pwm_mode() {
    let (_backend, controller) = initialized();

    controller.set_mode(1, PinMode::Output).expect("set mode");
    assert!(matches!(
        controller.write_pwm(1, 512),
        Err(PinError::InvalidPinState(_))
    ));
}

#[test]
fn sys_scheme_rejects_pwm() {
    let (_backend, controller) = controller();
    controller
        .initialize(NumberingScheme::BroadcomSys)
        .expect("initialize");

    assert!(matches!(
        controller.set_mode(1, PinMode::Pwm),
        Err(PinError::UnsupportedOperation(_))
    ));
    assert!(matches!(
        controller.set_mode(4, PinMode::Clock),
        Err(PinError::UnsupportedOperation(_))
    ));

    controller.set_mode(1, PinMode::Output).expect("set mode");
    assert!(matches!(
        controller.write_pwm(1, 512),
        Err(PinError::UnsupportedOperation(_))
    ));
}

#[test]
fn pull_resistor_requires_input_mode() {
    let (backend, controller) = initialized();

    controller.set_mode(5, PinMode::Output).expect("set mode");
    assert!(matches!(
        controller.set_pull(5, PullMode::PullUp),
        Err(PinError::InvalidPinState(_))
    ));

    controller.set_mode(26, PinMode::Input).expect("set mode");
    controller.set_pull(26, PullMode::PullUp).expect("set pull");
    assert_eq!(backend.pull(26), Some(PullMode::PullUp));
}

#[test]
fn analog_roundtrip_through_backend() {
    let (backend, controller) = initialized();

    controller.set_mode(7, PinMode::Output).expect("set mode");
    controller.write_analog(7, 333).expect("write");

    controller.set_mode(8, PinMode::Input).expect("set mode");
    backend.set_analog_input(8, 512);
    assert_eq!(controller.read_analog(8).expect("read"), 512);
}

#[test]
fn descriptor_tracks_mode_and_last_level() {
    let (_backend, controller) = initialized();

    controller.set_mode(5, PinMode::Output).expect("set mode");
    controller.write_digital(5, true).expect("write");
    let descriptor = controller.descriptor(5).expect("descriptor");
    assert_eq!(descriptor.mode, PinMode::Output);
    assert_eq!(descriptor.last_level, Some(true));

    // switching away from output invalidates the shadow level
    controller.set_mode(5, PinMode::Input).expect("set mode");
    let descriptor = controller.descriptor(5).expect("descriptor");
    assert_eq!(descriptor.mode, PinMode::Input);
    assert_eq!(descriptor.last_level, None);

    assert!(matches!(
        controller.descriptor(6),
        Err(PinError::UnknownPin(6))
    ));
}

#[test]
fn list_pins_snapshots_known_records() {
    let (_backend, controller) = initialized();

    controller.set_mode(5, PinMode::Output).expect("set mode");
    controller.set_mode(26, PinMode::Input).expect("set mode");

    let pins = controller.list_pins();
    assert_eq!(pins.len(), 2);
    assert_eq!(pins[&5].mode, PinMode::Output);
    assert_eq!(pins[&26].mode, PinMode::Input);
}

#[test]
fn write_byte_passes_through() {
    let (backend, controller) = initialized();

    controller.write_byte(0xaa).expect("write byte");
    assert_eq!(backend.last_byte(), Some(0xaa));
}
