use std::sync::Arc;
use std::time::Duration;

use wirepi::{ButtonSampler, MockPinBackend, NumberingScheme, PinController, PinError, PinMode};

fn sampler(pins: Vec<u8>) -> (Arc<MockPinBackend>, Arc<ButtonSampler<MockPinBackend>>) {
    let backend = Arc::new(MockPinBackend::default());
    let controller = Arc::new(PinController::new(Arc::clone(&backend)));
    controller
        .initialize(NumberingScheme::BroadcomGpio)
        .expect("initialize");
    for &pin in &pins {
        controller.set_mode(pin, PinMode::Input).expect("set mode");
    }
    let sampler = Arc::new(ButtonSampler::new(
        controller,
        pins,
        Duration::from_secs(1),
    ));
    (backend, sampler)
}

#[test]
fn counter_increments_once_per_tick_while_held() {
    let (backend, sampler) = sampler(vec![26]);

    backend.set_input_level(26, false);
    for _ in 0..3 {
        sampler.sample_once();
    }
    assert_eq!(sampler.count(26).expect("count"), 3);

    // released: the counter holds, it never decrements
    backend.set_input_level(26, true);
    sampler.sample_once();
    assert_eq!(sampler.count(26).expect("count"), 3);

    let snapshot = sampler.snapshot();
    assert!(snapshot[&26].last_level);
}

#[test]
fn unpressed_pin_still_gets_a_counter_entry() {
    let (_backend, sampler) = sampler(vec![26]);

    // resting HIGH, not pressed
    sampler.sample_once();
    assert_eq!(sampler.count(26).expect("count"), 0);
}

#[test]
fn unsampled_pin_is_unknown() {
    let (_backend, sampler) = sampler(vec![26]);

    assert!(matches!(sampler.count(5), Err(PinError::UnknownPin(5))));
    assert!(matches!(sampler.count(26), Err(PinError::UnknownPin(26))));
}

#[test]
fn read_fault_on_one_pin_does_not_stop_the_others() {
    let (backend, sampler) = sampler(vec![19, 26]);

    backend.set_input_level(19, false);
    backend.set_input_level(26, false);
    backend.fail_reads(26, true);

    sampler.sample_once();
    assert_eq!(sampler.count(19).expect("count"), 1);
    assert!(matches!(sampler.count(26), Err(PinError::UnknownPin(26))));

    // fault clears, the skipped pin resumes sampling
    backend.fail_reads(26, false);
    sampler.sample_once();
    assert_eq!(sampler.count(19).expect("count"), 2);
    assert_eq!(sampler.count(26).expect("count"), 1);
}

#[test]
fn sampling_skips_pins_left_in_output_mode() {
    let backend = Arc::new(MockPinBackend::default());
    let controller = Arc::new(PinController::new(Arc::clone(&backend)));
    controller
        .initialize(NumberingScheme::BroadcomGpio)
        .expect("initialize");
    controller.set_mode(26, PinMode::Output).expect("set mode");

    let sampler = ButtonSampler::new(controller, vec![26], Duration::from_secs(1));
    sampler.sample_once();
    assert!(matches!(sampler.count(26), Err(PinError::UnknownPin(26))));
}

#[tokio::test(start_paused = true)]
async fn run_samples_on_the_configured_interval() {
    let (backend, sampler) = sampler(vec![26]);

    backend.set_input_level(26, false);
    tokio::spawn(Arc::clone(&sampler).run());

    // ticks land at 0s, 1s, 2s and 3s
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(sampler.count(26).expect("count"), 4);
}
