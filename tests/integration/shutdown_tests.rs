//! ShutdownCoordinator against the simulated lines.

use std::sync::Arc;
use std::time::Duration;

use doorbell::app::events::AppEvent;
use doorbell::app::ports::GpioPort;
use doorbell::config::DoorbellConfig;
use doorbell::runtime;
use doorbell::shutdown::{ShutdownCoordinator, ShutdownReason, ShutdownToken};

use crate::mock_hw::{RecordingPublisher, RecordingSink, SimGpio};

#[test]
fn release_closes_lines_once() {
    let sim = Arc::new(SimGpio::new(17, None));
    let coordinator = ShutdownCoordinator::new(sim.clone());

    assert!(coordinator.release());
    assert!(sim.is_closed());
    assert!(!coordinator.release(), "second release is a no-op");
    assert!(coordinator.is_released());
}

#[test]
fn run_waits_for_interrupt_then_releases() {
    let sim = Arc::new(SimGpio::new(17, None));
    let coordinator = ShutdownCoordinator::new(sim.clone());
    let token = ShutdownToken::new();
    let mut sink = RecordingSink::default();

    let remote = token.clone();
    let signaller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        remote.cancel(ShutdownReason::Interrupted);
    });

    let reason = coordinator.run(&token, &mut sink);
    signaller.join().unwrap();

    assert_eq!(reason, ShutdownReason::Interrupted);
    assert_eq!(reason.exit_code(), 130);
    assert!(sim.is_closed());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Shutdown(ShutdownReason::Interrupted))),
        1
    );
}

#[test]
fn fatal_loop_error_drives_coordinator_to_exit_one() {
    let config = DoorbellConfig {
        sample_interval_ms: 5,
        indicator_interval_ms: 1,
        ..DoorbellConfig::default()
    };
    let sim = Arc::new(SimGpio::new(config.button_pin, None));
    let gpio: Arc<dyn GpioPort> = sim.clone();
    let coordinator = ShutdownCoordinator::new(gpio.clone());
    let token = ShutdownToken::new();

    let group = runtime::start(
        &config,
        gpio,
        RecordingPublisher::default(),
        RecordingSink::default(),
        &token,
    )
    .unwrap();

    sim.fail_reads();
    let reason = coordinator.run(&token, &mut RecordingSink::default());
    group.join();

    assert_eq!(reason, ShutdownReason::Fatal);
    assert_eq!(reason.exit_code(), 1);
    assert!(sim.is_closed());
}

#[test]
fn loops_after_release_stop_quietly() {
    // Closing the lines under running loops must not be mistaken for a
    // hardware fault once shutdown is underway.
    let config = DoorbellConfig {
        led_pin: Some(27),
        sample_interval_ms: 5,
        indicator_interval_ms: 1,
        ..DoorbellConfig::default()
    };
    let sim = Arc::new(SimGpio::new(config.button_pin, config.led_pin));
    let gpio: Arc<dyn GpioPort> = sim.clone();
    let coordinator = ShutdownCoordinator::new(gpio.clone());
    let token = ShutdownToken::new();

    let group = runtime::start(
        &config,
        gpio,
        RecordingPublisher::default(),
        RecordingSink::default(),
        &token,
    )
    .unwrap();

    token.cancel(ShutdownReason::Interrupted);
    coordinator.release();
    group.join();

    assert_eq!(token.reason(), Some(ShutdownReason::Interrupted));
}
