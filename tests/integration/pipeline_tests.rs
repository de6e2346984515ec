//! End-to-end: SimGpio → sampler → debouncer → notifier → RecordingPublisher.

use std::sync::Arc;
use std::time::{Duration, Instant};

use doorbell::app::events::AppEvent;
use doorbell::app::ports::GpioPort;
use doorbell::config::DoorbellConfig;
use doorbell::error::Error;
use doorbell::pins::Level;
use doorbell::runtime::{self, TaskGroup};
use doorbell::shutdown::{ShutdownReason, ShutdownToken};

use crate::mock_hw::{RecordingPublisher, RecordingSink, SimGpio, wait_until};

const SETTLE: Duration = Duration::from_secs(2);

fn fast_config(throttle_ms: u32) -> DoorbellConfig {
    DoorbellConfig {
        led_pin: Some(27),
        sample_interval_ms: 5,
        debounce_ms: 20,
        throttle_ms,
        indicator_interval_ms: 1,
        ..DoorbellConfig::default()
    }
}

struct Rig {
    sim: Arc<SimGpio>,
    publisher: RecordingPublisher,
    sink: RecordingSink,
    token: ShutdownToken,
    group: TaskGroup,
}

fn start(config: &DoorbellConfig) -> Rig {
    let sim = Arc::new(SimGpio::new(config.button_pin, config.led_pin));
    let gpio: Arc<dyn GpioPort> = sim.clone();
    let publisher = RecordingPublisher::default();
    let sink = RecordingSink::default();
    let token = ShutdownToken::new();
    let group = runtime::start(config, gpio, publisher.clone(), sink.clone(), &token).unwrap();
    assert!(
        wait_until(SETTLE, || sim.sampler_reads() > 0),
        "sampler never took its first reading"
    );
    Rig {
        sim,
        publisher,
        sink,
        token,
        group,
    }
}

impl Rig {
    fn stop(self) {
        self.token.cancel(ShutdownReason::Interrupted);
        self.group.join();
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_configures_lines_and_reports_started() {
    let rig = start(&fast_config(10_000));

    assert_eq!(rig.group.names(), vec!["notifier", "sampler", "indicator"]);
    assert_eq!(*rig.sim.configured.lock().unwrap(), vec![17, 27]);
    assert!(rig.sim.sampler_reads() > 0, "debouncer is seeded before start returns");
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Started { pin: 17, .. })),
        1
    );
    rig.stop();
}

#[test]
fn no_indicator_thread_without_led_pin() {
    let config = DoorbellConfig {
        led_pin: None,
        ..fast_config(10_000)
    };
    let rig = start(&config);
    assert_eq!(rig.group.names(), vec!["notifier", "sampler"]);
    rig.stop();
}

#[test]
fn idle_line_publishes_nothing() {
    let rig = start(&fast_config(10_000));
    std::thread::sleep(Duration::from_millis(150));
    assert!(rig.publisher.payloads().is_empty(), "seeding must not emit an edge");
    rig.stop();
}

#[test]
fn unavailable_output_fails_before_spawning() {
    let config = fast_config(10_000);
    let sim: Arc<dyn GpioPort> = Arc::new(SimGpio::new(config.button_pin, None));
    let token = ShutdownToken::new();
    let result = runtime::start(
        &config,
        sim,
        RecordingPublisher::default(),
        RecordingSink::default(),
        &token,
    );
    assert!(matches!(result, Err(Error::Gpio(_))));
    assert!(!token.is_cancelled());
}

#[test]
fn invalid_config_fails_before_touching_lines() {
    let config = DoorbellConfig {
        topic: String::new(),
        ..fast_config(10_000)
    };
    let sim = Arc::new(SimGpio::new(config.button_pin, config.led_pin));
    let gpio: Arc<dyn GpioPort> = sim.clone();
    let result = runtime::start(
        &config,
        gpio,
        RecordingPublisher::default(),
        RecordingSink::default(),
        &ShutdownToken::new(),
    );
    assert!(matches!(result, Err(Error::Config(_))));
    assert!(sim.configured.lock().unwrap().is_empty());
}

// ── Notification flow ─────────────────────────────────────────

#[test]
fn press_publishes_on_retained() {
    let rig = start(&fast_config(10_000));

    rig.sim.press();
    assert!(wait_until(SETTLE, || rig.publisher.payloads() == ["ON"]));

    let sent = rig.publisher.sent.lock().unwrap()[0].clone();
    assert_eq!(sent.topic, "rpi-mqtt-doorbell");
    assert!(sent.retain);
    rig.stop();
}

#[test]
fn release_inside_cooldown_is_suppressed() {
    let rig = start(&fast_config(10_000));

    rig.sim.press();
    assert!(wait_until(SETTLE, || rig.publisher.payloads() == ["ON"]));
    rig.sim.release();
    assert!(wait_until(SETTLE, || {
        rig.sink.count(|e| matches!(e, AppEvent::Suppressed { .. })) == 1
    }));

    assert_eq!(rig.publisher.payloads(), ["ON"]);
    rig.stop();
}

#[test]
fn release_after_cooldown_publishes_off() {
    let rig = start(&fast_config(30));

    rig.sim.press();
    assert!(wait_until(SETTLE, || rig.publisher.payloads() == ["ON"]));
    std::thread::sleep(Duration::from_millis(50));
    rig.sim.release();
    assert!(wait_until(SETTLE, || rig.publisher.payloads() == ["ON", "OFF"]));
    rig.stop();
}

#[test]
fn publish_failure_keeps_loops_running() {
    let rig = start(&fast_config(30));
    rig.publisher.fail.store(true, std::sync::atomic::Ordering::SeqCst);

    rig.sim.press();
    assert!(wait_until(SETTLE, || {
        rig.sink.count(|e| matches!(e, AppEvent::PublishFailed { .. })) == 1
    }));
    assert!(!rig.token.is_cancelled());

    rig.publisher.fail.store(false, std::sync::atomic::Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(50));
    rig.sim.release();
    assert!(wait_until(SETTLE, || rig.publisher.payloads() == ["OFF"]));
    rig.stop();
}

#[test]
fn chatter_shorter_than_window_never_publishes() {
    let config = DoorbellConfig {
        debounce_ms: 80,
        ..fast_config(30)
    };
    let rig = start(&config);

    for _ in 0..6 {
        rig.sim.press();
        std::thread::sleep(Duration::from_millis(6));
        rig.sim.release();
        std::thread::sleep(Duration::from_millis(6));
    }
    std::thread::sleep(Duration::from_millis(200));

    assert!(rig.publisher.payloads().is_empty());
    rig.stop();
}

// ── Indicator ─────────────────────────────────────────────────

#[test]
fn indicator_follows_raw_input() {
    let rig = start(&fast_config(10_000));

    assert!(wait_until(SETTLE, || rig.sim.last_write() == Some(Level::Low)));
    rig.sim.press();
    assert!(wait_until(SETTLE, || rig.sim.last_write() == Some(Level::High)));
    rig.sim.release();
    assert!(wait_until(SETTLE, || rig.sim.last_write() == Some(Level::Low)));
    rig.stop();
}

#[test]
fn indicator_flickers_while_pipeline_stays_quiet() {
    let config = DoorbellConfig {
        debounce_ms: 1_000,
        ..fast_config(10_000)
    };
    let rig = start(&config);

    for _ in 0..5 {
        rig.sim.press();
        std::thread::sleep(Duration::from_millis(20));
        rig.sim.release();
        std::thread::sleep(Duration::from_millis(20));
    }

    let writes = rig.sim.writes.lock().unwrap().clone();
    let toggles = writes.windows(2).filter(|w| w[0] != w[1]).count();
    assert!(toggles >= 8, "mirror should follow every flicker, saw {toggles}");
    assert!(rig.publisher.payloads().is_empty());
    rig.stop();
}

// ── Failure and shutdown ──────────────────────────────────────

#[test]
fn read_failure_cancels_with_fatal() {
    let rig = start(&fast_config(10_000));

    rig.sim.fail_reads();
    assert_eq!(rig.token.wait(), ShutdownReason::Fatal);
    rig.group.join();
}

#[test]
fn loops_exit_promptly_on_cancel() {
    let rig = start(&fast_config(10_000));
    std::thread::sleep(Duration::from_millis(30));

    let began = Instant::now();
    rig.stop();
    assert!(began.elapsed() < Duration::from_secs(1));
}

#[test]
fn cancel_unblocks_sampler_waiting_on_full_slot() {
    // Holding the recorder's lock stalls the notifier inside publish, so
    // the slot fills and the sampler parks on its next edge.
    let config = DoorbellConfig {
        led_pin: None,
        ..fast_config(0)
    };
    let rig = start(&config);

    rig.sim.press();
    assert!(wait_until(SETTLE, || rig.publisher.payloads() == ["ON"]));
    let held = rig.publisher.sent.lock().unwrap();
    for _ in 0..2 {
        rig.sim.release();
        std::thread::sleep(Duration::from_millis(60));
        rig.sim.press();
        std::thread::sleep(Duration::from_millis(60));
    }

    rig.token.cancel(ShutdownReason::Interrupted);
    drop(held);
    rig.group.join();
}
