//! Simulated hardware and broker for integration tests.
//!
//! `SimGpio` models one input and one output line with atomics so a test
//! thread can flip the button while the loops are sampling it.  The
//! publisher and sink record into shared vectors so assertions can be made
//! after the loops have moved them onto their own threads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use doorbell::app::events::AppEvent;
use doorbell::app::ports::{EventSink, GpioError, GpioPort, PublishError, PublishPort};
use doorbell::pins::{Level, PinId, Pull};

// ── SimGpio ───────────────────────────────────────────────────

pub struct SimGpio {
    pub input: PinId,
    pub output: Option<PinId>,
    level_high: AtomicBool,
    fail_reads: AtomicBool,
    closed: AtomicBool,
    sampler_reads: AtomicUsize,
    pub configured: Mutex<Vec<PinId>>,
    pub writes: Mutex<Vec<Level>>,
}

#[allow(dead_code)]
impl SimGpio {
    /// Idle pull-up wiring: the input reads high until pressed.
    pub fn new(input: PinId, output: Option<PinId>) -> Self {
        Self {
            input,
            output,
            level_high: AtomicBool::new(true),
            fail_reads: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            sampler_reads: AtomicUsize::new(0),
            configured: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Active-low press.
    pub fn press(&self) {
        self.level_high.store(false, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.level_high.store(true, Ordering::SeqCst);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Reads made from the sampler thread.  The first one seeds the
    /// debouncer, so tests must not touch the button before it.
    pub fn sampler_reads(&self) -> usize {
        self.sampler_reads.load(Ordering::SeqCst)
    }

    pub fn last_write(&self) -> Option<Level> {
        self.writes.lock().unwrap().last().copied()
    }
}

impl GpioPort for SimGpio {
    fn configure_input(&self, pin: PinId, _pull: Pull) -> Result<(), GpioError> {
        if pin != self.input {
            return Err(GpioError::PinUnavailable(pin));
        }
        self.configured.lock().unwrap().push(pin);
        Ok(())
    }

    fn configure_output(&self, pin: PinId) -> Result<(), GpioError> {
        if Some(pin) != self.output {
            return Err(GpioError::PinUnavailable(pin));
        }
        self.configured.lock().unwrap().push(pin);
        Ok(())
    }

    fn read(&self, pin: PinId) -> Result<Level, GpioError> {
        if self.is_closed() {
            return Err(GpioError::Closed);
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GpioError::Io("simulated read failure".into()));
        }
        if pin != self.input {
            return Err(GpioError::NotConfigured(pin));
        }
        let level = Level::from_high(self.level_high.load(Ordering::SeqCst));
        if std::thread::current().name() == Some("sampler") {
            self.sampler_reads.fetch_add(1, Ordering::SeqCst);
        }
        Ok(level)
    }

    fn write(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
        if self.is_closed() {
            return Err(GpioError::Closed);
        }
        if Some(pin) != self.output {
            return Err(GpioError::NotConfigured(pin));
        }
        self.writes.lock().unwrap().push(level);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// ── RecordingPublisher ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub sent: Arc<Mutex<Vec<Published>>>,
    pub fail: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl RecordingPublisher {
    pub fn payloads(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|p| p.payload.clone()).collect()
    }
}

impl PublishPort for RecordingPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), PublishError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublishError::Send("broker unreachable".into()));
        }
        self.sent.lock().unwrap().push(Published {
            topic: topic.to_owned(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            retain,
        });
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Poll `cond` until it holds or `timeout` passes.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}
