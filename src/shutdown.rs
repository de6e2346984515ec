//! Shutdown coordination.
//!
//! A [`ShutdownToken`] is shared by every loop.  Loops check it at each tick
//! boundary; anything that blocks (channel hand-off, the main thread's wait)
//! races its wait against [`ShutdownToken::cancelled`] so it cannot be left
//! parked after shutdown.
//!
//! ```text
//!  SIGINT/SIGTERM ──▶ ctrlc thread ──▶ token.cancel(Interrupted)
//!  fatal read     ──▶ sampler      ──▶ token.cancel(Fatal)
//!                                         │
//!                        main: coordinator.run() ──▶ gpio.close() (once)
//! ```
//!
//! The coordinator does not join the loops.  Releasing the lines is
//! idempotent and cheap, and the process exits right after.

use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use core::task::{Context, Poll};
use std::sync::Arc;
use std::time::Duration;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::waitqueue::MultiWakerRegistration;
use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort};
use crate::error::{Error, Result};

/// Concurrent async waiters before registration falls back to waking all.
const MAX_WAITERS: usize = 4;

const RUNNING: u8 = 0;
const INTERRUPTED: u8 = 1;
const FATAL: u8 = 2;

/// Why the process is going down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT or SIGTERM.
    Interrupted,
    /// A loop hit an unrecoverable error.
    Fatal,
}

impl ShutdownReason {
    /// Process exit status for this reason.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Interrupted => 130,
            Self::Fatal => 1,
        }
    }

    fn code(self) -> u8 {
        match self {
            Self::Interrupted => INTERRUPTED,
            Self::Fatal => FATAL,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            INTERRUPTED => Some(Self::Interrupted),
            FATAL => Some(Self::Fatal),
            _ => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Token
// ───────────────────────────────────────────────────────────────

struct Inner {
    state: AtomicU8,
    wakers: Mutex<CriticalSectionRawMutex, RefCell<MultiWakerRegistration<MAX_WAITERS>>>,
}

/// Shared cancellation flag.  Cloning is cheap; all clones observe the same
/// state.  The first `cancel` wins and fixes the reason.
#[derive(Clone)]
pub struct ShutdownToken {
    inner: Arc<Inner>,
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: AtomicU8::new(RUNNING),
                wakers: Mutex::new(RefCell::new(MultiWakerRegistration::new())),
            }),
        }
    }

    /// Request shutdown.  Returns `true` if this call set the reason.
    pub fn cancel(&self, reason: ShutdownReason) -> bool {
        let won = self
            .inner
            .state
            .compare_exchange(RUNNING, reason.code(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.inner.wakers.lock(|w| w.borrow_mut().wake());
        }
        won
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) != RUNNING
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        ShutdownReason::from_code(self.inner.state.load(Ordering::Acquire))
    }

    /// Future that resolves once the token is cancelled.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled { token: self }
    }

    /// Block the calling thread until the token is cancelled.
    pub fn wait(&self) -> ShutdownReason {
        futures_lite::future::block_on(self.cancelled())
    }

    /// Sleep one tick.  Returns `true` while the loop should keep going.
    pub fn tick(&self, interval: Duration) -> bool {
        std::thread::sleep(interval);
        !self.is_cancelled()
    }
}

/// Returned by [`ShutdownToken::cancelled`].
pub struct Cancelled<'a> {
    token: &'a ShutdownToken,
}

impl Future for Cancelled<'_> {
    type Output = ShutdownReason;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(reason) = self.token.reason() {
            return Poll::Ready(reason);
        }
        self.token
            .inner
            .wakers
            .lock(|w| w.borrow_mut().register(cx.waker()));
        // Re-check: cancel() may have run between the load and the register.
        match self.token.reason() {
            Some(reason) => Poll::Ready(reason),
            None => Poll::Pending,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Coordinator
// ───────────────────────────────────────────────────────────────

/// Owns the single release of the GPIO capability.
pub struct ShutdownCoordinator {
    gpio: Arc<dyn GpioPort>,
    released: AtomicBool,
}

impl ShutdownCoordinator {
    pub fn new(gpio: Arc<dyn GpioPort>) -> Self {
        Self {
            gpio,
            released: AtomicBool::new(false),
        }
    }

    /// Close the GPIO capability.  Only the first call does anything.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        info!("cleanup");
        self.gpio.close();
        true
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Block until `token` is cancelled, then release.  Does not wait for
    /// the loops to notice.
    pub fn run(&self, token: &ShutdownToken, sink: &mut impl EventSink) -> ShutdownReason {
        let reason = token.wait();
        sink.emit(&AppEvent::Shutdown(reason));
        self.release();
        reason
    }
}

/// Route SIGINT and SIGTERM to `token`.  Can be installed once per process.
pub fn listen_for_signals(token: ShutdownToken) -> Result<()> {
    ctrlc::set_handler(move || {
        token.cancel(ShutdownReason::Interrupted);
    })
    .map_err(|e| Error::Init(format!("signal handler: {e}")))
}
