//! Task group: the three loops and the hand-off between them.
//!
//! ```text
//!  ┌──────────────────────────┐  EDGE (1 slot)  ┌──────────────────────────┐
//!  │ sampler thread           │────────────────▶│ notifier thread          │
//!  │ PinSampler → Debouncer   │  blocking send  │ Throttle → Dispatcher    │──▶ broker
//!  └──────────────────────────┘                 └──────────────────────────┘
//!  ┌──────────────────────────┐
//!  │ indicator thread         │  raw input ──▶ LED (no debounce)
//!  └──────────────────────────┘
//!            all three observe the ShutdownToken at every tick
//! ```
//!
//! The edge channel holds one edge.  The sampler blocks on a second edge
//! until the notifier has taken the first, so stale edges never queue up
//! behind a stalled broker.  Both blocking ends are raced against the
//! token so neither thread outlives a shutdown by more than one tick.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future;
use log::{debug, error, info, warn};

use crate::app::debounce::Debouncer;
use crate::app::events::{AppEvent, DebouncedEdge};
use crate::app::ports::{EventSink, GpioPort, PublishPort};
use crate::app::service::NotifyService;
use crate::config::DoorbellConfig;
use crate::drivers::indicator::IndicatorMirror;
use crate::drivers::sampler::PinSampler;
use crate::drivers::task::{LOOP_STACK_KB, spawn_named};
use crate::error::Result;
use crate::shutdown::{ShutdownReason, ShutdownToken};

/// Depth of the debouncer → notifier hand-off.
pub const EDGE_DEPTH: usize = 1;

/// Debouncer → notifier hand-off.
pub type EdgeChannel = Channel<CriticalSectionRawMutex, DebouncedEdge, EDGE_DEPTH>;

// ── Task group ────────────────────────────────────────────────

/// Handles of the running loops.
#[derive(Default)]
pub struct TaskGroup {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl TaskGroup {
    fn push(&mut self, name: &'static str, handle: JoinHandle<()>) {
        self.tasks.push((name, handle));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(name, _)| *name).collect()
    }

    /// Wait for every loop to exit.  Only useful after the token has been
    /// cancelled; the binary never calls this.
    pub fn join(self) {
        for (name, handle) in self.tasks {
            if handle.join().is_err() {
                warn!("task '{}' panicked", name);
            }
        }
    }
}

/// Configure the lines and start the loops.
///
/// Any configuration error is returned before a single thread is started.
/// If a later spawn fails, the token is cancelled so the loops that did
/// start wind down.
pub fn start<P, S>(
    config: &DoorbellConfig,
    gpio: Arc<dyn GpioPort>,
    publisher: P,
    mut sink: S,
    token: &ShutdownToken,
) -> Result<TaskGroup>
where
    P: PublishPort + 'static,
    S: EventSink + 'static,
{
    config.validate()?;

    // ── Lines ─────────────────────────────────────────────────
    let sampler = PinSampler::new(gpio.clone(), config.button_pin, config.button_polarity);
    sampler.configure(config.button_pull)?;

    let mirror = match config.led_pin {
        Some(led) => {
            let mirror = IndicatorMirror::new(
                gpio,
                config.button_pin,
                config.button_polarity,
                led,
                config.led_polarity,
            );
            mirror.configure()?;
            Some(mirror)
        }
        None => None,
    };

    sink.emit(&AppEvent::Started {
        pin: config.button_pin,
        topic: config.topic.clone(),
    });

    // ── Loops ─────────────────────────────────────────────────
    let edges: Arc<EdgeChannel> = Arc::new(Channel::new());
    let service = NotifyService::from_config(config, publisher);
    let debouncer = Debouncer::new(config.debounce_window());
    info!(
        "debounce={:?} cooldown={:?} topic='{}'",
        debouncer.window(),
        service.throttle_window(),
        config.topic
    );
    let sample_interval = config.sample_interval();
    let indicator_interval = config.indicator_interval();

    let spawned = (|| -> Result<TaskGroup> {
        let mut group = TaskGroup::default();

        let (rx, tok) = (edges.clone(), token.clone());
        group.push(
            "notifier",
            spawn_named("notifier", LOOP_STACK_KB, move || {
                notifier_loop(&rx, service, sink, &tok)
            })?,
        );

        let (tx, tok) = (edges.clone(), token.clone());
        group.push(
            "sampler",
            spawn_named("sampler", LOOP_STACK_KB, move || {
                sampler_loop(sampler, debouncer, sample_interval, &tx, &tok)
            })?,
        );

        if let Some(mirror) = mirror {
            let tok = token.clone();
            group.push(
                "indicator",
                spawn_named("indicator", LOOP_STACK_KB, move || {
                    indicator_loop(mirror, indicator_interval, &tok)
                })?,
            );
        }

        Ok(group)
    })();

    if spawned.is_err() {
        token.cancel(ShutdownReason::Fatal);
    }
    spawned
}

// ── Loops ─────────────────────────────────────────────────────

/// Sample, debounce, hand edges to the notifier.  A read error is fatal.
pub fn sampler_loop(
    sampler: PinSampler,
    mut debouncer: Debouncer,
    interval: Duration,
    edges: &EdgeChannel,
    token: &ShutdownToken,
) {
    info!("Started... waiting for button press on GPIO{}", sampler.pin());

    while !token.is_cancelled() {
        match sampler.sample() {
            Ok(sample) => {
                if let Some(edge) = debouncer.sample(sample) {
                    debug!("EDGE | {:?}", edge.state);
                    if !hand_off(edges, edge, token) {
                        break;
                    }
                }
            }
            Err(e) => {
                // After shutdown the lines are already closed; not an error.
                if !token.is_cancelled() {
                    error!("GPIO{} read failed: {}, stopping", sampler.pin(), e);
                    token.cancel(ShutdownReason::Fatal);
                }
                break;
            }
        }

        if !token.tick(interval) {
            break;
        }
    }

    debug!("sampler stopped");
}

/// Take edges in order and run them through the notifier service.
pub fn notifier_loop<P: PublishPort>(
    edges: &EdgeChannel,
    mut service: NotifyService<P>,
    mut sink: impl EventSink,
    token: &ShutdownToken,
) {
    loop {
        let next = future::block_on(future::or(
            async { Some(edges.receive().await) },
            async {
                token.cancelled().await;
                None
            },
        ));
        let Some(edge) = next else {
            break;
        };
        service.handle_edge(edge, Instant::now(), &mut sink);
    }

    debug!(
        "notifier stopped (published={} suppressed={} failed={})",
        service.published_count(),
        service.suppressed_count(),
        service.failed_count()
    );
}

/// Mirror the raw input onto the LED.  A read or write error is fatal.
pub fn indicator_loop(mut mirror: IndicatorMirror, interval: Duration, token: &ShutdownToken) {
    while !token.is_cancelled() {
        if let Err(e) = mirror.step() {
            if !token.is_cancelled() {
                error!("indicator GPIO{} failed: {}, stopping", mirror.output_pin(), e);
                token.cancel(ShutdownReason::Fatal);
            }
            break;
        }

        if !token.tick(interval) {
            break;
        }
    }

    debug!("indicator stopped");
}

/// Blocking single-slot send.  Returns `false` if shutdown won the race.
fn hand_off(edges: &EdgeChannel, edge: DebouncedEdge, token: &ShutdownToken) -> bool {
    future::block_on(future::or(
        async {
            edges.send(edge).await;
            true
        },
        async {
            token.cancelled().await;
            false
        },
    ))
}
