//! Application core: pure domain logic, zero I/O.
//!
//! Debounce, cooldown and dispatch rules for the doorbell.  All interaction
//! with hardware and the broker happens through **port traits** defined in
//! [`ports`], keeping this layer testable without a Pi or a broker.

pub mod debounce;
pub mod dispatch;
pub mod events;
pub mod ports;
pub mod service;
pub mod throttle;
