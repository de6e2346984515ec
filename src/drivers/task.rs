//! Named worker threads.
//!
//! Every long-running loop gets its own OS thread with an explicit name and
//! stack size, so `ps -L` and panic messages say which loop is which.

use std::thread::JoinHandle;

use crate::error::{Error, Result};

/// Stack for the polling loops.  They hold a handful of small values.
pub const LOOP_STACK_KB: usize = 64;

/// Spawn `f` on a named thread.
pub fn spawn_named(
    name: &'static str,
    stack_kb: usize,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    log::debug!("Spawning '{}' (stack={}KB)", name, stack_kb);

    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .map_err(|e| Error::Init(format!("spawn {name}: {e}")))
}
