//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that runs the real loops against the
//! simulated lines and broker in `mock_hw`.  Everything runs on the host
//! with short intervals; no hardware or broker required.

mod mock_hw;
mod pipeline_tests;
mod shutdown_tests;
