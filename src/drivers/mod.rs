//! Line drivers and worker-thread helpers.

pub mod indicator;
pub mod sampler;
pub mod task;
