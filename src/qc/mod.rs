//! Telemetry quality control
mod stuck;

pub use stuck::{stuck_mask, StuckFilter, StuckPolicy};
