//! Shared utilities: colours, identifiers, frame timing and throttling.

pub mod color;
pub mod frame_timing;
pub mod id;
pub mod throttle;
