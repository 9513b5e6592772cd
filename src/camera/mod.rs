//! Camera system for the editor viewport.
//!
//! A perspective or orthographic [`Camera`](core::Camera) and the orbit
//! controls that move it around a centre point.

/// Orbit, zoom and pan controls.
pub mod controls;
/// Core camera struct and GPU uniform types.
pub mod core;
/// Spherical coordinates for orbiting.
pub mod spherical;
