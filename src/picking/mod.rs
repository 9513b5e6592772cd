//! Mouse picking: rays from the camera, scene intersection, and
//! click-to-select.

/// Rays and primitive intersection tests.
pub mod ray;
/// Scene ray casting.
pub mod raycaster;
/// Click (not drag) detection and selection changes.
pub mod selector;

pub use ray::Ray;
pub use raycaster::{Intersection, Raycaster};
pub use selector::{SelectorEvent, ViewportSelector};
