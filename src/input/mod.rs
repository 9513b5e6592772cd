//! Input handling: the platform-agnostic pointer events every interactive
//! component consumes.

/// Platform-agnostic input events.
pub mod event;

pub use event::{InputEvent, MouseButton};
