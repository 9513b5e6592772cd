// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Embeddable 3D scene editor viewport built on wgpu.
//!
//! Stageview shows a scene graph loaded from editor project JSON and lets
//! the user orbit the camera, click objects to select them and move,
//! rotate or scale the selection with a transform gizmo.
//!
//! # Key entry points
//!
//! - [`viewport::Viewport`] - the interactive viewport: input in, draw data
//!   and events out
//! - [`scene::Scene`] - the scene graph arena and the project JSON loader
//! - [`renderer::SceneRenderer`] - draws a viewport frame with wgpu
//! - [`options::Options`] - runtime configuration (theme, camera, controls,
//!   gizmo, grid, keybindings)
//! - `Editor` - a winit window (or browser canvas) running all of the above,
//!   behind the `viewer` feature
//!
//! # Architecture
//!
//! The viewport owns no GPU state. Each redraw the host calls
//! [`Viewport::tick`](viewport::Viewport::tick) to run animations and
//! refresh the gizmo, then [`Viewport::frame`](viewport::Viewport::frame)
//! to collect world-space triangles, lines and points, which the renderer
//! uploads and draws in a single depth-tested pass with the gizmo on top.

pub mod camera;
#[cfg(feature = "viewer")]
pub mod editor;
pub mod error;
pub mod gizmo;
pub mod gpu;
pub mod input;
pub mod options;
pub mod picking;
pub mod renderer;
pub mod scene;
pub mod util;
pub mod viewport;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

#[cfg(feature = "viewer")]
pub use editor::{Editor, EditorBuilder};
pub use error::ViewportError;
pub use options::Options;
pub use viewport::{Viewport, ViewportCommand, ViewportEvent};
