/// Platform-agnostic pointer input, in canvas-relative physical pixels
/// with the origin at the top-left corner.
///
/// Hosts translate their native events into these and pass them to
/// [`Viewport::handle_input`](crate::viewport::Viewport::handle_input).
///
/// # Example
///
/// ```ignore
/// viewport.handle_input(InputEvent::PointerDown {
///     x: 100.0,
///     y: 200.0,
///     button: MouseButton::Primary,
///     on_canvas: true,
/// });
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A button was pressed.
    PointerDown {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
        /// Which button.
        button: MouseButton,
        /// Whether the press targeted the canvas itself rather than an
        /// element layered over it.
        on_canvas: bool,
    },
    /// The pointer moved.
    PointerMove {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// A button was released.
    PointerUp {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
        /// Which button.
        button: MouseButton,
    },
    /// Scroll wheel, DOM sign convention: positive scrolls down and moves
    /// the camera away.
    Wheel {
        /// Vertical scroll amount.
        delta_y: f32,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Primary,
    /// Middle mouse button (wheel click).
    Middle,
    /// Secondary (right) mouse button.
    Secondary,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Secondary,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Primary,
        }
    }
}
