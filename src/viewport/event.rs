use crate::gizmo::{GizmoMode, TransformSpace};
use crate::scene::{NodeId, ViewportStatistics};

/// Notifications queued by the [`Viewport`](super::Viewport) for its host.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    /// A frame was drawn. Throttled.
    Rendered {
        /// Milliseconds spent submitting the frame.
        frametime: f64,
    },
    /// An object was added to the scene.
    ObjectAdded {
        /// Root of the added subtree.
        node: NodeId,
    },
    /// An object was removed from the scene.
    ObjectRemoved {
        /// Former handle of the removed root.
        node: NodeId,
        /// Its uuid.
        uuid: String,
    },
    /// Vertex or triangle counts may have changed.
    GeometryChanged,
    /// The viewport camera was replaced or reset.
    CameraReset,
    /// The camera moved.
    CameraChanged,
    /// The scene was rebuilt.
    SceneGraphChanged,
    /// The selection changed.
    ObjectSelected {
        /// New selection.
        selected: Option<NodeId>,
    },
    /// Fresh statistics, sent with every delivered `Rendered`.
    StatsChanged(ViewportStatistics),
    /// The camera was moved to frame an object.
    ObjectFocused {
        /// Framed object.
        node: NodeId,
    },
    /// An object's transform was edited.
    ObjectChanged {
        /// Edited object.
        node: NodeId,
    },
    /// The gizmo mode changed.
    TransformModeChanged(GizmoMode),
    /// The gizmo space changed.
    SpaceChanged(TransformSpace),
    /// A gizmo snap step changed.
    SnapChanged,
}
