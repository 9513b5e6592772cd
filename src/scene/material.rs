//! Surface appearance. Only what the viewport shades with is kept: colour,
//! opacity, face culling and a lighting model.

use serde::{Deserialize, Serialize};

use crate::util::color::Color;
use crate::util::id::generate_uuid;

/// Lighting model of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Unlit flat colour.
    Basic,
    /// Diffuse only.
    Lambert,
    /// Diffuse plus specular highlight.
    Phong,
    /// Physically based materials, shaded as Phong.
    Standard,
    /// Screen-space point sprites.
    Points,
}

impl MaterialKind {
    /// Whether the fragment shader applies lighting.
    #[must_use]
    pub fn is_lit(self) -> bool {
        !matches!(self, Self::Basic | Self::Points)
    }
}

/// Which triangle faces are drawn and hit by picking rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    /// Counter-clockwise faces only.
    #[default]
    Front,
    /// Clockwise faces only.
    Back,
    /// Both.
    Double,
}

impl Side {
    /// Side from the numeric constant scene JSON uses (0, 1, 2).
    #[must_use]
    pub fn from_index(i: u32) -> Self {
        match i {
            1 => Self::Back,
            2 => Self::Double,
            _ => Self::Front,
        }
    }
}

/// Appearance shared between objects by uuid.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Identifier referenced by objects in scene JSON.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Lighting model.
    pub kind: MaterialKind,
    /// Diffuse colour.
    pub color: Color,
    /// 0.0 transparent to 1.0 opaque.
    pub opacity: f32,
    /// Whether opacity is applied.
    pub transparent: bool,
    /// Face culling.
    pub side: Side,
    /// Draw triangle edges instead of faces.
    pub wireframe: bool,
    /// Point size in pixels for [`MaterialKind::Points`].
    pub size: f32,
}

impl Material {
    /// Opaque front-sided material of the given kind and colour.
    #[must_use]
    pub fn new(kind: MaterialKind, color: Color) -> Self {
        Self {
            uuid: generate_uuid(),
            name: String::new(),
            kind,
            color,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            wireframe: false,
            size: 1.0,
        }
    }

    /// Replace the generated uuid.
    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Alpha the renderer should use.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        if self.transparent {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(MaterialKind::Basic, Color::WHITE)
    }
}
