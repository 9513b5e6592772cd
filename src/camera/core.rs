//! Cameras: projection, view matrices and the GPU uniform.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4Swizzles};

use crate::options::CameraOptions;
use crate::scene::{Object3D, ObjectKind};
use crate::util::id::generate_uuid;

/// Projection model of a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Pinhole projection.
    Perspective {
        /// Vertical field of view in degrees.
        fov: f32,
        /// Viewport aspect ratio (width / height).
        aspect: f32,
        /// Near clipping plane distance.
        near: f32,
        /// Far clipping plane distance.
        far: f32,
    },
    /// Parallel projection of a view box.
    Orthographic {
        /// Left plane.
        left: f32,
        /// Right plane.
        right: f32,
        /// Top plane.
        top: f32,
        /// Bottom plane.
        bottom: f32,
        /// Near clipping plane distance.
        near: f32,
        /// Far clipping plane distance.
        far: f32,
        /// Magnification of the view box.
        zoom: f32,
    },
}

impl Projection {
    /// Projection matrix with wgpu's [0, 1] depth range.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov.to_radians(), aspect, near, far),
            Self::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
                zoom,
            } => {
                let dx = (right - left) / (2.0 * zoom);
                let dy = (top - bottom) / (2.0 * zoom);
                let cx = (right + left) * 0.5;
                let cy = (top + bottom) * 0.5;
                Mat4::orthographic_rh(
                    cx - dx,
                    cx + dx,
                    cy - dy,
                    cy + dy,
                    near,
                    far,
                )
            }
        }
    }

    /// Near clipping plane distance.
    #[must_use]
    pub fn near(&self) -> f32 {
        match *self {
            Self::Perspective { near, .. } | Self::Orthographic { near, .. } => {
                near
            }
        }
    }

    /// Far clipping plane distance.
    #[must_use]
    pub fn far(&self) -> f32 {
        match *self {
            Self::Perspective { far, .. } | Self::Orthographic { far, .. } => far,
        }
    }

    /// Whether this is a parallel projection.
    #[must_use]
    pub fn is_orthographic(&self) -> bool {
        matches!(self, Self::Orthographic { .. })
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            fov: 50.0,
            aspect: 1.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

/// A camera looking down its local -Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Stable identifier; the viewport camera takes the uuid of a loaded
    /// project camera.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Eye position in world space.
    pub position: Vec3,
    /// Orientation in world space.
    pub rotation: Quat,
    /// Up direction used by [`Camera::look_at`].
    pub up: Vec3,
    /// Projection parameters.
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_options(&CameraOptions::default())
    }
}

impl Camera {
    /// Camera at the origin looking down -Z.
    #[must_use]
    pub fn new(projection: Projection) -> Self {
        Self {
            uuid: generate_uuid(),
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            up: Vec3::Y,
            projection,
        }
    }

    /// The default viewport camera: named "Camera", perspective with the
    /// configured field of view and clip planes, aspect 1, placed at the
    /// configured position and looking at the configured target.
    #[must_use]
    pub fn from_options(options: &CameraOptions) -> Self {
        let mut camera = Self::new(Projection::Perspective {
            fov: options.fov,
            aspect: 1.0,
            near: options.near,
            far: options.far,
        });
        camera.name = "Camera".into();
        camera.position = Vec3::from(options.position);
        camera.look_at(Vec3::from(options.target));
        camera
    }

    /// Camera built from a camera node and its world matrix. Returns `None`
    /// if the node is not a camera.
    #[must_use]
    pub fn from_object(object: &Object3D, world: &Mat4) -> Option<Self> {
        let ObjectKind::Camera(projection) = object.kind else {
            return None;
        };
        let (_, rotation, position) = world.to_scale_rotation_translation();
        Some(Self {
            uuid: object.uuid.clone(),
            name: object.name.clone(),
            position,
            rotation,
            up: object.up,
            projection,
        })
    }

    /// Rotate so the local -Z axis points at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let mut z = self.position - target;
        if z.length_squared() == 0.0 {
            z.z = 1.0;
        }
        z = z.normalize();
        let mut x = self.up.cross(z);
        if x.length_squared() == 0.0 {
            // up and z are parallel
            if self.up.z.abs() == 1.0 {
                z.x += 0.0001;
            } else {
                z.z += 0.0001;
            }
            z = z.normalize();
            x = self.up.cross(z);
        }
        x = x.normalize();
        let y = z.cross(x);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
    }

    /// Update the aspect ratio of a perspective camera. Orthographic cameras
    /// are unaffected.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = new_aspect;
        }
    }

    /// Camera-to-world matrix.
    #[must_use]
    pub fn matrix_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World-to-camera matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.matrix_world().inverse()
    }

    /// Projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vector the camera looks along.
    #[must_use]
    pub fn world_direction(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Inverse-transpose of the upper 3×3 of the camera matrix; maps
    /// camera-space offsets to world space.
    #[must_use]
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.matrix_world()).inverse().transpose()
    }

    /// World point to normalized device coordinates (z in [0, 1]).
    #[must_use]
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }

    /// Normalized device coordinates (z in [0, 1]) to a world point.
    #[must_use]
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_projection().inverse().project_point3(ndc)
    }

    /// GPU uniform for this camera, the given key light and a viewport of
    /// `width` × `height` physical pixels.
    #[must_use]
    pub fn uniform(
        &self,
        light: &LightUniform,
        width: f32,
        height: f32,
    ) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            eye: self.position.extend(1.0).to_array(),
            light_dir: light.direction.extend(light.ambient).to_array(),
            light_color: light.color.extend(light.intensity).to_array(),
            viewport: [width.max(1.0), height.max(1.0), 0.0, 0.0],
        }
    }

    /// Distance from the eye to `point` along the view direction.
    #[must_use]
    pub fn view_depth(&self, point: Vec3) -> f32 {
        -(self.view_matrix() * point.extend(1.0)).xyz().z
    }
}

/// Key light parameters folded into the camera uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightUniform {
    /// Unit direction the light travels (towards the scene).
    pub direction: Vec3,
    /// Light colour.
    pub color: Vec3,
    /// Light intensity.
    pub intensity: f32,
    /// Ambient term added to every lit fragment.
    pub ambient: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the view-projection matrix, eye and key light.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position (w = 1).
    pub eye: [f32; 4],
    /// Light direction (xyz) and ambient term (w).
    pub light_dir: [f32; 4],
    /// Light colour (rgb) and intensity (w).
    pub light_color: [f32; 4],
    /// Viewport size in pixels (xy).
    pub viewport: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn default_camera_looks_at_origin() {
        let camera = Camera::default();
        assert_eq!(camera.name, "Camera");
        assert_eq!(camera.position, Vec3::new(5.0, 5.0, 10.0));
        let expected = (-camera.position).normalize();
        assert!(approx(camera.world_direction(), expected));
        assert!(matches!(
            camera.projection,
            Projection::Perspective { fov, aspect, near, far }
                if fov == 50.0 && aspect == 1.0 && near == 0.01 && far == 1000.0
        ));
    }

    #[test]
    fn look_at_straight_down_is_stable() {
        let mut camera = Camera::new(Projection::default());
        camera.position = Vec3::new(0.0, 10.0, 0.0);
        camera.look_at(Vec3::ZERO);
        assert!(camera.rotation.is_finite());
        assert!(approx(camera.world_direction(), Vec3::NEG_Y));
    }

    #[test]
    fn project_unproject_round_trip() {
        let camera = Camera::default();
        let p = Vec3::new(1.0, 0.5, -0.25);
        let ndc = camera.project(p);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        // f32 depth precision falls off with distance from the near plane
        let error = (camera.unproject(ndc) - p).length();
        assert!(error < 1e-3 * camera.position.distance(p), "error {error}");
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let camera = Camera::default();
        let ndc = camera.project(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }

    #[test]
    fn set_aspect_ignores_orthographic() {
        let ortho = Projection::Orthographic {
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
            near: 0.1,
            far: 100.0,
            zoom: 1.0,
        };
        let mut camera = Camera::new(ortho);
        camera.set_aspect(2.0);
        assert_eq!(camera.projection, ortho);

        let mut camera = Camera::default();
        camera.set_aspect(2.0);
        assert!(matches!(
            camera.projection,
            Projection::Perspective { aspect, .. } if aspect == 2.0
        ));
    }

    #[test]
    fn normal_matrix_maps_camera_axes() {
        let camera = Camera::default();
        let n = camera.normal_matrix();
        // Camera +Z (backwards) maps to minus the view direction
        assert!(approx(n * Vec3::Z, -camera.world_direction()));
    }

    #[test]
    fn camera_from_object_copies_projection() {
        let mut object = Object3D::new(ObjectKind::Camera(Projection::default()));
        object.uuid = "cam".into();
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let camera = Camera::from_object(&object, &world).unwrap();
        assert_eq!(camera.uuid, "cam");
        assert_eq!(camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(Camera::from_object(&Object3D::group(), &world).is_none());
    }
}
