//! Scene JSON loading.
//!
//! Reads the three.js object format (`metadata`, `geometries`,
//! `materials`, `object`) and the editor project wrapper that bundles a
//! camera, a scene and per-object scripts.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

use super::{
    Fog, Geometry, Light, LightKind, Material, MaterialKind, Object3D,
    ObjectKind, ObjectTree, Side, Transform,
};
use crate::camera::core::Projection;
use crate::error::ViewportError;
use crate::util::color::Color;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ObjectFile {
    #[serde(default)]
    geometries: Vec<GeometryJson>,
    #[serde(default)]
    materials: Vec<MaterialJson>,
    object: ObjectJson,
}

#[derive(Deserialize)]
struct GeometryJson {
    uuid: String,
    #[serde(flatten)]
    shape: ShapeJson,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ShapeJson {
    #[serde(rename = "BoxGeometry")]
    Box(BoxParams),
    #[serde(rename = "PlaneGeometry")]
    Plane(PlaneParams),
    #[serde(rename = "SphereGeometry")]
    Sphere(SphereParams),
    #[serde(rename = "BufferGeometry")]
    Buffer(BufferParams),
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BoxParams {
    width: f32,
    height: f32,
    depth: f32,
    width_segments: u32,
    height_segments: u32,
    depth_segments: u32,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
        }
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlaneParams {
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
}

impl Default for PlaneParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
        }
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SphereParams {
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    phi_start: f32,
    phi_length: f32,
    theta_start: f32,
    theta_length: f32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
            phi_start: 0.0,
            phi_length: TAU,
            theta_start: 0.0,
            theta_length: PI,
        }
    }
}

#[derive(Deserialize)]
struct BufferParams {
    data: BufferData,
}

#[derive(Deserialize)]
struct BufferData {
    attributes: HashMap<String, AttributeJson>,
    #[serde(default)]
    index: Option<AttributeJson>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeJson {
    #[serde(default = "one")]
    item_size: usize,
    array: Vec<f64>,
}

fn one() -> usize {
    1
}

#[derive(Deserialize)]
#[serde(default)]
struct MaterialJson {
    uuid: String,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    color: Option<u32>,
    opacity: f32,
    transparent: bool,
    side: u32,
    wireframe: bool,
    size: f32,
}

impl Default for MaterialJson {
    fn default() -> Self {
        Self {
            uuid: String::new(),
            kind: String::new(),
            name: String::new(),
            color: None,
            opacity: 1.0,
            transparent: false,
            side: 0,
            wireframe: false,
            size: 1.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaterialRef {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectJson {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    matrix: Option<[f32; 16]>,
    #[serde(default)]
    position: Option<[f32; 3]>,
    #[serde(default)]
    quaternion: Option<[f32; 4]>,
    #[serde(default)]
    scale: Option<[f32; 3]>,
    #[serde(default)]
    up: Option<[f32; 3]>,
    #[serde(default = "yes")]
    visible: bool,
    #[serde(default)]
    user_data: Option<Value>,
    #[serde(default)]
    children: Vec<ObjectJson>,
    #[serde(default)]
    geometry: Option<String>,
    #[serde(default)]
    material: Option<MaterialRef>,
    // Cameras
    #[serde(default)]
    fov: Option<f32>,
    #[serde(default)]
    aspect: Option<f32>,
    #[serde(default)]
    near: Option<f32>,
    #[serde(default)]
    far: Option<f32>,
    #[serde(default)]
    zoom: Option<f32>,
    #[serde(default)]
    left: Option<f32>,
    #[serde(default)]
    right: Option<f32>,
    #[serde(default)]
    top: Option<f32>,
    #[serde(default)]
    bottom: Option<f32>,
    // Lights
    #[serde(default)]
    color: Option<u32>,
    #[serde(default)]
    intensity: Option<f32>,
    // Scenes
    #[serde(default)]
    background: Option<Value>,
    #[serde(default)]
    fog: Option<FogJson>,
    #[serde(default)]
    background_blurriness: Option<f32>,
    #[serde(default)]
    background_intensity: Option<f32>,
}

fn yes() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum FogJson {
    Fog {
        #[serde(default)]
        color: u32,
        #[serde(default = "fog_near")]
        near: f32,
        #[serde(default = "fog_far")]
        far: f32,
    },
    FogExp2 {
        #[serde(default)]
        color: u32,
        #[serde(default = "fog_density")]
        density: f32,
    },
}

fn fog_near() -> f32 {
    1.0
}

fn fog_far() -> f32 {
    1000.0
}

fn fog_density() -> f32 {
    0.00025
}

/// Script attached to an object in an editor project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Script {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Source text. Stored only; never executed.
    #[serde(default)]
    pub source: String,
}

/// Scripts keyed by the uuid of the object they belong to.
pub type ScriptMap = FxHashMap<String, Vec<Script>>;

#[derive(Deserialize)]
struct ProjectJson {
    camera: Value,
    scene: Value,
    #[serde(default)]
    scripts: ScriptMap,
}

// ---------------------------------------------------------------------------
// Loaded results
// ---------------------------------------------------------------------------

/// Scene-level settings of a loaded `Scene` object.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    /// Scene uuid.
    pub uuid: String,
    /// Scene name.
    pub name: String,
    /// Background colour, if it is a colour.
    pub background: Option<Color>,
    /// Fog.
    pub fog: Option<Fog>,
    /// Background blur amount.
    pub background_blurriness: f32,
    /// Background brightness multiplier.
    pub background_intensity: f32,
    /// User data.
    pub user_data: Value,
}

/// A parsed editor project.
#[derive(Debug, Clone)]
pub struct Project {
    /// The project camera as a scene object.
    pub camera: ObjectTree,
    /// Scene-level settings.
    pub scene: SceneSettings,
    /// Top-level scene children.
    pub children: Vec<ObjectTree>,
    /// Scripts per object uuid.
    pub scripts: ScriptMap,
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Parses scene JSON into object trees, resolving geometry and material
/// references by uuid.
#[derive(Default)]
pub struct ObjectLoader {
    geometries: FxHashMap<String, Arc<Geometry>>,
    materials: FxHashMap<String, Arc<Material>>,
}

impl ObjectLoader {
    /// Loader with empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an editor project (`{ camera, scene, scripts }`).
    pub fn parse_project(&mut self, json: &Value) -> Result<Project, ViewportError> {
        let project = ProjectJson::deserialize(json)?;
        let camera = self.parse(&project.camera)?;
        if !matches!(camera.object.kind, ObjectKind::Camera(_)) {
            return Err(ViewportError::SceneLoad(format!(
                "project camera is a {}",
                camera.object.type_name()
            )));
        }
        let (scene, children) = self.parse_scene(&project.scene)?;
        Ok(Project {
            camera,
            scene,
            children,
            scripts: project.scripts,
        })
    }

    /// Parse a `Scene` object into its settings and top-level children.
    pub fn parse_scene(
        &mut self,
        json: &Value,
    ) -> Result<(SceneSettings, Vec<ObjectTree>), ViewportError> {
        let root = self.read_file(json)?;
        if root.kind != "Scene" {
            return Err(ViewportError::SceneLoad(format!(
                "expected a Scene object, found {}",
                root.kind
            )));
        }
        let settings = scene_settings(&root);
        let children = root
            .children
            .iter()
            .map(|child| self.build(child))
            .collect();
        Ok((settings, children))
    }

    /// Parse any object into a tree. Accepts the full object format or a
    /// bare object whose references were registered by an earlier parse.
    pub fn parse(&mut self, json: &Value) -> Result<ObjectTree, ViewportError> {
        let root = self.read_file(json)?;
        Ok(self.build(&root))
    }

    /// Geometry registered under `uuid`.
    #[must_use]
    pub fn geometry(&self, uuid: &str) -> Option<&Arc<Geometry>> {
        self.geometries.get(uuid)
    }

    /// Material registered under `uuid`.
    #[must_use]
    pub fn material(&self, uuid: &str) -> Option<&Arc<Material>> {
        self.materials.get(uuid)
    }

    fn read_file(&mut self, json: &Value) -> Result<ObjectJson, ViewportError> {
        if json.get("object").is_none() {
            return Ok(ObjectJson::deserialize(json)?);
        }
        let file = ObjectFile::deserialize(json)?;
        for g in file.geometries {
            if let Some(geometry) = build_geometry(g.shape)? {
                let geometry = geometry.with_uuid(g.uuid.clone());
                let _ = self.geometries.insert(g.uuid, Arc::new(geometry));
            } else {
                log::warn!("geometry {}: unsupported type, skipped", g.uuid);
            }
        }
        for m in file.materials {
            let uuid = m.uuid.clone();
            let _ = self.materials.insert(uuid, Arc::new(build_material(m)));
        }
        Ok(file.object)
    }

    fn build(&self, json: &ObjectJson) -> ObjectTree {
        let kind = self.object_kind(json);
        let mut object = Object3D::new(kind);
        if let Some(uuid) = &json.uuid {
            object.uuid.clone_from(uuid);
        }
        object.name.clone_from(&json.name);
        object.transform = transform(json);
        if let Some(up) = json.up {
            object.up = Vec3::from(up);
        }
        object.visible = json.visible;
        if let Some(user_data) = &json.user_data {
            object.user_data = user_data.clone();
        }
        ObjectTree {
            object,
            children: json.children.iter().map(|c| self.build(c)).collect(),
        }
    }

    fn object_kind(&self, json: &ObjectJson) -> ObjectKind {
        match json.kind.as_str() {
            "Scene" | "Group" | "Object3D" => ObjectKind::Group,
            "Mesh" | "Points" => self.drawable(json),
            "PerspectiveCamera" => ObjectKind::Camera(Projection::Perspective {
                fov: json.fov.unwrap_or(50.0),
                aspect: json.aspect.unwrap_or(1.0),
                near: json.near.unwrap_or(0.1),
                far: json.far.unwrap_or(2000.0),
            }),
            "OrthographicCamera" => ObjectKind::Camera(Projection::Orthographic {
                left: json.left.unwrap_or(-1.0),
                right: json.right.unwrap_or(1.0),
                top: json.top.unwrap_or(1.0),
                bottom: json.bottom.unwrap_or(-1.0),
                near: json.near.unwrap_or(0.1),
                far: json.far.unwrap_or(2000.0),
                zoom: json.zoom.unwrap_or(1.0),
            }),
            "AmbientLight" => light(json, LightKind::Ambient),
            "DirectionalLight" => light(json, LightKind::Directional),
            "PointLight" => light(json, LightKind::Point),
            "SpotLight" => light(json, LightKind::Spot),
            "HemisphereLight" => light(json, LightKind::Hemisphere),
            other => {
                log::warn!("object type {other} is not supported, loading as a group");
                ObjectKind::Group
            }
        }
    }

    fn drawable(&self, json: &ObjectJson) -> ObjectKind {
        let Some(geometry) = json
            .geometry
            .as_deref()
            .and_then(|uuid| self.geometries.get(uuid))
            .cloned()
        else {
            log::warn!(
                "{} {:?}: missing geometry {:?}, loading as a group",
                json.kind,
                json.name,
                json.geometry
            );
            return ObjectKind::Group;
        };
        let material_uuid = match &json.material {
            Some(MaterialRef::One(uuid)) => Some(uuid.as_str()),
            Some(MaterialRef::Many(uuids)) => {
                if uuids.len() > 1 {
                    log::debug!("{:?}: using the first of {} materials", json.name, uuids.len());
                }
                uuids.first().map(String::as_str)
            }
            None => None,
        };
        let is_points = json.kind == "Points";
        let material = material_uuid
            .and_then(|uuid| self.materials.get(uuid))
            .cloned()
            .unwrap_or_else(|| {
                let kind = if is_points {
                    MaterialKind::Points
                } else {
                    MaterialKind::Basic
                };
                Arc::new(Material::new(kind, Color::WHITE))
            });
        if is_points {
            ObjectKind::Points { geometry, material }
        } else {
            ObjectKind::Mesh { geometry, material }
        }
    }
}

fn light(json: &ObjectJson, kind: LightKind) -> ObjectKind {
    ObjectKind::Light(Light {
        kind,
        color: Color::from_hex(json.color.unwrap_or(0xffffff)),
        intensity: json.intensity.unwrap_or(1.0),
    })
}

fn transform(json: &ObjectJson) -> Transform {
    if let Some(m) = json.matrix {
        return Transform::from_matrix(&Mat4::from_cols_array(&m));
    }
    let mut t = Transform::default();
    if let Some(p) = json.position {
        t.position = Vec3::from(p);
    }
    if let Some(q) = json.quaternion {
        t.rotation = Quat::from_array(q).normalize();
    }
    if let Some(s) = json.scale {
        t.scale = Vec3::from(s);
    }
    t
}

fn scene_settings(json: &ObjectJson) -> SceneSettings {
    let background = match &json.background {
        Some(Value::Number(n)) => n.as_u64().map(|hex| Color::from_hex(hex as u32)),
        Some(other) => {
            log::warn!("scene background {other} is not a colour, ignored");
            None
        }
        None => None,
    };
    let fog = json.fog.as_ref().map(|fog| match *fog {
        FogJson::Fog { color, near, far } => Fog::Linear {
            color: Color::from_hex(color),
            near,
            far,
        },
        FogJson::FogExp2 { color, density } => Fog::Exp2 {
            color: Color::from_hex(color),
            density,
        },
    });
    SceneSettings {
        uuid: json.uuid.clone().unwrap_or_default(),
        name: json.name.clone(),
        background,
        fog,
        background_blurriness: json.background_blurriness.unwrap_or(0.0),
        background_intensity: json.background_intensity.unwrap_or(1.0),
        user_data: json
            .user_data
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
    }
}

fn build_geometry(shape: ShapeJson) -> Result<Option<Geometry>, ViewportError> {
    Ok(Some(match shape {
        ShapeJson::Box(p) => Geometry::cuboid(
            p.width,
            p.height,
            p.depth,
            p.width_segments,
            p.height_segments,
            p.depth_segments,
        ),
        ShapeJson::Plane(p) => {
            Geometry::plane(p.width, p.height, p.width_segments, p.height_segments)
        }
        ShapeJson::Sphere(p) => Geometry::sphere(
            p.radius,
            p.width_segments,
            p.height_segments,
            p.phi_start,
            p.phi_length,
            p.theta_start,
            p.theta_length,
        ),
        ShapeJson::Buffer(p) => buffer_geometry(p.data)?,
        ShapeJson::Unsupported => return Ok(None),
    }))
}

fn buffer_geometry(mut data: BufferData) -> Result<Geometry, ViewportError> {
    let position = data.attributes.remove("position").ok_or_else(|| {
        ViewportError::SceneLoad("BufferGeometry without a position attribute".into())
    })?;
    let positions = vec3_attribute(&position, "position")?;
    let normals = data
        .attributes
        .remove("normal")
        .map(|n| vec3_attribute(&n, "normal"))
        .transpose()?;
    if normals.as_ref().is_some_and(|n| n.len() != positions.len()) {
        return Err(ViewportError::SceneLoad(
            "normal count does not match position count".into(),
        ));
    }
    let index = data
        .index
        .map(|i| {
            i.array
                .iter()
                .map(|&v| index_entry(v, positions.len()))
                .collect::<Result<Vec<u32>, _>>()
        })
        .transpose()?;
    Ok(Geometry::new(positions, normals, index))
}

/// A whole, non-negative number naming one of `vertex_count` vertices.
fn index_entry(v: f64, vertex_count: usize) -> Result<u32, ViewportError> {
    if v.fract() != 0.0 || v < 0.0 {
        return Err(ViewportError::SceneLoad(format!(
            "index {v} is not a vertex number"
        )));
    }
    if v >= vertex_count as f64 {
        return Err(ViewportError::SceneLoad(format!(
            "index {v} out of range for {vertex_count} vertices"
        )));
    }
    Ok(v as u32)
}

fn vec3_attribute(attr: &AttributeJson, name: &str) -> Result<Vec<Vec3>, ViewportError> {
    if attr.item_size != 3 || attr.array.len() % 3 != 0 {
        return Err(ViewportError::SceneLoad(format!(
            "{name} attribute must have item size 3"
        )));
    }
    Ok(attr
        .array
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
        .collect())
}

fn build_material(json: MaterialJson) -> Material {
    let kind = match json.kind.as_str() {
        "MeshBasicMaterial" => MaterialKind::Basic,
        "MeshLambertMaterial" => MaterialKind::Lambert,
        "MeshPhongMaterial" => MaterialKind::Phong,
        "MeshStandardMaterial" | "MeshPhysicalMaterial" => MaterialKind::Standard,
        "PointsMaterial" => MaterialKind::Points,
        other => {
            log::warn!("material type {other} is not supported, shading as basic");
            MaterialKind::Basic
        }
    };
    Material {
        uuid: json.uuid,
        name: json.name,
        kind,
        color: json.color.map_or(Color::WHITE, Color::from_hex),
        opacity: json.opacity,
        transparent: json.transparent,
        side: Side::from_index(json.side),
        wireframe: json.wireframe,
        size: json.size,
    }
}
