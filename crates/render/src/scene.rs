use cubeview_common::{Color, Transform};

/// Index of a mesh inside its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Mesh shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Axis-aligned box centred on the origin.
    Box { width: f32, height: f32, depth: f32 },
}

impl Geometry {
    pub fn unit_box() -> Self {
        Self::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }
}

/// Surface shading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Colors each face by its normal direction; ignores lights.
    Normal,
    /// Flat color lit by the scene's ambient light and a fixed key light.
    Lit { color: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            intensity: 1.0,
        }
    }
}

/// Flat scene graph: meshes plus one optional ambient light.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
    ambient: Option<AmbientLight>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn ambient_light(&self) -> Option<&AmbientLight> {
        self.ambient.as_ref()
    }

    pub fn set_ambient_light(&mut self, light: AmbientLight) {
        self.ambient = Some(light);
    }

    /// Ambient contribution as a color, black when there is no light.
    pub fn ambient_term(&self) -> Color {
        match self.ambient {
            Some(light) => Color::rgba(
                light.color.r * light.intensity,
                light.color.g * light.intensity,
                light.color.b * light.intensity,
                1.0,
            ),
            None => Color::BLACK,
        }
    }

    /// Soft white ambient light and a unit cube with a normal material.
    /// `on_loaded` runs once the objects are in place.
    pub fn populate_default(&mut self, on_loaded: impl FnOnce(&Scene)) {
        self.set_ambient_light(AmbientLight::new(Color::from_hex(0x404040)));
        self.add(Mesh::new("cube", Geometry::unit_box(), Material::Normal));
        tracing::info!(meshes = self.len(), "scene is loaded");
        on_loaded(self);
    }
}
