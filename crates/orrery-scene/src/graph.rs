//! A flat-arena scene graph: nodes with transforms, parents, and a kind.

use glam::{Mat4, Quat, Vec3};
use orrery_assets::{Handle, MeshData, TextureData};

/// Index of a node in its [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Translation, rotation, and scale relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn with_rotation_y(mut self, angle: f32) -> Self {
        self.rotation = Quat::from_rotation_y(angle);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// How a surface responds to light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Color and texture only; lights are ignored.
    Unlit,
    /// Diffuse (Lambert) lighting from the scene's lights.
    Lambert,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub color: [f32; 3],
    pub texture: Option<Handle<TextureData>>,
}

impl Material {
    pub fn unlit(color: [f32; 3]) -> Self {
        Self {
            shading: Shading::Unlit,
            color,
            texture: None,
        }
    }

    pub fn lambert(color: [f32; 3]) -> Self {
        Self {
            shading: Shading::Lambert,
            color,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Option<Handle<TextureData>>) -> Self {
        self.texture = texture;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Transform-only node; children inherit its transform.
    Group,
    Mesh {
        mesh: Handle<MeshData>,
        material: Material,
    },
    /// One mesh and material drawn once per instance transform.
    InstancedMesh {
        mesh: Handle<MeshData>,
        material: Material,
        instances: Vec<Transform>,
    },
    AmbientLight {
        color: [f32; 3],
    },
    /// Parallel light shining from the node's position toward the origin.
    DirectionalLight {
        color: [f32; 3],
        intensity: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub visible: bool,
}

/// One mesh-drawing node flattened to world space.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub mesh: Handle<MeshData>,
    pub material: Material,
    /// World matrices, one per instance.
    pub transforms: Vec<Mat4>,
}

/// Combined scene lighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: [f32; 3],
    /// Unit vector pointing from the surface toward the light.
    pub direction: Vec3,
    /// Light color premultiplied by intensity.
    pub color: [f32; 3],
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: [0.0; 3],
            direction: Vec3::Y,
            color: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. `parent` must already be in this graph.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> NodeId {
        debug_assert!(parent.is_none_or(|p| p.0 < self.nodes.len()));
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            transform,
            parent,
            kind,
            visible: true,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.name == name).map(|(id, _)| id)
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(id, _)| id)
    }

    /// Local-to-world matrix, composed through every ancestor.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c.0)) {
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    fn effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c.0)) {
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Every visible mesh node with its world transforms.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        for (id, node) in self.iter() {
            if !self.effectively_visible(id) {
                continue;
            }
            match &node.kind {
                NodeKind::Mesh { mesh, material } => items.push(DrawItem {
                    node: id,
                    mesh: *mesh,
                    material: *material,
                    transforms: vec![self.world_matrix(id)],
                }),
                NodeKind::InstancedMesh {
                    mesh,
                    material,
                    instances,
                } if !instances.is_empty() => {
                    let world = self.world_matrix(id);
                    items.push(DrawItem {
                        node: id,
                        mesh: *mesh,
                        material: *material,
                        transforms: instances.iter().map(|t| world * t.matrix()).collect(),
                    });
                }
                _ => {}
            }
        }
        items
    }

    /// Sum of ambient lights plus the first directional light.
    pub fn lighting(&self) -> Lighting {
        let mut lighting = Lighting::default();
        let mut has_directional = false;
        for (id, node) in self.iter() {
            match node.kind {
                NodeKind::AmbientLight { color } => {
                    for (acc, c) in lighting.ambient.iter_mut().zip(color) {
                        *acc += c;
                    }
                }
                NodeKind::DirectionalLight { color, intensity } if !has_directional => {
                    let position = self.world_matrix(id).w_axis.truncate();
                    lighting.direction = position.try_normalize().unwrap_or(Vec3::Y);
                    lighting.color = color.map(|c| c * intensity);
                    has_directional = true;
                }
                _ => {}
            }
        }
        lighting
    }
}
