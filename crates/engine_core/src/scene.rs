//! Renderable scene graph. Node kinds are fixed at construction, so traversal matches on the
//! enum instead of probing node types at runtime.

use crate::color::Color;
use crate::material::Material;
use crate::transform::Transform;
use glam::Vec3;
use serde::Serialize;

/// Geometry description. Dimensions are in world units before the node's scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    /// XY-plane quad facing +Z.
    Plane { width: f32, height: f32 },
    Box { width: f32, height: f32, depth: f32 },
    /// Y-aligned, centered on the node origin.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    /// Mesh owned by an externally loaded model.
    External { source: String, mesh: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Light {
    Ambient { color: Color },
    Point { color: Color, intensity: f32, range: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshNode {
    pub name: String,
    pub transform: Transform,
    pub primitive: Primitive,
    pub material: Material,
}

impl MeshNode {
    pub fn new(name: impl Into<String>, primitive: Primitive, material: Material) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            primitive,
            material,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightNode {
    pub name: String,
    pub transform: Transform,
    pub light: Light,
}

impl LightNode {
    pub fn new(name: impl Into<String>, light: Light) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            light,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct GroupNode {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<SceneNode>,
}

impl GroupNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: impl Into<SceneNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn push(&mut self, child: impl Into<SceneNode>) {
        self.children.push(child.into());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SceneNode {
    Group(GroupNode),
    Mesh(MeshNode),
    Light(LightNode),
}

impl From<GroupNode> for SceneNode {
    fn from(node: GroupNode) -> Self {
        Self::Group(node)
    }
}

impl From<MeshNode> for SceneNode {
    fn from(node: MeshNode) -> Self {
        Self::Mesh(node)
    }
}

impl From<LightNode> for SceneNode {
    fn from(node: LightNode) -> Self {
        Self::Light(node)
    }
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Group(g) => &g.name,
            Self::Mesh(m) => &m.name,
            Self::Light(l) => &l.name,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            Self::Group(g) => &g.transform,
            Self::Mesh(m) => &m.transform,
            Self::Light(l) => &l.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Self::Group(g) => &mut g.transform,
            Self::Mesh(m) => &mut m.transform,
            Self::Light(l) => &mut l.transform,
        }
    }

    pub fn children(&self) -> &[SceneNode] {
        match self {
            Self::Group(g) => &g.children,
            _ => &[],
        }
    }

    /// Depth-first, parents before children.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a SceneNode)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Apply `f` to every mesh in this subtree.
    pub fn for_each_mesh_mut(&mut self, f: &mut impl FnMut(&mut MeshNode)) {
        match self {
            Self::Mesh(mesh) => f(mesh),
            Self::Group(group) => {
                for child in &mut group.children {
                    child.for_each_mesh_mut(f);
                }
            }
            Self::Light(_) => {}
        }
    }
}

/// Exponential-squared distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fog {
    pub color: Color,
    pub density: f32,
}

/// Node counts, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub groups: usize,
    pub meshes: usize,
    pub lights: usize,
}

/// Root of everything the render backend draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneGraph {
    pub background: Color,
    pub fog: Option<Fog>,
    pub nodes: Vec<SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            fog: None,
            nodes: Vec::new(),
        }
    }
}

impl SceneGraph {
    pub fn new(background: Color, fog: Option<Fog>) -> Self {
        Self {
            background,
            fog,
            nodes: Vec::new(),
        }
    }

    pub fn add(&mut self, node: impl Into<SceneNode>) {
        self.nodes.push(node.into());
    }

    pub fn extend<I, N>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<SceneNode>,
    {
        self.nodes.extend(nodes.into_iter().map(Into::into));
    }

    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats::default();
        for node in &self.nodes {
            node.visit(&mut |n| match n {
                SceneNode::Group(_) => stats.groups += 1,
                SceneNode::Mesh(_) => stats.meshes += 1,
                SceneNode::Light(_) => stats.lights += 1,
            });
        }
        stats
    }
}
