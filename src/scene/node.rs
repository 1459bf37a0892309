use std::rc::Rc;

use glam::{Mat3, Mat4, Vec3};

use crate::error::ConfigurationError;
use crate::scene::{GeometryBuffer, Material};

slotmap::new_key_type! {
    /// Handle to a node in a [`Scene`](crate::scene::Scene). Stays invalid
    /// once the node is removed, even if the slot is reused.
    pub struct NodeId;
}

/// Camera projection parameters. Only built through [`Optics::new`], so
/// `0 < znear < zfar` always holds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Optics {
    yfov: f32,
    znear: f32,
    zfar: f32,
}

impl Optics {
    pub fn new(yfov: f32, znear: f32, zfar: f32) -> Result<Optics, ConfigurationError> {
        if !(znear > 0.0 && znear < zfar) {
            return Err(ConfigurationError::InvalidOptics { znear, zfar });
        }
        Ok(Optics { yfov, znear, zfar })
    }

    /// Vertical field of view in degrees.
    pub fn yfov(&self) -> f32 {
        self.yfov
    }

    pub fn znear(&self) -> f32 {
        self.znear
    }

    pub fn zfar(&self) -> f32 {
        self.zfar
    }

    /// Camera-to-clip matrix for the given viewport aspect ratio.
    pub fn perspective(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.yfov.to_radians(), aspect, self.znear, self.zfar)
    }
}

#[derive(Clone, Debug)]
pub struct Drawable {
    pub components: Vec<Rc<GeometryBuffer>>,
    pub material: Rc<Material>,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Only groups and positions its children.
    Transform,
    Camera(Optics),
    Drawable(Drawable),
}

/// A node in the scene hierarchy.
///
/// The transform maps node-local coordinates into the parent's space, with
/// column vectors: `parent_point = node_to_parent * local_point`.
#[derive(Clone, Debug)]
pub struct Node {
    node_to_parent: Mat4,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Node {
        Node {
            node_to_parent: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub fn transform() -> Node {
        Node::new(NodeKind::Transform)
    }

    pub fn camera(optics: Optics) -> Node {
        Node::new(NodeKind::Camera(optics))
    }

    pub fn drawable(components: Vec<Rc<GeometryBuffer>>, material: Rc<Material>) -> Node {
        Node::new(NodeKind::Drawable(Drawable {
            components,
            material,
        }))
    }

    /// Builder form of [`Node::translate`].
    pub fn translated(mut self, value: Vec3) -> Node {
        self.translate(value);
        self
    }

    /// Translates in the node's own space: `local = local * T(value)`.
    pub fn translate(&mut self, value: Vec3) -> &mut Node {
        self.node_to_parent *= Mat4::from_translation(value);
        self
    }

    /// Rotates by `angle` radians around `axis` in the node's own space.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) -> &mut Node {
        self.node_to_parent *= Mat4::from_axis_angle(axis.normalize(), angle);
        self
    }

    pub fn identity(&mut self) -> &mut Node {
        self.node_to_parent = Mat4::IDENTITY;
        self
    }

    pub fn set_mat4(&mut self, value: Mat4) -> &mut Node {
        self.node_to_parent = value;
        self
    }

    /// Replaces the transform with `value`, dropping any translation.
    pub fn set_mat3(&mut self, value: Mat3) -> &mut Node {
        self.node_to_parent = Mat4::from_mat3(value);
        self
    }

    pub fn node_to_parent(&self) -> Mat4 {
        self.node_to_parent
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn optics(&self) -> Option<&Optics> {
        match &self.kind {
            NodeKind::Camera(optics) => Some(optics),
            _ => None,
        }
    }

    pub fn drawable_payload(&self) -> Option<&Drawable> {
        match &self.kind {
            NodeKind::Drawable(drawable) => Some(drawable),
            _ => None,
        }
    }
}
