//! The retained scene: a node table, the active camera, and per-frame
//! rendering through a [`GraphicsContext`].

use std::collections::HashMap;
use std::rc::Rc;

use glam::Mat4;
use log::{debug, trace, warn};
use slotmap::SlotMap;

use crate::error::{CompileError, ConfigurationError, SceneError};
use crate::exchange::{InboundState, OutboundState};
use crate::renderer::{BufferHandle, BufferTarget, GraphicsContext, ProgramHandle, UniformValue};

mod geometry;
mod material;
mod node;

pub use geometry::{Geometry, GeometryBuffer, VertexAttribute};
pub use material::{Material, MaterialUniform, MODEL_TO_CAMERA, MODEL_TO_PERSPECTIVE};
pub use node::{Drawable, Node, NodeId, NodeKind, Optics};

const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

/// Owns the node graph and every graphics resource created through it.
///
/// Nodes live in a table and refer to their parent by [`NodeId`], so the
/// parent link never owns anything. Top-level nodes are also registered
/// under a name, in insertion order, which is the order they render in.
pub struct Scene<G: GraphicsContext> {
    context: G,
    nodes: SlotMap<NodeId, Node>,
    named: Vec<(String, NodeId)>,
    active_camera: Option<NodeId>,
    from_server: InboundState,
    to_server: OutboundState,
    clear_color: [f32; 4],
    buffers: Vec<BufferHandle>,
    programs: Vec<ProgramHandle>,
}

impl<G: GraphicsContext> Scene<G> {
    pub fn new(context: G) -> Scene<G> {
        Scene {
            context,
            nodes: SlotMap::with_key(),
            named: Vec::new(),
            active_camera: None,
            from_server: InboundState::default(),
            to_server: OutboundState::default(),
            clear_color: DEFAULT_CLEAR_COLOR,
            buffers: Vec::new(),
            programs: Vec::new(),
        }
    }

    pub fn context(&self) -> &G {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut G {
        &mut self.context
    }

    pub fn set_clear_color(&mut self, clear_color: [f32; 4]) {
        self.clear_color = clear_color;
    }

    /// Uploads validated geometry. The buffers are released with the scene.
    pub fn create_geometry(&mut self, geometry: Geometry) -> Rc<GeometryBuffer> {
        let vertex_buffer = self
            .context
            .create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(geometry.vertices()));
        let index_buffer = self
            .context
            .create_buffer(BufferTarget::Index, bytemuck::cast_slice(geometry.indices()));
        self.buffers.push(vertex_buffer);
        self.buffers.push(index_buffer);
        debug!(
            "uploaded geometry: {} vertices, {} indices, stride {}",
            geometry.vertex_count(),
            geometry.indices().len(),
            geometry.stride(),
        );
        Rc::new(GeometryBuffer {
            geometry,
            vertex_buffer,
            index_buffer,
        })
    }

    /// Compiles `shader_source` and resolves the uniform locations the
    /// material needs. The program is released with the scene.
    pub fn create_material(
        &mut self,
        shader_source: &str,
        uniforms: HashMap<String, UniformValue>,
    ) -> Result<Rc<Material>, CompileError> {
        let program = self.context.compile_program(shader_source)?;
        self.programs.push(program);

        let model_to_camera = self.context.uniform_location(program, MODEL_TO_CAMERA);
        let model_to_perspective = self.context.uniform_location(program, MODEL_TO_PERSPECTIVE);
        let mut uniforms = uniforms
            .into_iter()
            .map(|(name, value)| {
                let location = self.context.uniform_location(program, &name);
                if location.is_none() {
                    debug!("material uniform \"{name}\" = {value} is not used by {program:?}");
                }
                MaterialUniform {
                    name,
                    value,
                    location,
                }
            })
            .collect::<Vec<_>>();
        uniforms.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("compiled material program {program:?}");

        Ok(Rc::new(Material {
            program,
            model_to_camera,
            model_to_perspective,
            uniforms,
        }))
    }

    /// Adds a detached node that isn't registered under a name. It only
    /// renders once it is attached below a named node.
    pub fn create(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Adds a top-level node under `name`. A node previously registered under
    /// the same name is removed together with its subtree.
    pub fn insert(&mut self, name: &str, node: Node) -> NodeId {
        if let Some(previous) = self.get(name) {
            debug!("replacing node \"{name}\"");
            self.remove(previous);
        }
        let id = self.create(node);
        self.named.push((name.to_string(), id));
        id
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, id)| id)
    }

    /// Named top-level nodes in insertion order.
    pub fn names(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.named.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attaches `child` below `parent`, moving it away from its previous
    /// parent if it had one.
    ///
    /// Fails if `child` is `parent` or one of its ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(SceneError::UnknownNode(child));
        }
        if self.ancestors(parent).any(|id| id == child) {
            return Err(SceneError::Cycle { parent, child });
        }

        self.detach(child)?;
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Cuts `node` loose from its parent. Roots are left as they are.
    pub fn detach(&mut self, node: NodeId) -> Result<(), SceneError> {
        let parent = self
            .nodes
            .get_mut(node)
            .ok_or(SceneError::UnknownNode(node))?
            .parent
            .take();
        if let Some(parent) = parent {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|&c| c != node);
            }
        }
        Ok(())
    }

    /// Detaches `node` and destroys it along with all of its descendants.
    ///
    /// Graphics resources stay alive until the scene is dropped, since other
    /// drawables may share them.
    pub fn remove(&mut self, node: NodeId) -> Option<Node> {
        self.detach(node).ok()?;
        let mut pending = vec![node];
        let mut removed = None;
        while let Some(id) = pending.pop() {
            let Some(current) = self.nodes.remove(id) else {
                continue;
            };
            pending.extend_from_slice(&current.children);
            self.named.retain(|&(_, named)| named != id);
            if self.active_camera == Some(id) {
                warn!("removed the active camera");
                self.active_camera = None;
            }
            if id == node {
                removed = Some(current);
            }
        }
        removed
    }

    /// Walks the parent links upwards, starting at `node` itself.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(
            self.nodes.contains_key(node).then_some(node),
            move |&id| self.nodes.get(id).and_then(|n| n.parent),
        )
    }

    /// Node-to-world matrix: `root * ... * parent * node`, recomputed on
    /// every call.
    pub fn world_transform(&self, node: NodeId) -> Option<Mat4> {
        let local = self.nodes.get(node)?.node_to_parent();
        let world = self
            .ancestors(node)
            .skip(1)
            .fold(local, |world, ancestor| {
                self.nodes[ancestor].node_to_parent() * world
            });
        Some(world)
    }

    /// Makes `camera` the camera [`Scene::render`] looks through.
    pub fn set_active_camera(&mut self, camera: NodeId) -> Result<(), ConfigurationError> {
        let node = self
            .nodes
            .get(camera)
            .ok_or(ConfigurationError::CameraNotInScene(camera))?;
        if node.optics().is_none() {
            return Err(ConfigurationError::NotACamera(camera));
        }
        self.active_camera = Some(camera);
        Ok(())
    }

    pub fn active_camera(&self) -> Option<NodeId> {
        self.active_camera
    }

    /// Last state received from the server.
    pub fn inbound(&self) -> &InboundState {
        &self.from_server
    }

    /// Keys currently held, to be sent to the server.
    pub fn outbound(&self) -> &OutboundState {
        &self.to_server
    }

    pub fn key_down(&mut self, code: u32) {
        self.to_server.key_down(code);
    }

    pub fn key_up(&mut self, code: u32) {
        self.to_server.key_up(code);
    }

    pub fn clear_outbound(&mut self) {
        self.to_server.clear();
    }

    /// Camera validation happens before anything touches the context.
    fn camera_matrices(&self) -> Result<(Mat4, Optics), ConfigurationError> {
        let camera = self.active_camera.ok_or(ConfigurationError::NoActiveCamera)?;
        let node = self
            .nodes
            .get(camera)
            .ok_or(ConfigurationError::CameraNotInScene(camera))?;
        let optics = *node
            .optics()
            .ok_or(ConfigurationError::NotACamera(camera))?;
        let camera_to_world = self
            .world_transform(camera)
            .ok_or(ConfigurationError::CameraNotInScene(camera))?;
        Ok((camera_to_world.inverse(), optics))
    }

    /// Every node reachable from the named roots, depth first, parents
    /// before children.
    fn render_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        for &(_, root) in &self.named {
            if self.nodes.get(root).map_or(true, |n| n.parent.is_some()) {
                continue;
            }
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                order.push(id);
                stack.extend(self.nodes[id].children.iter().rev());
            }
        }
        order
    }

    /// Draws one frame and returns the state to send to the server.
    ///
    /// `inbound` is stored as the latest server state. The returned keys
    /// keep accumulating across frames until the matching key-up.
    pub fn render(&mut self, inbound: InboundState) -> Result<OutboundState, ConfigurationError> {
        self.from_server = inbound;

        let (world_to_camera, optics) = self.camera_matrices()?;
        let (width, height) = self.context.viewport_size();
        let aspect = if height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        let camera_to_perspective = optics.perspective(aspect);

        self.context.begin_frame(self.clear_color);

        for id in self.render_order() {
            let Some(drawable) = self.nodes[id].drawable_payload() else {
                continue;
            };
            let Some(model_to_world) = self.world_transform(id) else {
                continue;
            };
            let model_to_camera = world_to_camera * model_to_world;
            let model_to_perspective = camera_to_perspective * model_to_camera;
            draw_node(
                &mut self.context,
                drawable,
                model_to_camera,
                model_to_perspective,
            );
        }

        Ok(self.to_server.clone())
    }
}

fn draw_node<G: GraphicsContext>(
    context: &mut G,
    drawable: &Drawable,
    model_to_camera: Mat4,
    model_to_perspective: Mat4,
) {
    let material = &drawable.material;
    let program = material.program;
    context.use_program(program);
    if let Some(location) = material.model_to_camera {
        context.set_uniform(location, &UniformValue::Mat4(model_to_camera));
    }
    if let Some(location) = material.model_to_perspective {
        context.set_uniform(location, &UniformValue::Mat4(model_to_perspective));
    }
    for uniform in &material.uniforms {
        if let Some(location) = uniform.location {
            context.set_uniform(location, &uniform.value);
        }
    }

    for component in &drawable.components {
        let geometry = &component.geometry;
        context.bind_buffers(component.vertex_buffer, component.index_buffer);

        let mut enabled = Vec::with_capacity(geometry.attributes().len());
        for attribute in geometry.attributes() {
            let Some(slot) = context.attribute_location(program, &attribute.semantic) else {
                trace!("{program:?} has no attribute \"{}\"", attribute.semantic);
                continue;
            };
            context.enable_attribute(slot, attribute, geometry.stride());
            enabled.push(slot);
        }

        context.draw_indexed(geometry.indices().len());

        for slot in enabled {
            context.disable_attribute(slot);
        }
    }
}

impl<G: GraphicsContext> Drop for Scene<G> {
    fn drop(&mut self) {
        debug!(
            "releasing {} buffers and {} programs",
            self.buffers.len(),
            self.programs.len()
        );
        for buffer in self.buffers.drain(..) {
            self.context.delete_buffer(buffer);
        }
        for program in self.programs.drain(..) {
            self.context.delete_program(program);
        }
    }
}
