#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use glam::{Mat4, Vec3};
use wibble::error::{CompileError, TransportError};
use wibble::renderer::{
    AttributeSlot, BufferHandle, BufferTarget, GraphicsContext, ProgramHandle, ShaderStage,
    UniformLocation, UniformValue,
};
use wibble::scene::{GeometryBuffer, Material, VertexAttribute};
use wibble::transport::Transport;
use wibble::{Geometry, Scene};

/// Everything a [`RecordingContext`] was asked to do, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateBuffer(BufferTarget, usize),
    DeleteBuffer(BufferHandle),
    CompileProgram,
    DeleteProgram(ProgramHandle),
    BeginFrame([f32; 4]),
    UseProgram(ProgramHandle),
    SetUniform(UniformLocation, UniformValue),
    BindBuffers(BufferHandle, BufferHandle),
    EnableAttribute(AttributeSlot, String, usize),
    DisableAttribute(AttributeSlot),
    DrawIndexed(usize),
}

/// Headless graphics context that records calls instead of drawing.
///
/// Uniform names map to locations by their order of first lookup, attribute
/// semantics by the `attributes` table.
pub struct RecordingContext {
    pub calls: Vec<Call>,
    pub size: (i32, i32),
    pub fail_compile: bool,
    pub attributes: HashMap<String, AttributeSlot>,
    /// Delete calls, shared so they can be inspected after the owning scene
    /// is gone.
    pub released: Rc<RefCell<Vec<Call>>>,
    uniforms: HashMap<String, UniformLocation>,
    next_handle: u32,
}

impl RecordingContext {
    pub fn new() -> RecordingContext {
        let attributes = [("POSITION", 0), ("NORMAL", 1), ("COLOR", 2)]
            .into_iter()
            .map(|(name, slot)| (name.to_string(), AttributeSlot(slot)))
            .collect();
        RecordingContext {
            calls: Vec::new(),
            size: (800, 400),
            fail_compile: false,
            attributes,
            released: Rc::new(RefCell::new(Vec::new())),
            uniforms: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn location_of(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::DrawIndexed(_)))
            .count()
    }

    /// Matrices uploaded to the named uniform, in order.
    pub fn matrices_for(&self, name: &str) -> Vec<Mat4> {
        let Some(location) = self.location_of(name) else {
            return Vec::new();
        };
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetUniform(l, UniformValue::Mat4(m)) if *l == location => Some(*m),
                _ => None,
            })
            .collect()
    }

    fn handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl GraphicsContext for RecordingContext {
    fn viewport_size(&self) -> (i32, i32) {
        self.size
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferHandle {
        self.calls.push(Call::CreateBuffer(target, data.len()));
        BufferHandle(self.handle())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(Call::DeleteBuffer(buffer));
        self.released.borrow_mut().push(Call::DeleteBuffer(buffer));
    }

    fn compile_program(&mut self, source: &str) -> Result<ProgramHandle, CompileError> {
        self.calls.push(Call::CompileProgram);
        if self.fail_compile {
            return Err(CompileError::Shader {
                stage: ShaderStage::Vertex,
                log: format!("0:1: syntax error in {} bytes", source.len()),
            });
        }
        Ok(ProgramHandle(self.handle()))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::DeleteProgram(program));
        self.released.borrow_mut().push(Call::DeleteProgram(program));
    }

    fn uniform_location(&mut self, _program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if name.starts_with("unused") {
            return None;
        }
        let next = UniformLocation(self.uniforms.len() as i32);
        Some(*self.uniforms.entry(name.to_string()).or_insert(next))
    }

    fn attribute_location(
        &mut self,
        _program: ProgramHandle,
        semantic: &str,
    ) -> Option<AttributeSlot> {
        self.attributes.get(semantic).copied()
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        self.calls.push(Call::BeginFrame(clear_color));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        self.calls.push(Call::SetUniform(location, *value));
    }

    fn bind_buffers(&mut self, vertices: BufferHandle, indices: BufferHandle) {
        self.calls.push(Call::BindBuffers(vertices, indices));
    }

    fn enable_attribute(&mut self, slot: AttributeSlot, attribute: &VertexAttribute, stride: usize) {
        self.calls
            .push(Call::EnableAttribute(slot, attribute.semantic.clone(), stride));
    }

    fn disable_attribute(&mut self, slot: AttributeSlot) {
        self.calls.push(Call::DisableAttribute(slot));
    }

    fn draw_indexed(&mut self, index_count: usize) {
        self.calls.push(Call::DrawIndexed(index_count));
    }
}

/// Transport fed from a queue of canned responses.
#[derive(Default)]
pub struct ScriptedTransport {
    pub sent: Vec<(String, String)>,
    pub responses: VecDeque<Result<String, TransportError>>,
}

impl Transport for ScriptedTransport {
    fn send(&mut self, path: &str, body: String) {
        self.sent.push((path.to_string(), body));
    }

    fn poll(&mut self) -> Option<Result<String, TransportError>> {
        self.responses.pop_front()
    }
}

#[rustfmt::skip]
pub fn triangle_vertices() -> Vec<f32> {
    vec![
        -1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0,
        -1.0,  1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0,
         1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0,
    ]
}

pub fn triangle(scene: &mut Scene<RecordingContext>) -> Rc<GeometryBuffer> {
    let geometry = Geometry::position_normal_color(triangle_vertices(), vec![0, 1, 2]).unwrap();
    scene.create_geometry(geometry)
}

pub fn material(scene: &mut Scene<RecordingContext>) -> Rc<Material> {
    scene
        .create_material("void main() {}", HashMap::new())
        .unwrap()
}

pub fn assert_point_eq(actual: Vec3, expected: Vec3) {
    approx::assert_relative_eq!(actual.x, expected.x, epsilon = 1e-5);
    approx::assert_relative_eq!(actual.y, expected.y, epsilon = 1e-5);
    approx::assert_relative_eq!(actual.z, expected.z, epsilon = 1e-5);
}
