//! The graphics capability the scene draws through.
//!
//! The scene never talks to OpenGL directly: everything goes through
//! [`GraphicsContext`], which [`GlContext`] implements on top of GLES 3.0.

use std::fmt::{self, Display};

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::CompileError;
use crate::scene::VertexAttribute;

pub mod gl;
mod gl_context;
mod shader;

pub use gl_context::GlContext;
pub use shader::{stage_source, ShaderStage};

/// A buffer object owned by the graphics context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// A linked shader program owned by the graphics context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// A vertex attribute slot of a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttributeSlot(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// The scalar type of each component of a vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Float,
}

impl ComponentType {
    pub fn size_in_bytes(self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::Float => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl Display for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformValue::Float(v) => write!(f, "{v}"),
            UniformValue::Int(v) => write!(f, "{v}"),
            UniformValue::Vec2(v) => write!(f, "{v}"),
            UniformValue::Vec3(v) => write!(f, "{v}"),
            UniformValue::Vec4(v) => write!(f, "{v}"),
            UniformValue::Mat4(v) => write!(f, "{v}"),
        }
    }
}

/// Buffer creation, program setup and draw submission.
///
/// Implementations own every handle they hand out; callers release them
/// with [`GraphicsContext::delete_buffer`] and
/// [`GraphicsContext::delete_program`].
pub trait GraphicsContext {
    /// Drawable size in pixels.
    fn viewport_size(&self) -> (i32, i32);

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferHandle;
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Compiles `source` once per shader stage and links the result.
    fn compile_program(&mut self, source: &str) -> Result<ProgramHandle, CompileError>;
    fn delete_program(&mut self, program: ProgramHandle);

    /// `None` when the program has no active uniform of that name.
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;
    /// `None` when the program has no active attribute with that semantic.
    fn attribute_location(
        &mut self,
        program: ProgramHandle,
        semantic: &str,
    ) -> Option<AttributeSlot>;

    /// Sets the viewport to the drawable size, clears colour and depth and
    /// enables depth testing.
    fn begin_frame(&mut self, clear_color: [f32; 4]);
    fn use_program(&mut self, program: ProgramHandle);
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);
    fn bind_buffers(&mut self, vertices: BufferHandle, indices: BufferHandle);
    fn enable_attribute(&mut self, slot: AttributeSlot, attribute: &VertexAttribute, stride: usize);
    fn disable_attribute(&mut self, slot: AttributeSlot);
    /// Draws `index_count` `u32` indices from the bound index buffer as
    /// triangles.
    fn draw_indexed(&mut self, index_count: usize);
}
