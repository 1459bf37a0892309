use std::ffi::c_void;
use std::ptr;

use log::debug;

use crate::error::{CompileError, ConfigurationError};
use crate::renderer::{
    gl, stage_source, AttributeSlot, BufferHandle, BufferTarget, ComponentType, GraphicsContext,
    ProgramHandle, ShaderStage, UniformLocation, UniformValue,
};
use crate::scene::VertexAttribute;

/// [`GraphicsContext`] backed by a current GLES 3.0 (WebGL2) context.
pub struct GlContext {
    vao: gl::types::GLuint,
    width: i32,
    height: i32,
}

impl GlContext {
    /// Loads the GL entry points through `get_proc_address` and sets up the
    /// default state. The GL context must already be current.
    pub fn new<F>(get_proc_address: F, width: i32, height: i32) -> Result<GlContext, ConfigurationError>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(get_proc_address);
        if !gl::Viewport::is_loaded() || !gl::DrawElements::is_loaded() {
            return Err(ConfigurationError::MissingGraphics(
                "could not load GLES 3.0 entry points".to_string(),
            ));
        }
        gl::call!(gl::Viewport(0, 0, width, height));

        // Every buffer binding goes through this one vertex array.
        let mut vao = 0;
        gl::call!(gl::GenVertexArrays(1, &mut vao));
        gl::call!(gl::BindVertexArray(vao));
        debug!("gl context ready at {width}x{height}");

        Ok(GlContext { vao, width, height })
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        gl::call!(gl::Viewport(0, 0, width, height));
    }
}

fn gl_component_type(component_type: ComponentType) -> gl::types::GLenum {
    match component_type {
        ComponentType::Byte => gl::BYTE,
        ComponentType::UnsignedByte => gl::UNSIGNED_BYTE,
        ComponentType::Short => gl::SHORT,
        ComponentType::UnsignedShort => gl::UNSIGNED_SHORT,
        ComponentType::Float => gl::FLOAT,
    }
}

fn compile_stage(source: &str, stage: ShaderStage) -> Result<gl::types::GLuint, CompileError> {
    let shader_type = match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    };
    gl::create_shader(shader_type, &stage_source(source, stage))
        .map_err(|log| CompileError::Shader { stage, log })
}

impl GraphicsContext for GlContext {
    fn viewport_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferHandle {
        let target = match target {
            BufferTarget::Vertex => gl::ARRAY_BUFFER,
            BufferTarget::Index => gl::ELEMENT_ARRAY_BUFFER,
        };
        let mut buffer = 0;
        gl::call!(gl::GenBuffers(1, &mut buffer));
        gl::call!(gl::BindBuffer(target, buffer));
        gl::call!(gl::BufferData(
            target,
            data.len() as isize,
            data.as_ptr() as *const c_void,
            gl::STATIC_DRAW,
        ));
        BufferHandle(buffer)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        gl::call!(gl::DeleteBuffers(1, &buffer.0));
    }

    fn compile_program(&mut self, source: &str) -> Result<ProgramHandle, CompileError> {
        let vertex_shader = compile_stage(source, ShaderStage::Vertex)?;
        let fragment_shader = match compile_stage(source, ShaderStage::Fragment) {
            Ok(shader) => shader,
            Err(err) => {
                gl::call!(gl::DeleteShader(vertex_shader));
                return Err(err);
            }
        };
        let program = gl::create_program(&[vertex_shader, fragment_shader]);
        gl::call!(gl::DeleteShader(vertex_shader));
        gl::call!(gl::DeleteShader(fragment_shader));
        program
            .map(ProgramHandle)
            .map_err(|log| CompileError::Link { log })
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        gl::call!(gl::DeleteProgram(program.0));
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        gl::get_uniform_location(program.0, name).map(UniformLocation)
    }

    fn attribute_location(
        &mut self,
        program: ProgramHandle,
        semantic: &str,
    ) -> Option<AttributeSlot> {
        gl::get_attrib_location(program.0, semantic).map(AttributeSlot)
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        let [r, g, b, a] = clear_color;
        gl::call!(gl::Viewport(0, 0, self.width, self.height));
        gl::call!(gl::ClearColor(r, g, b, a));
        gl::call!(gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT));
        gl::call!(gl::Enable(gl::DEPTH_TEST));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        gl::call!(gl::UseProgram(program.0));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let location = location.0;
        match value {
            UniformValue::Float(v) => gl::call!(gl::Uniform1f(location, *v)),
            UniformValue::Int(v) => gl::call!(gl::Uniform1i(location, *v)),
            UniformValue::Vec2(v) => gl::call!(gl::Uniform2f(location, v.x, v.y)),
            UniformValue::Vec3(v) => gl::call!(gl::Uniform3f(location, v.x, v.y, v.z)),
            UniformValue::Vec4(v) => gl::call!(gl::Uniform4f(location, v.x, v.y, v.z, v.w)),
            UniformValue::Mat4(m) => {
                let columns = m.to_cols_array();
                gl::call!(gl::UniformMatrix4fv(location, 1, gl::FALSE, columns.as_ptr()));
            }
        }
    }

    fn bind_buffers(&mut self, vertices: BufferHandle, indices: BufferHandle) {
        gl::call!(gl::BindBuffer(gl::ARRAY_BUFFER, vertices.0));
        gl::call!(gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, indices.0));
    }

    fn enable_attribute(&mut self, slot: AttributeSlot, attribute: &VertexAttribute, stride: usize) {
        gl::call!(gl::VertexAttribPointer(
            slot.0,
            attribute.components as gl::types::GLint,
            gl_component_type(attribute.component_type),
            if attribute.normalized { gl::TRUE } else { gl::FALSE },
            stride as gl::types::GLsizei,
            attribute.offset as *const c_void,
        ));
        gl::call!(gl::EnableVertexAttribArray(slot.0));
    }

    fn disable_attribute(&mut self, slot: AttributeSlot) {
        gl::call!(gl::DisableVertexAttribArray(slot.0));
    }

    fn draw_indexed(&mut self, index_count: usize) {
        gl::call!(gl::DrawElements(
            gl::TRIANGLES,
            index_count as gl::types::GLsizei,
            gl::UNSIGNED_INT,
            ptr::null(),
        ));
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        gl::call!(gl::DeleteVertexArrays(1, &self.vao));
    }
}
