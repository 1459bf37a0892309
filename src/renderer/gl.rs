//! Generated GLES 3.0 bindings plus a few helpers around them.
#![allow(clippy::all, non_upper_case_globals, unused_imports)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

/// Runs a GL call in an unsafe block and, in debug builds, panics with the
/// call site if it raised a GL error.
macro_rules! call {
    ($expr:expr) => {{
        #[allow(unused_unsafe)]
        let result = unsafe { $expr };
        if cfg!(debug_assertions) {
            let error = unsafe { $crate::renderer::gl::GetError() };
            if error != $crate::renderer::gl::NO_ERROR {
                let error_number_stringified;
                let error_name = match error {
                    $crate::renderer::gl::INVALID_ENUM => "INVALID_ENUM",
                    $crate::renderer::gl::INVALID_VALUE => "INVALID_VALUE",
                    $crate::renderer::gl::INVALID_OPERATION => "INVALID_OPERATION",
                    $crate::renderer::gl::OUT_OF_MEMORY => "OUT_OF_MEMORY",
                    $crate::renderer::gl::INVALID_FRAMEBUFFER_OPERATION => {
                        "INVALID_FRAMEBUFFER_OPERATION"
                    }
                    _ => {
                        error_number_stringified = format!("{error}");
                        &error_number_stringified
                    }
                };
                panic!(
                    "OpenGL error {error_name} at {}:{}:{}",
                    file!(),
                    line!(),
                    column!(),
                );
            }
        }
        result
    }};
}
pub(crate) use call;

use std::ffi::CString;

const INFO_LOG_LEN: usize = 4096;

/// Compiles a single shader stage, returning the info log on failure.
pub fn create_shader(shader_type: types::GLenum, source: &str) -> Result<types::GLuint, String> {
    let shader = call!(CreateShader(shader_type));
    let sources = [source.as_bytes().as_ptr() as *const types::GLchar];
    let source_lens = [source.len() as types::GLint];
    call!(ShaderSource(shader, 1, sources.as_ptr(), source_lens.as_ptr()));
    call!(CompileShader(shader));
    let mut compile_status = 0;
    call!(GetShaderiv(shader, COMPILE_STATUS, &mut compile_status));
    if compile_status == FALSE as types::GLint {
        let mut info_log = [0u8; INFO_LOG_LEN];
        let mut length = 0;
        call!(GetShaderInfoLog(
            shader,
            INFO_LOG_LEN as types::GLsizei,
            &mut length,
            info_log.as_mut_ptr() as *mut types::GLchar,
        ));
        call!(DeleteShader(shader));
        return Err(String::from_utf8_lossy(&info_log[..length.max(0) as usize]).into_owned());
    }
    Ok(shader)
}

/// Links the given shaders into a program, returning the info log on
/// failure. The shaders are left for the caller to delete.
pub fn create_program(shaders: &[types::GLuint]) -> Result<types::GLuint, String> {
    let program = call!(CreateProgram());
    for &shader in shaders {
        call!(AttachShader(program, shader));
    }
    call!(LinkProgram(program));
    let mut link_status = 0;
    call!(GetProgramiv(program, LINK_STATUS, &mut link_status));
    if link_status == FALSE as types::GLint {
        let mut info_log = [0u8; INFO_LOG_LEN];
        let mut length = 0;
        call!(GetProgramInfoLog(
            program,
            INFO_LOG_LEN as types::GLsizei,
            &mut length,
            info_log.as_mut_ptr() as *mut types::GLchar,
        ));
        call!(DeleteProgram(program));
        return Err(String::from_utf8_lossy(&info_log[..length.max(0) as usize]).into_owned());
    }
    Ok(program)
}

/// Returns `None` for inactive uniforms and names GL can't take.
pub fn get_uniform_location(program: types::GLuint, name: &str) -> Option<types::GLint> {
    let name = CString::new(name).ok()?;
    let location = call!(GetUniformLocation(program, name.as_ptr()));
    (location != -1).then_some(location)
}

/// Returns `None` for inactive attributes and names GL can't take.
pub fn get_attrib_location(program: types::GLuint, name: &str) -> Option<types::GLuint> {
    let name = CString::new(name).ok()?;
    let location = call!(GetAttribLocation(program, name.as_ptr()));
    (location >= 0).then_some(location as types::GLuint)
}
