use crate::renderer::{ProgramHandle, UniformLocation, UniformValue};

/// Name of the model-to-camera matrix uniform the scene fills in per node.
pub const MODEL_TO_CAMERA: &str = "model_to_camera";
/// Name of the model-to-clip matrix uniform the scene fills in per node.
pub const MODEL_TO_PERSPECTIVE: &str = "model_to_perspective";

/// A compiled program and the uniform values to draw it with.
///
/// Shared between drawables through `Rc`; the program itself belongs to the
/// scene that compiled it.
#[derive(Debug)]
pub struct Material {
    pub(crate) program: ProgramHandle,
    pub(crate) model_to_camera: Option<UniformLocation>,
    pub(crate) model_to_perspective: Option<UniformLocation>,
    pub(crate) uniforms: Vec<MaterialUniform>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialUniform {
    pub name: String,
    pub value: UniformValue,
    /// `None` if the program doesn't use this uniform.
    pub location: Option<UniformLocation>,
}

impl Material {
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn uniforms(&self) -> &[MaterialUniform] {
        &self.uniforms
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms
            .iter()
            .find(|uniform| uniform.name == name)
            .map(|uniform| &uniform.value)
    }
}
