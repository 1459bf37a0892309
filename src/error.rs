//! Error types shared across the scene, renderer and transport.

use crate::renderer::ShaderStage;
use crate::scene::NodeId;

/// The scene or graphics capability is not set up well enough to render.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("no active camera is set")]
    NoActiveCamera,
    #[error("active camera {0:?} is not part of the scene")]
    CameraNotInScene(NodeId),
    #[error("node {0:?} is not a camera")]
    NotACamera(NodeId),
    #[error("camera optics need 0 < znear < zfar, got znear={znear} zfar={zfar}")]
    InvalidOptics { znear: f32, zfar: f32 },
    #[error("graphics capability is missing: {0}")]
    MissingGraphics(String),
}

/// Shader compilation or program linking failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("compiling {stage} shader failed: {log}")]
    Shader { stage: ShaderStage, log: String },
    #[error("linking shader program failed: {log}")]
    Link { log: String },
}

/// Malformed geometry, rejected when the geometry is constructed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataModelError {
    #[error("vertex stride must be greater than zero")]
    ZeroStride,
    #[error("attribute \"{semantic}\" has {components} components, expected 1 to 4")]
    InvalidComponentCount { semantic: String, components: u8 },
    #[error("attribute \"{semantic}\" ends at byte {end}, past the stride of {stride} bytes")]
    AttributeExceedsStride {
        semantic: String,
        end: usize,
        stride: usize,
    },
    #[error("attribute \"{semantic}\" at offset {offset} runs past the end of addressable memory")]
    AttributeOffsetOverflow { semantic: String, offset: usize },
    #[error("vertex data is {bytes} bytes, which is not a multiple of the {stride} byte stride")]
    VertexDataMisaligned { bytes: usize, stride: usize },
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// A failed or malformed exchange with the server. Never fatal to the
/// frame loop.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("could not serialize outbound state: {0}")]
    Serialize(String),
}

/// Errors from editing the node graph.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("adding {child:?} under {parent:?} would make a node its own ancestor")]
    Cycle { parent: NodeId, child: NodeId },
}
