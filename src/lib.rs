//! A small retained-mode scene graph for a WebGL2 / GLES 3.0 context that
//! trades keyboard state for server state once per frame.

pub mod config;
#[cfg(target_family = "wasm")]
pub mod emscripten_h;
pub mod error;
pub mod exchange;
pub mod input;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod transport;

pub use error::{CompileError, ConfigurationError, DataModelError, SceneError, TransportError};
pub use exchange::{InboundState, OutboundState};
pub use scene::{Geometry, Node, NodeId, NodeKind, Optics, Scene, VertexAttribute};
pub use session::Session;
