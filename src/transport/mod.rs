//! Fire-and-forget exchange with the game server.
//!
//! One request goes out per frame; responses are collected without blocking
//! and picked up by the next frame.

use crate::error::TransportError;

#[cfg(not(target_family = "wasm"))]
mod http;
#[cfg(target_family = "wasm")]
mod fetch;

#[cfg(not(target_family = "wasm"))]
pub use http::HttpTransport as PlatformTransport;
#[cfg(target_family = "wasm")]
pub use fetch::FetchTransport as PlatformTransport;

pub trait Transport {
    /// Dispatches a PUT of `body` to `path` and returns immediately.
    fn send(&mut self, path: &str, body: String);

    /// Returns the next response that has arrived, if any.
    fn poll(&mut self) -> Option<Result<String, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, path: &str, body: String) {
        (**self).send(path, body);
    }

    fn poll(&mut self) -> Option<Result<String, TransportError>> {
        (**self).poll()
    }
}
