//! The per-frame loop tying a [`Scene`] to a [`Transport`].

use log::warn;

use crate::error::ConfigurationError;
use crate::exchange::InboundState;
use crate::renderer::GraphicsContext;
use crate::scene::Scene;
use crate::transport::Transport;

/// Runs frames: take in whatever the server answered, render, send the
/// outbound state back.
pub struct Session<G: GraphicsContext, T: Transport> {
    scene: Scene<G>,
    transport: T,
    endpoint: String,
}

impl<G: GraphicsContext, T: Transport> Session<G, T> {
    pub fn new(scene: Scene<G>, transport: T, endpoint: &str) -> Session<G, T> {
        Session {
            scene,
            transport,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn scene(&self) -> &Scene<G> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene<G> {
        &mut self.scene
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Runs one frame.
    ///
    /// Transport problems are logged and skipped: a bad response leaves the
    /// previous inbound state in place. Only a scene that can't render is an
    /// error.
    pub fn frame(&mut self) -> Result<(), ConfigurationError> {
        let mut latest = None;
        while let Some(response) = self.transport.poll() {
            match response.and_then(|body| InboundState::from_json(&body)) {
                Ok(inbound) => latest = Some(inbound),
                Err(err) => warn!("ignoring server response: {err}"),
            }
        }

        // Without news the scene keeps what it already holds.
        let inbound = latest.unwrap_or_else(|| self.scene.inbound().clone());
        let outbound = self.scene.render(inbound)?;

        match outbound.to_json() {
            Ok(body) => self.transport.send(&self.endpoint, body),
            Err(err) => warn!("not sending outbound state: {err}"),
        }
        Ok(())
    }
}
