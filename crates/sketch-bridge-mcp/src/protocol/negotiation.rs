//! Handshake state for the single client on the other end of the transport.

use crate::types::{Implementation, InitializeParams, InitializeResult, MCP_VERSION};

#[derive(Debug, Clone, Default)]
pub enum Handshake {
    /// No `initialize` yet.
    #[default]
    Pending,
    /// `initialize` answered, waiting for `initialized`.
    Negotiated(Implementation),
    Ready(Implementation),
}

impl Handshake {
    /// Answer `initialize`. The server only speaks one protocol version, so a
    /// mismatch is logged and the client decides whether to continue.
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client asked for protocol {}, answering with {MCP_VERSION}",
                params.protocol_version
            );
        }
        tracing::info!(
            "Client connected: {} v{}",
            params.client_info.name,
            params.client_info.version
        );
        *self = Handshake::Negotiated(params.client_info);
        InitializeResult::default_result()
    }

    pub fn mark_initialized(&mut self) {
        match std::mem::take(self) {
            Handshake::Negotiated(client) | Handshake::Ready(client) => {
                tracing::info!("MCP handshake complete with {}", client.name);
                *self = Handshake::Ready(client);
            }
            Handshake::Pending => tracing::warn!("Got `initialized` before `initialize`"),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Handshake::Ready(_))
    }
}
