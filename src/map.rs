use std::time::Duration;

use crate::wire::{MapResponse, OpCode};

/// Transport protocol of a mapping
///
/// Only TCP mappings are ever requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
}

impl Protocol {
    pub(crate) const fn opcode(self) -> OpCode {
        match self {
            Protocol::Tcp => OpCode::MapTcp,
        }
    }
}

/// A port mapping granted by the gateway
///
/// Every successful request produces a fresh `Mapping`, which replaces the
/// previous one entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mapping {
    pub internal_port: u16,
    pub external_port: u16,
    pub protocol: Protocol,
    /// How long the gateway keeps the mapping alive, as granted by it
    pub lifetime: Duration,
}

impl Mapping {
    pub(crate) fn from_response(response: &MapResponse, protocol: Protocol) -> Self {
        Self {
            internal_port: response.internal_port,
            external_port: response.mapped_external_port,
            protocol,
            lifetime: Duration::from_secs(response.lifetime.into()),
        }
    }
}
