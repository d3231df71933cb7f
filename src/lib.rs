//! Keeps a TCP port mapping alive on a NAT-PMP (RFC 6886) gateway and tells
//! Deluge which external port to listen on.
//!
//! The [`Renewer`] asks the gateway for a mapping with a [`Client`], then hands
//! the external port to a [`PortSink`], such as [`DelugeSink`], which only
//! talks to Deluge when the port actually changed.

pub mod config;
pub mod rpc;
pub mod schedule;
pub mod sink;
pub mod wire;

mod client;
mod error;
mod map;
mod renew;
mod sampler;

pub use client::{Client, Gateway, ProtocolError, DEFAULT_LIFETIME};
pub use config::Args;
pub use error::Error;
pub use map::{Mapping, Protocol};
pub use renew::{Iteration, Renewer};
pub use rpc::{HttpTransport, RpcError, Transport};
pub use schedule::Schedule;
pub use sink::{DelugeSink, PortSink, SinkState};
