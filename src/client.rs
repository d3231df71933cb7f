//! The `Client` is the part of the system that talks NAT-PMP to the gateway.
//!
//! # Requesting a mapping
//!
//! Every call to [`Gateway::request_mapping`] opens a new session: a UDP
//! socket bound to any local port and connected to the gateway, whose
//! exchanges are all bounded by the same deadline. A session performs two
//! exchanges:
//! - the _external address_ request, which proves the gateway is up and
//!   has an address on the outside network;
//! - the _map_ request for a TCP port, with internal port and suggested
//!   external port both set to `0`, so the gateway picks the port.
//!
//! If the first exchange fails the second is never attempted. No request is
//! ever retransmitted: retrying is left entirely to the caller.
//!
//! # The Epoch
//!
//! Every response carries the time elapsed since the gateway mapping table
//! was initialized. The `Client` remembers the last value it saw and warns
//! when the gateway appears to have lost its state. Nothing else needs to
//! happen in that case, the next map request recreates the mapping.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::error::Error;
use crate::map::{Mapping, Protocol};
use crate::wire::{
    self, Epoch, ExternalAddressRequest, ExternalAddressResponse, MapRequest, MapResponse,
    ResponseHeader, ResultCode, MAX_PACKET_SIZE, SERVER_PORT,
};

/// Lifetime requested for every mapping, in seconds
pub const DEFAULT_LIFETIME: u32 = 360;

/// Reasons a single NAT-PMP exchange can fail
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("network I/O error")]
    Network(#[from] io::Error),
    #[error("timed out waiting for the gateway")]
    Timeout,
    #[error("malformed response")]
    Malformed(#[from] wire::Error),
    #[error("gateway refused the request: {0}")]
    Rejected(ResultCode),
}

/// Something that can hand out port mappings
#[async_trait]
pub trait Gateway: Send {
    /// Requests a mapping, giving up once `deadline` is reached
    ///
    /// Without a deadline the request waits for the gateway indefinitely.
    async fn request_mapping(&mut self, deadline: Option<Instant>) -> Result<Mapping, Error>;
}

/// A NAT-PMP client for a single gateway
///
/// # Examples
///
/// ```no_run
/// use deluge_incoming_port::{Client, Gateway};
/// use tokio::time::{Duration, Instant};
///
/// # async fn example() -> Result<(), deluge_incoming_port::Error> {
/// let mut client = Client::new([192, 168, 1, 1].into());
/// let deadline = Instant::now() + Duration::from_secs(1);
/// let mapping = client.request_mapping(Some(deadline)).await?;
/// println!("mapped external port {}", mapping.external_port);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    /// Address and port of the NAT-PMP server
    server: SocketAddr,
    /// Requested lifetime of the mappings, in seconds
    lifetime: u32,
    protocol: Protocol,
    /// Value of the last epoch, paired with the instant of when it was received
    epoch: Option<(Epoch, Instant)>,
}

impl Client {
    /// Creates a client for the gateway at `gateway`, on the standard NAT-PMP port
    pub fn new(gateway: IpAddr) -> Self {
        Self::with_server(SocketAddr::new(gateway, SERVER_PORT))
    }

    /// Creates a client for a NAT-PMP server listening on `server`
    pub fn with_server(server: SocketAddr) -> Self {
        Self {
            server,
            lifetime: DEFAULT_LIFETIME,
            protocol: Protocol::Tcp,
            epoch: None,
        }
    }

    /// Sets the lifetime requested for the mappings
    pub fn lifetime(mut self, seconds: u32) -> Self {
        self.lifetime = seconds;
        self
    }

    /// Records the epoch of a response and turns its result code into an error
    fn observe(&mut self, header: &ResponseHeader) -> Result<(), ProtocolError> {
        let now = Instant::now();
        if let Some((previous, when)) = self.epoch {
            if !header.epoch.validate_epoch(previous, now.saturating_duration_since(when)) {
                warn!(
                    previous = previous.0,
                    current = header.epoch.0,
                    "Gateway appears to have lost its port mapping state"
                );
            }
        }
        self.epoch = Some((header.epoch, now));
        match header.result {
            ResultCode::Success => Ok(()),
            code => Err(ProtocolError::Rejected(code)),
        }
    }

    async fn external_address(&mut self, session: &Session) -> Result<Ipv4Addr, ProtocolError> {
        let mut buf = [0; MAX_PACKET_SIZE];
        let size = session
            .exchange(&ExternalAddressRequest.bytes()?, &mut buf)
            .await?;
        let response = ExternalAddressResponse::try_from(&buf[..size])?;
        self.observe(&response.header)?;
        Ok(response.external_addr)
    }

    async fn add_mapping(&mut self, session: &Session) -> Result<Mapping, ProtocolError> {
        let opcode = self.protocol.opcode();
        let request = MapRequest {
            opcode,
            internal_port: 0,
            suggested_external_port: 0,
            lifetime: self.lifetime,
        };
        let mut buf = [0; MAX_PACKET_SIZE];
        let size = session.exchange(&request.bytes()?, &mut buf).await?;
        let response = MapResponse::parse(&buf[..size], opcode)?;
        self.observe(&response.header)?;
        Ok(Mapping::from_response(&response, self.protocol))
    }
}

#[async_trait]
impl Gateway for Client {
    async fn request_mapping(&mut self, deadline: Option<Instant>) -> Result<Mapping, Error> {
        let session = Session::open(self.server, deadline)
            .await
            .map_err(|e| Error::AddressQueryFailed(e.into()))?;

        let external_addr = self
            .external_address(&session)
            .await
            .map_err(Error::AddressQueryFailed)?;
        debug!(external_address = %external_addr, "Got external address");

        let mapping = self
            .add_mapping(&session)
            .await
            .map_err(Error::MappingRequestFailed)?;
        debug!(
            internal_port = mapping.internal_port,
            external_port = mapping.external_port,
            lifetime = ?mapping.lifetime,
            "Added port mapping"
        );
        Ok(mapping)
    }
}

/// A socket connected to the gateway whose exchanges share a deadline
struct Session {
    socket: UdpSocket,
    deadline: Option<Instant>,
}

impl Session {
    async fn open(server: SocketAddr, deadline: Option<Instant>) -> io::Result<Self> {
        let local: IpAddr = match server {
            SocketAddr::V4(_) => Ipv4Addr::UNSPECIFIED.into(),
            SocketAddr::V6(_) => Ipv6Addr::UNSPECIFIED.into(),
        };
        let socket = UdpSocket::bind((local, 0)).await?;
        socket.connect(server).await?;
        Ok(Self { socket, deadline })
    }

    /// Sends `request` and waits for a single packet in reply
    async fn exchange(&self, request: &[u8], response: &mut [u8]) -> Result<usize, ProtocolError> {
        let io = async {
            self.socket.send(request).await?;
            self.socket.recv(response).await
        };
        let size = match self.deadline {
            Some(deadline) => time::timeout_at(deadline, io)
                .await
                .map_err(|_| ProtocolError::Timeout)??,
            None => io.await?,
        };
        Ok(size)
    }
}
