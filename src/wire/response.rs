use std::net::Ipv4Addr;

use super::{util, Epoch, Error, OpCode, ResultCode, VERSION};
use util::Deserializer;

/// Header shared by every NAT-PMP response
///
/// # Format
///
/// ```plain
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Vers = 0      | OP = 128 + x  | Result Code                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Seconds Since Start of Epoch                                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct ResponseHeader {
    /// The outcome of the operation
    pub result: ResultCode,
    /// Time elapsed since the gateway mapping table was (re)initialized
    pub epoch: Epoch,
}

impl ResponseHeader {
    /// Reads the header and checks it answers to `expected`
    fn deserialize_for(data: &mut Deserializer, expected: OpCode) -> util::Result<Self> {
        let version: u8 = data.deserialize()?;
        if version != VERSION {
            return Err(Error::VersionNotSupported(version));
        }
        let opcode = OpCode::from_response(data.deserialize()?)?;
        if opcode != expected {
            return Err(Error::UnexpectedOpCode {
                expected,
                found: opcode,
            });
        }
        Ok(Self {
            result: data.deserialize()?,
            epoch: Epoch(data.deserialize()?),
        })
    }
}

/// NAT-PMP [`ExternalAddress`](OpCode::ExternalAddress) response
///
/// # Format
///
/// ```plain
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Vers = 0      | OP = 128 + 0  | Result Code                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Seconds Since Start of Epoch                                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | External IPv4 Address (a.b.c.d)                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Gateways answer error responses with just the header, in that case the
/// external address is left [unspecified](Ipv4Addr::UNSPECIFIED).
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct ExternalAddressResponse {
    pub header: ResponseHeader,
    pub external_addr: Ipv4Addr,
}

impl TryFrom<&[u8]> for ExternalAddressResponse {
    type Error = Error;

    fn try_from(slice: &[u8]) -> util::Result<Self> {
        let mut de = Deserializer::new(slice);
        let header = ResponseHeader::deserialize_for(&mut de, OpCode::ExternalAddress)?;
        if header.result != ResultCode::Success {
            return Ok(Self {
                header,
                external_addr: Ipv4Addr::UNSPECIFIED,
            });
        }
        Ok(Self {
            header,
            external_addr: de.deserialize()?,
        })
    }
}

/// NAT-PMP [`MapUdp`](OpCode::MapUdp) or [`MapTcp`](OpCode::MapTcp) response
///
/// # Format
///
/// ```plain
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Vers = 0      | OP = 128 + x  | Result Code                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Seconds Since Start of Epoch                                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Internal Port                 | Mapped External Port          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Port Mapping Lifetime in Seconds                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct MapResponse {
    pub header: ResponseHeader,
    /// Internal port, copied from the corresponding request when non zero
    pub internal_port: u16,
    /// The external port assigned by the gateway
    pub mapped_external_port: u16,
    /// The lifetime granted by the gateway, which may differ from the requested one
    pub lifetime: u32,
}

impl MapResponse {
    pub const SIZE: usize = 16;

    /// Parses a response to a map request made with `opcode`
    pub fn parse(slice: &[u8], opcode: OpCode) -> util::Result<Self> {
        let mut de = Deserializer::new(slice);
        let header = ResponseHeader::deserialize_for(&mut de, opcode)?;
        if header.result != ResultCode::Success {
            return Ok(Self {
                header,
                internal_port: 0,
                mapped_external_port: 0,
                lifetime: 0,
            });
        }
        Ok(Self {
            header,
            internal_port: de.deserialize()?,
            mapped_external_port: de.deserialize()?,
            lifetime: de.deserialize()?,
        })
    }
}
