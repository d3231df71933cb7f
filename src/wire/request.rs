use super::{util, OpCode, VERSION};
use util::Serializer;

/// NAT-PMP [`ExternalAddress`](OpCode::ExternalAddress) request
///
/// # Format
///
/// ```plain
///  0                   1
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Vers = 0      | OP = 0        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct ExternalAddressRequest;

impl ExternalAddressRequest {
    pub const SIZE: usize = 2;

    pub fn bytes(&self) -> util::Result<[u8; Self::SIZE]> {
        Serializer::<{ ExternalAddressRequest::SIZE }>::new()
            .serialize(VERSION)?
            .serialize(OpCode::ExternalAddress as u8)?
            .finish()
    }
}

/// NAT-PMP [`MapUdp`](OpCode::MapUdp) or [`MapTcp`](OpCode::MapTcp) request
///
/// # Format
///
/// ```plain
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Vers = 0      | OP = x        | Reserved                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Internal Port                 | Suggested External Port       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Requested Port Mapping Lifetime in Seconds                    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct MapRequest {
    /// Either [`OpCode::MapUdp`] or [`OpCode::MapTcp`]
    pub opcode: OpCode,
    /// Internal port for the mapping
    ///
    /// The value `0` leaves the choice of the port to the gateway.
    pub internal_port: u16,
    /// Suggested external port for the mapping
    ///
    /// If the client does not have a preference it **must** use 0.
    pub suggested_external_port: u16,
    /// Requested lifetime in seconds, `0` deletes the mapping
    pub lifetime: u32,
}

impl MapRequest {
    pub const SIZE: usize = 12;

    pub fn bytes(&self) -> util::Result<[u8; Self::SIZE]> {
        Serializer::<{ MapRequest::SIZE }>::new()
            .serialize(VERSION)?
            .serialize(self.opcode as u8)?
            .serialize([0u8; 2])?
            .serialize(self.internal_port)?
            .serialize(self.suggested_external_port)?
            .serialize(self.lifetime)?
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding() {
        assert_eq!(ExternalAddressRequest.bytes(), Ok([0, 0]));

        let map = MapRequest {
            opcode: OpCode::MapTcp,
            internal_port: 0,
            suggested_external_port: 0,
            lifetime: 360,
        };
        assert_eq!(map.bytes(), Ok([0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 1, 104]));

        let map = MapRequest {
            opcode: OpCode::MapUdp,
            internal_port: 51413,
            suggested_external_port: 51414,
            lifetime: 0,
        };
        assert_eq!(
            map.bytes(),
            Ok([0, 1, 0, 0, 0xc8, 0xd5, 0xc8, 0xd6, 0, 0, 0, 0])
        );
    }
}
