use super::{util, Error};

/// The NAT-PMP operation
///
/// This enum represents the possible values of the `Opcode` field in
/// NAT-PMP requests and responses.
///
/// In requests this field indicates the operation to perform while in
/// responses it is used to know to which operation it's referring, with
/// the most significant bit set (see [`OpCode::RESPONSE_BIT`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpCode {
    ExternalAddress = 0,
    MapUdp = 1,
    MapTcp = 2,
}

impl OpCode {
    /// Bit set by the gateway in the opcode of every response
    pub const RESPONSE_BIT: u8 = 128;

    /// Parses the opcode field of a response packet
    pub fn from_response(byte: u8) -> util::Result<Self> {
        if byte < Self::RESPONSE_BIT {
            return Err(Error::NotAResponse(byte));
        }
        Self::try_from(byte - Self::RESPONSE_BIT)
    }
}

impl TryFrom<u8> for OpCode {
    type Error = Error;

    fn try_from(byte: u8) -> util::Result<Self> {
        match byte {
            0 => Ok(OpCode::ExternalAddress),
            1 => Ok(OpCode::MapUdp),
            2 => Ok(OpCode::MapTcp),
            n => Err(Error::UnknownOpCode(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_opcodes() {
        assert_eq!(OpCode::from_response(128), Ok(OpCode::ExternalAddress));
        assert_eq!(OpCode::from_response(2), Err(Error::NotAResponse(2)));
        assert_eq!(OpCode::from_response(131), Err(Error::UnknownOpCode(3)));
    }
}
