use std::fmt;

use super::{util, Error};
use util::Deserializer;

/// The `Result Code` field contained in every NAT-PMP response header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultCode {
    /// Success
    Success = 0,
    /// The version number of the request is not recognized by the gateway
    UnsuppVersion = 1,
    /// The gateway supports mapping but the user has turned the feature off
    NotAuthorized = 2,
    /// The gateway itself has not obtained an external address yet
    NetworkFailure = 3,
    /// The gateway cannot create any more mappings at this time
    OutOfResources = 4,
    /// Unsupported Opcode
    UnsuppOpcode = 5,
}

impl ResultCode {
    pub const fn explain(&self) -> &'static str {
        use ResultCode::*;

        match self {
            Success => "Success",

            UnsuppVersion => "The version number of the request is not supported by the gateway",

            NotAuthorized => concat!(
                "The gateway supports mapping, but the user has turned the",
                " feature off or refused the request"
            ),

            NetworkFailure => concat!(
                "The gateway has not obtained a DHCP lease yet or is otherwise",
                " unable to reach the outside network"
            ),

            OutOfResources => concat!(
                "The gateway cannot create any more mappings at this time,",
                " its table is full"
            ),

            UnsuppOpcode => "Unsupported Opcode",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{:?}: {}", self, self.explain())
    }
}

impl TryFrom<u16> for ResultCode {
    type Error = Error;

    fn try_from(code: u16) -> util::Result<Self> {
        use ResultCode::*;

        match code {
            0 => Ok(Success),
            1 => Ok(UnsuppVersion),
            2 => Ok(NotAuthorized),
            3 => Ok(NetworkFailure),
            4 => Ok(OutOfResources),
            5 => Ok(UnsuppOpcode),
            n => Err(Error::UnknownResultCode(n)),
        }
    }
}

impl util::Deserialize for ResultCode {
    fn deserialize(data: &mut Deserializer) -> util::Result<Self> {
        data.deserialize::<u16>()?.try_into()
    }
}
