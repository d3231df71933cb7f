use thiserror::Error;

use super::OpCode;

/// Errors returned by the (de)serialization functions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The operation code found in the packet is not known
    #[error("the value {0} is not a valid opcode")]
    UnknownOpCode(u8),
    /// The result code found in the packet is not known
    #[error("the value {0} is not a valid result code")]
    UnknownResultCode(u16),
    /// The slice is shorter than the data that had to be read from it
    ///
    /// The first value is the length of the slice, the second the number of
    /// bytes that were needed
    #[error("the slice has a length of {0} but {1} bytes were needed")]
    InvalidSliceSize(usize, usize),
    /// The version field found in the packet indicates a version that is not supported
    ///
    /// The only supported version is version 0
    #[error("unsupported version {0}")]
    VersionNotSupported(u8),
    /// The packet is not a response
    ///
    /// The most significant bit of the opcode is not set
    #[error("the opcode {0} does not belong to a response")]
    NotAResponse(u8),
    /// The response answers a different operation than the expected one
    #[error("expected a response to {expected:?} but got one to {found:?}")]
    UnexpectedOpCode { expected: OpCode, found: OpCode },
}
