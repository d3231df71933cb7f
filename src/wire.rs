//! This module defines the packets of the NAT Port Mapping Protocol (RFC 6886)
//! and the fields contained in them.
//!
//! # Sending
//!
//! Every request type has a `bytes` method that returns a correctly formatted
//! byte array that can be directly sent to the NAT-PMP gateway.
//!
//! # Receiving
//!
//! When a slice of data is received from the network it can be turned into a
//! response type via the `try_from` method, as each of them implements the
//! `TryFrom` trait (from std), which checks that the data is valid for that
//! type and returns a `Result` that can lead to an [`Error`] if it's not.

mod error;
pub use error::Error;

mod op_code;
pub use op_code::OpCode;

mod result_code;
pub use result_code::ResultCode;

mod epoch;
pub use epoch::Epoch;

mod request;
pub use request::{ExternalAddressRequest, MapRequest};

mod response;
pub use response::{ExternalAddressResponse, MapResponse, ResponseHeader};

mod util;

/// NAT-PMP protocol version, the only one defined
pub const VERSION: u8 = 0;

/// Size of the biggest NAT-PMP packet, the map response
pub const MAX_PACKET_SIZE: usize = MapResponse::SIZE;

/// IANA assigned UDP port number the gateway listens on
pub const SERVER_PORT: u16 = 5351;
