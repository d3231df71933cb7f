use std::time::Duration;

use thiserror::Error;

use crate::client::ProtocolError;
use crate::rpc::RpcError;

/// Everything that can make a renewal iteration fail
///
/// None of these is fatal: the renewal loop logs them, widens its timeout
/// and tries again.
///
/// The underlying failure is only reachable through [`source`], so that
/// walking the chain prints every cause once.
///
/// [`source`]: std::error::Error::source
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not get external address")]
    AddressQueryFailed(#[source] ProtocolError),

    #[error("could not add port mapping")]
    MappingRequestFailed(#[source] ProtocolError),

    #[error("could not connect to Deluge")]
    SinkConnectFailed(#[source] RpcError),

    #[error("could not update Deluge incoming port")]
    SinkUpdateFailed(#[source] RpcError),

    #[error("Deluge hosts list has unexpected shape: {0}")]
    UnexpectedSinkResponse(String),

    #[error("iteration did not complete within {0:?}")]
    DeadlineExceeded(Duration),
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;
    use crate::wire::ResultCode;

    fn chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
        let mut messages = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            messages.push(cause.to_string());
            source = cause.source();
        }
        messages
    }

    #[test]
    fn every_cause_is_printed_once() {
        let err = Error::AddressQueryFailed(ProtocolError::Network(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        )));
        assert_eq!(
            chain(&err),
            [
                "could not get external address",
                "network I/O error",
                "connection refused",
            ]
        );

        let err = Error::SinkUpdateFailed(RpcError::Timeout("core.set_config".to_owned()));
        assert_eq!(
            chain(&err),
            [
                "could not update Deluge incoming port",
                "deadline reached before calling core.set_config",
            ]
        );
    }

    #[test]
    fn leaf_errors_keep_their_details() {
        let err = Error::MappingRequestFailed(ProtocolError::Rejected(ResultCode::OutOfResources));
        let messages = chain(&err);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].starts_with("gateway refused the request: OutOfResources"));

        let err = Error::DeadlineExceeded(Duration::from_millis(250));
        assert_eq!(err.to_string(), "iteration did not complete within 250ms");
        assert!(err.source().is_none());
    }
}
