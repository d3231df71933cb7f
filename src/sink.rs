//! The port sink keeps Deluge's incoming port in line with the mapped one.
//!
//! A [`DelugeSink`] remembers the last port Deluge confirmed and only talks
//! to it when the port changes. The first time it does so it also has to
//! pick a daemon: the web UI lists the daemons it knows about and the first
//! one is connected to. The chosen daemon is kept until a call fails, after
//! which it is discovered again.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::Error;
use crate::rpc::{RpcError, Transport};
use crate::sampler::Sampler;

/// How often an unchanged port gets reported at info level
const NOOP_LOG_EVERY: Duration = Duration::from_secs(30 * 60);

const ALREADY_APPLIED: &str =
    "Not updating Deluge since we think its port mapping is already correct.";

/// Something whose listen port has to follow the mapped port
#[async_trait]
pub trait PortSink: Send {
    /// Makes `port` the active port, giving up at `deadline`
    ///
    /// Applying the port that is already active does nothing.
    async fn apply(&mut self, deadline: Instant, port: u16) -> Result<(), Error>;
}

/// What a [`DelugeSink`] knows about the remote side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkState {
    /// Last port Deluge confirmed, `0` if none was applied yet
    pub last_applied_port: u16,
    /// Id of the daemon the web UI is connected to
    pub host: Option<String>,
}

/// A daemon entry of the web UI host list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub id: String,
    pub address: Option<String>,
    pub port: Option<u16>,
}

/// Validates the result of `web.get_hosts`
///
/// The result must be a non empty list whose first entry is a list starting
/// with the host id. Following entries that don't look like hosts are skipped.
pub fn parse_hosts(result: &Value) -> Result<Vec<Host>, Error> {
    let unexpected = || Error::UnexpectedSinkResponse(result.to_string());

    let entries = result.as_array().ok_or_else(unexpected)?;
    let first = entries.first().and_then(host).ok_or_else(unexpected)?;
    Ok(std::iter::once(first)
        .chain(entries[1..].iter().filter_map(host))
        .collect())
}

fn host(entry: &Value) -> Option<Host> {
    let fields = entry.as_array()?;
    Some(Host {
        id: fields.first()?.as_str()?.to_owned(),
        address: fields.get(1).and_then(Value::as_str).map(str::to_owned),
        port: fields
            .get(2)
            .and_then(Value::as_u64)
            .and_then(|p| u16::try_from(p).ok()),
    })
}

/// [`PortSink`] that sets the incoming port of a Deluge daemon through its web UI
pub struct DelugeSink<T> {
    transport: T,
    password: Option<String>,
    state: SinkState,
    noop_sampler: Sampler,
}

impl<T: Transport> DelugeSink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            password: None,
            state: SinkState::default(),
            noop_sampler: Sampler::new(NOOP_LOG_EVERY),
        }
    }

    /// Logs into the web UI with `password` before discovering the daemons
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn state(&self) -> &SinkState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Picks a daemon and connects the web UI to it, returning its id
    async fn connect(&self, deadline: Instant) -> Result<String, Error> {
        if let Some(password) = &self.password {
            let logged_in = self
                .transport
                .call("auth.login", json!([password]), deadline)
                .await
                .map_err(Error::SinkConnectFailed)?;
            if logged_in != Value::Bool(true) {
                return Err(Error::SinkConnectFailed(RpcError::UnexpectedResult(
                    "auth.login".to_owned(),
                    logged_in,
                )));
            }
        }

        let result = self
            .transport
            .call("web.get_hosts", json!([]), deadline)
            .await
            .map_err(Error::SinkConnectFailed)?;
        let hosts = parse_hosts(&result)?;
        debug!(?hosts, "Discovered deluge hosts");

        let host = hosts
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnexpectedSinkResponse(result.to_string()))?;
        self.transport
            .call("web.connect", json!([host.id]), deadline)
            .await
            .map_err(Error::SinkConnectFailed)?;
        debug!(host = %host.id, "Connected to Deluge");
        Ok(host.id)
    }
}

#[async_trait]
impl<T: Transport> PortSink for DelugeSink<T> {
    async fn apply(&mut self, deadline: Instant, port: u16) -> Result<(), Error> {
        if port == self.state.last_applied_port {
            if self.noop_sampler.sample() {
                info!(port, "{}", ALREADY_APPLIED);
            } else {
                debug!(port, "{}", ALREADY_APPLIED);
            }
            return Ok(());
        }

        // The host stays out of the state until the update went through, so
        // that any failure leads to a new discovery
        let host = match self.state.host.take() {
            Some(host) => host,
            None => self.connect(deadline).await?,
        };

        self.transport
            .call(
                "core.set_config",
                json!([{ "listen_ports": [port, port] }]),
                deadline,
            )
            .await
            .map_err(Error::SinkUpdateFailed)?;
        info!(port, "Updated Deluge incoming port.");

        self.state = SinkState {
            last_applied_port: port,
            host: Some(host),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    /// In-memory web UI recording every call
    #[derive(Default)]
    struct FakeDeluge {
        calls: Mutex<Vec<(String, Value)>>,
        scripted: Mutex<HashMap<&'static str, VecDeque<Result<Value, RpcError>>>>,
    }

    impl FakeDeluge {
        fn script(&self, method: &'static str, reply: Result<Value, RpcError>) {
            let mut scripted = self.scripted.lock().unwrap();
            scripted.entry(method).or_default().push_back(reply);
        }

        fn methods(&self) -> Vec<String> {
            let calls = self.calls.lock().unwrap();
            calls.iter().map(|(method, _)| method.clone()).collect()
        }

        fn params(&self, index: usize) -> Value {
            self.calls.lock().unwrap()[index].1.clone()
        }
    }

    #[async_trait]
    impl Transport for FakeDeluge {
        async fn call(
            &self,
            method: &str,
            params: Value,
            _deadline: Instant,
        ) -> Result<Value, RpcError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_owned(), params));
            let scripted = self
                .scripted
                .lock()
                .unwrap()
                .get_mut(method)
                .and_then(VecDeque::pop_front);
            scripted.unwrap_or_else(|| {
                Ok(match method {
                    "auth.login" => json!(true),
                    "web.get_hosts" => json!([
                        ["host-A", "127.0.0.1", 58846, "Online"],
                        ["host-B", "10.0.0.2", 58846, "Offline"]
                    ]),
                    _ => Value::Null,
                })
            })
        }
    }

    fn remote_error(method: &str) -> RpcError {
        RpcError::Remote {
            method: method.to_owned(),
            code: 2,
            message: "Unknown error".to_owned(),
        }
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(1)
    }

    #[tokio::test]
    async fn first_apply_discovers_and_connects() {
        let mut sink = DelugeSink::new(FakeDeluge::default());

        sink.apply(deadline(), 51413).await.unwrap();

        let deluge = sink.transport();
        assert_eq!(
            deluge.methods(),
            ["web.get_hosts", "web.connect", "core.set_config"]
        );
        assert_eq!(deluge.params(1), json!(["host-A"]));
        assert_eq!(deluge.params(2), json!([{ "listen_ports": [51413, 51413] }]));
        assert_eq!(
            sink.state(),
            &SinkState {
                last_applied_port: 51413,
                host: Some("host-A".to_owned()),
            }
        );
    }

    #[tokio::test]
    async fn same_port_is_a_noop() {
        let mut sink = DelugeSink::new(FakeDeluge::default());

        sink.apply(deadline(), 51413).await.unwrap();
        sink.apply(deadline(), 51413).await.unwrap();

        assert_eq!(sink.transport().methods().len(), 3);
    }

    #[tokio::test]
    async fn new_port_reuses_the_connection() {
        let mut sink = DelugeSink::new(FakeDeluge::default());

        sink.apply(deadline(), 51413).await.unwrap();
        sink.apply(deadline(), 51414).await.unwrap();

        let deluge = sink.transport();
        assert_eq!(deluge.methods()[3..], ["core.set_config"]);
        assert_eq!(deluge.params(3), json!([{ "listen_ports": [51414, 51414] }]));
        assert_eq!(sink.state().last_applied_port, 51414);
    }

    #[tokio::test]
    async fn connect_failure_leaves_state_untouched() {
        let deluge = FakeDeluge::default();
        deluge.script("web.connect", Err(remote_error("web.connect")));
        let mut sink = DelugeSink::new(deluge);

        let err = sink.apply(deadline(), 51413).await.unwrap_err();
        assert!(matches!(err, Error::SinkConnectFailed(_)));
        assert_eq!(sink.state(), &SinkState::default());

        // Discovery starts over
        sink.apply(deadline(), 51413).await.unwrap();
        assert_eq!(
            sink.transport().methods()[2..],
            ["web.get_hosts", "web.connect", "core.set_config"]
        );
    }

    #[tokio::test]
    async fn update_failure_is_retried() {
        let mut sink = DelugeSink::new(FakeDeluge::default());
        sink.apply(deadline(), 51413).await.unwrap();

        sink.transport()
            .script("core.set_config", Err(remote_error("core.set_config")));
        let err = sink.apply(deadline(), 51414).await.unwrap_err();
        assert!(matches!(err, Error::SinkUpdateFailed(_)));
        assert_eq!(sink.state().last_applied_port, 51413);
        assert_eq!(sink.state().host, None);

        // Not mistaken for a no-op
        sink.apply(deadline(), 51414).await.unwrap();
        assert_eq!(
            sink.transport().methods()[4..],
            ["web.get_hosts", "web.connect", "core.set_config"]
        );
        assert_eq!(sink.state().last_applied_port, 51414);
    }

    #[tokio::test]
    async fn unexpected_hosts_list() {
        let deluge = FakeDeluge::default();
        deluge.script("web.get_hosts", Ok(json!([])));
        let mut sink = DelugeSink::new(deluge);

        let err = sink.apply(deadline(), 51413).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedSinkResponse(_)));
        assert_eq!(sink.transport().methods(), ["web.get_hosts"]);
        assert_eq!(sink.state(), &SinkState::default());
    }

    #[tokio::test]
    async fn logs_in_when_a_password_is_set() {
        let mut sink = DelugeSink::new(FakeDeluge::default()).password("deluge");

        sink.apply(deadline(), 51413).await.unwrap();
        assert_eq!(sink.transport().methods()[0], "auth.login");
        assert_eq!(sink.transport().params(0), json!(["deluge"]));

        let deluge = FakeDeluge::default();
        deluge.script("auth.login", Ok(json!(false)));
        let mut sink = DelugeSink::new(deluge).password("wrong");
        let err = sink.apply(deadline(), 51413).await.unwrap_err();
        assert!(matches!(
            err,
            Error::SinkConnectFailed(RpcError::UnexpectedResult(..))
        ));
    }

    #[test]
    fn hosts_shapes() {
        let hosts = parse_hosts(&json!([["abc", "127.0.0.1", 58846, "Online"], 7])).unwrap();
        assert_eq!(
            hosts,
            [Host {
                id: "abc".to_owned(),
                address: Some("127.0.0.1".to_owned()),
                port: Some(58846),
            }]
        );

        let hosts = parse_hosts(&json!([["abc"]])).unwrap();
        assert_eq!(hosts[0].address, None);

        for bad in [
            json!([]),
            json!(null),
            json!({ "abc": 1 }),
            json!([[]]),
            json!([[42, "127.0.0.1"]]),
            json!(["abc"]),
        ] {
            assert!(matches!(
                parse_hosts(&bad),
                Err(Error::UnexpectedSinkResponse(_))
            ));
        }
    }
}
