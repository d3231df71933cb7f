//! The `Renewer` keeps the mapping alive and the sink up to date.
//!
//! # Iterations
//!
//! Every iteration gets a deadline, `timeout` from its start, that bounds
//! both the mapping request and the sink update. Then:
//! - on **success** the timeout is halved (never below the minimum) and the
//!   loop sleeps for half the lifetime the gateway granted, so that a single
//!   missed renewal doesn't let the mapping expire;
//! - on **failure** the timeout is doubled (never above the maximum) and the
//!   loop sleeps until the deadline of the failed iteration, so it never
//!   retries faster than the timeout it just used.
//!
//! Failures are logged and never end the loop.

use tokio::time::{self, Instant};
use tracing::{debug, error};

use crate::client::Gateway;
use crate::error::Error;
use crate::map::Mapping;
use crate::schedule::Schedule;
use crate::sink::PortSink;

/// Result of a single iteration
#[derive(Debug)]
pub struct Iteration {
    pub outcome: Result<Mapping, Error>,
    /// When the next iteration should start
    pub wake_at: Instant,
}

pub struct Renewer<G, S> {
    gateway: G,
    sink: S,
    schedule: Schedule,
}

impl<G: Gateway, S: PortSink> Renewer<G, S> {
    pub fn new(gateway: G, sink: S) -> Self {
        Self::with_schedule(gateway, sink, Schedule::default())
    }

    pub fn with_schedule(gateway: G, sink: S, schedule: Schedule) -> Self {
        Self {
            gateway,
            sink,
            schedule,
        }
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    async fn attempt(&mut self, deadline: Instant) -> Result<Mapping, Error> {
        let mapping = self.gateway.request_mapping(Some(deadline)).await?;
        self.sink.apply(deadline, mapping.external_port).await?;
        Ok(mapping)
    }

    /// Runs a single iteration, without sleeping afterwards
    pub async fn step(&mut self) -> Iteration {
        let timeout = self.schedule.timeout();
        debug!(?timeout, "Attempting to map a port...");

        let deadline = Instant::now() + timeout;
        let outcome = time::timeout_at(deadline, self.attempt(deadline))
            .await
            .unwrap_or(Err(Error::DeadlineExceeded(timeout)));

        match outcome {
            Ok(mapping) => {
                self.schedule.succeeded();
                let renew_in = mapping.lifetime / 2;
                debug!(
                    external_port = mapping.external_port,
                    ?renew_in,
                    "Port mapping is up to date"
                );
                Iteration {
                    outcome: Ok(mapping),
                    wake_at: Instant::now() + renew_in,
                }
            }
            Err(err) => {
                self.schedule.failed();
                error!(
                    error = &err as &(dyn std::error::Error + 'static),
                    next_timeout = ?self.schedule.timeout(),
                    "Could not renew port mapping"
                );
                Iteration {
                    outcome: Err(err),
                    wake_at: deadline,
                }
            }
        }
    }

    /// Renews the mapping forever
    pub async fn run(&mut self) {
        loop {
            let iteration = self.step().await;
            time::sleep_until(iteration.wake_at).await;
        }
    }
}
