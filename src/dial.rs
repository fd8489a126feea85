use std::future::Future;
use std::io;

use tokio::net::TcpStream;
use tokio::time;
use tracing::{error, info, warn};

use crate::config::RetryPolicy;
use crate::{Error, Result};

/// Attempt counter for one dial. Fresh per incoming connection.
#[derive(Debug)]
pub struct RetryState {
    attempt: u32,
    policy: RetryPolicy,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { attempt: 0, policy }
    }

    /// 0-based index of the next attempt, `None` once the bound is reached.
    pub fn next_attempt(&mut self) -> Option<u32> {
        if self.attempt >= self.policy.attempts {
            return None;
        }
        let attempt = self.attempt;
        self.attempt += 1;
        Some(attempt)
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempt
    }
}

/// Opens one outbound connection. `TcpConnector` is the real thing; the
/// seam exists so a forwarder can be driven with a connector that stalls.
pub trait Connect: Send + Sync + 'static {
    fn connect(&self, target: &str) -> impl Future<Output = io::Result<TcpStream>> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connect for TcpConnector {
    fn connect(&self, target: &str) -> impl Future<Output = io::Result<TcpStream>> + Send {
        TcpStream::connect(target.to_owned())
    }
}

/// Dials the fixed target, retrying up to the policy bound
#[derive(Debug, Clone)]
pub struct Dialer<C = TcpConnector> {
    target: String,
    policy: RetryPolicy,
    connector: C,
}

impl Dialer {
    pub fn new(target: impl Into<String>, policy: RetryPolicy) -> Self {
        Self::with_connector(target, policy, TcpConnector)
    }
}

impl<C: Connect> Dialer<C> {
    pub fn with_connector(target: impl Into<String>, policy: RetryPolicy, connector: C) -> Self {
        Self {
            target: target.into(),
            policy,
            connector,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn dial(&self) -> Result<TcpStream> {
        self.dial_with(|| self.connector.connect(&self.target)).await
    }

    /// Runs the retry loop over `connect`. Every attempt is bounded by the
    /// policy timeout; the first success is returned straight away, with no
    /// delay between failed attempts.
    pub async fn dial_with<F, Fut, S>(&self, mut connect: F) -> Result<S>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<S>>,
    {
        let mut state = RetryState::new(self.policy);

        while let Some(attempt) = state.next_attempt() {
            info!(
                attempt,
                timeout = self.policy.timeout.as_secs(),
                "dial connection"
            );

            match self.attempt(attempt, connect()).await {
                Ok(stream) => {
                    info!(outbound = %self.target, attempt, "connection established");
                    return Ok(stream);
                }
                Err(err) => warn!(error = %err, "remote connection"),
            }
        }

        let err = Error::RetriesExhausted {
            target: self.target.clone(),
            attempts: state.attempts_made(),
        };
        error!(error = %err, "dial");
        Err(err)
    }

    async fn attempt<Fut, S>(&self, attempt: u32, connecting: Fut) -> Result<S>
    where
        Fut: Future<Output = io::Result<S>>,
    {
        match time::timeout(self.policy.timeout, connecting).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(Error::Dial { attempt, source }),
            Err(_) => Err(Error::Dial {
                attempt,
                source: io::Error::new(io::ErrorKind::TimedOut, "dial timed out"),
            }),
        }
    }
}
