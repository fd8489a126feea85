use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, info_span, Instrument};

use crate::config::Config;
use crate::dial::{Connect, Dialer, TcpConnector};
use crate::relay::Session;
use crate::{Error, Result};

/// Accepts connections on the inbound address and forwards each one to the
/// outbound target.
pub struct Forwarder<C = TcpConnector> {
    listener: TcpListener,
    dialer: Arc<Dialer<C>>,
}

impl Forwarder {
    pub async fn bind(config: &Config) -> Result<Self> {
        Self::bind_with(config, TcpConnector).await
    }
}

impl<C: Connect> Forwarder<C> {
    pub async fn bind_with(config: &Config, connector: C) -> Result<Self> {
        let listener = TcpListener::bind(&config.inbound)
            .await
            .map_err(|source| Error::Bind {
                addr: config.inbound.clone(),
                source,
            })?;

        Ok(Self {
            listener,
            dialer: Arc::new(Dialer::with_connector(
                &config.outbound,
                config.policy,
                connector,
            )),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Never returns unless accepting fails, which is fatal.
    pub async fn run(self) -> Result<()> {
        info!(addr = ?self.local_addr().ok(), outbound = %self.dialer.target(), "listening");

        loop {
            let (inbound, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(source) => {
                    let err = Error::Accept(source);
                    error!(error = %err, "accept incoming connection");
                    return Err(err);
                }
            };

            info!(%peer, "accepted connection");

            let span = info_span!("connection", %peer);
            tokio::spawn(establish(inbound, self.dialer.clone()).instrument(span));
        }
    }
}

/// Dial the target for one inbound connection and start relaying. Failure
/// stays local to this connection.
async fn establish<C: Connect>(mut inbound: TcpStream, dialer: Arc<Dialer<C>>) {
    match dialer.dial().await {
        Ok(outbound) => Session::new(inbound, outbound).spawn(),
        Err(_) => {
            // already logged by the dialer; don't leave the client hanging
            let _ = inbound.shutdown().await;
        }
    }
}
