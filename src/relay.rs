use std::net::Shutdown;

use socket2::SockRef;
use tokio::io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tracing::{error, info, Instrument, Span};

use strum_macros::Display;

use crate::{Error, Result};

pub const BUF_SIZE: usize = 1024;

/// Which way a relay task moves bytes
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// inbound -> outbound, closes the outbound connection when done
    #[strum(serialize = "inbound->outbound")]
    Outbound,
    /// outbound -> inbound, closes the inbound connection when done
    #[strum(serialize = "outbound->inbound")]
    Inbound,
}

/// Copy from `src` to `dest` through a fixed buffer until `src` reports EOF.
/// Returns the number of bytes moved.
pub async fn pipe<R, W>(src: &mut R, dest: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0; BUF_SIZE];
    let mut total = 0;

    loop {
        let len = src.read(&mut buf).await?;
        if len == 0 {
            return Ok(total);
        }
        dest.write_all(&buf[..len]).await?;
        total += len as u64;
    }
}

/// The connection a relay direction writes to.
pub trait Destination: AsyncWrite + Unpin {
    /// Close the whole connection, not just the side being written. Any task
    /// still reading from it wakes up with EOF.
    fn close(&mut self) -> io::Result<()>;
}

impl Destination for OwnedWriteHalf {
    fn close(&mut self) -> io::Result<()> {
        let stream: &TcpStream = self.as_ref();
        SockRef::from(stream).shutdown(Shutdown::Both)
    }
}

/// One half-duplex direction. Whether the copy ends in EOF or an error, the
/// destination connection is closed; the source is left alone.
pub async fn relay<R, W>(direction: Direction, mut src: R, mut dest: W) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: Destination,
{
    let copied = pipe(&mut src, &mut dest).await;

    // the peer may already be gone, nothing left to report then
    let _ = dest.shutdown().await;
    let _ = dest.close();
    drop(dest);

    copied.map_err(|source| Error::Relay { direction, source })
}

/// An inbound connection paired with its dialed outbound connection
pub struct Session {
    inbound: TcpStream,
    outbound: TcpStream,
}

impl Session {
    pub fn new(inbound: TcpStream, outbound: TcpStream) -> Self {
        Self { inbound, outbound }
    }

    /// Detach both directions onto the runtime. Nothing is handed back: the
    /// outcome of each direction is only visible in the log, under the
    /// caller's span.
    pub fn spawn(self) {
        let (in_read, in_write) = self.inbound.into_split();
        let (out_read, out_write) = self.outbound.into_split();
        let span = Span::current();

        tokio::spawn(run(Direction::Outbound, in_read, out_write).instrument(span.clone()));
        tokio::spawn(run(Direction::Inbound, out_read, in_write).instrument(span));
    }
}

async fn run<R, W>(direction: Direction, src: R, dest: W)
where
    R: AsyncRead + Unpin,
    W: Destination,
{
    match relay(direction, src, dest).await {
        Ok(bytes) => info!(%direction, bytes, "end connection"),
        Err(err) => error!(%direction, error = %err, "relay"),
    }
}
