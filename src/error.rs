use std::io;

use crate::relay::Direction;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to bind listener on {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("failed to accept incoming connection: {0}")]
    Accept(#[source] io::Error),

    #[error("dial attempt {attempt} failed: {source}")]
    Dial { attempt: u32, source: io::Error },

    #[error("num retries exceeded: {target} unreachable after {attempts} attempts")]
    RetriesExhausted { target: String, attempts: u32 },

    #[error("relay {direction} failed: {source}")]
    Relay {
        direction: Direction,
        source: io::Error,
    },
}
