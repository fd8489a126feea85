pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
pub mod dial;
pub mod error;
pub mod logging;
pub mod relay;
pub mod server;

pub use config::{Config, RetryPolicy};
pub use error::Error;
pub use server::Forwarder;
