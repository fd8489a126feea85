use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tcpforwarder::config::Args;
use tcpforwarder::{logging, Config, Forwarder};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_format);

    let config = match Config::try_from(args) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "missing arg");
            Args::command()
                .error(ErrorKind::ValueValidation, err)
                .exit();
        }
    };

    info!(inbound = %config.inbound, outbound = %config.outbound, "args");

    let forwarder = match Forwarder::bind(&config).await {
        Ok(forwarder) => forwarder,
        Err(err) => {
            error!(error = %err, "create listener");
            return ExitCode::FAILURE;
        }
    };

    match forwarder.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
