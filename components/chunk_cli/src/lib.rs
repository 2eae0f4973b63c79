//! Precompiled chunk tool library
//!
//! Provides the argument model and the commands behind `chunkc`, a host
//! tool for inspecting, packing and unpacking precompiled artifacts.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Command};
pub use commands::{inspect, listing, pack, run, unpack};
pub use error::{CliError, CliResult};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set. Otherwise the filter is `warn`, or `debug`
/// with `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
