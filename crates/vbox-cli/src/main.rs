//! vboxctl - command-line front end for vbox-driver.
//!
//! # Usage
//!
//! ```bash
//! # Which VirtualBox is installed?
//! vboxctl version
//!
//! # Replace a machine's forwarded ports
//! vboxctl clear-ports dev-box
//! vboxctl forward dev-box ssh:2222:22 web:8080:80
//!
//! # Host ports held by running machines, for scripting
//! vboxctl --json used-ports | jq '.[]'
//! ```
//!
//! Logs go to stderr so stdout only carries results.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

/// Initialize tracing subscriber with environment-based filtering.
///
/// `verbose` forces debug-level logging; otherwise `RUST_LOG` applies,
/// defaulting to warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    cli.run()
}
