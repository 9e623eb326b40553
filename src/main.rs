//! Strongbox - an encrypted credential manager.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strongbox::cli::output;
use strongbox::cli::{execute, Cli};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("STRONGBOX_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("strongbox=debug")
        } else {
            EnvFilter::new("strongbox=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            strongbox::error::Error::NoDatabase => {
                Some("run: export STRONGBOX_DB=/path/to/db.sbx")
            }
            strongbox::error::Error::DatabaseNotFound(_) => Some("run: strongbox init"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
