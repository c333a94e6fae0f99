//! OpenStack Service Check Binary

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use openstack_service_check::{CheckError, Completion, Config, execute};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        // A rejected flag is UNKNOWN like any other configuration error
        Err(e) => return finish(Completion::failed(&CheckError::from(e))),
    };

    initialize_tracing(config.debug);

    info!(
        "Starting {} v{} - Cloud: {}, Service: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.cloud,
        config.service
    );

    finish(execute(&config).await)
}

fn finish(completion: Completion) -> ExitCode {
    println!("{}", completion.output);
    completion.verdict.into()
}

/// Initialize structured logging on stderr; stdout carries the check output.
fn initialize_tracing(debug: bool) {
    let log_level = if debug { "debug" } else { "warn" };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    let filter_layer = if debug {
        tracing_subscriber::EnvFilter::new(log_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level))
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
