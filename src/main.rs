//! boot-artifacts - Generate artifacts for booting on various boards or SoCs
//!
//! Entry point for the boot-artifacts command-line application.

use clap::Parser;

use boot_artifacts::cli::output::display_error;
use boot_artifacts::cli::Cli;

fn main() {
    let cli = Cli::parse();
    let output_config = cli.output_config();

    // Initialize tracing subscriber; RUST_LOG directives override the flags
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(output_config.log_level().into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Run the command and handle errors
    if let Err(e) = cli.run() {
        display_error(&e);
        std::process::exit(1);
    }
}
