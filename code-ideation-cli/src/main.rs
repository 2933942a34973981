use clap::Parser;
use code_ideation_core::{execute_ideation_flow, style, CoreCliArgs};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the report, so logs go to stderr
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() {
    let cli_args = CoreCliArgs::parse();
    init_logging(cli_args.verbose);

    if let Err(e) = execute_ideation_flow(cli_args).await {
        eprintln!(
            "{} {} {}",
            style("❌"),
            style("code-ideation failed:").red().bold(),
            style(format!("{e:#}")).red()
        );
        std::process::exit(1);
    }
}
