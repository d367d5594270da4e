use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use ndfilter_cli::{Cli, CliError, app, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let resolved = match app::resolve_config(&cli).await {
        Ok(resolved) => resolved,
        Err(e) => return report(&e),
    };
    let config = &resolved.config;

    if let Err(e) = logging::init_tracing(&config.general) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }
    resolved.log_warnings();
    ndfilter_core::metrics::describe_all();

    if cli.validate {
        return match app::validate(config) {
            Ok(rendered) => {
                print!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(e) => report(&e),
        };
    }

    match app::run(&cli, config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "ndfilter failed");
            report(&e)
        }
    }
}

fn report(err: &CliError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}
