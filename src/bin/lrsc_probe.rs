use std::io::{self, Write};
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use lrsc_probe::{ProbeConfig, probe};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = ProbeConfig::from_env().and_then(|cfg| probe(cfg, &mut out));
    let _ = out.flush();

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("lrsc-probe: {e}");
            ExitCode::FAILURE
        }
    }
}
