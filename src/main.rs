use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::EnvFilter;

use leader_monitor::cli::Cli;
use leader_monitor::client::NodeSource;
use leader_monitor::config::{LoggingConfig, MonitorConfig};
use leader_monitor::dashboard::{PlainRenderer, TerminalDashboard};
use leader_monitor::error::MonitorError;
use leader_monitor::monitor::LeaderMonitor;

/// The dashboard owns stdout, so logs go to a file unless running plain.
fn init_tracing(logging: &LoggingConfig, to_stderr: bool) -> Result<(), MonitorError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&logging.log_file)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = MonitorConfig::load_or_default(&cli.config);
    cli.apply_overrides(&mut config);

    if let Err(e) = init_tracing(&config.logging, cli.plain) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let source = match NodeSource::from_config(&config) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create RPC client: {}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Using RPC endpoint {}", source.rpc_url());

    let initialized =
        LeaderMonitor::initialize(cli.identity.clone(), source, &config, cli.refresh_schedule)
            .await;
    let mut monitor = match initialized {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Initialization failed: {}", e);
            eprintln!("error: could not calculate schedule: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !monitor.state().slot_duration_estimated {
        eprintln!(
            "warning: could not calculate slot duration. using default value of {} seconds.",
            config.poll.default_slot_duration_secs
        );
    }

    let result = if cli.plain {
        monitor.run(&mut PlainRenderer::stdout()).await
    } else {
        match TerminalDashboard::enter() {
            Ok(mut dashboard) => monitor.run(&mut dashboard).await,
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(()) => {
            println!("\nexiting...");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Monitor stopped: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
