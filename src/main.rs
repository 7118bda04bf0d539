//! Sshwifty configuration check.
//!
//! Loads the runtime configuration from `SSHWIFTY_*` environment variables
//! exactly as the server would, logs what it found, and exits non-zero when
//! the environment cannot produce a configuration.

use clap::Parser;

use sshwifty_config::config::{Configuration, EnvLoader, Loader, Redundant};
use sshwifty_config::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "sshwifty-config")]
#[command(about = "Validate Sshwifty configuration from environment variables", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs)?;

    let mut loaders = Redundant::default();
    loaders.push(EnvLoader::new());

    let (source, config) = match loaders.load() {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(error = %e, "Configuration rejected");
            return Err(e.into());
        }
    };

    report(source, &config);
    Ok(())
}

fn report(source: &str, config: &Configuration) {
    tracing::info!(
        source,
        host_name = %config.host_name,
        shared_key_set = !config.shared_key.is_empty(),
        dial_timeout_secs = config.dial_timeout.as_secs(),
        socks5 = %config.socks5,
        hook_points = config.hooks.len(),
        hook_timeout_secs = config.hook_timeout.as_secs(),
        presets = config.presets.len(),
        only_allow_preset_remotes = config.only_allow_preset_remotes,
        "Configuration loaded"
    );

    for server in &config.servers {
        tracing::info!(
            address = %server.listen_address(),
            tls = server.is_tls(),
            initial_timeout_secs = server.initial_timeout.as_secs(),
            read_timeout_secs = server.read_timeout.as_secs(),
            write_timeout_secs = server.write_timeout.as_secs(),
            heartbeat_timeout_secs = server.heartbeat_timeout.as_secs(),
            read_delay_ms = server.read_delay.as_millis() as u64,
            write_delay_ms = server.write_delay.as_millis() as u64,
            "Server"
        );
    }

    for preset in &config.presets {
        tracing::info!(
            title = %preset.title,
            kind = %preset.kind,
            host = %preset.host,
            "Preset"
        );
    }
}
