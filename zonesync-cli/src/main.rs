//! zonesync command-line entry point
//!
//! Replicates the zones of every configured cloud account onto the target store.
//!
//! Exit codes: 0 on success, 1 when any account or zone failed, 2 when the
//! configuration could not be loaded.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use zonesync_app::AppState;
use zonesync_app::config::SyncConfig;

const EXIT_FAILURES: u8 = 1;
const EXIT_CONFIG: u8 = 2;

/// Replicate cloud DNS zones onto a secondary DNS server
#[derive(Parser)]
#[command(name = "zonesync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync every configured zone
    Run(RunArgs),

    /// Load and validate the configuration file
    CheckConfig(CheckConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Configuration file
    #[arg(long, short, env = "ZONESYNC_CONFIG", default_value = "zonesync.json")]
    config: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Compute changes without touching the target store
    #[arg(long)]
    dry_run: bool,

    /// Only sync this zone (repeatable)
    #[arg(long = "zone", value_name = "NAME")]
    zones: Vec<String>,
}

#[derive(Args)]
struct CheckConfigArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Also verify every account's credentials against its provider
    #[arg(long)]
    verify_credentials: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout 留给命令输出，日志写到 stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::CheckConfig(args) => check_config(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAILURES)
        }
    }
}

fn load_config(args: &ConfigArgs) -> Option<SyncConfig> {
    match SyncConfig::load(&args.config) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::error!("{e}");
            None
        }
    }
}

async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let Some(config) = load_config(&args.config) else {
        return Ok(ExitCode::from(EXIT_CONFIG));
    };

    let mut options = config.to_run_options();
    options.dry_run |= args.dry_run;
    if !args.zones.is_empty() {
        options.include_zones = Some(args.zones);
    }

    let state = match AppState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("{e}");
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };

    let summary = state.run(&options).await.context("sync run aborted")?;
    if summary.has_failures() {
        Ok(ExitCode::from(EXIT_FAILURES))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn check_config(args: CheckConfigArgs) -> anyhow::Result<ExitCode> {
    let Some(config) = load_config(&args.config) else {
        return Ok(ExitCode::from(EXIT_CONFIG));
    };
    tracing::info!(
        "{}: {} accounts, target {:?}",
        args.config.config.display(),
        config.accounts.len(),
        config.target
    );

    if !args.verify_credentials {
        return Ok(ExitCode::SUCCESS);
    }

    let state = match AppState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("{e}");
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };
    let mut all_valid = true;
    for (account_id, valid) in state.validate_accounts().await {
        if valid {
            tracing::info!("Account {account_id}: credentials accepted");
        } else {
            tracing::error!("Account {account_id}: credentials rejected");
            all_valid = false;
        }
    }
    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_CONFIG)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_repeated_zones() {
        let res = Cli::try_parse_from([
            "zonesync",
            "run",
            "--config",
            "/etc/zonesync.json",
            "--dry-run",
            "--zone",
            "a.com",
            "--zone",
            "b.org",
        ]);
        assert!(res.is_ok());
        let Ok(Cli {
            command: Commands::Run(args),
        }) = res
        else {
            return;
        };
        assert!(args.dry_run);
        assert_eq!(args.zones, vec!["a.com", "b.org"]);
        assert_eq!(args.config.config, PathBuf::from("/etc/zonesync.json"));
    }
}
